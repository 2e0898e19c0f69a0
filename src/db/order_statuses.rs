use sqlx::PgPool;
use uuid::Uuid;

use crate::models::OrderStatus;

pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub desc: bool,
    pub title: Option<String>,
}

pub async fn create(pool: &PgPool, title: &str) -> Result<OrderStatus, sqlx::Error> {
    sqlx::query_as::<_, OrderStatus>(
        "INSERT INTO order_statuses (title) VALUES ($1) RETURNING *",
    )
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OrderStatus>, sqlx::Error> {
    sqlx::query_as::<_, OrderStatus>("SELECT * FROM order_statuses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    title: &str,
) -> Result<Option<OrderStatus>, sqlx::Error> {
    sqlx::query_as::<_, OrderStatus>(
        "UPDATE order_statuses SET title = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM order_statuses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// True when any order still references this status.
pub async fn orders_attached(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM orders WHERE order_status_id = $1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<OrderStatus>, sqlx::Error> {
    let order = if params.desc { "DESC" } else { "ASC" };

    let sort_col = match params.sort_by.as_str() {
        "title" => "title",
        "created_at" => "created_at",
        _ => "created_at",
    };

    sqlx::query_as::<_, OrderStatus>(&format!(
        "SELECT * FROM order_statuses
         WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
         ORDER BY {sort_col} {order} LIMIT $2 OFFSET $3"
    ))
    .bind(params.title.as_deref())
    .bind(params.limit)
    .bind(params.offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, params: &ListParams) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM order_statuses
         WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')",
    )
    .bind(params.title.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
