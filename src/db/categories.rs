use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Category;

pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub desc: bool,
    pub title: Option<String>,
}

pub async fn create(pool: &PgPool, title: &str, slug: &str) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (title, slug) VALUES ($1, $2) RETURNING *",
    )
    .bind(title)
    .bind(slug)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    title: &str,
    slug: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET title = $2, slug = $3, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<Category>, sqlx::Error> {
    let order = if params.desc { "DESC" } else { "ASC" };

    let sort_col = match params.sort_by.as_str() {
        "title" => "title",
        "slug" => "slug",
        "created_at" => "created_at",
        _ => "created_at",
    };

    sqlx::query_as::<_, Category>(&format!(
        "SELECT * FROM categories
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
        "SELECT COUNT(*) FROM categories
         WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')",
    )
    .bind(params.title.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
