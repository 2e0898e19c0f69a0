use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Order;

pub struct NewOrder<'a> {
    pub user_id: Uuid,
    pub order_status_id: Uuid,
    pub products: &'a serde_json::Value,
    pub address: &'a serde_json::Value,
    pub delivery_fee: Option<Decimal>,
    pub amount: Decimal,
}

pub struct ListParams {
    pub user_id: Uuid,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub desc: bool,
}

pub async fn create(pool: &PgPool, order: &NewOrder<'_>) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders (user_id, order_status_id, products, address, delivery_fee, amount)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(order.user_id)
    .bind(order.order_status_id)
    .bind(order.products)
    .bind(order.address)
    .bind(order.delivery_fee)
    .bind(order.amount)
    .fetch_one(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, params: &ListParams) -> Result<Vec<Order>, sqlx::Error> {
    let order = if params.desc { "DESC" } else { "ASC" };

    let sort_col = match params.sort_by.as_str() {
        "amount" => "amount",
        "shipped_at" => "shipped_at",
        "created_at" => "created_at",
        _ => "created_at",
    };

    sqlx::query_as::<_, Order>(&format!(
        "SELECT * FROM orders WHERE user_id = $1
         ORDER BY {sort_col} {order} LIMIT $2 OFFSET $3"
    ))
    .bind(params.user_id)
    .bind(params.limit)
    .bind(params.offset)
    .fetch_all(pool)
    .await
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
