use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::db::order_statuses::ListParams;
use crate::error::{AppError, ValidationErrors};
use crate::models::OrderStatus;
use crate::state::SharedState;

use super::{page_params, total_pages, wants_desc};

pub const STATUS_NOT_FOUND: &str = "Status not found.";
pub const ORDERS_ATTACHED: &str = "There are orders attached to this status.";

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub desc: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub title: String,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = page_params(query.page, query.limit);
    let params = ListParams {
        limit: page.limit,
        offset: page.offset,
        sort_by: query.sort_by.unwrap_or_else(|| "created_at".to_string()),
        desc: wants_desc(query.desc.as_deref()),
        title: query.title,
    };

    let statuses = db::order_statuses::list(&state.pool, &params).await?;
    let total = db::order_statuses::count(&state.pool, &params).await?;

    Ok(Json(json!({
        "order_statuses": statuses,
        "total": total,
        "page": page.number,
        "limit": page.limit,
        "total_pages": total_pages(total, page.limit),
    })))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderStatus>, AppError> {
    let status = db::order_statuses::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(STATUS_NOT_FOUND.to_string()))?;
    Ok(Json(status))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<StatusRequest>,
) -> Result<(StatusCode, Json<OrderStatus>), AppError> {
    validate_title(&req)?;
    let status = db::order_statuses::create(&state.pool, req.title.trim()).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderStatus>, AppError> {
    validate_title(&req)?;
    let status = db::order_statuses::update(&state.pool, id, req.title.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(STATUS_NOT_FOUND.to_string()))?;
    Ok(Json(status))
}

/// Statuses still referenced by orders cannot be removed.
pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if db::order_statuses::orders_attached(&state.pool, id).await? {
        return Err(AppError::BadRequest(ORDERS_ATTACHED.to_string()));
    }
    if !db::order_statuses::delete(&state.pool, id).await? {
        return Err(AppError::NotFound(STATUS_NOT_FOUND.to_string()));
    }
    Ok(Json(json!({ "message": "Order status deleted successfully." })))
}

fn validate_title(req: &StatusRequest) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();
    if req.title.trim().is_empty() {
        errors.add("title", "The title field is required.");
    }
    errors.into_result()
}
