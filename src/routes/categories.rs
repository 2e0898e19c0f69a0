use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::db::categories::ListParams;
use crate::error::{AppError, ValidationErrors};
use crate::models::Category;
use crate::state::SharedState;

use super::{page_params, total_pages, wants_desc};

pub const CATEGORY_NOT_FOUND: &str = "Category not found.";

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub desc: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoryRequest {
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

    let categories = db::categories::list(&state.pool, &params).await?;
    let total = db::categories::count(&state.pool, &params).await?;

    Ok(Json(json!({
        "categories": categories,
        "total": total,
        "page": page.number,
        "limit": page.limit,
        "total_pages": total_pages(total, page.limit),
    })))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    let category = db::categories::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(CATEGORY_NOT_FOUND.to_string()))?;
    Ok(Json(category))
}

/// Slug comes from the title; a colliding slug gets a random suffix.
pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    validate_title(&req)?;
    let title = req.title.trim();
    let slug = slug_for(title);

    for attempt in 0..3 {
        let candidate = if attempt == 0 { slug.clone() } else { suffixed(&slug) };
        match db::categories::create(&state.pool, title, &candidate).await {
            Ok(category) => return Ok((StatusCode::CREATED, Json(category))),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Internal("exhausted category slug candidates".to_string()))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, AppError> {
    validate_title(&req)?;
    let title = req.title.trim();
    let slug = slug_for(title);

    for attempt in 0..3 {
        let candidate = if attempt == 0 { slug.clone() } else { suffixed(&slug) };
        match db::categories::update(&state.pool, id, title, &candidate).await {
            Ok(Some(category)) => return Ok(Json(category)),
            Ok(None) => return Err(AppError::NotFound(CATEGORY_NOT_FOUND.to_string())),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Internal("exhausted category slug candidates".to_string()))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !db::categories::delete(&state.pool, id).await? {
        return Err(AppError::NotFound(CATEGORY_NOT_FOUND.to_string()));
    }
    Ok(Json(json!({ "message": "Category deleted successfully." })))
}

fn validate_title(req: &CategoryRequest) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();
    if req.title.trim().is_empty() {
        errors.add("title", "The title field is required.");
    }
    errors.into_result()
}

fn slug_for(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        // Titles with no alphanumerics still need a usable slug.
        hex::encode(rand::random::<[u8; 4]>())
    } else {
        slug
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn suffixed(slug: &str) -> String {
    format!("{slug}-{}", hex::encode(rand::random::<[u8; 2]>()))
}
