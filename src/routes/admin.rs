use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::db::users::{ListParams, UserChanges};
use crate::error::{AppError, ValidationErrors};
use crate::models::User;
use crate::state::SharedState;

use super::users::{validate_edit, EditUserRequest, ACCOUNT_DELETED, USER_NOT_FOUND};
use super::{page_params, total_pages, wants_desc};

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub desc: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

/// Paginated listing of customer accounts. Admin rows never appear here.
pub async fn list_users(
    State(state): State<SharedState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>, AppError> {
    let page = page_params(query.page, query.limit);
    let params = ListParams {
        limit: page.limit,
        offset: page.offset,
        sort_by: query.sort_by.unwrap_or_else(|| "created_at".to_string()),
        desc: wants_desc(query.desc.as_deref()),
        email: query.email,
        phone: query.phone,
        name: query.name,
    };

    let users = db::users::list_non_admin(&state.pool, &params).await?;
    let total = db::users::count_non_admin(&state.pool, &params).await?;

    Ok(Json(json!({
        "users": users,
        "total": total,
        "page": page.number,
        "limit": page.limit,
        "total_pages": total_pages(total, page.limit),
    })))
}

/// Edits a customer account. Unknown, deleted and admin targets all answer
/// 404 so admin rows stay invisible through this surface.
pub async fn edit_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditUserRequest>,
) -> Result<Json<User>, AppError> {
    validate_edit(&req)?;

    let current = db::users::find_by_id(&state.pool, id)
        .await?
        .filter(|u| !u.is_admin)
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    let pw_hash = if req.password.is_empty() {
        current.password_hash.clone()
    } else {
        password::hash(&req.password).map_err(AppError::Internal)?
    };

    let changes = UserChanges {
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        email: req.email.trim(),
        password_hash: &pw_hash,
        avatar: req.avatar,
        address: req.address.trim(),
        phone_number: req.phone_number.trim(),
        is_marketing: req.is_marketing,
    };

    match db::users::update_non_admin(&state.pool, id, &changes).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let mut errors = ValidationErrors::new();
            if db_err.constraint() == Some("users_phone_number_unique") {
                errors.add("phone_number", "The phone number has already been taken.");
            } else {
                errors.add("email", "The email has already been taken.");
            }
            Err(AppError::Validation(errors))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !db::users::soft_delete_non_admin(&state.pool, id).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }
    Ok(Json(json!({ "message": ACCOUNT_DELETED })))
}
