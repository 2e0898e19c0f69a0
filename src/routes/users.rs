use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::db::users::UserChanges;
use crate::error::{AppError, ValidationErrors};
use crate::models::User;
use crate::state::SharedState;

use super::auth::{require, EMAIL_RE};

pub const USER_NOT_FOUND: &str = "User not found.";
pub const ACCOUNT_DELETED: &str = "User account has been deleted successfully.";

/// Profile edit takes the same fields as registration; the password pair is
/// optional and only rehashed when supplied.
#[derive(Deserialize)]
pub struct EditUserRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    pub avatar: Option<Uuid>,
    #[serde(default)]
    pub is_marketing: bool,
}

pub async fn get_current(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.uuid())
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;
    Ok(Json(user))
}

pub async fn edit_current(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<EditUserRequest>,
) -> Result<Json<User>, AppError> {
    validate_edit(&req)?;

    let current = db::users::find_by_id(&state.pool, auth.uuid())
        .await?
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

    match db::users::update_non_admin(&state.pool, auth.uuid(), &changes).await {
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

pub async fn delete_current(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    if !db::users::soft_delete_non_admin(&state.pool, auth.uuid()).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }
    Ok(Json(json!({ "message": ACCOUNT_DELETED })))
}

pub(super) fn validate_edit(req: &EditUserRequest) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    require(&mut errors, "first_name", &req.first_name);
    require(&mut errors, "last_name", &req.last_name);

    if req.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !EMAIL_RE.is_match(req.email.trim()) {
        errors.add("email", "The email must be a valid email address.");
    }

    if !req.password.is_empty() {
        if req.password.len() < 8 {
            errors.add("password", "The password must be at least 8 characters.");
        }
        if req.password != req.password_confirmation {
            errors.add("password", "The password confirmation does not match.");
        }
    }

    require(&mut errors, "address", &req.address);
    require(&mut errors, "phone_number", &req.phone_number);

    errors.into_result()
}
