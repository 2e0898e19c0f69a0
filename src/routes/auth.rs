use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::UserClaims;
use crate::auth::password;
use crate::db;
use crate::db::users::NewUser;
use crate::error::{AppError, ValidationErrors};
use crate::models::User;
use crate::state::SharedState;

pub const CREDENTIALS_MISMATCH: &str = "Email and/or Password does not match.";

pub(super) static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Deserialize)]
pub struct RegisterRequest {
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
    #[serde(default)]
    pub avatar: Option<Uuid>,
    #[serde(default)]
    pub is_marketing: bool,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = create_account(&state, &req, false).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully, please login to continue.",
            "user": user,
        })),
    ))
}

/// Same input rules as `register`, but the created account is an admin.
/// Reachable only through the admin-gated router.
pub async fn register_admin(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = create_account(&state, &req, true).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Admin created successfully, please login to continue.",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let user = db::users::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::BadRequest(CREDENTIALS_MISMATCH.to_string()))?;

    let valid =
        password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::BadRequest(CREDENTIALS_MISMATCH.to_string()));
    }

    let token = state
        .codec
        .issue(UserClaims::from(&user))
        .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "message": "login successful.",
        "user": user,
        "token": token,
    })))
}

/// Blacklist the presented token as-is. The authentication gate in front of
/// this route already rejected missing or invalid bearers; the revocation
/// itself never inspects the string.
pub async fn logout(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    db::token_blacklist::revoke(&state.pool, &auth.token).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

async fn create_account(
    state: &SharedState,
    req: &RegisterRequest,
    as_admin: bool,
) -> Result<User, AppError> {
    validate_registration(req)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let new_user = NewUser {
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        email: req.email.trim(),
        password_hash: &pw_hash,
        is_admin: as_admin,
        avatar: req.avatar,
        address: req.address.trim(),
        phone_number: req.phone_number.trim(),
        is_marketing: req.is_marketing,
    };

    match db::users::create(&state.pool, &new_user).await {
        Ok(user) => Ok(user),
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

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    require(&mut errors, "first_name", &req.first_name);
    require(&mut errors, "last_name", &req.last_name);

    if req.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !EMAIL_RE.is_match(req.email.trim()) {
        errors.add("email", "The email must be a valid email address.");
    }

    if req.password.is_empty() {
        errors.add("password", "The password field is required.");
    } else {
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

pub(super) fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        let label = field.replace('_', " ");
        errors.add(field, &format!("The {label} field is required."));
    }
}
