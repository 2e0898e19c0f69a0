use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::auth::password;
use crate::db;
use crate::error::{AppError, ValidationErrors};
use crate::state::SharedState;

pub const RESET_LINK_SENT: &str = "Reset link sent to your email.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const INVALID_OR_EXPIRED_TOKEN: &str = "Invalid token or expired token.";

/// Reset links stop working this long after the request that minted them.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Responds identically whether or not the email is registered. For known
/// addresses the hashed token lands in storage before the response; only
/// the SMTP delivery runs on a background task.
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let response = Json(json!({ "message": RESET_LINK_SENT }));

    let Some(user) = db::users::find_by_email(&state.pool, &req.email).await? else {
        return Ok(response);
    };

    let token = generate_reset_token();
    db::password_reset_tokens::upsert(&state.pool, &user.email, &hash_token(&token)).await?;

    let reset_url = reset_link(&state.config.app_url, &token, &user.email);
    match &state.mailer {
        Some(mailer) => {
            let mailer = mailer.clone();
            let to = user.email.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_password_reset(&to, &reset_url).await {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            });
        }
        None => {
            tracing::warn!("SMTP not configured. Password reset link: {reset_url}");
        }
    }

    Ok(response)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    validate_reset(&req)?;

    let record = db::password_reset_tokens::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.to_string()))?;

    if Utc::now() > record.created_at + Duration::minutes(RESET_TOKEN_TTL_MINUTES) {
        db::password_reset_tokens::delete_by_email(&state.pool, &req.email).await?;
        return Err(AppError::BadRequest(INVALID_OR_EXPIRED_TOKEN.to_string()));
    }

    // A mismatch inside the window leaves the record in place so the holder
    // of the real link can still use it.
    if !tokens_match(&hash_token(&req.token), &record.token) {
        return Err(AppError::BadRequest(INVALID_OR_EXPIRED_TOKEN.to_string()));
    }

    let user = db::users::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.to_string()))?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;
    db::password_reset_tokens::delete_by_email(&state.pool, &req.email).await?;

    Ok(Json(json!({ "message": "Password has been reset successfully." })))
}

fn validate_reset(req: &ResetPasswordRequest) -> Result<(), AppError> {
    let mut errors = ValidationErrors::new();

    if req.email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    }
    if req.token.is_empty() {
        errors.add("token", "The token field is required.");
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

    errors.into_result()
}

/// 32 random bytes, hex-encoded: 64 URL-safe characters.
fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn tokens_match(presented: &str, stored: &str) -> bool {
    presented.as_bytes().ct_eq(stored.as_bytes()).into()
}

fn reset_link(app_url: &str, token: &str, email: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(email.as_bytes()).collect();
    format!("{app_url}/reset-password?token={token}&email={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_long_and_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable_sha256_hex() {
        assert_eq!(
            hash_token("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn matching_is_exact() {
        let stored = hash_token("the-real-token");
        assert!(tokens_match(&hash_token("the-real-token"), &stored));
        assert!(!tokens_match(&hash_token("the-fake-token"), &stored));
    }

    #[test]
    fn reset_link_urlencodes_the_email() {
        let link = reset_link("http://shop.test", "abc123", "user+tag@example.com");
        assert_eq!(
            link,
            "http://shop.test/reset-password?token=abc123&email=user%2Btag%40example.com"
        );
    }
}
