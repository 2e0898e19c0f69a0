use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

/// Single message for every authentication failure: missing header,
/// blacklisted token, bad signature, expired. Clients learn nothing about
/// which check tripped.
pub const LOGIN_REQUIRED: &str = "Please login to complete this request";

pub const NOT_PERMITTED: &str = "You don't have permission to operate this route.";

/// First gate: extract the bearer token, refuse anything blacklisted,
/// verify signature and expiry, then attach the identity to the request.
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_string()))?;

    if db::token_blacklist::is_revoked(&state.pool, &token).await? {
        return Err(AppError::Unauthorized(LOGIN_REQUIRED.to_string()));
    }

    let claims = state
        .codec
        .validate(&token)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::Unauthorized(LOGIN_REQUIRED.to_string())
        })?;

    req.extensions_mut().insert(AuthUser {
        claims: claims.user,
        token,
    });

    Ok(next.run(req).await)
}

/// Second gate, layered inside `require_auth`: only admin identities pass.
/// Running it without the first gate is a wiring bug and surfaces as a 500.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let auth = req.extensions().get::<AuthUser>().ok_or_else(|| {
        AppError::Internal("admin gate reached without an authenticated identity".to_string())
    })?;

    if !auth.is_admin() {
        return Err(AppError::Forbidden(NOT_PERMITTED.to_string()));
    }

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
