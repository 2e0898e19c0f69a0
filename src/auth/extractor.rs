use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::jwt::UserClaims;
use crate::error::AppError;
use crate::middleware::auth_gate::LOGIN_REQUIRED;

/// The authenticated identity attached to a request by the token gate,
/// carrying the decoded claims and the raw bearer string (logout blacklists
/// the exact string that was presented).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: UserClaims,
    pub token: String,
}

impl AuthUser {
    pub fn uuid(&self) -> Uuid {
        self.claims.uuid
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_string()))
    }
}
