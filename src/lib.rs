pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod email;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::TokenCodec;
use crate::auth::password;
use crate::config::Config;
use crate::db::users::NewUser;
use crate::email::Mailer;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> Router {
    let mailer = config.smtp.as_ref().and_then(|smtp| match Mailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("SMTP transport configured");
            Some(Arc::new(mailer))
        }
        Err(e) => {
            tracing::warn!("SMTP transport not available: {e}");
            None
        }
    });

    let codec = TokenCodec::new(&config.app_url, &config.jwt_secret);

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        codec,
        mailer,
    });

    Router::new()
        .merge(routes::api_routes(state.clone()))
        .route("/health", axum::routing::get(health))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Inserts the configured admin account on startup when it does not exist
/// yet. Profile fields other than the credentials are fixed placeholders.
pub async fn bootstrap_admin(pool: &PgPool, config: &Config) -> Result<(), String> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(());
    };

    let existing = db::users::find_by_email(pool, &admin.email)
        .await
        .map_err(|e| format!("Admin bootstrap lookup failed: {e}"))?;
    if existing.is_some() {
        return Ok(());
    }

    let pw_hash = password::hash(&admin.password)?;
    let new_admin = NewUser {
        first_name: "Admin",
        last_name: "Admin",
        email: &admin.email,
        password_hash: &pw_hash,
        is_admin: true,
        avatar: None,
        address: "System",
        phone_number: "+0000000000",
        is_marketing: false,
    };

    match db::users::create(pool, &new_admin).await {
        Ok(user) => {
            tracing::info!("Bootstrapped admin account {}", user.email);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("Admin bootstrap skipped: placeholder profile fields already taken");
            Ok(())
        }
        Err(e) => Err(format!("Admin bootstrap failed: {e}")),
    }
}
