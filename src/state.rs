use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::TokenCodec;
use crate::config::Config;
use crate::email::Mailer;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub codec: TokenCodec,
    pub mailer: Option<Arc<Mailer>>,
}
