use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per email; the stored token is a sha256 hex digest, never the
/// raw value mailed to the user.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
}
