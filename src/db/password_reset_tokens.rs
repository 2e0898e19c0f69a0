use sqlx::PgPool;

use crate::models::PasswordResetToken;

/// Insert or replace the reset token for an email. One active token per
/// address; a new request invalidates the previous link.
pub async fn upsert(pool: &PgPool, email: &str, token_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO password_reset_tokens (email, token, created_at)
         VALUES ($1, $2, now())
         ON CONFLICT (email) DO UPDATE SET token = EXCLUDED.token, created_at = EXCLUDED.created_at",
    )
    .bind(email)
    .bind(token_hash)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<PasswordResetToken>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetToken>(
        "SELECT * FROM password_reset_tokens WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn delete_by_email(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM password_reset_tokens WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}
