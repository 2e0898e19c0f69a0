use sqlx::PgPool;

/// Insert the raw token string into the deny list. Re-revoking the same
/// token is a no-op.
pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO token_blacklists (token) VALUES ($1) ON CONFLICT (token) DO NOTHING")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn is_revoked(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM token_blacklists WHERE token = $1)")
        .bind(token)
        .fetch_one(pool)
        .await
}
