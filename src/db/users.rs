use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub avatar: Option<Uuid>,
    pub address: &'a str,
    pub phone_number: &'a str,
    pub is_marketing: bool,
}

/// Final column values for an update; callers merge the stored row with the
/// requested changes before calling.
pub struct UserChanges<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar: Option<Uuid>,
    pub address: &'a str,
    pub phone_number: &'a str,
    pub is_marketing: bool,
}

pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: String,
    pub desc: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

pub async fn create(pool: &PgPool, user: &NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (first_name, last_name, email, password_hash, is_admin,
                            avatar, address, phone_number, is_marketing)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.is_admin)
    .bind(user.avatar)
    .bind(user.address)
    .bind(user.phone_number)
    .bind(user.is_marketing)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Update a non-admin account. Returns None when the target does not exist,
/// is deleted, or is an admin (admin rows are off limits to profile edits).
pub async fn update_non_admin(
    pool: &PgPool,
    id: Uuid,
    changes: &UserChanges<'_>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                          avatar = $6, address = $7, phone_number = $8, is_marketing = $9,
                          updated_at = now()
         WHERE id = $1 AND is_admin = false AND deleted_at IS NULL
         RETURNING *",
    )
    .bind(id)
    .bind(changes.first_name)
    .bind(changes.last_name)
    .bind(changes.email)
    .bind(changes.password_hash)
    .bind(changes.avatar)
    .bind(changes.address)
    .bind(changes.phone_number)
    .bind(changes.is_marketing)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Soft delete a non-admin account. Returns false when nothing was deleted.
pub async fn soft_delete_non_admin(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET deleted_at = now()
         WHERE id = $1 AND is_admin = false AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_non_admin(pool: &PgPool, params: &ListParams) -> Result<Vec<User>, sqlx::Error> {
    let order = if params.desc { "DESC" } else { "ASC" };

    let sort_col = match params.sort_by.as_str() {
        "email" => "email",
        "first_name" => "first_name",
        "last_name" => "last_name",
        "created_at" => "created_at",
        _ => "created_at",
    };

    sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM users
         WHERE is_admin = false AND deleted_at IS NULL
           AND ($1::text IS NULL OR email ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR phone_number ILIKE '%' || $2 || '%')
           AND ($3::text IS NULL OR first_name || ' ' || last_name ILIKE '%' || $3 || '%')
         ORDER BY {sort_col} {order} LIMIT $4 OFFSET $5"
    ))
    .bind(params.email.as_deref())
    .bind(params.phone.as_deref())
    .bind(params.name.as_deref())
    .bind(params.limit)
    .bind(params.offset)
    .fetch_all(pool)
    .await
}

pub async fn count_non_admin(pool: &PgPool, params: &ListParams) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users
         WHERE is_admin = false AND deleted_at IS NULL
           AND ($1::text IS NULL OR email ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR phone_number ILIKE '%' || $2 || '%')
           AND ($3::text IS NULL OR first_name || ' ' || last_name ILIKE '%' || $3 || '%')",
    )
    .bind(params.email.as_deref())
    .bind(params.phone.as_deref())
    .bind(params.name.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
