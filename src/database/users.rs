use sqlx::PgPool;
use uuid::Uuid;

use super::models::user::{PublicUser, User};
use super::DatabaseError;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Login matches the submitted identifier against both email and username.
pub async fn find_by_email_or_username(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 OR username = $1")
        .bind(identifier)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_public_by_id(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<PublicUser>, DatabaseError> {
    let user = sqlx::query_as::<_, PublicUser>(
        "SELECT user_id, username, email FROM users WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO users (user_id, username, email, password_hash) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(())
}
