use sqlx::SqlitePool;
use tracing::info;

use crate::models::User;

/// Inserts a new user and returns it.
///
/// The email is expected to be normalized already. A duplicate email
/// surfaces as a database error whose `is_unique_violation()` is true.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    pass_hash: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, pass_hash)
        VALUES (?, ?, ?)
        RETURNING id, name, email, pass_hash
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(pass_hash)
    .fetch_one(pool)
    .await?;

    info!("Created user {} ({})", user.id, user.email);
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email, pass_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email, pass_hash FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}
