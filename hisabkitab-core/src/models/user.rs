use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User model representing an account holder.
///
/// Maps to the `users` table. A user owns one settings row and any
/// number of clients and invoices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: i64,

    /// Display name given at signup
    pub name: String,

    /// Login email address (unique, stored lowercase)
    pub email: String,

    /// Bcrypt hashed password
    #[serde(skip_serializing)]
    pub pass_hash: String,
}

/// Signup form submission
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form submission
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Normalizes an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
