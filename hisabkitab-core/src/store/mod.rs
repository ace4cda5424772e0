//! Parameterized queries over the SQLite store, one module per table.
//!
//! Every query that reads or deletes user-owned rows filters on the
//! owning user's id, so a record belonging to someone else behaves exactly
//! like a missing one.

pub mod clients;
pub mod invoices;
pub mod settings;
pub mod users;

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::SqlitePool;

    use crate::db::create_memory_pool;
    use crate::models::User;
    use crate::store::users;

    /// Fresh in-memory database.
    pub async fn pool() -> SqlitePool {
        create_memory_pool().await.expect("in-memory pool")
    }

    /// Inserts a user with a dummy hash.
    pub async fn user(pool: &SqlitePool, email: &str) -> User {
        users::create_user(pool, "Test User", email, "not-a-real-hash")
            .await
            .expect("create user")
    }
}
