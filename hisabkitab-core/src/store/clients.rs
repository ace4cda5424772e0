use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Client, CreateClient};

const CLIENT_COLUMNS: &str = "id, user_id, name, email, phone, address, tax_id";

pub async fn list_clients(pool: &SqlitePool, user_id: i64) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = ? ORDER BY name COLLATE NOCASE"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Looks a client up by exact name within one user's clients.
pub async fn find_by_name(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = ? AND name = ? ORDER BY id DESC LIMIT 1"
    ))
    .bind(user_id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Inserts a client. The caller has already checked the name is present.
pub async fn create_client(
    pool: &SqlitePool,
    user_id: i64,
    client: &CreateClient,
) -> Result<Client, sqlx::Error> {
    let created = sqlx::query_as::<_, Client>(&format!(
        r#"
        INSERT INTO clients (user_id, name, email, phone, address, tax_id)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {CLIENT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(client.name.trim())
    .bind(client.email.trim())
    .bind(client.phone.trim())
    .bind(client.address.trim())
    .bind(client.tax_id.trim())
    .fetch_one(pool)
    .await?;

    info!("User {} created client {}", user_id, created.id);
    Ok(created)
}

/// Deletes a client owned by `user_id`. Returns false when nothing matched.
pub async fn delete_client(pool: &SqlitePool, user_id: i64, client_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ? AND user_id = ?")
        .bind(client_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    fn acme() -> CreateClient {
        CreateClient {
            name: " Acme ".into(),
            email: "billing@acme.test".into(),
            ..CreateClient::default()
        }
    }

    #[tokio::test]
    async fn test_create_list_and_find() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "c@example.com").await;

        let created = create_client(&pool, user.id, &acme()).await.unwrap();
        assert_eq!(created.name, "Acme");

        let all = list_clients(&pool, user.id).await.unwrap();
        assert_eq!(all.len(), 1);
        let found = find_by_name(&pool, user.id, "Acme").await.unwrap().unwrap();
        assert_eq!(found.email, "billing@acme.test");
    }

    #[tokio::test]
    async fn test_clients_are_isolated_per_user() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "owner@example.com").await;
        let other = testing::user(&pool, "other@example.com").await;
        let created = create_client(&pool, owner.id, &acme()).await.unwrap();

        assert!(list_clients(&pool, other.id).await.unwrap().is_empty());
        assert!(find_by_name(&pool, other.id, "Acme").await.unwrap().is_none());
        assert!(!delete_client(&pool, other.id, created.id).await.unwrap());
        assert!(delete_client(&pool, owner.id, created.id).await.unwrap());
        assert!(list_clients(&pool, owner.id).await.unwrap().is_empty());
    }
}
