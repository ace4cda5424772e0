use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A counterparty the user bills. Invoices copy these fields rather than
/// referencing the row, so deleting a client never touches past invoices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
}

/// Client creation form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateClient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: String,
}
