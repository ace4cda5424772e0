use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user business profile used to pre-fill new invoices and to head
/// generated documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Settings {
    /// Owner of this profile (one row per user)
    pub user_id: i64,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// GSTIN or other tax registration number
    pub tax_id: String,
    /// Absolute path of the uploaded logo, if any
    pub logo_path: Option<String>,
}

/// Text fields of the settings form. The logo arrives separately as a
/// multipart file part.
#[derive(Debug, Clone, Default)]
pub struct UpdateSettings {
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
}

impl Settings {
    /// Fresh profile for a newly seen user, named after them.
    pub fn defaults_for(user_id: i64, name: &str) -> Self {
        Self {
            user_id,
            business_name: name.to_string(),
            ..Self::default()
        }
    }
}
