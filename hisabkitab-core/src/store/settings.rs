use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Settings, UpdateSettings};

const SELECT_SETTINGS: &str = r#"
    SELECT user_id, business_name, email, phone, address, tax_id, logo_path
    FROM settings
    WHERE user_id = ?
"#;

pub async fn get_settings(pool: &SqlitePool, user_id: i64) -> Result<Option<Settings>, sqlx::Error> {
    sqlx::query_as::<_, Settings>(SELECT_SETTINGS)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns the user's settings, creating a default row named after the
/// user when none exists yet.
pub async fn ensure_settings(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
) -> Result<Settings, sqlx::Error> {
    if let Some(settings) = get_settings(pool, user_id).await? {
        return Ok(settings);
    }

    let defaults = Settings::defaults_for(user_id, name);
    sqlx::query("INSERT INTO settings (user_id, business_name) VALUES (?, ?) ON CONFLICT(user_id) DO NOTHING")
        .bind(user_id)
        .bind(&defaults.business_name)
        .execute(pool)
        .await?;

    info!("Created default settings for user {}", user_id);
    Ok(get_settings(pool, user_id).await?.unwrap_or(defaults))
}

/// Inserts or replaces the text fields of a user's settings.
///
/// `logo_path` replaces the stored logo only when `Some`; an existing
/// logo survives a save without a new upload.
pub async fn upsert_settings(
    pool: &SqlitePool,
    user_id: i64,
    update: &UpdateSettings,
    logo_path: Option<&str>,
) -> Result<Settings, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO settings (user_id, business_name, email, phone, address, tax_id, logo_path)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            business_name = excluded.business_name,
            email = excluded.email,
            phone = excluded.phone,
            address = excluded.address,
            tax_id = excluded.tax_id,
            logo_path = COALESCE(excluded.logo_path, settings.logo_path)
        "#,
    )
    .bind(user_id)
    .bind(&update.business_name)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(&update.address)
    .bind(&update.tax_id)
    .bind(logo_path)
    .execute(pool)
    .await?;

    info!("Saved settings for user {}", user_id);
    sqlx::query_as::<_, Settings>(SELECT_SETTINGS)
        .bind(user_id)
        .fetch_one(pool)
        .await
}
