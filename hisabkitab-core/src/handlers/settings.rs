use std::path::Path;

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::flash::{flash_redirect, take_flash};
use crate::handlers::invoices::load_settings;
use crate::models::UpdateSettings;
use crate::store::settings;
use crate::views::{render_page, SettingsTemplate};

/// An uploaded file part.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

pub async fn settings_page(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let current = load_settings(&state, &user).await?;
    let (jar, flash) = take_flash(jar);

    render_page(
        jar,
        &SettingsTemplate {
            flash,
            has_logo: current.logo_path.is_some(),
            settings: current,
        },
    )
}

/// Saves the business profile; a non-empty `logo` part replaces the stored
/// logo.
pub async fn save_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut update = UpdateSettings::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Could not read the form: {e}"), "/settings"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "logo" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Logo upload failed: {e}"), "/settings"))?;
            if !bytes.is_empty() {
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Could not read the form: {e}"), "/settings"))?
            .trim()
            .to_string();
        match name.as_str() {
            "business_name" => update.business_name = value,
            "email" => update.email = value,
            "phone" => update.phone = value,
            "address" => update.address = value,
            "tax_id" => update.tax_id = value,
            _ => {}
        }
    }

    let logo_path = match upload {
        Some(upload) => Some(store_logo(&state.config.logo_dir(), upload).await?),
        None => None,
    };

    let previous_logo = match logo_path {
        Some(_) => settings::get_settings(&state.db, user.id())
            .await?
            .and_then(|s| s.logo_path),
        None => None,
    };

    if let Err(e) = settings::upsert_settings(&state.db, user.id(), &update, logo_path.as_deref()).await {
        if let Some(path) = &logo_path {
            discard_logo(path).await;
        }
        return Err(e.into());
    }

    // The old file is unreferenced once the new path is stored.
    if let Some(old) = previous_logo.filter(|old| Some(old) != logo_path.as_ref()) {
        discard_logo(&old).await;
    }

    Ok(flash_redirect(jar, "/settings", "Settings saved").into_response())
}

/// Best-effort removal of a logo file that is no longer referenced.
async fn discard_logo(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove logo {}: {}", path, e);
    }
}

/// Lower-cased image extension accepted for logos, if `file_name` has one.
fn logo_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        _ => None,
    }
}

/// Writes the logo under a fresh name and returns its path.
async fn store_logo(dir: &Path, upload: Upload) -> Result<String, AppError> {
    let ext = logo_extension(&upload.file_name)
        .ok_or_else(|| AppError::validation("Logo must be a PNG or JPEG image", "/settings"))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", dir.display()))?;
    let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;

    info!("Stored logo at {}", path.display());
    Ok(path.to_string_lossy().into_owned())
}
