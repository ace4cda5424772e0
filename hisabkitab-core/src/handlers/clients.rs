use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::flash::{flash_redirect, take_flash};
use crate::models::CreateClient;
use crate::store::clients;
use crate::views::{render_page, ClientsTemplate};

pub async fn list_clients(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let clients = clients::list_clients(&state.db, user.id()).await?;
    let (jar, flash) = take_flash(jar);
    render_page(jar, &ClientsTemplate { flash, clients })
}

pub async fn create_client(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<CreateClient>,
) -> Result<Response, AppError> {
    if form.name.trim().is_empty() {
        return Err(AppError::validation("Client name is required", "/clients"));
    }
    clients::create_client(&state.db, user.id(), &form).await?;
    Ok(flash_redirect(jar, "/clients", "Client saved").into_response())
}

pub async fn delete_client(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let not_found = || AppError::not_found("Client not found", "/clients");
    let Ok(Path(client_id)) = path else {
        return Err(not_found());
    };
    if !clients::delete_client(&state.db, user.id(), client_id).await? {
        return Err(not_found());
    }
    Ok(flash_redirect(jar, "/clients", "Client deleted").into_response())
}
