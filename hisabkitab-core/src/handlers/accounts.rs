use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::{hash_password, issue_token, session_cookie, verify_password, SESSION_COOKIE};
use crate::error::AppError;
use crate::flash::{flash_redirect, take_flash};
use crate::models::user::normalize_email;
use crate::models::{CreateUser, LoginUser};
use crate::store::{settings, users};
use crate::views::{render_page, LoginTemplate, SignupTemplate};

const DUPLICATE_EMAIL: &str = "An account with this email already exists";

pub async fn signup_page(jar: CookieJar) -> Result<Response, AppError> {
    let (jar, flash) = take_flash(jar);
    render_page(jar, &SignupTemplate { flash })
}

/// Registers a user and sends them to the login page.
///
/// The settings row is created right away so the first invoice form is
/// already pre-filled with the user's name.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CreateUser>,
) -> Result<Response, AppError> {
    let name = form.name.trim().to_string();
    let email = normalize_email(&form.email);
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AppError::validation("Name, email and password are required", "/signup"));
    }

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::conflict(DUPLICATE_EMAIL, "/signup"));
    }

    let pass_hash = hash_password(form.password).await?;
    let user = match users::create_user(&state.db, &name, &email, &pass_hash).await {
        Ok(user) => user,
        Err(e) if e.as_database_error().is_some_and(|db| db.is_unique_violation()) => {
            return Err(AppError::conflict(DUPLICATE_EMAIL, "/signup"));
        }
        Err(e) => return Err(e.into()),
    };
    settings::ensure_settings(&state.db, user.id, &user.name).await?;

    info!("New signup: user {}", user.id);
    Ok(flash_redirect(jar, "/login", "Account created, please log in").into_response())
}

pub async fn login_page(jar: CookieJar) -> Result<Response, AppError> {
    let (jar, flash) = take_flash(jar);
    render_page(jar, &LoginTemplate { flash })
}

/// Checks credentials and, on success, sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginUser>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);
    let user = users::find_by_email(&state.db, &email).await?;

    let verified = match &user {
        Some(user) => verify_password(form.password, user.pass_hash.clone()).await?,
        None => false,
    };
    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!("Failed login attempt");
            return Ok(flash_redirect(jar, "/login", "Invalid login").into_response());
        }
    };

    settings::ensure_settings(&state.db, user.id, &user.name).await?;
    let token = issue_token(&state.config.secret_key, user.id, state.config.session_hours)
        .map_err(|e| anyhow::anyhow!("failed to sign session token: {e}"))?;

    info!("User {} logged in", user.id);
    Ok((jar.add(session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Redirect::to("/login"))
}
