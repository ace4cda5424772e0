use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::AppState;
use crate::error::AppError;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "hk_session";

/// The authenticated user for the current request.
///
/// Handlers receive it as an extractor and pass it explicitly into every
/// operation that reads user-owned data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(i64);

impl CurrentUser {
    pub fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

/// Claims carried inside the session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's id as a string.
    pub sub: String,
    pub exp: usize,
}

/// Signs a session token for `user_id` valid for `hours`.
pub fn issue_token(secret: &str, user_id: i64, hours: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::hours(hours)).timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a session token and returns the user id it names.
///
/// Expired, tampered or malformed tokens yield `None`.
pub fn verify_token(secret: &str, token: &str) -> Option<i64> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let claims = match decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256)) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return None;
        }
    };
    claims.sub.parse::<i64>().ok()
}

/// Session cookie holding `token`.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Hashes a password with bcrypt on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, anyhow::Error> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST)).await??;
    Ok(hashed)
}

/// Checks a password against a stored bcrypt hash. A malformed hash counts
/// as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, anyhow::Error> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false)).await?;
    Ok(matches)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| verify_token(&state.config.secret_key, cookie.value()))
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
