//! One-shot user-visible messages carried across a redirect in a cookie.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

pub const FLASH_COOKIE: &str = "hk_flash";

/// Stores `message` for the next page render and redirects to `to`.
pub fn flash_redirect(jar: CookieJar, to: &str, message: &str) -> (CookieJar, Redirect) {
    (jar.add(flash_cookie(message)), Redirect::to(to))
}

/// Removes the pending flash message, returning it if one was set.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).and_then(|cookie| decode(cookie.value()));
    match message {
        Some(message) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message)),
        None => (jar, None),
    }
}

fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, encode(message)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// Cookie values may not carry spaces, commas or semicolons; form-encode them.
fn encode(message: &str) -> String {
    serde_urlencoded::to_string(&[("m", message)]).unwrap_or_default()
}

fn decode(value: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(value)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == "m")
        .map(|(_, message)| message)
        .filter(|message| !message.is_empty())
}
