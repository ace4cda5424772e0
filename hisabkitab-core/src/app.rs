use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::{accounts, clients, health, invoices, settings};

/// Largest accepted request body; bounds logo uploads.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Application state containing shared resources.
///
/// This struct holds the database connection pool and the runtime
/// configuration that route handlers and extractors need.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub db: SqlitePool,

    /// Configuration loaded at startup
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Creates the main application router.
///
/// Sets up all routes and middleware for the Hisab Kitab web app.
///
/// # Arguments
///
/// * `state` - The application state containing database pool and config
///
/// # Returns
///
/// Returns a configured Axum Router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/health/db", get(health::db_health_check))
        .route("/signup", get(accounts::signup_page).post(accounts::signup))
        .route("/login", get(accounts::login_page).post(accounts::login))
        .route("/logout", get(accounts::logout))
        // Routes below redirect to /login without a session
        .route("/", get(invoices::index))
        .route("/settings", get(settings::settings_page).post(settings::save_settings))
        .route("/clients", get(clients::list_clients))
        .route("/clients/new", post(clients::create_client))
        .route("/clients/:id/delete", post(clients::delete_client))
        .route("/new", get(invoices::new_invoice_page).post(invoices::create_invoice))
        .route("/invoice/:id", get(invoices::view_invoice))
        .route("/invoice/:id/delete", post(invoices::delete_invoice))
        .route("/invoice/:id/pdf", get(invoices::invoice_pdf))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
