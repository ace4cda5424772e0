//! Hisab Kitab: a multi-tenant invoicing web app.
//!
//! Users manage a business profile and saved clients, create itemised
//! invoices with optional GST, and download them as PDFs. Every query is
//! scoped to the signed-in user.

pub mod app;
pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod models;
pub mod pdf;
pub mod store;
pub mod views;

pub use app::{create_router, AppState};
pub use config::Config;
pub use error::AppError;
