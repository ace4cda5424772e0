use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use thiserror::Error;
use tracing::{error, warn};

use crate::billing::TotalsError;
use crate::flash::flash_redirect;
use crate::pdf::PdfError;

/// Errors a request handler can end with.
///
/// User-facing variants become a flash message plus a redirect; the rest
/// are logged and answered with a generic error page. None of them bring
/// down the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed form input; nothing was written.
    #[error("{message}")]
    Validation { message: String, back_to: String },

    /// Uniqueness conflict such as a duplicate signup email.
    #[error("{message}")]
    Conflict { message: String, back_to: String },

    /// Missing record, or one owned by another user. Both look the same.
    #[error("{message}")]
    NotFound { message: String, back_to: String },

    /// No valid session cookie.
    #[error("not signed in")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("document generation failed: {0}")]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            back_to: back_to.into(),
        }
    }

    pub fn conflict(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            back_to: back_to.into(),
        }
    }

    /// Not-found that sends the user back to the list view at `back_to`.
    pub fn not_found(message: impl Into<String>, back_to: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            back_to: back_to.into(),
        }
    }
}

impl From<TotalsError> for AppError {
    fn from(err: TotalsError) -> Self {
        match err {
            TotalsError::Database(e) => AppError::Database(e),
            // Stored amounts that cannot be totalled; back to the list.
            TotalsError::Overflow(_) => AppError::validation("Invoice amounts are too large to total", "/"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation { message, back_to } | AppError::Conflict { message, back_to } => {
                warn!("Rejected request: {}", message);
                flash_redirect(CookieJar::new(), &back_to, &message).into_response()
            }
            AppError::NotFound { message, back_to } => {
                flash_redirect(CookieJar::new(), &back_to, &message).into_response()
            }
            AppError::Unauthorized => Redirect::to("/login").into_response(),
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Something went wrong</h1><p><a href=\"/\">Back to invoices</a></p>"),
                )
                    .into_response()
            }
        }
    }
}
