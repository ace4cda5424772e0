use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, Form};
use chrono::Local;
use tracing::info;

use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::billing::{calc_totals, next_number};
use crate::error::AppError;
use crate::flash::{flash_redirect, take_flash};
use crate::models::{InvoiceForm, NewInvoice, Settings};
use crate::pdf::{download_filename, generate_invoice_pdf, InvoiceDocument};
use crate::store::{clients, invoices, settings, users};
use crate::views::{render_page, IndexTemplate, InvoiceRow, InvoiceTemplate, NewInvoiceTemplate};

/// Lists the user's newest invoices.
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = invoices::list_invoices(&state.db, user.id()).await?;
    let (jar, flash) = take_flash(jar);
    render_page(
        jar,
        &IndexTemplate {
            flash,
            invoices: rows.iter().map(InvoiceRow::from).collect(),
        },
    )
}

/// Blank invoice form, pre-filled with the business profile and the next
/// number for today.
pub async fn new_invoice_page(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let next_number = next_number(&state.db, &user, today).await?;
    let settings = load_settings(&state, &user).await?;
    let clients = clients::list_clients(&state.db, user.id()).await?;
    let (jar, flash) = take_flash(jar);

    render_page(
        jar,
        &NewInvoiceTemplate {
            flash,
            next_number,
            today: today.format("%Y-%m-%d").to_string(),
            settings,
            clients,
        },
    )
}

/// Creates an invoice with all its items.
///
/// # Arguments
///
/// * `form` - Header fields plus the `desc[]`, `qty[]` and `rate[]` columns
///
/// # Returns
///
/// A redirect to the new invoice, or back to the form with a flash
/// message when a required field is missing.
pub async fn create_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<InvoiceForm>,
) -> Result<Response, AppError> {
    let client_name = form.client.trim().to_string();
    let mut invoice = NewInvoice::from(form);

    if !client_name.is_empty() {
        let client = clients::find_by_name(&state.db, user.id(), &client_name)
            .await?
            .ok_or_else(|| AppError::validation("Selected client not found", "/new"))?;
        invoice.to.fill_blanks_from(&client);
    }

    let invoice_date = invoice.validate().map_err(|msg| AppError::validation(msg, "/new"))?;
    let invoice_no = if invoice.invoice_no.is_empty() {
        next_number(&state.db, &user, invoice_date).await?
    } else {
        invoice.invoice_no.clone()
    };

    let invoice_id =
        invoices::create_invoice(&state.db, user.id(), &invoice_no, invoice_date, &invoice).await?;

    info!(
        "Created invoice {} ({}) with {} items for user {}",
        invoice_id,
        invoice_no,
        invoice.items.len(),
        user.id()
    );
    let to = format!("/invoice/{invoice_id}");
    Ok(flash_redirect(jar, &to, "Invoice created").into_response())
}

pub async fn view_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let invoice_id = parse_invoice_id(path)?;
    let data = calc_totals(&state.db, &user, invoice_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found", "/"))?;
    let (jar, flash) = take_flash(jar);
    render_page(jar, &InvoiceTemplate::new(flash, data))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let invoice_id = parse_invoice_id(path)?;
    if !invoices::delete_invoice(&state.db, user.id(), invoice_id).await? {
        return Err(AppError::not_found("Invoice not found", "/"));
    }
    info!("Deleted invoice {} for user {}", invoice_id, user.id());
    Ok(flash_redirect(jar, "/", "Invoice deleted").into_response())
}

/// Streams the invoice as a PDF attachment.
pub async fn invoice_pdf(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let invoice_id = parse_invoice_id(path)?;
    let data = calc_totals(&state.db, &user, invoice_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found", "/"))?;
    let settings = load_settings(&state, &user).await?;
    let filename = download_filename(&data.invoice.invoice_no);

    let bytes = tokio::task::spawn_blocking(move || {
        generate_invoice_pdf(&InvoiceDocument {
            invoice: &data.invoice,
            items: &data.items,
            totals: &data.totals,
            settings: &settings,
        })
    })
    .await
    .map_err(|e| anyhow::anyhow!("pdf task failed: {e}"))??;

    info!("Rendered {} ({} bytes) for user {}", filename, bytes.len(), user.id());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Invoice id from the URL. A malformed id is treated like a missing invoice.
fn parse_invoice_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::not_found("Invoice not found", "/"))
}

/// The user's settings, created with defaults on first use.
pub(crate) async fn load_settings(state: &AppState, user: &CurrentUser) -> Result<Settings, AppError> {
    let name = users::find_by_id(&state.db, user.id())
        .await?
        .map(|u| u.name)
        .unwrap_or_default();
    Ok(settings::ensure_settings(&state.db, user.id(), &name).await?)
}
