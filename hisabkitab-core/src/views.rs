//! Server-rendered pages. Templates live in `templates/` and escape all
//! interpolated values.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::billing::money::{format_amount, format_quantity, line_amount};
use crate::billing::InvoiceTotals;
use crate::error::AppError;
use crate::models::{Client, Invoice, Settings};

/// Renders `template` and attaches the (possibly updated) cookie jar.
pub fn render_page<T: Template>(jar: CookieJar, template: &T) -> Result<Response, AppError> {
    let body = template.render()?;
    Ok((jar, Html(body)).into_response())
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flash: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub flash: Option<String>,
}

/// One line of the invoice list.
pub struct InvoiceRow {
    pub id: i64,
    pub invoice_no: String,
    pub invoice_date: String,
    pub to_name: String,
}

impl From<&Invoice> for InvoiceRow {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_no: invoice.invoice_no.clone(),
            invoice_date: invoice.invoice_date.format("%Y-%m-%d").to_string(),
            to_name: invoice.to.name.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flash: Option<String>,
    pub invoices: Vec<InvoiceRow>,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub flash: Option<String>,
    pub settings: Settings,
    pub has_logo: bool,
}

#[derive(Template)]
#[template(path = "clients.html")]
pub struct ClientsTemplate {
    pub flash: Option<String>,
    pub clients: Vec<Client>,
}

#[derive(Template)]
#[template(path = "new_invoice.html")]
pub struct NewInvoiceTemplate {
    pub flash: Option<String>,
    pub next_number: String,
    pub today: String,
    pub settings: Settings,
    pub clients: Vec<Client>,
}

/// One item line of the invoice page, pre-formatted.
pub struct ItemRow {
    pub description: String,
    pub qty: String,
    pub rate: String,
    pub amount: String,
}

#[derive(Template)]
#[template(path = "view_invoice.html")]
pub struct InvoiceTemplate {
    pub flash: Option<String>,
    pub invoice: Invoice,
    pub invoice_date: String,
    pub items: Vec<ItemRow>,
    pub subtotal: String,
    pub tax_label: Option<String>,
    pub tax_amount: String,
    pub total: String,
}

impl InvoiceTemplate {
    pub fn new(flash: Option<String>, data: InvoiceTotals) -> Self {
        let InvoiceTotals { invoice, items, totals } = data;
        let items = items
            .iter()
            .map(|item| ItemRow {
                description: item.description.clone(),
                qty: format_quantity(item.qty),
                rate: format_amount(item.rate),
                amount: line_amount(item.qty, item.rate).map(format_amount).unwrap_or_default(),
            })
            .collect();
        let tax_label = invoice
            .tax_mode
            .then(|| format!("GST @ {}%", invoice.tax_rate.normalize()));

        Self {
            flash,
            invoice_date: invoice.invoice_date.format("%Y-%m-%d").to_string(),
            invoice,
            items,
            subtotal: format_amount(totals.subtotal),
            tax_label,
            tax_amount: format_amount(totals.tax_amount),
            total: format_amount(totals.total),
        }
    }
}
