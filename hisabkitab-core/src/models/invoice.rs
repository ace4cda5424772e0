use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::billing::compute_totals;
use crate::billing::money::{parse_amount, MAX_INPUT_AMOUNT, MAX_TAX_RATE};
use crate::models::Client;

/// Tax rate assumed when the form value is missing or malformed.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// One side of an invoice (sender or recipient), copied onto the invoice
/// at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// GSTIN or other tax registration number
    pub tax_id: String,
}

impl Party {
    /// Fills every blank field from the client record, keeping anything the
    /// user typed explicitly.
    pub fn fill_blanks_from(&mut self, client: &Client) {
        fn fill(slot: &mut String, value: &str) {
            if slot.trim().is_empty() {
                *slot = value.to_string();
            }
        }
        fill(&mut self.name, &client.name);
        fill(&mut self.email, &client.email);
        fill(&mut self.phone, &client.phone);
        fill(&mut self.address, &client.address);
        fill(&mut self.tax_id, &client.tax_id);
    }
}

/// Invoice header as stored in the `invoices` table.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    /// Row identifier; higher ids are newer
    pub id: i64,

    /// ID of the user who owns this invoice
    pub user_id: i64,

    /// Human-readable number, `HK-<YYYYMMDD>-<seq>` when allocated
    pub invoice_no: String,

    /// Date printed on the invoice
    pub invoice_date: NaiveDate,

    pub from: Party,
    pub to: Party,
    pub notes: String,

    /// Whether GST is charged on the subtotal
    pub tax_mode: bool,

    /// GST percentage applied when `tax_mode` is set
    pub tax_rate: Decimal,

    /// Jurisdiction shown for tax reporting only
    pub place_of_supply: String,
}

/// One billable line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: i64,
    pub invoice_id: i64,
    pub description: String,
    pub qty: Decimal,
    pub rate: Decimal,
}

/// Reads a decimal stored as TEXT.
fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for Invoice {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            invoice_no: row.try_get("invoice_no")?,
            invoice_date: row.try_get("invoice_date")?,
            from: Party {
                name: row.try_get("from_name")?,
                email: row.try_get("from_email")?,
                phone: row.try_get("from_phone")?,
                address: row.try_get("from_address")?,
                tax_id: row.try_get("from_tax_id")?,
            },
            to: Party {
                name: row.try_get("to_name")?,
                email: row.try_get("to_email")?,
                phone: row.try_get("to_phone")?,
                address: row.try_get("to_address")?,
                tax_id: row.try_get("to_tax_id")?,
            },
            notes: row.try_get("notes")?,
            tax_mode: row.try_get("tax_mode")?,
            tax_rate: decimal_column(row, "tax_rate")?,
            place_of_supply: row.try_get("place_of_supply")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Item {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            invoice_id: row.try_get("invoice_id")?,
            description: row.try_get("description")?,
            qty: decimal_column(row, "qty")?,
            rate: decimal_column(row, "rate")?,
        })
    }
}

/// Line item ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub description: String,
    pub qty: Decimal,
    pub rate: Decimal,
}

impl NewItem {
    /// Builds an item from raw form text.
    ///
    /// Quantity falls back to 1 when it is malformed or not positive; rate
    /// falls back to 0 when malformed.
    pub fn from_raw(description: &str, qty: &str, rate: &str) -> Self {
        let qty = parse_amount(qty, Decimal::ONE);
        Self {
            description: description.trim().to_string(),
            qty: if qty > Decimal::ZERO { qty } else { Decimal::ONE },
            rate: parse_amount(rate, Decimal::ZERO),
        }
    }
}

/// Raw new-invoice form, with the item columns as parallel arrays.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceForm {
    #[serde(default)]
    pub invoice_no: String,
    #[serde(default)]
    pub invoice_date: String,
    /// Name of a saved client whose details fill the blank "to" fields
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub from_phone: String,
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub from_tax_id: String,
    #[serde(default)]
    pub to_name: String,
    #[serde(default)]
    pub to_email: String,
    #[serde(default)]
    pub to_phone: String,
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub to_tax_id: String,
    #[serde(default)]
    pub notes: String,
    /// Checkbox; present only when ticked
    #[serde(default)]
    pub tax_mode: Option<String>,
    #[serde(default)]
    pub tax_rate: String,
    #[serde(default)]
    pub place_of_supply: String,
    #[serde(rename = "desc[]", default)]
    pub desc: Vec<String>,
    #[serde(rename = "qty[]", default)]
    pub qty: Vec<String>,
    #[serde(rename = "rate[]", default)]
    pub rate: Vec<String>,
}

/// Invoice header plus items, ready to be written in one transaction.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Blank means "allocate the next number for `invoice_date`"
    pub invoice_no: String,
    pub invoice_date: Option<NaiveDate>,
    pub from: Party,
    pub to: Party,
    pub notes: String,
    pub tax_mode: bool,
    pub tax_rate: Decimal,
    pub place_of_supply: String,
    pub items: Vec<NewItem>,
}

impl From<InvoiceForm> for NewInvoice {
    fn from(form: InvoiceForm) -> Self {
        let items = form
            .desc
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.trim().is_empty())
            .map(|(i, d)| {
                let qty = form.qty.get(i).map(String::as_str).unwrap_or("");
                let rate = form.rate.get(i).map(String::as_str).unwrap_or("");
                NewItem::from_raw(d, qty, rate)
            })
            .collect();

        Self {
            invoice_no: form.invoice_no.trim().to_string(),
            invoice_date: NaiveDate::parse_from_str(form.invoice_date.trim(), "%Y-%m-%d").ok(),
            from: Party {
                name: form.from_name.trim().to_string(),
                email: form.from_email.trim().to_string(),
                phone: form.from_phone.trim().to_string(),
                address: form.from_address.trim().to_string(),
                tax_id: form.from_tax_id.trim().to_string(),
            },
            to: Party {
                name: form.to_name.trim().to_string(),
                email: form.to_email.trim().to_string(),
                phone: form.to_phone.trim().to_string(),
                address: form.to_address.trim().to_string(),
                tax_id: form.to_tax_id.trim().to_string(),
            },
            notes: form.notes.trim().to_string(),
            tax_mode: form.tax_mode.is_some(),
            tax_rate: parse_amount(&form.tax_rate, DEFAULT_TAX_RATE),
            place_of_supply: form.place_of_supply.trim().to_string(),
            items,
        }
    }
}

impl NewInvoice {
    /// Checks the fields a document cannot be produced without.
    ///
    /// # Errors
    ///
    /// Returns the user-facing message for the first missing field.
    pub fn validate(&self) -> Result<NaiveDate, String> {
        let date = self
            .invoice_date
            .ok_or_else(|| "Invoice date is required (YYYY-MM-DD)".to_string())?;
        if self.from.name.is_empty() {
            return Err("Sender name is required".to_string());
        }
        if self.to.name.is_empty() {
            return Err("Recipient name is required".to_string());
        }
        if self.items.is_empty() {
            return Err("Add at least one item with a description".to_string());
        }
        let too_large = |value: Decimal| value.abs() > MAX_INPUT_AMOUNT;
        if self.items.iter().any(|item| too_large(item.qty) || too_large(item.rate)) {
            return Err("Quantities and rates must be below 1,000,000,000,000,000".to_string());
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > MAX_TAX_RATE {
            return Err("GST rate must be between 0 and 100".to_string());
        }
        compute_totals(
            self.items.iter().map(|item| (item.qty, item.rate)),
            self.tax_mode,
            self.tax_rate,
        )
        .map_err(|_| "Invoice total is too large".to_string())?;
        Ok(date)
    }
}
