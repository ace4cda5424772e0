use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::{Invoice, Item, NewInvoice};

/// Most invoices shown on the list page.
pub const LIST_LIMIT: i64 = 50;

const INVOICE_COLUMNS: &str = r#"
    id, user_id, invoice_no, invoice_date,
    from_name, from_email, from_phone, from_address, from_tax_id,
    to_name, to_email, to_phone, to_address, to_tax_id,
    notes, tax_mode, tax_rate, place_of_supply
"#;

/// The user's invoices, newest first, capped at [`LIST_LIMIT`].
pub async fn list_invoices(pool: &SqlitePool, user_id: i64) -> Result<Vec<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE user_id = ? ORDER BY id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

/// Fetches an invoice only if it belongs to `user_id`.
pub async fn find_invoice(
    pool: &SqlitePool,
    user_id: i64,
    invoice_id: i64,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ? AND user_id = ?"
    ))
    .bind(invoice_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Items of an invoice in insertion order. Ownership must be checked by
/// the caller through [`find_invoice`].
pub async fn list_items(pool: &SqlitePool, invoice_id: i64) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        "SELECT id, invoice_id, description, qty, rate FROM items WHERE invoice_id = ? ORDER BY id",
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await
}

/// Number of the user's most recent invoice whose number starts with
/// `prefix`, by descending id.
pub async fn last_number_with_prefix(
    pool: &SqlitePool,
    user_id: i64,
    prefix: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT invoice_no FROM invoices
        WHERE user_id = ? AND substr(invoice_no, 1, length(?)) = ?
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(prefix)
    .bind(prefix)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(number,)| number))
}

/// Writes the invoice header and all of its items in one transaction and
/// returns the new invoice id.
///
/// Either every item becomes visible together with the header or, on any
/// error, nothing does.
pub async fn create_invoice(
    pool: &SqlitePool,
    user_id: i64,
    invoice_no: &str,
    invoice_date: NaiveDate,
    invoice: &NewInvoice,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (invoice_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO invoices (
            user_id, invoice_no, invoice_date,
            from_name, from_email, from_phone, from_address, from_tax_id,
            to_name, to_email, to_phone, to_address, to_tax_id,
            notes, tax_mode, tax_rate, place_of_supply
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(invoice_no)
    .bind(invoice_date)
    .bind(&invoice.from.name)
    .bind(&invoice.from.email)
    .bind(&invoice.from.phone)
    .bind(&invoice.from.address)
    .bind(&invoice.from.tax_id)
    .bind(&invoice.to.name)
    .bind(&invoice.to.email)
    .bind(&invoice.to.phone)
    .bind(&invoice.to.address)
    .bind(&invoice.to.tax_id)
    .bind(&invoice.notes)
    .bind(invoice.tax_mode)
    .bind(invoice.tax_rate.to_string())
    .bind(&invoice.place_of_supply)
    .fetch_one(&mut *tx)
    .await?;

    for item in &invoice.items {
        sqlx::query("INSERT INTO items (invoice_id, description, qty, rate) VALUES (?, ?, ?, ?)")
            .bind(invoice_id)
            .bind(&item.description)
            .bind(item.qty.to_string())
            .bind(item.rate.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(invoice_id)
}

/// Deletes an owned invoice together with its items.
///
/// Returns false, touching nothing, when the invoice does not exist or
/// belongs to another user.
pub async fn delete_invoice(pool: &SqlitePool, user_id: i64, invoice_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let owned: Option<(i64,)> = sqlx::query_as("SELECT id FROM invoices WHERE id = ? AND user_id = ?")
        .bind(invoice_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if owned.is_none() {
        return Ok(false);
    }

    sqlx::query("DELETE FROM items WHERE invoice_id = ?")
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM invoices WHERE id = ? AND user_id = ?")
        .bind(invoice_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
