use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::billing::money::round2;
use crate::models::{Invoice, Item};
use crate::store::invoices::{find_invoice, list_items};

/// Derived amounts for one invoice, each rounded exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Totals could not be computed because an intermediate amount does not
/// fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invoice amounts are too large to total")]
pub struct AmountOverflow;

/// Failure while loading and totalling an invoice.
#[derive(Debug, Error)]
pub enum TotalsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

/// An invoice with its items and computed totals.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTotals {
    pub invoice: Invoice,
    pub items: Vec<Item>,
    pub totals: Totals,
}

/// Computes subtotal, tax and total from `(qty, rate)` pairs.
///
/// Summation is exact decimal arithmetic, so item order never changes the
/// result. Tax is zero whenever `tax_mode` is off, whatever the rate.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when a line product, the running sum or the
/// tax does not fit in a `Decimal`.
pub fn compute_totals<I>(lines: I, tax_mode: bool, tax_rate: Decimal) -> Result<Totals, AmountOverflow>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let raw = lines.into_iter().try_fold(Decimal::ZERO, |sum, (qty, rate)| {
        qty.checked_mul(rate).and_then(|amount| sum.checked_add(amount))
    });
    let subtotal = round2(raw.ok_or(AmountOverflow)?);
    let tax_amount = if tax_mode {
        let tax = subtotal
            .checked_mul(tax_rate)
            .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(AmountOverflow)?;
        round2(tax)
    } else {
        Decimal::ZERO
    };
    let total = round2(subtotal.checked_add(tax_amount).ok_or(AmountOverflow)?);

    Ok(Totals {
        subtotal,
        tax_amount,
        total,
    })
}

/// Loads an invoice for `user` and computes its totals.
///
/// Returns `Ok(None)` when no invoice with that id belongs to `user`,
/// including when the id exists under another account, and
/// [`TotalsError::Overflow`] for stored amounts that cannot be totalled.
pub async fn calc_totals(
    pool: &SqlitePool,
    user: &CurrentUser,
    invoice_id: i64,
) -> Result<Option<InvoiceTotals>, TotalsError> {
    let Some(invoice) = find_invoice(pool, user.id(), invoice_id).await? else {
        return Ok(None);
    };
    let items = list_items(pool, invoice.id).await?;
    let totals = compute_totals(
        items.iter().map(|item| (item.qty, item.rate)),
        invoice.tax_mode,
        invoice.tax_rate,
    )?;

    Ok(Some(InvoiceTotals {
        invoice,
        items,
        totals,
    }))
}
