use std::path::Path;

use tracing::debug;

use crate::billing::money::{format_amount, format_quantity, line_amount};
use crate::billing::Totals;
use crate::models::{Invoice, Item, Party, Settings};
use crate::pdf::canvas::Canvas;
use crate::pdf::cursor::{hard_wrap, PageCursor};
use crate::pdf::PdfError;

/// Descriptions longer than this continue on following rows.
pub const DESCRIPTION_WRAP: usize = 35;
/// Width at which each notes line is wrapped.
pub const NOTES_WRAP: usize = 95;

const TITLE_SIZE: f32 = 16.0;
const TITLE_LEADING: f32 = 9.0;
const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 5.0;
const NOTES_SIZE: f32 = 9.0;
const NOTES_LEADING: f32 = 4.5;
const SECTION_GAP: f32 = 3.0;

const LOGO_X: f32 = 160.0;
const LOGO_Y: f32 = 262.0;
const LOGO_WIDTH: f32 = 35.0;

// Column widths in characters; the amount columns right-align under
// their headers.
const QTY_COL: usize = 8;
const RATE_COL: usize = 14;
const AMOUNT_COL: usize = 14;
const TABLE_WIDTH: usize = DESCRIPTION_WRAP + 1 + QTY_COL + 1 + RATE_COL + 1 + AMOUNT_COL;

/// Everything needed to lay out one invoice.
pub struct InvoiceDocument<'a> {
    pub invoice: &'a Invoice,
    pub items: &'a [Item],
    pub totals: &'a Totals,
    /// Business profile of the invoice's owner
    pub settings: &'a Settings,
}

/// Lays the invoice out on `canvas` and returns the finished document.
///
/// Sections are written in a fixed order: heading, parties, item table,
/// totals, notes. Pages break wherever the cursor runs out of room.
pub fn render_invoice<C: Canvas>(canvas: C, doc: &InvoiceDocument<'_>) -> Result<Vec<u8>, PdfError> {
    let mut cursor = PageCursor::new(canvas);

    if let Some(logo) = doc.settings.logo_path.as_deref().filter(|p| !p.is_empty()) {
        if let Err(e) = cursor.place_image(Path::new(logo), LOGO_X, LOGO_Y, LOGO_WIDTH) {
            debug!("Skipping logo {}: {}", logo, e);
        }
    }

    write_heading(&mut cursor, doc);
    separator(&mut cursor);
    write_party(&mut cursor, "From:", &doc.invoice.from);
    cursor.gap(SECTION_GAP);
    write_party(&mut cursor, "To:", &doc.invoice.to);
    separator(&mut cursor);
    write_items(&mut cursor, doc.items);
    separator(&mut cursor);
    write_totals(&mut cursor, doc);
    write_notes(&mut cursor, &doc.invoice.notes);

    cursor.finalize()
}

fn write_heading<C: Canvas>(cursor: &mut PageCursor<C>, doc: &InvoiceDocument<'_>) {
    let business = doc.settings.business_name.trim();
    let title = if business.is_empty() {
        doc.invoice.from.name.as_str()
    } else {
        business
    };
    cursor.emit_bold(title, TITLE_SIZE, TITLE_LEADING);
    cursor.emit_line(&format!("Invoice No: {}", doc.invoice.invoice_no), BODY_SIZE, BODY_LEADING);
    cursor.emit_line(
        &format!("Date: {}", doc.invoice.invoice_date.format("%Y-%m-%d")),
        BODY_SIZE,
        BODY_LEADING,
    );
    if !doc.invoice.place_of_supply.is_empty() {
        cursor.emit_line(
            &format!("Place of Supply: {}", doc.invoice.place_of_supply),
            BODY_SIZE,
            BODY_LEADING,
        );
    }
}

fn separator<C: Canvas>(cursor: &mut PageCursor<C>) {
    cursor.emit_line(&"-".repeat(TABLE_WIDTH), BODY_SIZE, BODY_LEADING);
}

fn write_party<C: Canvas>(cursor: &mut PageCursor<C>, label: &str, party: &Party) {
    cursor.emit_bold(label, BODY_SIZE, BODY_LEADING);
    if !party.name.is_empty() {
        cursor.emit_line(&party.name, BODY_SIZE, BODY_LEADING);
    }
    for line in party.address.lines().map(str::trim).filter(|l| !l.is_empty()) {
        cursor.emit_line(line, BODY_SIZE, BODY_LEADING);
    }
    if !party.email.is_empty() {
        cursor.emit_line(&format!("Email: {}", party.email), BODY_SIZE, BODY_LEADING);
    }
    if !party.phone.is_empty() {
        cursor.emit_line(&format!("Phone: {}", party.phone), BODY_SIZE, BODY_LEADING);
    }
    if !party.tax_id.is_empty() {
        cursor.emit_line(&format!("GSTIN: {}", party.tax_id), BODY_SIZE, BODY_LEADING);
    }
}

/// First row of an item, or a table header when given header labels.
fn table_row(description: &str, qty: &str, rate: &str, amount: &str) -> String {
    format!(
        "{:<dw$} {:>qw$} {:>rw$} {:>aw$}",
        description,
        qty,
        rate,
        amount,
        dw = DESCRIPTION_WRAP,
        qw = QTY_COL,
        rw = RATE_COL,
        aw = AMOUNT_COL,
    )
}

fn write_items<C: Canvas>(cursor: &mut PageCursor<C>, items: &[Item]) {
    cursor.emit_bold(&table_row("Description", "Qty", "Rate", "Amount"), BODY_SIZE, BODY_LEADING);
    separator(cursor);

    for item in items {
        let amount = line_amount(item.qty, item.rate).map(format_amount).unwrap_or_default();
        let mut pieces = hard_wrap(&item.description, DESCRIPTION_WRAP).into_iter();
        let first = pieces.next().unwrap_or_default();
        cursor.emit_line(
            &table_row(
                &first,
                &format_quantity(item.qty),
                &format_amount(item.rate),
                &amount,
            ),
            BODY_SIZE,
            BODY_LEADING,
        );
        for piece in pieces {
            cursor.emit_line(&piece, BODY_SIZE, BODY_LEADING);
        }
    }
}

fn total_row(label: &str, value: &str) -> String {
    format!(
        "{:>lw$} {:>aw$}",
        label,
        value,
        lw = TABLE_WIDTH - AMOUNT_COL - 1,
        aw = AMOUNT_COL
    )
}

fn write_totals<C: Canvas>(cursor: &mut PageCursor<C>, doc: &InvoiceDocument<'_>) {
    let totals = doc.totals;
    cursor.emit_line(
        &total_row("Subtotal:", &format_amount(totals.subtotal)),
        BODY_SIZE,
        BODY_LEADING,
    );
    if doc.invoice.tax_mode {
        let label = format!("GST @ {}%:", doc.invoice.tax_rate.normalize());
        cursor.emit_line(
            &total_row(&label, &format_amount(totals.tax_amount)),
            BODY_SIZE,
            BODY_LEADING,
        );
    }
    cursor.emit_bold(
        &total_row("Total:", &format_amount(totals.total)),
        BODY_SIZE,
        BODY_LEADING,
    );
}

fn write_notes<C: Canvas>(cursor: &mut PageCursor<C>, notes: &str) {
    if notes.trim().is_empty() {
        return;
    }
    cursor.gap(SECTION_GAP);
    cursor.emit_bold("Notes:", BODY_SIZE, BODY_LEADING);
    for line in notes.lines() {
        for piece in hard_wrap(line.trim_end(), NOTES_WRAP) {
            cursor.emit_line(&piece, NOTES_SIZE, NOTES_LEADING);
        }
    }
}
