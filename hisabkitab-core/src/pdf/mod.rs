//! Invoice documents: a page cursor writing to an abstract canvas, the
//! invoice layout on top of it, and a `printpdf` canvas producing A4 PDFs.

pub mod canvas;
pub mod cursor;
pub mod layout;

use thiserror::Error;

pub use canvas::{Canvas, PdfCanvas};
pub use cursor::PageCursor;
pub use layout::{render_invoice, InvoiceDocument};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf rendering failed: {0}")]
    Render(String),

    #[error("image could not be loaded: {0}")]
    Image(String),
}

/// Renders the invoice to PDF bytes.
pub fn generate_invoice_pdf(doc: &InvoiceDocument<'_>) -> Result<Vec<u8>, PdfError> {
    let title = format!("Invoice {}", doc.invoice.invoice_no);
    let canvas = PdfCanvas::new(&title)?;
    render_invoice(canvas, doc)
}

/// File name offered for download: `invoice_<number>.pdf`, with anything
/// outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn download_filename(invoice_no: &str) -> String {
    let safe: String = invoice_no
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    format!("invoice_{safe}.pdf")
}
