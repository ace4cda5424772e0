//! Invoice arithmetic: money handling, numbering and totals.

pub mod money;
pub mod numbering;
pub mod totals;

pub use numbering::next_number;
pub use totals::{calc_totals, compute_totals, AmountOverflow, InvoiceTotals, Totals, TotalsError};
