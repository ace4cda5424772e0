use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a user-supplied amount, falling back to `default` instead of failing.
///
/// A trailing percent sign, thousands separators and surrounding whitespace
/// are stripped before parsing, so `"18%"`, `" 1,200.50 "` and `"3"` all
/// parse. Empty or malformed input yields `default`.
///
/// # Example
///
/// ```rust
/// use hisabkitab_core::billing::money::parse_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_amount("1,200.50", Decimal::ZERO), Decimal::new(120050, 2));
/// assert_eq!(parse_amount("abc", Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn parse_amount(raw: &str, default: Decimal) -> Decimal {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return default;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(default)
}

/// Rounds half-up (away from zero) to two fractional digits.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest magnitude accepted for a quantity or rate typed into a form.
pub const MAX_INPUT_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Largest accepted tax rate, in percent.
pub const MAX_TAX_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Amount for one line: `qty × rate`, rounded.
///
/// Returns `None` when the product does not fit in a `Decimal`.
pub fn line_amount(qty: Decimal, rate: Decimal) -> Option<Decimal> {
    qty.checked_mul(rate).map(round2)
}

/// Fixed two-decimal rendering used in pages and documents.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Quantity rendering without trailing zeros (`2`, `1.5`).
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}
