use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::store::invoices::last_number_with_prefix;

/// Fixed leading part of every allocated invoice number.
pub const NUMBER_PREFIX: &str = "HK";

/// `HK-<YYYYMMDD>-` for the given day.
pub fn number_prefix(date: NaiveDate) -> String {
    format!("{}-{}-", NUMBER_PREFIX, date.format("%Y%m%d"))
}

/// Next number after `last` within `prefix`.
///
/// With no previous number the sequence starts at `001`. The numeric
/// suffix after the last `-` is incremented and zero-padded to three
/// digits; a suffix that does not parse restarts the sequence at `001`.
pub fn next_in_sequence(prefix: &str, last: Option<&str>) -> String {
    let seq = match last {
        None => 1,
        Some(number) => number
            .rsplit('-')
            .next()
            .and_then(|suffix| suffix.trim().parse::<u32>().ok())
            .map(|n| n.saturating_add(1))
            .unwrap_or(1),
    };
    format!("{prefix}{seq:03}")
}

/// Allocates the next invoice number for `user` on `date`.
///
/// Reads the user's latest number for that day and increments it. Nothing
/// is reserved: two requests racing for the same user and day can both
/// receive the same number.
pub async fn next_number(
    pool: &SqlitePool,
    user: &CurrentUser,
    date: NaiveDate,
) -> Result<String, sqlx::Error> {
    let prefix = number_prefix(date);
    let last = last_number_with_prefix(pool, user.id(), &prefix).await?;
    let number = next_in_sequence(&prefix, last.as_deref());
    debug!("Next invoice number for user {}: {}", user.id(), number);
    Ok(number)
}
