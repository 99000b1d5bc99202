//! Voice-friendly rendering of structured values. Pure functions with
//! best-effort fallback, no failure modes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Render a non-negative amount as spoken currency. The fractional part is
/// truncated to hundredths, never rounded.
pub fn format_currency_for_voice(amount: Decimal) -> String {
    let dollars = amount.trunc();
    let cents = ((amount - dollars) * Decimal::from(100)).trunc();

    let dollars = dollars.to_i64().unwrap_or(0);
    let cents = cents.to_i64().unwrap_or(0);

    if cents > 0 {
        format!("{dollars} dollars and {cents} cents")
    } else {
        format!("{dollars} dollars")
    }
}

/// Spell out an email address for speech synthesis. Only `@` and `.` are
/// rewritten, other characters pass through untouched.
pub fn format_email_for_voice(email: &str) -> String {
    email.replace('@', " at ").replace('.', " dot ")
}

/// Render an ISO-8601 date or datetime as "Month DD, YYYY". A trailing `Z`
/// is accepted as a UTC offset. Unparseable input is returned unchanged.
pub fn format_date_for_voice(date_text: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date_text) {
        return parsed.format("%B %d, %Y").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date_text, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%B %d, %Y").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(date_text, "%Y-%m-%d") {
        return parsed.format("%B %d, %Y").to_string();
    }

    date_text.to_string()
}
