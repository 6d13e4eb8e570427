//! Conversions between human-entered decimal amounts and smallest-unit
//! integer strings.
//!
//! Everything here works on decimal digit strings, so precision is not
//! limited by any fixed-width integer type.

use crate::error::SessionError;

/// Default number of fractional digits shown by [`format_balance`].
pub const DEFAULT_DISPLAY_PRECISION: usize = 5;

/// Scales a human decimal amount (`"1.5"`) to a smallest-unit integer string
/// (`"1500000000000000000"` at 18 decimals).
///
/// Fractional digits beyond `decimals` are dropped, never rounded. Accepted
/// shapes: `"12"`, `"12.5"`, `"12."`, `".5"`. Signs, exponents, separators and
/// whitespace are rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<String, SessionError> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(SessionError::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(SessionError::InvalidAmount(format!(
            "'{amount}' is not a non-negative decimal number"
        )));
    }

    let decimals = usize::from(decimals);
    let kept = &fraction[..fraction.len().min(decimals)];

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(decimals - kept.len()));

    Ok(strip_leading_zeros(&digits).to_string())
}

/// Inverse of [`parse_amount`]: renders a smallest-unit integer string as an
/// exact decimal, without trailing fractional zeros (`"1500…0"`, 18 → `"1.5"`).
pub fn format_units(value: &str, decimals: u8) -> Result<String, SessionError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SessionError::InvalidAmount(format!(
            "'{value}' is not an integer amount"
        )));
    }

    let (whole, fraction) = split_units(value, usize::from(decimals));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Ok(whole)
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}

/// Renders a smallest-unit balance for display: thousands-grouped whole part,
/// then the first `precision` fractional digits, truncated.
///
/// `("1234567890123", 6, 5)` → `"1,234,567.89012"`. With no fractional digits
/// to show the dot is omitted. A balance that is not a digit string is
/// returned unchanged.
pub fn format_balance(balance: &str, decimals: u8, precision: usize) -> String {
    if balance.is_empty() || !balance.bytes().all(|b| b.is_ascii_digit()) {
        tracing::warn!(balance, "failed to format balance, showing raw value");
        return balance.to_string();
    }

    let (whole, fraction) = split_units(balance, usize::from(decimals));
    let whole = group_thousands(&whole);
    let shown = &fraction[..fraction.len().min(precision)];

    if shown.is_empty() {
        whole
    } else {
        format!("{whole}.{shown}")
    }
}

/// Splits a digit string into whole and zero-padded fractional parts.
fn split_units(value: &str, decimals: usize) -> (String, String) {
    let digits = strip_leading_zeros(value);
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals - digits.len() + 1))
    } else {
        digits.to_string()
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    (whole.to_string(), fraction.to_string())
}

fn strip_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
