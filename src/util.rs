//! Field formatters for CRM import files.

use crate::models::Address;

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a phone number as `(123) 456-7890`. Ten digits format directly;
/// eleven digits with a leading country code 1 drop the 1; anything else is
/// passed through trimmed.
pub fn format_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let digits = digits_only(trimmed);
    let area = match (digits.len(), digits.as_bytes().first()) {
        (10, _) => &digits[..],
        (11, Some(b'1')) => &digits[1..],
        _ => return trimmed.to_string(),
    };
    format!("({}) {}-{}", &area[..3], &area[3..6], &area[6..])
}

/// Format a zip code as a 5-digit string: first five digits, zero-padded on
/// the left when shorter.
pub fn format_zip(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return String::new();
    }
    if digits.len() >= 5 {
        digits[..5].to_string()
    } else {
        format!("{digits:0>5}")
    }
}

/// Comma-join the non-empty address components.
pub fn full_address(addr: &Address) -> String {
    [&addr.street, &addr.city, &addr.state, &addr.zip]
        .into_iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Minimal structural check, not RFC validation: one `@` with a dotted domain.
pub fn is_valid_email(raw: &str) -> bool {
    let s = raw.trim();
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    }
}

/// A phone is usable when it carries at least a full ten-digit number.
pub fn is_valid_phone(raw: &str) -> bool {
    digits_only(raw).len() >= 10
}
