//! Phone number convention shared by every customer-scoped tool.

use thiserror::Error;

/// Shortest accepted subscriber number, after separators are removed.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Guidance returned to the model when a number is rejected.
pub const INVALID_PHONE_MESSAGE: &str =
    "Geçersiz telefon numarası formatı. Lütfen 11 haneli telefon numaranızı doğru girin (örn: 05551234567).";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,

    #[error("phone number contains non-digit characters")]
    NonDigit,

    #[error("phone number has {0} digits, at least 10 required")]
    TooShort(usize),
}

/// Strip spaces and hyphens and check the result is a plausible number.
pub fn normalize_phone(raw: &str) -> Result<String, PhoneError> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(PhoneError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneError::NonDigit);
    }
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(PhoneError::TooShort(digits.len()));
    }
    Ok(digits)
}
