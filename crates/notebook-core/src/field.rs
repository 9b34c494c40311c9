//! Bounded decimal parsing for numeric protocol fields.
//!
//! Clients send numbers as short ASCII text, sometimes newline terminated and
//! sometimes NUL padded. `parse_decimal` reports exactly why a field failed;
//! `parse_decimal_lenient` is what the protocol observes, where anything
//! unparseable reads as 0.

use thiserror::Error;

/// Longest numeric field read from the wire.
pub const MAX_FIELD_LEN: usize = 15;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Field is empty")]
    Empty,
    #[error("Field does not start with a number")]
    NotNumeric,
    #[error("Number does not fit in 64 bits")]
    Overflow,
    #[error("Field is {0} bytes, too long for a number")]
    TooLong(usize),
}

/// Parse the leading decimal number of `field`.
///
/// Leading ASCII whitespace and one `+`/`-` sign are accepted; parsing stops
/// at the first non-digit, so `"42\n"` and `"42\0\0\0"` both yield 42.
///
/// # Examples
/// ```
/// use notebook_core::field::{parse_decimal, FieldError};
///
/// assert_eq!(parse_decimal(b"  256\n"), Ok(256));
/// assert_eq!(parse_decimal(b"-3"), Ok(-3));
/// assert_eq!(parse_decimal(b"abc"), Err(FieldError::NotNumeric));
/// ```
pub fn parse_decimal(field: &[u8]) -> Result<i64, FieldError> {
    if field.len() > MAX_FIELD_LEN {
        return Err(FieldError::TooLong(field.len()));
    }

    let mut rest = field;
    while let [first, tail @ ..] = rest {
        if !first.is_ascii_whitespace() {
            break;
        }
        rest = tail;
    }
    if rest.is_empty() {
        return Err(FieldError::Empty);
    }

    let negative = match rest[0] {
        b'-' => {
            rest = &rest[1..];
            true
        }
        b'+' => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(FieldError::NotNumeric);
    }

    // Accumulate negatively so i64::MIN is representable
    let mut value: i64 = 0;
    for &digit in &rest[..digits] {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_sub(i64::from(digit - b'0')))
            .ok_or(FieldError::Overflow)?;
    }
    if negative {
        Ok(value)
    } else {
        value.checked_neg().ok_or(FieldError::Overflow)
    }
}

/// Protocol semantics: any parse failure reads as 0.
pub fn parse_decimal_lenient(field: &[u8]) -> i64 {
    parse_decimal(field).unwrap_or(0)
}
