//! GeneralizedTime parsing

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

/// Parse a `YYYYMMDDHHMMSS[.fff]Z` GeneralizedTime as UTC
///
/// Fractional seconds are kept down to nanoseconds; further digits are
/// ignored.
pub fn parse_generalized_time(value: &str) -> Result<DateTime<Utc>> {
    let invalid = || Error::InvalidTime(value.to_string());

    let body = value.strip_suffix('Z').ok_or_else(invalid)?;
    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };
    if whole.len() != 14 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let naive = NaiveDateTime::parse_from_str(whole, "%Y%m%d%H%M%S").map_err(|_| invalid())?;

    let naive = match fraction {
        None => naive,
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let nanos = digits
                .bytes()
                .chain(std::iter::repeat(b'0'))
                .take(9)
                .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
            naive.with_nanosecond(nanos).ok_or_else(invalid)?
        }
    };

    Ok(Utc.from_utc_datetime(&naive))
}
