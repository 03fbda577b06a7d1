//! Date, time, and UTC-offset input parsing
//!
//! The shipment date/time arrive as free-form CLI strings; the timezone is an
//! explicit offset resolved once at startup and passed down, replacing any
//! ambient fallback chain.

use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};

/// Jakarta local time (UTC+7), the default offset for generated receipts.
pub const DEFAULT_UTC_OFFSET: &str = "+07:00";

/// Parse a shipment date.
///
/// Accepted formats:
/// - `2025-11-20` (ISO)
/// - `20/11/2025` (day-first, as printed on the receipt)
pub fn parse_date_input(expr: &str) -> Result<NaiveDate> {
    let expr = expr.trim();

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%d/%m/%Y") {
        return Ok(date);
    }

    Err(Error::InvalidDate(expr.to_string()))
}

/// Parse a time of day, with or without seconds (`14:30:05` or `14:30`).
pub fn parse_time_input(expr: &str) -> Result<NaiveTime> {
    let expr = expr.trim();

    if let Ok(time) = NaiveTime::parse_from_str(expr, "%H:%M:%S") {
        return Ok(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(expr, "%H:%M") {
        return Ok(time);
    }

    Err(Error::InvalidTime(expr.to_string()))
}

/// Parse a UTC offset such as `+07:00`, `+0700`, `-03:30`, or `7`.
pub fn parse_utc_offset(expr: &str) -> Result<FixedOffset> {
    let expr = expr.trim();
    let (negative, rest) = match expr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, expr.strip_prefix('+').unwrap_or(expr)),
    };

    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || rest.chars().any(|c| !c.is_ascii_digit() && c != ':') {
        return Err(Error::InvalidUtcOffset(expr.to_string()));
    }

    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().unwrap_or(0), 0),
        3 => (
            digits[..1].parse::<i32>().unwrap_or(0),
            digits[1..].parse::<i32>().unwrap_or(0),
        ),
        4 => (
            digits[..2].parse::<i32>().unwrap_or(0),
            digits[2..].parse::<i32>().unwrap_or(0),
        ),
        _ => return Err(Error::InvalidUtcOffset(expr.to_string())),
    };

    if hours > 14 || minutes > 59 {
        return Err(Error::InvalidUtcOffset(expr.to_string()));
    }

    let seconds = (hours * 3600 + minutes * 60) * if negative { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(|| Error::InvalidUtcOffset(expr.to_string()))
}

/// Current date and time in the given offset, used as defaults when the
/// caller does not supply `--date` / `--time`.
pub fn now_in_offset(offset: FixedOffset) -> (NaiveDate, NaiveTime) {
    let now = Utc::now().with_timezone(&offset);
    (now.date_naive(), now.time())
}
