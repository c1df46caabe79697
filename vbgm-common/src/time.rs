//! Time code utilities
//!
//! Converts between the `M:SS` time codes found in model responses and
//! fractional seconds.
//!
//! Two parsing flavors are provided:
//! - [`try_parse_time`] is strict and reports *why* a time code was rejected
//! - [`parse_time_to_seconds`] is lenient: every rejected input becomes `0.0`
//!   (logged), which is the behavior the segment pipeline depends on

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Reason a time code could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// `M:SS` form with a seconds field of 60 or more
    #[error("seconds out of range in '{0}' (expected 00-59)")]
    SecondsOutOfRange(String),

    /// Numeric value below zero
    #[error("negative time '{0}'")]
    Negative(String),

    /// Neither `M:SS` nor a decimal number
    #[error("unparseable time '{0}'")]
    Unparseable(String),
}

/// Strictly parse a time code into seconds.
///
/// Accepted forms:
/// - `M:SS` / `MM:SS` (any number of minute digits, exactly two second digits)
/// - plain decimal seconds, optionally suffixed with `s` (`"12.5"`, `"30s"`)
///
/// # Examples
///
/// ```
/// use vbgm_common::time::{try_parse_time, TimeParseError};
///
/// assert_eq!(try_parse_time("4:30"), Ok(270.0));
/// assert_eq!(try_parse_time("12.5"), Ok(12.5));
/// assert!(matches!(try_parse_time("1:60"), Err(TimeParseError::SecondsOutOfRange(_))));
/// ```
pub fn try_parse_time(input: &str) -> Result<f64, TimeParseError> {
    let trimmed = input.trim();
    let unparseable = || TimeParseError::Unparseable(trimmed.to_string());

    if let Some((minutes, seconds)) = trimmed.split_once(':') {
        let minutes = minutes.trim();
        let seconds = seconds.trim();
        if minutes.is_empty()
            || !minutes.bytes().all(|b| b.is_ascii_digit())
            || seconds.len() != 2
            || !seconds.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(unparseable());
        }

        let m: u64 = minutes.parse().map_err(|_| unparseable())?;
        let s: u64 = seconds.parse().map_err(|_| unparseable())?;
        if s >= 60 {
            return Err(TimeParseError::SecondsOutOfRange(trimmed.to_string()));
        }
        let total = m
            .checked_mul(60)
            .and_then(|v| v.checked_add(s))
            .ok_or_else(unparseable)?;
        return Ok(total as f64);
    }

    let numeric = trimmed
        .strip_suffix('s')
        .unwrap_or(trimmed)
        .trim();
    let value: f64 = numeric.parse().map_err(|_| unparseable())?;
    if !value.is_finite() {
        return Err(unparseable());
    }
    if value < 0.0 {
        return Err(TimeParseError::Negative(trimmed.to_string()));
    }
    Ok(value)
}

/// Leniently parse a time code into seconds.
///
/// Any input rejected by [`try_parse_time`] yields `0.0`. An out-of-range
/// seconds field (`"1:60"`) is therefore indistinguishable from zero to the
/// caller; it is logged at `warn` so the coercion stays visible.
pub fn parse_time_to_seconds(input: &str) -> f64 {
    match try_parse_time(input) {
        Ok(seconds) => seconds,
        Err(e @ TimeParseError::SecondsOutOfRange(_)) => {
            warn!(input = %input, error = %e, "Invalid time code, coercing to 0");
            0.0
        }
        Err(e) => {
            debug!(input = %input, error = %e, "Unparseable time code, coercing to 0");
            0.0
        }
    }
}

/// Decode a JSON time value (number of seconds or time code string).
///
/// Non-finite or negative numbers and non-scalar values yield `0.0`.
pub fn time_value_to_seconds(value: &Value) -> f64 {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => 0.0,
        },
        Value::String(s) => parse_time_to_seconds(s),
        _ => 0.0,
    }
}

/// Format seconds as an `M:SS` time code.
///
/// Fractional seconds are truncated. Minutes are not wrapped into hours, so
/// `format_seconds_to_time(6000.0)` is `"100:00"`.
///
/// # Examples
///
/// ```
/// use vbgm_common::time::format_seconds_to_time;
///
/// assert_eq!(format_seconds_to_time(270.0), "4:30");
/// assert_eq!(format_seconds_to_time(5.9), "0:05");
/// ```
pub fn format_seconds_to_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
