//! Validation functions for calendar input text.
//
// Timestamps, dates and list positions all arrive as user-typed text; these
// helpers turn them into typed values or a `CalendarError`.

use super::CalendarError;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Input format for event timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Input format for calendar days.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATETIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2} \d{1,2}:\d{1,2}$").expect("valid regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("valid regex"));

/// Parse a `YYYY-MM-DD HH:MM` timestamp
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, CalendarError> {
    if !DATETIME_RE.is_match(text) {
        return Err(CalendarError::Format);
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|_| CalendarError::Format)
}

/// Parse a `YYYY-MM-DD` day
pub fn parse_date(text: &str) -> Result<NaiveDate, CalendarError> {
    if !DATE_RE.is_match(text) {
        return Err(CalendarError::Format);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| CalendarError::Format)
}

/// Parse a 1-based list position typed by a user.
///
/// Only integer conversion happens here; range checking needs the current
/// event count and is done by the store.
pub fn parse_position(text: &str) -> Result<i64, CalendarError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| CalendarError::Range { position: text.to_string() })
}
