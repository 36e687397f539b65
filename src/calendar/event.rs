use super::CalendarError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Format used when an event is shown to a user.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A titled time interval `[start_time, end_time)`.
///
/// Fields are private so an event cannot be changed once built; every
/// constructor enforces a non-blank title and `start_time < end_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    title: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<Self, CalendarError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CalendarError::MissingTitle);
        }
        if start_time >= end_time {
            return Err(CalendarError::Ordering);
        }
        Ok(Self { title, start_time, end_time })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Half-open intersection test: an interval ending exactly when this
    /// event starts (or starting exactly when it ends) does not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end_time && end > self.start_time
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Start: {}, End: {}",
            self.title,
            self.start_time.format(DISPLAY_FORMAT),
            self.end_time.format(DISPLAY_FORMAT)
        )
    }
}
