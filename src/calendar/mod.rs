//! Calendar core: the event model, validation, the backing store and the
//! free-slot search.

use crate::storage::StorageError;

mod calendar_validation;
mod event;
mod slots;
mod store;

pub use calendar_validation::*;
pub use event::*;
pub use slots::*;
pub use store::*;

/// Custom error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Event title cannot be empty.")]
    MissingTitle,
    #[error("Invalid datetime format.")]
    Format,
    #[error("Start time must be before end time.")]
    Ordering,
    #[error("Overlaps with: {title}")]
    Overlap { title: String },
    #[error("Could not delete event: no event at position {position}.")]
    Range { position: String },
    #[error("Storage error: {0}")]
    Persistence(#[from] StorageError),
}

/// Result of a shell-facing operation: a success flag plus the message to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl From<CalendarError> for Outcome {
    fn from(err: CalendarError) -> Self {
        Outcome::failed(err.to_string())
    }
}
