//! Error types for schedule loading, layout and rendering.

use thiserror::Error;

use crate::models::{TalkId, TimeOfDay};

/// Result type for progpdf operations
pub type ProgrammeResult<T> = std::result::Result<T, ProgrammeError>;

/// Errors that can occur while loading, laying out or rendering a programme
#[derive(Error, Debug)]
pub enum ProgrammeError {
    /// Feed unreachable or answered with an error status
    #[error("Feed error: {0}")]
    Feed(String),

    /// Malformed schedule or detail payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Time value that is not a valid `H:MM` / `HH:MM` time of day
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// More than one talk starts in the same room at the same slot
    #[error("Two talks for {date} {slot} {room}: {first} and {second}")]
    AmbiguousSlot {
        date: String,
        slot: TimeOfDay,
        room: String,
        first: TalkId,
        second: TalkId,
    },

    /// Two talks with different start times overlap in one room
    #[error("Overlapping talks in room {room} on {date}: {first} and {second}")]
    OverlappingTalks {
        date: String,
        room: String,
        first: TalkId,
        second: TalkId,
    },

    /// Date not present in the schedule
    #[error("Unknown date: {0}")]
    UnknownDate(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document composition or PDF output failed
    #[error("Render error: {0}")]
    Render(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProgrammeError {
    /// Whether this error reports inconsistent schedule data rather than an I/O failure.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            ProgrammeError::AmbiguousSlot { .. } | ProgrammeError::OverlappingTalks { .. }
        )
    }
}
