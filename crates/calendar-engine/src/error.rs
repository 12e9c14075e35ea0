//! Error types for calendar-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// A component was built without a collaborator it cannot work without.
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid repeat rule: {0}")]
    InvalidRepeat(String),

    /// Two attributes of one calendar share a key.
    #[error("Duplicate attribute key: {0}")]
    DuplicateAttribute(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A pending page transition was replaced by a newer navigation.
    #[error("Page transition superseded by a newer navigation")]
    TransitionSuperseded,
}

pub type Result<T> = std::result::Result<T, CalendarError>;
