use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for recurring series operations
#[derive(Debug, Error)]
pub enum RecurringError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Series not found: {0}")]
    NotFound(String),
    #[error("Template not found for series: {0}")]
    TemplateNotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Defensive check for a recurrence unit outside the four supported
    /// ones. Reachable only through corrupt stored data, never through
    /// validated input; callers should treat it as fatal.
    #[error("Unknown recurrence type: {0}")]
    UnknownRecurrenceType(String),
}

impl From<DieselError> for RecurringError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RecurringError::NotFound("Record not found".to_string()),
            _ => RecurringError::DatabaseError(err.to_string()),
        }
    }
}
