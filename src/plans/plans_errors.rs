use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for plan-related operations
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Plan not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for PlanError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PlanError::NotFound("Record not found".to_string()),
            _ => PlanError::DatabaseError(err.to_string()),
        }
    }
}
