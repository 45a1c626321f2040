use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid principal: {0} (must be greater than zero)")]
    InvalidPrincipal(String),

    #[error("Invalid period count: {periods} — {reason}")]
    InvalidPeriodCount { periods: u32, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditSimError {
    fn from(e: serde_json::Error) -> Self {
        CreditSimError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for CreditSimError {
    fn from(e: std::io::Error) -> Self {
        CreditSimError::StorageError(e.to_string())
    }
}

#[cfg(feature = "applications")]
impl From<csv::Error> for CreditSimError {
    fn from(e: csv::Error) -> Self {
        CreditSimError::StorageError(e.to_string())
    }
}
