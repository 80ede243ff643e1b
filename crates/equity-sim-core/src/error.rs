use thiserror::Error;

#[derive(Debug, Error)]
pub enum EquitySimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),

    #[error("Invalid jurisdiction catalog: {0}")]
    InvalidCatalog(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EquitySimError {
    fn from(e: serde_json::Error) -> Self {
        EquitySimError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for EquitySimError {
    fn from(e: chrono::ParseError) -> Self {
        EquitySimError::DateError(e.to_string())
    }
}
