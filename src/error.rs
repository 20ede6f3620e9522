use thiserror::Error;

use crate::domain::WeatherAttribute;

/// Recoverable service errors.
///
/// Every variant is reported to the caller as a structured result; none of
/// these abort the process. I/O and upstream faults travel through
/// [`ServiceError::Internal`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No rows (or not enough rows) for the requested operation.
    #[error("no data available: {0}")]
    DataUnavailable(String),

    /// Prediction requested before the model bank was trained.
    #[error("model not initialized, call initialize first")]
    NotInitialized,

    /// A single attribute has no trained model (partial training).
    #[error("no trained model for {0}")]
    ModelMissing(WeatherAttribute),

    /// Incoming data is missing expected attributes or cannot be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
