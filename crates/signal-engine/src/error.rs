//! Error types for analysis operations

use thiserror::Error;

use crate::indicators::IndicatorError;

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// An indicator could not be computed
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// Parameter outside of its valid domain (programmer error)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Optional fundamental or sentiment input is absent
    #[error("Missing input for {symbol}: {field}")]
    MissingInput { symbol: String, field: String },

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cache error
    #[error("Cache error: {0}")]
    CacheError(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether the caller can carry on with a degraded result.
    ///
    /// Insufficient history and absent optional inputs only make one
    /// indicator or one scoring category unavailable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Indicator(IndicatorError::InsufficientData { .. })
                | EngineError::MissingInput { .. }
                | EngineError::DataUnavailable { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
