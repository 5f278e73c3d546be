//! Technical indicator library
//!
//! Pure functions over numeric sequences. Every function either returns the
//! full aligned output sequence or fails explicitly; none of them silently
//! returns zero for short input.
//!
//! # Supported indicators
//!
//! - **SMA / EMA**: simple and exponential moving averages
//! - **RSI**: Wilder's relative strength index
//! - **MACD**: moving average convergence/divergence with crossover detection
//! - **Bollinger Bands**: population standard deviation bands
//! - **ATR**: Wilder-smoothed average true range
//! - **Volume analysis**: volume ratio, spikes and ratio trend
//!
//! Output sequences are aligned to the last element of each input window, so
//! `values.len() == input.len() - (lookback - 1)`.
//!
//! # Example
//!
//! ```
//! use signal_engine::indicators::{ema, sma};
//!
//! let sma = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 5).unwrap();
//! assert_eq!(sma.values, vec![3.0]);
//!
//! let ema = ema(&[10.0, 11.0, 12.0, 13.0, 14.0], 3).unwrap();
//! assert_eq!(ema.values, vec![11.0, 12.0, 13.0]);
//! ```

pub mod momentum;
pub mod moving_average;
pub mod snapshot;
pub mod volatility;
pub mod volume;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use momentum::{Crossover, MacdResult, RsiResult, macd, rsi};
pub use moving_average::{ema, sma};
pub use snapshot::IndicatorSnapshot;
pub use volatility::{BandPosition, BollingerBandsResult, atr, bollinger_bands, true_range};
pub use volume::{VolumeAnalysis, VolumeTrend, volume_analysis};

/// Indicator calculation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// Input shorter than the indicator's minimum lookback
    #[error("Insufficient data for {indicator}: required {required}, provided {provided}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        provided: usize,
    },

    /// Non-positive period, empty series, mismatched inputs
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for indicator calculations
pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Reading of an indicator against its fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpretation {
    Oversold,
    Overbought,
    Neutral,
    Bullish,
    Bearish,
}

/// A single-line indicator: the latest value plus the aligned sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// Last element of `values`
    pub current: f64,
    /// Aligned output sequence, oldest first
    pub values: Vec<f64>,
    pub interpretation: Interpretation,
}

impl IndicatorResult {
    pub(crate) fn from_values(values: Vec<f64>, interpretation: Interpretation) -> Self {
        let current = values.last().copied().unwrap_or_default();
        Self {
            current,
            values,
            interpretation,
        }
    }
}

/// Reject zero periods and empty input.
pub(crate) fn validate_input(indicator: &'static str, len: usize, period: usize) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{indicator} period must be positive"
        )));
    }
    if len == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{indicator} input series is empty"
        )));
    }
    Ok(())
}

/// Fail with `InsufficientData` when `len < required`.
pub(crate) fn require_len(indicator: &'static str, len: usize, required: usize) -> Result<()> {
    if len < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            provided: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input() {
        assert!(validate_input("SMA", 5, 3).is_ok());
        assert!(matches!(
            validate_input("SMA", 5, 0),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(matches!(
            validate_input("SMA", 0, 3),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_require_len() {
        assert_eq!(
            require_len("RSI", 10, 15),
            Err(IndicatorError::InsufficientData {
                indicator: "RSI",
                required: 15,
                provided: 10,
            })
        );
        assert!(require_len("RSI", 15, 15).is_ok());
    }

    #[test]
    fn test_interpretation_serialization() {
        let json = serde_json::to_string(&Interpretation::Overbought).unwrap();
        assert_eq!(json, "\"OVERBOUGHT\"");
    }
}
