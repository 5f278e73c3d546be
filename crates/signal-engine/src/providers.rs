//! Collaborator interfaces for market data
//!
//! The engine never talks to a network; callers plug in whatever supplies
//! bars and fundamentals.

use async_trait::async_trait;

use crate::error::Result;
use crate::market::{Interval, PriceSeries};
use crate::scoring::Fundamentals;

/// Source of OHLCV history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Bars for `symbol` at `interval`, oldest first.
    ///
    /// Return `EngineError::DataUnavailable` when there is no history.
    async fn price_history(&self, symbol: &str, interval: Interval) -> Result<PriceSeries>;
}

/// Source of fundamentals and headlines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Return `EngineError::MissingInput` when nothing is known for `symbol`
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}
