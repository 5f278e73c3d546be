//! Price and fundamentals data read from a directory of JSON files
//!
//! Layout:
//! - `{dir}/{SYMBOL}_{interval}.json`: array of bars, oldest first
//! - `{dir}/{SYMBOL}_fundamentals.json`: fundamentals object, optional

use async_trait::async_trait;
use signal_engine::{
    Bar, EngineError, Fundamentals, FundamentalsProvider, Interval, PriceHistoryProvider,
    PriceSeries, Result,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads bar and fundamentals files on demand
#[derive(Debug, Clone)]
pub struct JsonDataStore {
    dir: PathBuf,
}

impl JsonDataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn bars_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", symbol.to_uppercase(), interval.as_str()))
    }

    pub fn fundamentals_path(&self, symbol: &str) -> PathBuf {
        self.dir
            .join(format!("{}_fundamentals.json", symbol.to_uppercase()))
    }
}

/// Load a bar file into a validated series
pub async fn load_series(path: &Path, symbol: &str, interval: Interval) -> Result<PriceSeries> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EngineError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
    let bars: Vec<Bar> = serde_json::from_str(&raw)?;
    debug!(symbol, %interval, bars = bars.len(), path = %path.display(), "loaded bars");
    PriceSeries::new(symbol, interval, bars)
}

#[async_trait]
impl PriceHistoryProvider for JsonDataStore {
    async fn price_history(&self, symbol: &str, interval: Interval) -> Result<PriceSeries> {
        load_series(&self.bars_path(symbol, interval), symbol, interval).await
    }
}

#[async_trait]
impl FundamentalsProvider for JsonDataStore {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let path = self.fundamentals_path(symbol);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(EngineError::MissingInput {
                symbol: symbol.to_string(),
                field: "fundamentals".to_string(),
            }),
            Err(e) => Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }
}
