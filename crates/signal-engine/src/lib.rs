//! Quantitative analysis engine for discretionary equity trading
//!
//! This crate turns OHLCV history into structured trading signals:
//!
//! - Indicator library: SMA, EMA, Wilder RSI, MACD, Bollinger Bands, ATR and volume ratios
//! - Per-timeframe trend classification with support and resistance
//! - Multi-timeframe confluence with a BUY/SELL/WAIT recommendation
//! - BPJS screening score and ranking across a universe of symbols
//!
//! # Architecture
//!
//! The indicator, trend, confluence and scoring modules are pure: they take
//! immutable inputs and return values. `AnalysisService` sits on top and talks
//! to the injected collaborators:
//! - `PriceHistoryProvider`: bars per symbol and interval
//! - `FundamentalsProvider`: valuation ratios and headlines
//! - `AnalysisCache`: optional TTL cache keyed by `(symbol, mode)`
//!
//! # Example
//!
//! ```rust,ignore
//! use signal_engine::{AnalysisService, EngineConfig, TimedAnalysisCache, TradingMode};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::default();
//!     let cache = Arc::new(TimedAnalysisCache::new(config.cache.capacity));
//!
//!     let service = AnalysisService::new(config, prices, fundamentals)?.with_cache(cache);
//!
//!     let result = service.analyze("BBCA", TradingMode::Swing).await?;
//!     println!("{} {}", result.confluence.direction, result.recommendation.action);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod confluence;
pub mod error;
pub mod indicators;
pub mod market;
pub mod providers;
pub mod scoring;
pub mod service;
pub mod trend;

// Re-export main types for convenience
pub use cache::{AnalysisCache, CacheKey, TimedAnalysisCache};
pub use config::{
    BollingerPolicy, CacheParams, ConfluenceParams, EngineConfig, IndicatorParams,
    ScreeningParams, TrendWeights,
};
pub use confluence::{
    Action, Confluence, ConfluenceAggregator, ConfluenceResult, EntryZone, Recommendation,
};
pub use error::{EngineError, Result};
pub use indicators::{IndicatorError, IndicatorSnapshot};
pub use market::{Bar, Interval, PriceSeries, TradingMode};
pub use providers::{FundamentalsProvider, PriceHistoryProvider};
pub use scoring::{
    BpjsScore, CategoryWeights, Fundamentals, ScoreBreakdown, ScoreCategory, ScoringEngine,
    ScreeningCandidate,
};
pub use service::AnalysisService;
pub use trend::{KeyLevels, TimeframeAnalysis, Trend, TrendClassifier};
