//! Orchestration over the data collaborators
//!
//! `AnalysisService` fetches history, runs the pure engine components and
//! optionally caches confluence results by `(symbol, mode)`.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::{AnalysisCache, CacheKey};
use crate::config::EngineConfig;
use crate::confluence::{ConfluenceAggregator, ConfluenceResult};
use crate::error::{EngineError, Result};
use crate::indicators::IndicatorSnapshot;
use crate::market::{Interval, TradingMode};
use crate::providers::{FundamentalsProvider, PriceHistoryProvider};
use crate::scoring::{BpjsScore, Fundamentals, ScoringEngine, ScreeningCandidate};
use crate::trend::{TimeframeAnalysis, TrendClassifier};

/// Interval used for screening snapshots
pub const SCREENING_INTERVAL: Interval = Interval::OneDay;

pub struct AnalysisService {
    prices: Arc<dyn PriceHistoryProvider>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    cache: Option<Arc<dyn AnalysisCache>>,
    config: EngineConfig,
    classifier: TrendClassifier,
    aggregator: ConfluenceAggregator,
    scorer: ScoringEngine,
}

impl AnalysisService {
    /// Validates `config` before wiring the components
    pub fn new(
        config: EngineConfig,
        prices: Arc<dyn PriceHistoryProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: TrendClassifier::new(config.trend.clone(), config.indicators.clone())?,
            aggregator: ConfluenceAggregator::new(config.confluence.clone()),
            scorer: ScoringEngine::new(config.scoring.clone(), config.screening.clone())?,
            prices,
            fundamentals,
            cache: None,
            config,
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn AnalysisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Indicator snapshot for one symbol and interval
    pub async fn snapshot(&self, symbol: &str, interval: Interval) -> Result<IndicatorSnapshot> {
        let series = self.prices.price_history(symbol, interval).await?;
        IndicatorSnapshot::compute(&series, &self.config.indicators)
    }

    /// Multi-timeframe confluence over the mode's interval ladder
    #[instrument(skip(self))]
    pub async fn analyze(&self, symbol: &str, mode: TradingMode) -> Result<ConfluenceResult> {
        let key = CacheKey::new(symbol, mode);
        if let Some(cached) = self.cached(&key).await {
            return Ok(cached);
        }

        let intervals = mode.intervals();
        let fetched = join_all(
            intervals
                .iter()
                .map(|interval| self.timeframe(symbol, *interval)),
        )
        .await;

        // ladder slot travels with each analysis so gaps keep the weights aligned
        let mut timeframes = Vec::with_capacity(intervals.len());
        for (slot, (interval, outcome)) in intervals.iter().zip(fetched).enumerate() {
            match outcome {
                Ok(analysis) => timeframes.push((slot, analysis)),
                Err(err) => warn!(symbol, %interval, error = %err, "dropping timeframe"),
            }
        }
        if timeframes.is_empty() {
            return Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no usable history for any {mode} timeframe"),
            });
        }

        let result = self.aggregator.aggregate_slotted(symbol, mode, timeframes)?;
        info!(
            symbol,
            direction = %result.confluence.direction,
            action = %result.recommendation.action,
            timeframes = result.timeframes.len(),
            "analysis complete"
        );

        if let Some(cache) = &self.cache {
            match serde_json::to_value(&result) {
                Ok(value) => cache.set(key, value, self.config.cache.ttl).await,
                Err(err) => warn!(error = %err, "could not cache analysis"),
            }
        }
        Ok(result)
    }

    /// Score and rank `symbols` on daily bars
    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    pub async fn screen<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Vec<BpjsScore>> {
        let symbols: Vec<&str> = symbols.iter().map(AsRef::as_ref).collect();
        let outcomes = join_all(symbols.iter().map(|symbol| self.candidate(symbol))).await;

        let candidates: Vec<ScreeningCandidate> = symbols
            .iter()
            .zip(outcomes)
            .filter_map(|(symbol, outcome)| match outcome {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    warn!(symbol, error = %err, "skipping candidate");
                    None
                }
            })
            .collect();

        if candidates.is_empty() && !symbols.is_empty() {
            return Err(EngineError::DataUnavailable {
                symbol: symbols.join(","),
                reason: "no symbol had usable daily history".to_string(),
            });
        }

        Ok(self.scorer.rank(&candidates))
    }

    async fn timeframe(&self, symbol: &str, interval: Interval) -> Result<TimeframeAnalysis> {
        let series = self.prices.price_history(symbol, interval).await?;
        self.classifier.classify(&series)
    }

    async fn candidate(&self, symbol: &str) -> Result<ScreeningCandidate> {
        let (snapshot, fundamentals) = futures::join!(
            self.snapshot(symbol, SCREENING_INTERVAL),
            self.fundamentals.fundamentals(symbol)
        );
        let fundamentals = match fundamentals {
            Ok(fundamentals) => fundamentals,
            Err(err) if err.is_recoverable() => {
                debug!(symbol, error = %err, "scoring without fundamentals");
                Fundamentals::default()
            }
            Err(err) => return Err(err),
        };
        Ok(ScreeningCandidate {
            snapshot: snapshot?,
            fundamentals,
        })
    }

    async fn cached(&self, key: &CacheKey) -> Option<ConfluenceResult> {
        let value = self.cache.as_ref()?.get(key).await?;
        match serde_json::from_value(value) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(%key, error = %err, "discarding unreadable cache entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MockAnalysisCache, TimedAnalysisCache};
    use crate::confluence::Action;
    use crate::market::PriceSeries;
    use crate::market::test_support::{bars_from_closes, zigzag};
    use crate::providers::{MockFundamentalsProvider, MockPriceHistoryProvider};
    use crate::trend::Trend;

    fn uptrend(symbol: &str, interval: Interval) -> Result<PriceSeries> {
        PriceSeries::new(symbol, interval, bars_from_closes(&zigzag(80, 100.0, 0.5, 0.01, -6.0)))
    }

    fn downtrend(symbol: &str, interval: Interval) -> Result<PriceSeries> {
        PriceSeries::new(symbol, interval, bars_from_closes(&zigzag(80, 300.0, -0.5, -0.01, 6.0)))
    }

    fn no_fundamentals() -> MockFundamentalsProvider {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fundamentals().returning(|symbol| {
            Err(EngineError::MissingInput {
                symbol: symbol.to_string(),
                field: "fundamentals".to_string(),
            })
        });
        mock
    }

    fn service(prices: MockPriceHistoryProvider) -> AnalysisService {
        AnalysisService::new(
            EngineConfig::default(),
            Arc::new(prices),
            Arc::new(no_fundamentals()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_uptrend_across_timeframes() {
        let mut prices = MockPriceHistoryProvider::new();
        prices
            .expect_price_history()
            .times(4)
            .returning(|symbol, interval| uptrend(symbol, interval));

        let result = service(prices)
            .analyze("BBCA", TradingMode::Intraday)
            .await
            .unwrap();

        assert_eq!(result.timeframes.len(), 4);
        assert_eq!(result.confluence.direction, Trend::Bullish);
        assert_eq!(result.recommendation.action, Action::Buy);
        let intervals: Vec<Interval> = result.timeframes.iter().map(|t| t.interval).collect();
        assert_eq!(intervals, TradingMode::Intraday.intervals().to_vec());
    }

    #[tokio::test]
    async fn test_failed_timeframe_is_dropped() {
        let mut prices = MockPriceHistoryProvider::new();
        prices.expect_price_history().returning(|symbol, interval| {
            if interval == Interval::FifteenMinutes {
                Err(EngineError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "market closed".to_string(),
                })
            } else {
                uptrend(symbol, interval)
            }
        });

        let result = service(prices)
            .analyze("BBCA", TradingMode::Intraday)
            .await
            .unwrap();
        assert_eq!(result.timeframes.len(), 3);
        assert_eq!(result.timeframes[0].interval, Interval::OneHour);
    }

    #[tokio::test]
    async fn test_failed_middle_timeframe_keeps_ladder_weights() {
        let mut prices = MockPriceHistoryProvider::new();
        prices.expect_price_history().returning(|symbol, interval| match interval {
            Interval::FourHours => Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "feed gap".to_string(),
            }),
            Interval::OneDay => uptrend(symbol, interval),
            _ => downtrend(symbol, interval),
        });

        let result = service(prices)
            .analyze("BBCA", TradingMode::Intraday)
            .await
            .unwrap();

        let trends: Vec<Trend> = result.timeframes.iter().map(|t| t.trend).collect();
        assert_eq!(trends, vec![Trend::Bearish, Trend::Bearish, Trend::Bullish]);
        // 1d keeps weight 3 against 1 + 1 from the bearish short frames
        assert_eq!(result.confluence.direction, Trend::Bullish);
        assert_eq!(result.confluence.strength, 60.0);
        assert_eq!(result.recommendation.action, Action::Buy);
    }

    #[tokio::test]
    async fn test_all_timeframes_failing_is_unavailable() {
        let mut prices = MockPriceHistoryProvider::new();
        prices.expect_price_history().returning(|symbol, _| {
            Err(EngineError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".to_string(),
            })
        });

        let err = service(prices)
            .analyze("XXXX", TradingMode::Swing)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let mut prices = MockPriceHistoryProvider::new();
        prices
            .expect_price_history()
            .times(4)
            .returning(|symbol, interval| uptrend(symbol, interval));

        let service = service(prices).with_cache(Arc::new(TimedAnalysisCache::new(10)));
        let first = service.analyze("BBCA", TradingMode::Intraday).await.unwrap();
        let second = service.analyze("bbca", TradingMode::Intraday).await.unwrap();
        assert_eq!(second.symbol, first.symbol);
        assert_eq!(second.confluence.direction, first.confluence.direction);
        assert_eq!(second.timeframes.len(), 4);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_recomputed() {
        let mut cache = MockAnalysisCache::new();
        cache
            .expect_get()
            .returning(|_| Some(serde_json::json!({"not": "a result"})));
        cache.expect_set().times(1).return_const(());

        let mut prices = MockPriceHistoryProvider::new();
        prices
            .expect_price_history()
            .returning(|symbol, interval| uptrend(symbol, interval));

        let result = service(prices)
            .with_cache(Arc::new(cache))
            .analyze("TLKM", TradingMode::Intraday)
            .await
            .unwrap();
        assert_eq!(result.symbol, "TLKM");
    }

    #[tokio::test]
    async fn test_screen_skips_symbols_without_history() {
        let mut prices = MockPriceHistoryProvider::new();
        prices.expect_price_history().returning(|symbol, interval| {
            if symbol == "GONE" {
                Err(EngineError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "delisted".to_string(),
                })
            } else {
                uptrend(symbol, interval)
            }
        });

        let mut fundamentals = MockFundamentalsProvider::new();
        fundamentals.expect_fundamentals().returning(|symbol| {
            if symbol == "BBCA" {
                Ok(Fundamentals {
                    pe_ratio: Some(12.0),
                    pb_ratio: Some(1.0),
                    sentiment: Some(5.0),
                    ..Default::default()
                })
            } else {
                Err(EngineError::MissingInput {
                    symbol: symbol.to_string(),
                    field: "fundamentals".to_string(),
                })
            }
        });

        let service = AnalysisService::new(
            EngineConfig::default(),
            Arc::new(prices),
            Arc::new(fundamentals),
        )
        .unwrap();

        let ranked = service.screen(&["TLKM", "GONE", "BBCA"]).await.unwrap();
        let symbols: Vec<&str> = ranked.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BBCA", "TLKM"]);
        // valuation 10 + sentiment 15
        assert!((ranked[0].total_score - ranked[1].total_score - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.confluence.timeframe_weights.clear();
        let result = AnalysisService::new(
            config,
            Arc::new(MockPriceHistoryProvider::new()),
            Arc::new(no_fundamentals()),
        );
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }
}
