//! Configuration for the analysis engine

use crate::error::{EngineError, Result};
use crate::scoring::CategoryWeights;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lookback periods and thresholds for the indicator library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub atr_period: usize,
    pub volume_period: usize,
    /// Volume ratio above which a bar counts as a spike
    pub volume_spike_threshold: f64,
    /// Number of trailing ratios compared for the volume trend
    pub volume_trend_window: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// Bars used for support/resistance
    pub key_level_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
            atr_period: 14,
            volume_period: 20,
            volume_spike_threshold: 1.5,
            volume_trend_window: 3,
            ema_fast: 20,
            ema_slow: 50,
            key_level_lookback: 20,
        }
    }
}

impl IndicatorParams {
    /// Reject periods and thresholds no indicator can work with
    pub fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("atr_period", self.atr_period),
            ("volume_period", self.volume_period),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("key_level_lookback", self.key_level_lookback),
        ] {
            if period == 0 {
                return Err(config_error(format!("{name} must be greater than 0")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(config_error("macd_fast must be shorter than macd_slow"));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(config_error("ema_fast must be shorter than ema_slow"));
        }
        if !(self.bollinger_k.is_finite() && self.bollinger_k >= 0.0) {
            return Err(config_error("bollinger_k must be a non-negative number"));
        }
        if self.volume_spike_threshold <= 0.0 {
            return Err(config_error("volume_spike_threshold must be positive"));
        }
        if self.volume_trend_window < 2 {
            return Err(config_error("volume_trend_window must be at least 2"));
        }
        Ok(())
    }
}

/// How a close beyond a Bollinger band is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BollingerPolicy {
    /// Always against the extreme
    MeanReversion,
    /// Always with the extreme
    Breakout,
    /// With the extreme when volume is rising, against it otherwise
    #[default]
    VolumeConfirmed,
}

/// Votes the trend classifier adds or subtracts per signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendWeights {
    pub rsi: f64,
    pub macd: f64,
    pub ema: f64,
    pub bollinger: f64,
    /// Net bias inside `[-deadband, deadband]` classifies as neutral
    pub deadband: f64,
    pub bollinger_policy: BollingerPolicy,
}

impl Default for TrendWeights {
    fn default() -> Self {
        Self {
            rsi: 10.0,
            macd: 15.0,
            ema: 15.0,
            bollinger: 10.0,
            deadband: 10.0,
            bollinger_policy: BollingerPolicy::VolumeConfirmed,
        }
    }
}

impl TrendWeights {
    pub fn validate(&self) -> Result<()> {
        if [self.rsi, self.macd, self.ema, self.bollinger, self.deadband]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(config_error("trend weights must be non-negative numbers"));
        }
        Ok(())
    }
}

/// Multi-timeframe aggregation and recommendation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceParams {
    /// Positional weights, shortest timeframe first. Extra timeframes reuse the last weight.
    pub timeframe_weights: Vec<f64>,
    /// Minimum strength for BUY/SELL
    pub action_threshold: f64,
    /// Half-width of the entry zone as a fraction of price
    pub entry_buffer: f64,
    /// Take-profit distances in multiples of the stop distance
    pub take_profit_multiples: Vec<f64>,
    /// Stop distance as a fraction of price when no ATR is available
    pub fallback_stop_pct: f64,
}

impl Default for ConfluenceParams {
    fn default() -> Self {
        Self {
            timeframe_weights: vec![1.0, 1.0, 2.0, 3.0],
            action_threshold: 60.0,
            entry_buffer: 0.003,
            take_profit_multiples: vec![1.0, 2.0, 3.0],
            fallback_stop_pct: 0.02,
        }
    }
}

impl ConfluenceParams {
    /// Positional weight; timeframes past the end of the list reuse the last weight
    pub fn weight_at(&self, position: usize) -> f64 {
        self.timeframe_weights
            .get(position)
            .or_else(|| self.timeframe_weights.last())
            .copied()
            .unwrap_or(1.0)
    }
}

/// Candidate filtering for the screener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningParams {
    pub min_score: f64,
    pub max_results: usize,
}

impl Default for ScreeningParams {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_results: 20,
        }
    }
}

/// Configuration for the analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub indicators: IndicatorParams,
    pub trend: TrendWeights,
    pub confluence: ConfluenceParams,
    pub scoring: CategoryWeights,
    pub screening: ScreeningParams,
    pub cache: CacheParams,
}

/// TTL and capacity of the result cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheParams {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
            capacity: 100,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.trend.validate()?;

        let conf = &self.confluence;
        if conf.timeframe_weights.is_empty() {
            return Err(config_error("timeframe_weights cannot be empty"));
        }
        if conf.timeframe_weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(config_error("timeframe_weights must be positive"));
        }
        if !(0.0..=100.0).contains(&conf.action_threshold) {
            return Err(config_error("action_threshold must be within [0, 100]"));
        }
        if !(0.0..1.0).contains(&conf.entry_buffer) {
            return Err(config_error("entry_buffer must be within [0, 1)"));
        }
        if conf.take_profit_multiples.is_empty()
            || conf.take_profit_multiples.iter().any(|m| *m <= 0.0)
            || conf.take_profit_multiples.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(config_error(
                "take_profit_multiples must be positive and strictly increasing",
            ));
        }
        if !(conf.fallback_stop_pct > 0.0 && conf.fallback_stop_pct < 1.0) {
            return Err(config_error("fallback_stop_pct must be within (0, 1)"));
        }

        self.scoring.validate()?;

        if self.screening.max_results == 0 {
            return Err(config_error("max_results must be greater than 0"));
        }
        if self.cache.capacity == 0 {
            return Err(config_error("cache capacity must be greater than 0"));
        }

        Ok(())
    }

    /// Weight for the timeframe at `position` (0 = shortest)
    pub fn timeframe_weight(&self, position: usize) -> f64 {
        self.confluence.weight_at(position)
    }
}

fn config_error(msg: impl Into<String>) -> EngineError {
    EngineError::ConfigError(msg.into())
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    indicators: Option<IndicatorParams>,
    trend: Option<TrendWeights>,
    confluence: Option<ConfluenceParams>,
    scoring: Option<CategoryWeights>,
    screening: Option<ScreeningParams>,
    cache: Option<CacheParams>,
}

impl EngineConfigBuilder {
    /// Set indicator periods and thresholds
    pub fn indicators(mut self, params: IndicatorParams) -> Self {
        self.indicators = Some(params);
        self
    }

    /// Set trend classifier weights
    pub fn trend(mut self, weights: TrendWeights) -> Self {
        self.trend = Some(weights);
        self
    }

    /// Set how Bollinger band extremes are read
    pub fn bollinger_policy(mut self, policy: BollingerPolicy) -> Self {
        let mut trend = self.trend.take().unwrap_or_default();
        trend.bollinger_policy = policy;
        self.trend = Some(trend);
        self
    }

    /// Set confluence aggregation parameters
    pub fn confluence(mut self, params: ConfluenceParams) -> Self {
        self.confluence = Some(params);
        self
    }

    /// Set scoring category weights
    pub fn scoring(mut self, weights: CategoryWeights) -> Self {
        self.scoring = Some(weights);
        self
    }

    /// Set minimum score and maximum result count
    pub fn screening(mut self, min_score: f64, max_results: usize) -> Self {
        self.screening = Some(ScreeningParams {
            min_score,
            max_results,
        });
        self
    }

    /// Set cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        let mut cache = self.cache.take().unwrap_or_default();
        cache.ttl = ttl;
        self.cache = Some(cache);
        self
    }

    /// Set cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        let mut cache = self.cache.take().unwrap_or_default();
        cache.capacity = capacity;
        self.cache = Some(cache);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        let config = EngineConfig {
            indicators: self.indicators.unwrap_or_default(),
            trend: self.trend.unwrap_or_default(),
            confluence: self.confluence.unwrap_or_default(),
            scoring: self.scoring.unwrap_or_default(),
            screening: self.screening.unwrap_or_default(),
            cache: self.cache.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
