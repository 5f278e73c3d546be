//! Every indicator for one price series, computed independently

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    BollingerBandsResult, IndicatorError, MacdResult, RsiResult, VolumeAnalysis, atr,
    bollinger_bands, ema, macd, rsi, volume_analysis,
};
use crate::config::IndicatorParams;
use crate::error::{EngineError, Result};
use crate::market::{Interval, PriceSeries};

/// Indicator readings for the latest bar of a series.
///
/// Each indicator is optional: a series too short for one lookback leaves
/// that field empty and records its name in `unavailable` without touching
/// the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub interval: Interval,
    pub close: f64,
    pub rsi: Option<RsiResult>,
    pub macd: Option<MacdResult>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub bollinger: Option<BollingerBandsResult>,
    pub atr: Option<f64>,
    pub volume: Option<VolumeAnalysis>,
    /// Latest open against the previous close, in percent
    pub gap_pct: Option<f64>,
    pub unavailable: Vec<String>,
}

impl IndicatorSnapshot {
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Result<Self> {
        let close = series.last_close().ok_or_else(|| EngineError::DataUnavailable {
            symbol: series.symbol.clone(),
            reason: format!("no {} bars", series.interval),
        })?;

        let closes = series.closes();
        let mut tracker = Availability::new(series);

        let rsi = tracker.keep("rsi", rsi(&closes, params.rsi_period))?;
        let macd = tracker.keep(
            "macd",
            macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal),
        )?;
        let ema_fast = tracker.keep("ema_fast", ema(&closes, params.ema_fast).map(|r| r.current))?;
        let ema_slow = tracker.keep("ema_slow", ema(&closes, params.ema_slow).map(|r| r.current))?;
        let bollinger = tracker.keep(
            "bollinger",
            bollinger_bands(&closes, params.bollinger_period, params.bollinger_k),
        )?;
        let atr = tracker.keep(
            "atr",
            atr(&series.highs(), &series.lows(), &closes, params.atr_period).map(|r| r.current),
        )?;
        let volume = tracker.keep(
            "volume",
            volume_analysis(
                &series.volumes(),
                params.volume_period,
                params.volume_spike_threshold,
                params.volume_trend_window,
            ),
        )?;

        Ok(Self {
            symbol: series.symbol.clone(),
            interval: series.interval,
            close,
            rsi,
            macd,
            ema_fast,
            ema_slow,
            bollinger,
            atr,
            volume,
            gap_pct: gap_pct(series),
            unavailable: tracker.unavailable,
        })
    }

    /// Number of indicators that could be computed
    pub fn available_count(&self) -> usize {
        [
            self.rsi.is_some(),
            self.macd.is_some(),
            self.ema_fast.is_some(),
            self.ema_slow.is_some(),
            self.bollinger.is_some(),
            self.atr.is_some(),
            self.volume.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Collects the names of indicators that failed, logging each once
struct Availability<'a> {
    series: &'a PriceSeries,
    unavailable: Vec<String>,
}

impl<'a> Availability<'a> {
    fn new(series: &'a PriceSeries) -> Self {
        Self {
            series,
            unavailable: Vec::new(),
        }
    }

    /// Short history only marks the indicator unavailable; a bad parameter
    /// is a caller error and is returned.
    fn keep<T>(&mut self, name: &str, result: super::Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err @ IndicatorError::InsufficientData { .. }) => {
                debug!(
                    symbol = %self.series.symbol,
                    interval = %self.series.interval,
                    indicator = name,
                    error = %err,
                    "indicator unavailable"
                );
                self.unavailable.push(name.to_string());
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Open of the last bar against the close before it, in percent
pub fn gap_pct(series: &PriceSeries) -> Option<f64> {
    match series.bars() {
        [.., prev, last] if prev.close != 0.0 => {
            Some((last.open - prev.close) / prev.close * 100.0)
        }
        _ => None,
    }
}
