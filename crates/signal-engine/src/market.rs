//! Price history and timeframe types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};

/// One OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Chart interval, ordered by horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" => Ok(Interval::OneHour),
            "4h" => Ok(Interval::FourHours),
            "1d" | "d" => Ok(Interval::OneDay),
            "1wk" | "1w" | "w" => Ok(Interval::OneWeek),
            other => Err(EngineError::InvalidParameter(format!("unknown interval: {other}"))),
        }
    }
}

/// Trading style; picks the timeframe ladder and stop width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Scalping,
    #[default]
    Intraday,
    Swing,
}

impl TradingMode {
    /// Timeframes analysed for this mode, shortest first
    pub fn intervals(&self) -> [Interval; 4] {
        match self {
            TradingMode::Scalping => [
                Interval::OneMinute,
                Interval::FiveMinutes,
                Interval::FifteenMinutes,
                Interval::OneHour,
            ],
            TradingMode::Intraday => [
                Interval::FifteenMinutes,
                Interval::OneHour,
                Interval::FourHours,
                Interval::OneDay,
            ],
            TradingMode::Swing => [
                Interval::OneHour,
                Interval::FourHours,
                Interval::OneDay,
                Interval::OneWeek,
            ],
        }
    }

    /// ATR multiple used for the stop distance
    pub fn stop_multiplier(&self) -> f64 {
        match self {
            TradingMode::Scalping => 1.0,
            TradingMode::Intraday => 1.5,
            TradingMode::Swing => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Scalping => "scalping",
            TradingMode::Intraday => "intraday",
            TradingMode::Swing => "swing",
        }
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradingMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "scalping" | "scalp" => Ok(TradingMode::Scalping),
            "intraday" | "day" => Ok(TradingMode::Intraday),
            "swing" => Ok(TradingMode::Swing),
            other => Err(EngineError::InvalidParameter(format!("unknown trading mode: {other}"))),
        }
    }
}

/// Immutable bar history for one symbol and interval, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub interval: Interval,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting bars that go back in time
    pub fn new(symbol: impl Into<String>, interval: Interval, bars: Vec<Bar>) -> Result<Self> {
        if let Some(pos) = bars.windows(2).position(|w| w[1].timestamp < w[0].timestamp) {
            return Err(EngineError::InvalidParameter(format!(
                "bars must be in ascending time order (bar {} precedes bar {})",
                pos + 1,
                pos
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            interval,
            bars,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Lowest low and highest high over the last `lookback` bars.
    ///
    /// `None` when fewer than `lookback` bars exist.
    pub fn range_extremes(&self, lookback: usize) -> Option<(f64, f64)> {
        if lookback == 0 || self.bars.len() < lookback {
            return None;
        }
        Some(extremes(&self.bars[self.bars.len() - lookback..]))
    }

    /// Lowest low and highest high over every bar
    pub fn full_extremes(&self) -> Option<(f64, f64)> {
        if self.bars.is_empty() {
            None
        } else {
            Some(extremes(&self.bars))
        }
    }
}

fn extremes(bars: &[Bar]) -> (f64, f64) {
    bars.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
        (lo.min(b.low), hi.max(b.high))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Bars with the given closes, one hour apart, high/low one unit away
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let prev = if i == 0 { c } else { closes[i - 1] };
                Bar::new(
                    start + Duration::hours(i as i64),
                    prev,
                    c.max(prev) + 1.0,
                    c.min(prev) - 1.0,
                    c,
                    1_000.0 + (i % 5) as f64 * 100.0,
                )
            })
            .collect()
    }

    pub fn series(symbol: &str, interval: Interval, closes: &[f64]) -> PriceSeries {
        PriceSeries::new(symbol, interval, bars_from_closes(closes)).unwrap()
    }

    pub fn trending(n: usize, start: f64, step: f64) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    /// Accelerating drift with every odd bar pulled back by `swing`
    pub fn zigzag(n: usize, start: f64, drift: f64, accel: f64, swing: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                let pullback = if i % 2 == 1 { swing } else { 0.0 };
                start + drift * x + accel * x * x + pullback
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_interval_round_trip_and_order() {
        for raw in ["1m", "5m", "15m", "30m", "1h", "4h", "1d", "1wk"] {
            let interval: Interval = raw.parse().unwrap();
            assert_eq!(interval.to_string(), raw);
        }
        assert!(Interval::FifteenMinutes < Interval::OneHour);
        assert!(Interval::OneDay < Interval::OneWeek);
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn test_mode_ladders_are_sorted() {
        for mode in [TradingMode::Scalping, TradingMode::Intraday, TradingMode::Swing] {
            let intervals = mode.intervals();
            assert!(intervals.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(TradingMode::Scalping.stop_multiplier() < TradingMode::Swing.stop_multiplier());
        assert_eq!("swing".parse::<TradingMode>().unwrap(), TradingMode::Swing);
    }

    #[test]
    fn test_series_rejects_descending_time() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        bars.swap(0, 2);
        assert!(PriceSeries::new("X", Interval::OneDay, bars).is_err());
    }

    #[test]
    fn test_series_accessors() {
        let s = series("BBRI", Interval::OneDay, &[10.0, 12.0, 11.0]);
        assert_eq!(s.closes(), vec![10.0, 12.0, 11.0]);
        assert_eq!(s.last_close(), Some(11.0));
        assert_eq!(s.range_extremes(1), Some((10.0, 13.0)));
        assert_eq!(s.range_extremes(2), Some((9.0, 13.0)));
        assert_eq!(s.range_extremes(5), None);
        assert_eq!(s.full_extremes(), Some((9.0, 13.0)));
    }

    #[test]
    fn test_bar_json_shape() {
        let bar = bars_from_closes(&[5.0])[0];
        let json = serde_json::to_value(bar).unwrap();
        assert_eq!(json["close"], 5.0);
        assert!(json["timestamp"].is_string());
        assert_eq!(serde_json::to_value(Interval::OneWeek).unwrap(), "1wk");
    }
}
