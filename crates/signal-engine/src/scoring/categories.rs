//! Scoring categories, their weights and per-category rules

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::indicators::{Crossover, IndicatorSnapshot};

use super::Fundamentals;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Fixed set of scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreCategory {
    RsiPosition,
    MacdSignal,
    VolumeRatio,
    Gap,
    Sentiment,
    Trend,
    Valuation,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 7] = [
        ScoreCategory::RsiPosition,
        ScoreCategory::MacdSignal,
        ScoreCategory::VolumeRatio,
        ScoreCategory::Gap,
        ScoreCategory::Sentiment,
        ScoreCategory::Trend,
        ScoreCategory::Valuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::RsiPosition => "rsiPosition",
            ScoreCategory::MacdSignal => "macdSignal",
            ScoreCategory::VolumeRatio => "volumeRatio",
            ScoreCategory::Gap => "gap",
            ScoreCategory::Sentiment => "sentiment",
            ScoreCategory::Trend => "trend",
            ScoreCategory::Valuation => "valuation",
        }
    }

    /// Share of the category weight earned, in `[0, 1]`; 0 when the input is missing
    pub fn fraction(&self, snapshot: &IndicatorSnapshot, fundamentals: &Fundamentals) -> f64 {
        let raw = match self {
            ScoreCategory::RsiPosition => snapshot.rsi.as_ref().map(|r| rsi_fraction(r.current)),
            ScoreCategory::MacdSignal => snapshot
                .macd
                .as_ref()
                .map(|m| macd_fraction(m.crossover, m.histogram)),
            ScoreCategory::VolumeRatio => snapshot.volume.as_ref().map(|v| volume_fraction(v.ratio)),
            ScoreCategory::Gap => snapshot.gap_pct.map(gap_fraction),
            ScoreCategory::Sentiment => fundamentals.sentiment.map(|s| s / 5.0),
            ScoreCategory::Trend => snapshot
                .ema_fast
                .map(|fast| trend_fraction(snapshot.close, fast, snapshot.ema_slow)),
            ScoreCategory::Valuation => {
                valuation_fraction(fundamentals.pe_ratio, fundamentals.pb_ratio)
            }
        };
        match raw {
            Some(f) if f.is_finite() => f.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points available per category; must sum to 100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWeights {
    pub rsi_position: f64,
    pub macd_signal: f64,
    pub volume_ratio: f64,
    pub gap: f64,
    pub sentiment: f64,
    pub trend: f64,
    pub valuation: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            rsi_position: 15.0,
            macd_signal: 15.0,
            volume_ratio: 20.0,
            gap: 15.0,
            sentiment: 15.0,
            trend: 10.0,
            valuation: 10.0,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::RsiPosition => self.rsi_position,
            ScoreCategory::MacdSignal => self.macd_signal,
            ScoreCategory::VolumeRatio => self.volume_ratio,
            ScoreCategory::Gap => self.gap,
            ScoreCategory::Sentiment => self.sentiment,
            ScoreCategory::Trend => self.trend,
            ScoreCategory::Valuation => self.valuation,
        }
    }

    pub fn total(&self) -> f64 {
        ScoreCategory::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(category) = ScoreCategory::ALL
            .iter()
            .find(|c| !(self.weight(**c).is_finite() && self.weight(**c) >= 0.0))
        {
            return Err(EngineError::ConfigError(format!(
                "weight for {category} must be a non-negative number"
            )));
        }
        let total = self.total();
        if (total - 100.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::ConfigError(format!(
                "category weights must sum to 100, got {total}"
            )));
        }
        Ok(())
    }
}

fn rsi_fraction(rsi: f64) -> f64 {
    match rsi {
        r if r >= 70.0 => 0.2,
        r if r > 65.0 => 0.7,
        r if r >= 50.0 => 1.0,
        r if r >= 40.0 => 0.7,
        r if r >= 30.0 => 0.5,
        _ => 0.3,
    }
}

fn macd_fraction(crossover: Crossover, histogram: f64) -> f64 {
    match crossover {
        Crossover::Bullish => 1.0,
        Crossover::Bearish => 0.0,
        Crossover::None if histogram > 0.0 => 0.7,
        Crossover::None => 0.2,
    }
}

fn volume_fraction(ratio: f64) -> f64 {
    match ratio {
        r if r >= 2.0 => 1.0,
        r if r >= 1.5 => 0.75,
        r if r >= 1.0 => 0.5,
        r if r >= 0.7 => 0.25,
        _ => 0.0,
    }
}

/// Gap in percent; a small gap up scores best
fn gap_fraction(gap: f64) -> f64 {
    match gap {
        g if g > 5.0 => 0.3,
        g if g > 2.0 => 0.6,
        g if g > 0.0 => 1.0,
        g if g >= -1.0 => 0.5,
        _ => 0.0,
    }
}

fn trend_fraction(close: f64, ema_fast: f64, ema_slow: Option<f64>) -> f64 {
    if close <= ema_fast {
        return 0.0;
    }
    match ema_slow {
        Some(slow) if ema_fast > slow => 1.0,
        _ => 0.6,
    }
}

fn valuation_fraction(pe: Option<f64>, pb: Option<f64>) -> Option<f64> {
    if pe.is_none() && pb.is_none() {
        return None;
    }
    let pe_part = match pe {
        Some(p) if p > 0.0 && p <= 15.0 => 0.5,
        Some(p) if p > 15.0 && p <= 25.0 => 0.3,
        _ => 0.0,
    };
    let pb_part = match pb {
        Some(p) if p > 0.0 && p <= 1.5 => 0.5,
        Some(p) if p > 1.5 && p <= 3.0 => 0.3,
        _ => 0.0,
    };
    Some(pe_part + pb_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        let weights = CategoryWeights::default();
        assert_eq!(weights.total(), 100.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weight_validation() {
        let drifted = CategoryWeights {
            sentiment: 20.0,
            ..Default::default()
        };
        assert!(matches!(drifted.validate(), Err(EngineError::ConfigError(_))));

        let negative = CategoryWeights {
            gap: -5.0,
            trend: 30.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_rsi_bands() {
        assert_eq!(rsi_fraction(55.0), 1.0);
        assert_eq!(rsi_fraction(65.0), 1.0);
        assert_eq!(rsi_fraction(67.0), 0.7);
        assert_eq!(rsi_fraction(45.0), 0.7);
        assert_eq!(rsi_fraction(35.0), 0.5);
        assert_eq!(rsi_fraction(20.0), 0.3);
        assert_eq!(rsi_fraction(70.0), 0.2);
    }

    #[test]
    fn test_macd_and_volume_rules() {
        assert_eq!(macd_fraction(Crossover::Bullish, -0.1), 1.0);
        assert_eq!(macd_fraction(Crossover::None, 0.3), 0.7);
        assert_eq!(macd_fraction(Crossover::None, -0.3), 0.2);
        assert_eq!(macd_fraction(Crossover::Bearish, 0.0), 0.0);

        assert_eq!(volume_fraction(2.5), 1.0);
        assert_eq!(volume_fraction(1.5), 0.75);
        assert_eq!(volume_fraction(1.2), 0.5);
        assert_eq!(volume_fraction(0.8), 0.25);
        assert_eq!(volume_fraction(0.2), 0.0);
    }

    #[test]
    fn test_gap_rules() {
        assert_eq!(gap_fraction(1.5), 1.0);
        assert_eq!(gap_fraction(2.0), 1.0);
        assert_eq!(gap_fraction(3.0), 0.6);
        assert_eq!(gap_fraction(8.0), 0.3);
        assert_eq!(gap_fraction(0.0), 0.5);
        assert_eq!(gap_fraction(-1.0), 0.5);
        assert_eq!(gap_fraction(-3.0), 0.0);
    }

    #[test]
    fn test_trend_and_valuation_rules() {
        assert_eq!(trend_fraction(105.0, 100.0, Some(95.0)), 1.0);
        assert_eq!(trend_fraction(105.0, 100.0, Some(102.0)), 0.6);
        assert_eq!(trend_fraction(105.0, 100.0, None), 0.6);
        assert_eq!(trend_fraction(99.0, 100.0, Some(95.0)), 0.0);

        assert_eq!(valuation_fraction(Some(10.0), Some(1.0)), Some(1.0));
        assert_eq!(valuation_fraction(Some(20.0), Some(2.0)), Some(0.6));
        assert_eq!(valuation_fraction(Some(-4.0), None), Some(0.0));
        assert_eq!(valuation_fraction(None, None), None);
    }
}
