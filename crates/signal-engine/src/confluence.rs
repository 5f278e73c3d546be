//! Multi-timeframe confluence and trade recommendation

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::ConfluenceParams;
use crate::error::{EngineError, Result};
use crate::market::TradingMode;
use crate::trend::{TimeframeAnalysis, Trend};

/// Recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Wait => "WAIT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryZone {
    pub min: f64,
    pub max: f64,
}

/// Weighted verdict across timeframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confluence {
    pub direction: Trend,
    /// Share of the total weight voting for `direction`, in percent
    pub strength: f64,
    /// e.g. "3/4 timeframes aligned"
    pub agreement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: f64,
    pub entry_zone: EntryZone,
    /// Absent when the direction is neutral
    pub stop_loss: Option<f64>,
    /// Nearest target first; empty when the direction is neutral
    pub take_profit: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    pub symbol: String,
    pub mode: TradingMode,
    pub current_price: f64,
    pub timeframes: Vec<TimeframeAnalysis>,
    pub confluence: Confluence,
    pub recommendation: Recommendation,
}

/// Combines per-timeframe trends into one verdict.
///
/// Weights follow each timeframe's slot in the mode's interval ladder,
/// shortest first.
#[derive(Debug, Clone, Default)]
pub struct ConfluenceAggregator {
    params: ConfluenceParams,
}

impl ConfluenceAggregator {
    pub fn new(params: ConfluenceParams) -> Self {
        Self { params }
    }

    /// Aggregate a complete ladder; the n-th timeframe takes the n-th weight
    pub fn aggregate(
        &self,
        symbol: &str,
        mode: TradingMode,
        timeframes: Vec<TimeframeAnalysis>,
    ) -> Result<ConfluenceResult> {
        self.aggregate_slotted(symbol, mode, timeframes.into_iter().enumerate().collect())
    }

    /// Aggregate timeframes tagged with their ladder slot. A gap left by a
    /// failed timeframe does not shift the weights of the ones after it.
    pub fn aggregate_slotted(
        &self,
        symbol: &str,
        mode: TradingMode,
        slotted: Vec<(usize, TimeframeAnalysis)>,
    ) -> Result<ConfluenceResult> {
        let Some((_, shortest)) = slotted.first() else {
            return Err(EngineError::InvalidParameter(
                "confluence needs at least one timeframe".to_string(),
            ));
        };
        if let Some(w) = slotted
            .windows(2)
            .find(|w| w[0].0 >= w[1].0 || w[0].1.interval >= w[1].1.interval)
        {
            return Err(EngineError::InvalidParameter(format!(
                "timeframes must be sorted shortest first without repeats ({} at slot {} before {} at slot {})",
                w[0].1.interval, w[0].0, w[1].1.interval, w[1].0
            )));
        }

        let current_price = shortest.close;
        let weights: Vec<f64> = slotted
            .iter()
            .map(|(slot, _)| self.params.weight_at(*slot))
            .collect();
        let timeframes: Vec<TimeframeAnalysis> = slotted.into_iter().map(|(_, tf)| tf).collect();

        let confluence = self.confluence(&timeframes, &weights);
        let recommendation = self.recommend(&confluence, current_price, mode, &timeframes);

        debug!(
            symbol,
            %mode,
            direction = %confluence.direction,
            strength = confluence.strength,
            action = %recommendation.action,
            "aggregated timeframes"
        );

        Ok(ConfluenceResult {
            symbol: symbol.to_string(),
            mode,
            current_price,
            timeframes,
            confluence,
            recommendation,
        })
    }

    fn confluence(&self, timeframes: &[TimeframeAnalysis], weights: &[f64]) -> Confluence {
        let (mut bullish, mut bearish, mut neutral) = (0.0, 0.0, 0.0);
        for (tf, weight) in timeframes.iter().zip(weights) {
            match tf.trend {
                Trend::Bullish => bullish += weight,
                Trend::Bearish => bearish += weight,
                Trend::Neutral => neutral += weight,
            }
        }
        let total = bullish + bearish + neutral;

        let direction = if bullish > bearish && bullish > neutral {
            Trend::Bullish
        } else if bearish > bullish && bearish > neutral {
            Trend::Bearish
        } else {
            Trend::Neutral
        };

        let votes = match direction {
            Trend::Bullish => bullish,
            Trend::Bearish => bearish,
            Trend::Neutral => 0.0,
        };
        let strength = if total > 0.0 { 100.0 * votes / total } else { 0.0 };

        let aligned = timeframes.iter().filter(|tf| tf.trend == direction).count();

        Confluence {
            direction,
            strength,
            agreement: format!("{aligned}/{} timeframes aligned", timeframes.len()),
        }
    }

    fn recommend(
        &self,
        confluence: &Confluence,
        price: f64,
        mode: TradingMode,
        timeframes: &[TimeframeAnalysis],
    ) -> Recommendation {
        let p = &self.params;
        let actionable = confluence.strength >= p.action_threshold;
        let action = match confluence.direction {
            Trend::Bullish if actionable => Action::Buy,
            Trend::Bearish if actionable => Action::Sell,
            _ => Action::Wait,
        };

        let entry_zone = EntryZone {
            min: price * (1.0 - p.entry_buffer),
            max: price * (1.0 + p.entry_buffer),
        };

        let side = match confluence.direction {
            Trend::Bullish => 1.0,
            Trend::Bearish => -1.0,
            Trend::Neutral => {
                return Recommendation {
                    action,
                    confidence: confluence.strength,
                    entry_zone,
                    stop_loss: None,
                    take_profit: Vec::new(),
                };
            }
        };

        let risk = self.stop_distance(price, mode, timeframes);
        Recommendation {
            action,
            confidence: confluence.strength,
            entry_zone,
            stop_loss: Some(price - side * risk),
            take_profit: p
                .take_profit_multiples
                .iter()
                .map(|m| price + side * m * risk)
                .collect(),
        }
    }

    /// ATR of the shortest timeframe that has one, scaled by mode; a fixed
    /// fraction of price otherwise
    fn stop_distance(&self, price: f64, mode: TradingMode, timeframes: &[TimeframeAnalysis]) -> f64 {
        timeframes
            .iter()
            .find_map(|tf| tf.atr.filter(|atr| *atr > 0.0))
            .map_or(price * self.params.fallback_stop_pct, |atr| {
                atr * mode.stop_multiplier()
            })
    }
}
