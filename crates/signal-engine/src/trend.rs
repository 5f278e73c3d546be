//! Single-timeframe trend classification
//!
//! Each available indicator casts a signed vote. The net vote (`bias`) moves
//! strength away from the neutral baseline of 50 and, once it clears the
//! deadband, decides the trend label. Missing indicators simply do not vote.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::{BollingerPolicy, IndicatorParams, TrendWeights};
use crate::error::Result;
use crate::indicators::{
    BandPosition, Crossover, IndicatorSnapshot, Interpretation, VolumeAnalysis, VolumeTrend,
};
use crate::market::{Interval, PriceSeries};

/// Neutral strength before any signal votes
pub const BASELINE_STRENGTH: f64 = 50.0;

/// Trend label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "BULLISH",
            Trend::Bearish => "BEARISH",
            Trend::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where support and resistance were taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    Lookback,
    Bollinger,
    FullRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    pub support: f64,
    pub resistance: f64,
    pub source: LevelSource,
}

/// Indicator that contributed a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Rsi,
    Macd,
    Ema,
    Bollinger,
}

/// One signed vote; positive favours bullish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub source: SignalSource,
    pub vote: f64,
    pub reason: String,
}

/// Classification of one timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub interval: Interval,
    pub trend: Trend,
    /// `50 + bias`, clamped to `[0, 100]`
    pub strength: f64,
    pub key_levels: KeyLevels,
    /// Net signed vote
    pub bias: f64,
    pub atr: Option<f64>,
    pub close: f64,
    pub signals: Vec<TrendSignal>,
}

/// Turns one timeframe's indicators into a trend label and levels
#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    weights: TrendWeights,
    params: IndicatorParams,
}

impl TrendClassifier {
    /// Rejects parameters the indicators cannot run with
    pub fn new(weights: TrendWeights, params: IndicatorParams) -> Result<Self> {
        weights.validate()?;
        params.validate()?;
        Ok(Self { weights, params })
    }

    /// Compute the snapshot for `series` and classify it
    pub fn classify(&self, series: &PriceSeries) -> Result<TimeframeAnalysis> {
        let snapshot = IndicatorSnapshot::compute(series, &self.params)?;
        Ok(self.classify_snapshot(&snapshot, series))
    }

    /// Classify an already computed snapshot; `series` supplies the key levels
    pub fn classify_snapshot(
        &self,
        snapshot: &IndicatorSnapshot,
        series: &PriceSeries,
    ) -> TimeframeAnalysis {
        let signals = self.signals(snapshot);
        let bias: f64 = signals.iter().map(|s| s.vote).sum();
        let strength = (BASELINE_STRENGTH + bias).clamp(0.0, 100.0);

        let trend = if bias > self.weights.deadband {
            Trend::Bullish
        } else if bias < -self.weights.deadband {
            Trend::Bearish
        } else {
            Trend::Neutral
        };

        debug!(
            symbol = %snapshot.symbol,
            interval = %snapshot.interval,
            %trend,
            bias,
            votes = signals.len(),
            "classified timeframe"
        );

        TimeframeAnalysis {
            interval: snapshot.interval,
            trend,
            strength,
            key_levels: self.key_levels(snapshot, series),
            bias,
            atr: snapshot.atr,
            close: snapshot.close,
            signals,
        }
    }

    fn signals(&self, snapshot: &IndicatorSnapshot) -> Vec<TrendSignal> {
        let w = &self.weights;
        let mut signals = Vec::new();

        if let Some(rsi) = &snapshot.rsi {
            match rsi.interpretation {
                Interpretation::Oversold => signals.push(signal(
                    SignalSource::Rsi,
                    w.rsi,
                    format!("RSI {:.1} oversold", rsi.current),
                )),
                Interpretation::Overbought => signals.push(signal(
                    SignalSource::Rsi,
                    -w.rsi,
                    format!("RSI {:.1} overbought", rsi.current),
                )),
                _ => {}
            }
        }

        if let Some(macd) = &snapshot.macd {
            let vote = match macd.crossover {
                Crossover::Bullish => Some((w.macd, "MACD bullish crossover")),
                Crossover::Bearish => Some((-w.macd, "MACD bearish crossover")),
                Crossover::None if macd.histogram > 0.0 => {
                    Some((w.macd / 2.0, "MACD histogram positive"))
                }
                Crossover::None if macd.histogram < 0.0 => {
                    Some((-w.macd / 2.0, "MACD histogram negative"))
                }
                Crossover::None => None,
            };
            if let Some((vote, reason)) = vote {
                signals.push(signal(SignalSource::Macd, vote, reason.to_string()));
            }
        }

        if let (Some(fast), Some(slow)) = (snapshot.ema_fast, snapshot.ema_slow) {
            let (p_fast, p_slow) = (self.params.ema_fast, self.params.ema_slow);
            if fast > slow {
                signals.push(signal(
                    SignalSource::Ema,
                    w.ema,
                    format!("EMA{p_fast} above EMA{p_slow}"),
                ));
            } else if fast < slow {
                signals.push(signal(
                    SignalSource::Ema,
                    -w.ema,
                    format!("EMA{p_fast} below EMA{p_slow}"),
                ));
            }
        }

        if let Some(bb) = &snapshot.bollinger {
            let confirmed = snapshot.volume.as_ref().is_some_and(volume_confirms);
            if let Some((vote, reason)) =
                bollinger_vote(bb.position, w.bollinger_policy, confirmed, w.bollinger)
            {
                signals.push(signal(SignalSource::Bollinger, vote, reason.to_string()));
            }
        }

        signals
    }

    fn key_levels(&self, snapshot: &IndicatorSnapshot, series: &PriceSeries) -> KeyLevels {
        if let Some((support, resistance)) = series.range_extremes(self.params.key_level_lookback)
        {
            return KeyLevels {
                support,
                resistance,
                source: LevelSource::Lookback,
            };
        }
        if let Some(bb) = &snapshot.bollinger {
            return KeyLevels {
                support: bb.lower,
                resistance: bb.upper,
                source: LevelSource::Bollinger,
            };
        }
        let (support, resistance) = series
            .full_extremes()
            .unwrap_or((snapshot.close, snapshot.close));
        KeyLevels {
            support,
            resistance,
            source: LevelSource::FullRange,
        }
    }
}

fn signal(source: SignalSource, vote: f64, reason: String) -> TrendSignal {
    TrendSignal {
        source,
        vote,
        reason,
    }
}

fn volume_confirms(volume: &VolumeAnalysis) -> bool {
    volume.is_spike || volume.trend == VolumeTrend::Increasing
}

/// Vote for a close outside the bands; `None` inside them
fn bollinger_vote(
    position: BandPosition,
    policy: BollingerPolicy,
    volume_confirmed: bool,
    weight: f64,
) -> Option<(f64, &'static str)> {
    let continuation = match policy {
        BollingerPolicy::MeanReversion => false,
        BollingerPolicy::Breakout => true,
        BollingerPolicy::VolumeConfirmed => volume_confirmed,
    };
    match (position, continuation) {
        (BandPosition::Within, _) => None,
        (BandPosition::AboveUpper, true) => Some((weight, "breakout above upper band")),
        (BandPosition::AboveUpper, false) => Some((-weight, "stretched above upper band")),
        (BandPosition::BelowLower, true) => Some((-weight, "breakdown below lower band")),
        (BandPosition::BelowLower, false) => Some((weight, "stretched below lower band")),
    }
}
