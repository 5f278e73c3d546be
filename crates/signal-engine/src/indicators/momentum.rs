//! Momentum indicators: RSI and MACD

use serde::{Deserialize, Serialize};

use super::moving_average::ema_values;
use super::{IndicatorError, Interpretation, Result, require_len, validate_input};

/// RSI at or below this level reads oversold.
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI at or above this level reads overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Wilder RSI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    pub current: f64,
    pub values: Vec<f64>,
    pub interpretation: Interpretation,
    pub period: usize,
}

/// Relative Strength Index with Wilder smoothing.
///
/// RSI = 100 - 100 / (1 + RS), RS = average gain / average loss.
/// The first `period` price differences seed the averages; each later
/// difference updates them as `(avg * (period - 1) + x) / period`.
/// An average loss of zero yields 100. Needs `period + 1` prices.
pub fn rsi(values: &[f64], period: usize) -> Result<RsiResult> {
    validate_input("RSI", values.len(), period)?;
    require_len("RSI", values.len(), period + 1)?;

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let mut avg_gain = deltas[..period].iter().map(|d| d.max(0.0)).sum::<f64>() / p;
    let mut avg_loss = deltas[..period].iter().map(|d| (-d).max(0.0)).sum::<f64>() / p;

    let mut out = Vec::with_capacity(deltas.len() - period + 1);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for &delta in &deltas[period..] {
        avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    let current = out.last().copied().unwrap_or(50.0);
    Ok(RsiResult {
        current,
        values: out,
        interpretation: interpret_rsi(current),
        period,
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Map an RSI reading onto its zone
pub fn interpret_rsi(value: f64) -> Interpretation {
    if value <= RSI_OVERSOLD {
        Interpretation::Oversold
    } else if value >= RSI_OVERBOUGHT {
        Interpretation::Overbought
    } else {
        Interpretation::Neutral
    }
}

/// Direction of the last MACD/signal cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

/// MACD output: latest values plus the aligned lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub crossover: Crossover,
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram_line: Vec<f64>,
}

/// Moving Average Convergence Divergence.
///
/// `macd = EMA(fast) - EMA(slow)` over their common tail,
/// `signal = EMA(macd, signal)`, `histogram = macd - signal`.
/// Needs `slow + signal - 1` prices.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Result<MacdResult> {
    validate_input("MACD", values.len(), fast)?;
    validate_input("MACD", values.len(), slow)?;
    validate_input("MACD", values.len(), signal)?;
    if fast >= slow {
        return Err(IndicatorError::InvalidParameter(format!(
            "MACD fast period ({fast}) must be shorter than slow period ({slow})"
        )));
    }
    require_len("MACD", values.len(), slow + signal - 1)?;

    let fast_ema = ema_values(values, fast)?;
    let slow_ema = ema_values(values, slow)?;

    // fast_ema starts `slow - fast` bars earlier than slow_ema
    let offset = fast_ema.len() - slow_ema.len();
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + offset] - slow_value)
        .collect();

    let signal_line = ema_values(&macd_line, signal)?;
    let offset = macd_line.len() - signal_line.len();
    let histogram_line: Vec<f64> = signal_line
        .iter()
        .enumerate()
        .map(|(i, signal_value)| macd_line[i + offset] - signal_value)
        .collect();

    let crossover = detect_crossover(&histogram_line);

    Ok(MacdResult {
        macd: macd_line.last().copied().unwrap_or_default(),
        signal: signal_line.last().copied().unwrap_or_default(),
        histogram: histogram_line.last().copied().unwrap_or_default(),
        crossover,
        macd_line,
        signal_line,
        histogram_line,
    })
}

/// Sign flip of the histogram between its last two points.
///
/// `<= 0` to `> 0` is bullish, `>= 0` to `< 0` is bearish.
pub fn detect_crossover(histogram: &[f64]) -> Crossover {
    match histogram {
        [.., prev, curr] if *prev <= 0.0 && *curr > 0.0 => Crossover::Bullish,
        [.., prev, curr] if *prev >= 0.0 && *curr < 0.0 => Crossover::Bearish,
        _ => Crossover::None,
    }
}
