//! Volatility indicators: Bollinger Bands and ATR

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult, Interpretation, Result, require_len, validate_input};

/// Where the last close sits relative to the bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandPosition {
    AboveUpper,
    Within,
    BelowLower,
}

/// Bollinger Bands output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(upper - lower) / |middle|`, zero when the middle band is zero
    pub bandwidth: f64,
    pub position: BandPosition,
    pub upper_band: Vec<f64>,
    pub middle_band: Vec<f64>,
    pub lower_band: Vec<f64>,
}

/// Bollinger Bands over a trailing window.
///
/// Middle = SMA(period), bands at `k` population standard deviations.
pub fn bollinger_bands(values: &[f64], period: usize, k: f64) -> Result<BollingerBandsResult> {
    validate_input("BollingerBands", values.len(), period)?;
    if !k.is_finite() || k < 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "BollingerBands multiplier must be a non-negative number, got {k}"
        )));
    }
    require_len("BollingerBands", values.len(), period)?;

    let n = values.len() - period + 1;
    let mut upper_band = Vec::with_capacity(n);
    let mut middle_band = Vec::with_capacity(n);
    let mut lower_band = Vec::with_capacity(n);

    for window in values.windows(period) {
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let std_dev = variance.max(0.0).sqrt();

        upper_band.push(mean + k * std_dev);
        middle_band.push(mean);
        lower_band.push(mean - k * std_dev);
    }

    let upper = upper_band.last().copied().unwrap_or_default();
    let middle = middle_band.last().copied().unwrap_or_default();
    let lower = lower_band.last().copied().unwrap_or_default();

    let bandwidth = if middle == 0.0 {
        0.0
    } else {
        (upper - lower) / middle.abs()
    };

    let last_close = values.last().copied().unwrap_or(middle);
    let position = if last_close > upper {
        BandPosition::AboveUpper
    } else if last_close < lower {
        BandPosition::BelowLower
    } else {
        BandPosition::Within
    };

    Ok(BollingerBandsResult {
        upper,
        middle,
        lower,
        bandwidth,
        position,
        upper_band,
        middle_band,
        lower_band,
    })
}

/// True range of one bar against the previous close
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Average True Range with Wilder smoothing.
///
/// The first `period` true ranges are averaged to seed the series; later
/// values follow `(atr * (period - 1) + tr) / period`. Needs `period + 1` bars.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Result<IndicatorResult> {
    if highs.len() != lows.len() || lows.len() != closes.len() {
        return Err(IndicatorError::InvalidParameter(format!(
            "ATR inputs differ in length: highs {}, lows {}, closes {}",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }
    validate_input("ATR", closes.len(), period)?;
    require_len("ATR", closes.len(), period + 1)?;

    let ranges: Vec<f64> = (1..closes.len())
        .map(|i| true_range(highs[i], lows[i], closes[i - 1]))
        .collect();

    let p = period as f64;
    let mut current = ranges[..period].iter().sum::<f64>() / p;

    let mut out = Vec::with_capacity(ranges.len() - period + 1);
    out.push(current);
    for &tr in &ranges[period..] {
        current = (current * (p - 1.0) + tr) / p;
        out.push(current);
    }

    Ok(IndicatorResult::from_values(out, Interpretation::Neutral))
}
