//! Simple and exponential moving averages

use super::{IndicatorResult, Interpretation, Result, require_len, validate_input};

/// Simple moving average over every window of `period` values.
///
/// Output is aligned to each window's last element; `current` is the last
/// average. Interpretation compares the latest input value with it.
pub fn sma(values: &[f64], period: usize) -> Result<IndicatorResult> {
    let averages = sma_values(values, period)?;
    let interpretation = price_vs_average(values, &averages);
    Ok(IndicatorResult::from_values(averages, interpretation))
}

/// Exponential moving average seeded with the SMA of the first `period` values.
///
/// Smoothing factor `α = 2 / (period + 1)`.
pub fn ema(values: &[f64], period: usize) -> Result<IndicatorResult> {
    let averages = ema_values(values, period)?;
    let interpretation = price_vs_average(values, &averages);
    Ok(IndicatorResult::from_values(averages, interpretation))
}

pub(crate) fn sma_values(values: &[f64], period: usize) -> Result<Vec<f64>> {
    validate_input("SMA", values.len(), period)?;
    require_len("SMA", values.len(), period)?;

    Ok(values
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect())
}

pub(crate) fn ema_values(values: &[f64], period: usize) -> Result<Vec<f64>> {
    validate_input("EMA", values.len(), period)?;
    require_len("EMA", values.len(), period)?;

    if period == 1 {
        return Ok(values.to_vec());
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = (value - prev) * alpha + prev;
        out.push(prev);
    }

    Ok(out)
}

fn price_vs_average(values: &[f64], averages: &[f64]) -> Interpretation {
    match (values.last(), averages.last()) {
        (Some(price), Some(avg)) if price > avg => Interpretation::Bullish,
        (Some(price), Some(avg)) if price < avg => Interpretation::Bearish,
        _ => Interpretation::Neutral,
    }
}
