//! Volume ratio statistics

use serde::{Deserialize, Serialize};

use super::moving_average::sma_values;
use super::{IndicatorError, Result};

/// Direction of the volume ratio over the last few bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// Volume analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    /// Latest bar volume
    pub current: f64,
    /// SMA of volume over the period ending at the latest bar
    pub average: f64,
    /// `current / average`, zero when the average is zero
    pub ratio: f64,
    pub is_spike: bool,
    pub trend: VolumeTrend,
    /// Aligned ratio sequence, oldest first
    pub ratios: Vec<f64>,
}

/// Volume against its moving average.
///
/// `is_spike` when the ratio exceeds `spike_threshold`; `trend` is the sign
/// of the change between the first and last of the final `trend_window`
/// ratios, `Stable` only when they are equal.
pub fn volume_analysis(
    volumes: &[f64],
    period: usize,
    spike_threshold: f64,
    trend_window: usize,
) -> Result<VolumeAnalysis> {
    if trend_window < 2 {
        return Err(IndicatorError::InvalidParameter(format!(
            "volume trend window must cover at least 2 bars, got {trend_window}"
        )));
    }
    if volumes.iter().any(|v| *v < 0.0) {
        return Err(IndicatorError::InvalidParameter(
            "volume cannot be negative".to_string(),
        ));
    }

    let averages = sma_values(volumes, period)?;
    let ratios: Vec<f64> = averages
        .iter()
        .enumerate()
        .map(|(i, avg)| safe_ratio(volumes[i + period - 1], *avg))
        .collect();

    let current = volumes.last().copied().unwrap_or_default();
    let average = averages.last().copied().unwrap_or_default();
    let ratio = ratios.last().copied().unwrap_or_default();

    Ok(VolumeAnalysis {
        current,
        average,
        ratio,
        is_spike: ratio > spike_threshold,
        trend: ratio_trend(&ratios, trend_window),
        ratios,
    })
}

fn safe_ratio(volume: f64, average: f64) -> f64 {
    if average == 0.0 { 0.0 } else { volume / average }
}

fn ratio_trend(ratios: &[f64], window: usize) -> VolumeTrend {
    let tail = &ratios[ratios.len().saturating_sub(window)..];
    let (Some(first), Some(last)) = (tail.first(), tail.last()) else {
        return VolumeTrend::Stable;
    };
    if tail.len() < 2 {
        return VolumeTrend::Stable;
    }

    match (last - first).partial_cmp(&0.0) {
        Some(std::cmp::Ordering::Greater) => VolumeTrend::Increasing,
        Some(std::cmp::Ordering::Less) => VolumeTrend::Decreasing,
        _ => VolumeTrend::Stable,
    }
}
