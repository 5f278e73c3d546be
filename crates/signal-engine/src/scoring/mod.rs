//! BPJS screening score
//!
//! A candidate's score is the sum of independently capped category points.
//! Each symbol is scored on its own, so a universe is scored in parallel.

pub mod categories;
pub mod sentiment;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::config::ScreeningParams;
use crate::error::Result;
use crate::indicators::IndicatorSnapshot;

pub use categories::{CategoryWeights, ScoreCategory};
pub use sentiment::score_headlines;

/// Optional fundamental and news inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub market_cap: Option<f64>,
    /// 0..=5; derived from `headlines` when absent
    pub sentiment: Option<f64>,
    pub headlines: Vec<String>,
}

impl Fundamentals {
    /// Explicit sentiment, or the keyword score of the headlines
    pub fn resolved_sentiment(&self) -> Option<f64> {
        self.sentiment.or_else(|| score_headlines(&self.headlines))
    }
}

/// One symbol to screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCandidate {
    pub snapshot: IndicatorSnapshot,
    pub fundamentals: Fundamentals,
}

/// Points per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub rsi_position: f64,
    pub macd_signal: f64,
    pub volume_ratio: f64,
    pub gap: f64,
    pub sentiment: f64,
    pub trend: f64,
    pub valuation: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, category: ScoreCategory) -> f64 {
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

    fn set(&mut self, category: ScoreCategory, points: f64) {
        let slot = match category {
            ScoreCategory::RsiPosition => &mut self.rsi_position,
            ScoreCategory::MacdSignal => &mut self.macd_signal,
            ScoreCategory::VolumeRatio => &mut self.volume_ratio,
            ScoreCategory::Gap => &mut self.gap,
            ScoreCategory::Sentiment => &mut self.sentiment,
            ScoreCategory::Trend => &mut self.trend,
            ScoreCategory::Valuation => &mut self.valuation,
        };
        *slot = points;
    }

    pub fn total(&self) -> f64 {
        ScoreCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpjsScore {
    pub symbol: String,
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    /// Latest volume ratio, used to break ties
    pub volume_ratio: f64,
}

/// Scores and ranks screening candidates
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: CategoryWeights,
    screening: ScreeningParams,
}

impl ScoringEngine {
    /// Fails when the weights do not sum to 100
    pub fn new(weights: CategoryWeights, screening: ScreeningParams) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights, screening })
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }

    pub fn score(&self, candidate: &ScreeningCandidate) -> BpjsScore {
        let snapshot = &candidate.snapshot;
        let fundamentals = Fundamentals {
            sentiment: candidate.fundamentals.resolved_sentiment(),
            ..candidate.fundamentals.clone()
        };

        let mut breakdown = ScoreBreakdown::default();
        for category in ScoreCategory::ALL {
            let points = self.weights.weight(category) * category.fraction(snapshot, &fundamentals);
            breakdown.set(category, points);
        }

        BpjsScore {
            symbol: snapshot.symbol.clone(),
            total_score: breakdown.total(),
            breakdown,
            volume_ratio: snapshot.volume.as_ref().map_or(0.0, |v| v.ratio),
        }
    }

    /// Score every candidate, drop those under the minimum, sort best first
    /// and keep at most `max_results`
    pub fn rank(&self, candidates: &[ScreeningCandidate]) -> Vec<BpjsScore> {
        let mut scores: Vec<BpjsScore> = candidates
            .par_iter()
            .map(|c| self.score(c))
            .filter(|s| s.total_score >= self.screening.min_score)
            .collect();

        debug!(
            candidates = candidates.len(),
            passed = scores.len(),
            min_score = self.screening.min_score,
            "scored candidates"
        );

        scores.sort_by(compare_scores);
        scores.truncate(self.screening.max_results);

        info!(returned = scores.len(), "ranked candidates");
        scores
    }
}

fn compare_scores(a: &BpjsScore, b: &BpjsScore) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.volume_ratio.total_cmp(&a.volume_ratio))
        .then_with(|| a.symbol.cmp(&b.symbol))
}
