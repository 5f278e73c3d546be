//! Keyword sentiment for news headlines
//!
//! Counts positive and negative keyword hits (English and Indonesian) and maps
//! the balance onto 0..=5, with 2.5 meaning an even split.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_SENTIMENT: f64 = 5.0;

const POSITIVE: &[&str] = &[
    "surge", "surges", "soar", "soars", "rally", "rallies", "gain", "gains", "jump", "jumps",
    "record", "profit", "beat", "beats", "upgrade", "growth", "dividend", "bullish", "buyback",
    "expansion", "naik", "melonjak", "menguat", "laba", "untung", "tumbuh", "rekor", "dividen",
    "positif", "meroket",
];

const NEGATIVE: &[&str] = &[
    "fall", "falls", "drop", "drops", "plunge", "plunges", "slump", "loss", "losses", "miss",
    "misses", "downgrade", "lawsuit", "fraud", "default", "bearish", "decline", "declines", "cut",
    "turun", "anjlok", "melemah", "rugi", "merosot", "negatif", "gagal", "koreksi", "tekanan",
];

static POSITIVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| keyword_regex(POSITIVE));
static NEGATIVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| keyword_regex(NEGATIVE));

fn keyword_regex(words: &[&str]) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).ok()
}

fn hits(re: &LazyLock<Option<Regex>>, text: &str) -> usize {
    re.as_ref().map_or(0, |re| re.find_iter(text).count())
}

/// Sentiment in `[0, 5]`, or `None` when no keyword matched
pub fn score_headlines<S: AsRef<str>>(headlines: &[S]) -> Option<f64> {
    let (positive, negative) = headlines.iter().fold((0usize, 0usize), |(p, n), h| {
        let text = h.as_ref();
        (p + hits(&POSITIVE_RE, text), n + hits(&NEGATIVE_RE, text))
    });

    let total = positive + negative;
    if total == 0 {
        return None;
    }
    let balance = (positive as f64 - negative as f64) / total as f64;
    Some((MAX_SENTIMENT / 2.0 * (1.0 + balance)).clamp(0.0, MAX_SENTIMENT))
}
