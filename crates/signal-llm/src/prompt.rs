//! Bilingual prompt templates rendered from engine results
//!
//! Templates use MiniJinja syntax. Every context value is the serde form of an
//! engine type, so field names follow their serialization (`current_price`,
//! `confluence.direction`, `totalScore`, ...). A `price` filter formats numbers
//! with two decimals.

use minijinja::value::Value;
use minijinja::{Environment, context};
use serde::Serialize;
use signal_engine::{BpjsScore, ConfluenceResult};
use std::collections::HashMap;
use tracing::debug;

use crate::error::PromptError;
use crate::language::Language;

pub type Result<T> = std::result::Result<T, PromptError>;

const CONFLUENCE_EN: &str = "\
You are an equity analyst. Write a short trading commentary for {{ symbol }} ({{ mode }} mode).
Current price: {{ current_price | price }}
Confluence: {{ confluence.direction }}, strength {{ confluence.strength | price }}% ({{ confluence.agreement }})
Timeframes:
{% for tf in timeframes %}- {{ tf.interval }}: {{ tf.trend }}, strength {{ tf.strength | price }}, support {{ tf.key_levels.support | price }}, resistance {{ tf.key_levels.resistance | price }}
{% endfor %}Recommendation: {{ recommendation.action }}, confidence {{ recommendation.confidence | price }}%
Entry zone: {{ recommendation.entry_zone.min | price }} - {{ recommendation.entry_zone.max | price }}
{% if recommendation.stop_loss is not none %}Stop loss: {{ recommendation.stop_loss | price }}
{% endif %}{% if recommendation.take_profit %}Take profit: {% for tp in recommendation.take_profit %}{{ tp | price }}{% if not loop.last %}, {% endif %}{% endfor %}
{% endif %}Explain the setup in plain language and name the main risk.";

const CONFLUENCE_ID: &str = "\
Anda adalah analis saham. Tulis komentar trading singkat untuk {{ symbol }} (mode {{ mode }}).
Harga saat ini: {{ current_price | price }}
Konfluensi: {{ confluence.direction }}, kekuatan {{ confluence.strength | price }}% ({{ confluence.agreement }})
Timeframe:
{% for tf in timeframes %}- {{ tf.interval }}: {{ tf.trend }}, kekuatan {{ tf.strength | price }}, support {{ tf.key_levels.support | price }}, resistance {{ tf.key_levels.resistance | price }}
{% endfor %}Rekomendasi: {{ recommendation.action }}, keyakinan {{ recommendation.confidence | price }}%
Area entry: {{ recommendation.entry_zone.min | price }} - {{ recommendation.entry_zone.max | price }}
{% if recommendation.stop_loss is not none %}Stop loss: {{ recommendation.stop_loss | price }}
{% endif %}{% if recommendation.take_profit %}Take profit: {% for tp in recommendation.take_profit %}{{ tp | price }}{% if not loop.last %}, {% endif %}{% endfor %}
{% endif %}Jelaskan setup ini dengan bahasa sederhana dan sebutkan risiko utamanya.";

const SCREENING_EN: &str = "\
You are an equity analyst. These symbols were screened for a buy-in-the-morning, sell-in-the-afternoon trade.
{% for s in scores %}{{ loop.index }}. {{ s.symbol }}: score {{ s.totalScore | price }}, volume ratio {{ s.volumeRatio | price }}
{% else %}No candidates passed the screen.
{% endfor %}Comment briefly on the strongest candidates and what could invalidate them.";

const SCREENING_ID: &str = "\
Anda adalah analis saham. Saham berikut disaring untuk strategi beli pagi jual sore (BPJS).
{% for s in scores %}{{ loop.index }}. {{ s.symbol }}: skor {{ s.totalScore | price }}, rasio volume {{ s.volumeRatio | price }}
{% else %}Tidak ada kandidat yang lolos penyaringan.
{% endfor %}Beri komentar singkat tentang kandidat terkuat dan apa yang dapat membatalkannya.";

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.add_filter("price", |value: f64| format!("{value:.2}"));
    env
}

/// One named template with a variant per language
pub struct CommentaryTemplate {
    name: String,
    templates: HashMap<Language, String>,
}

impl CommentaryTemplate {
    /// Create with English and Indonesian variants; both must parse
    pub fn bilingual(
        name: impl Into<String>,
        english: impl Into<String>,
        indonesian: impl Into<String>,
    ) -> Result<Self> {
        let template = Self {
            name: name.into(),
            templates: HashMap::from([
                (Language::English, english.into()),
                (Language::Indonesian, indonesian.into()),
            ]),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        let env = environment();
        for (lang, source) in &self.templates {
            env.template_from_str(source)
                .map_err(|e| PromptError::TemplateParseFailed {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                    detail: e.to_string(),
                })?;
        }
        Ok(())
    }

    pub fn render<S: Serialize>(&self, lang: Language, ctx: S) -> Result<String> {
        let source = self
            .templates
            .get(&lang)
            .ok_or_else(|| PromptError::TemplateNotFound {
                name: self.name.clone(),
                language: lang.code().to_string(),
            })?;

        environment()
            .render_str(source, Value::from_serialize(ctx))
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }
}

impl std::fmt::Debug for CommentaryTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentaryTemplate")
            .field("name", &self.name)
            .field("languages", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Prompts for the commentary generator
///
/// # Examples
///
/// ```ignore
/// use signal_llm::{CommentaryPrompt, Language};
///
/// let prompts = CommentaryPrompt::new()?;
/// let text = prompts.confluence(&result, Language::Indonesian)?;
/// let reply = generator.generate(&text).await?;
/// ```
#[derive(Debug)]
pub struct CommentaryPrompt {
    confluence: CommentaryTemplate,
    screening: CommentaryTemplate,
}

impl CommentaryPrompt {
    /// Built-in templates
    pub fn new() -> Result<Self> {
        Ok(Self::with_templates(
            CommentaryTemplate::bilingual("confluence", CONFLUENCE_EN, CONFLUENCE_ID)?,
            CommentaryTemplate::bilingual("screening", SCREENING_EN, SCREENING_ID)?,
        ))
    }

    pub fn with_templates(confluence: CommentaryTemplate, screening: CommentaryTemplate) -> Self {
        Self {
            confluence,
            screening,
        }
    }

    /// Prompt asking for commentary on one multi-timeframe analysis
    pub fn confluence(&self, result: &ConfluenceResult, lang: Language) -> Result<String> {
        debug!(symbol = %result.symbol, lang = lang.code(), "rendering confluence prompt");
        self.confluence.render(lang, result)
    }

    /// Prompt asking for commentary on a screening ranking
    pub fn screening(&self, scores: &[BpjsScore], lang: Language) -> Result<String> {
        debug!(count = scores.len(), lang = lang.code(), "rendering screening prompt");
        self.screening.render(lang, context! { scores => scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_engine::trend::LevelSource;
    use signal_engine::{
        Action, Confluence, EntryZone, Interval, KeyLevels, Recommendation, ScoreBreakdown,
        TimeframeAnalysis, TradingMode, Trend,
    };

    fn timeframe(interval: Interval, trend: Trend, strength: f64) -> TimeframeAnalysis {
        TimeframeAnalysis {
            interval,
            trend,
            strength,
            key_levels: KeyLevels {
                support: 95.0,
                resistance: 110.0,
                source: LevelSource::Lookback,
            },
            bias: strength - 50.0,
            atr: Some(2.0),
            close: 100.0,
            signals: Vec::new(),
        }
    }

    fn bullish_result() -> ConfluenceResult {
        ConfluenceResult {
            symbol: "BBCA".to_string(),
            mode: TradingMode::Swing,
            current_price: 100.0,
            timeframes: vec![
                timeframe(Interval::OneHour, Trend::Neutral, 45.0),
                timeframe(Interval::OneDay, Trend::Bullish, 72.5),
            ],
            confluence: Confluence {
                direction: Trend::Bullish,
                strength: 85.0,
                agreement: "3/4 timeframes aligned".to_string(),
            },
            recommendation: Recommendation {
                action: Action::Buy,
                confidence: 85.0,
                entry_zone: EntryZone {
                    min: 99.7,
                    max: 100.3,
                },
                stop_loss: Some(96.0),
                take_profit: vec![104.0, 108.0, 112.0],
            },
        }
    }

    fn score(symbol: &str, total: f64, volume_ratio: f64) -> BpjsScore {
        BpjsScore {
            symbol: symbol.to_string(),
            total_score: total,
            breakdown: ScoreBreakdown::default(),
            volume_ratio,
        }
    }

    #[test]
    fn test_confluence_prompt_english() {
        let prompts = CommentaryPrompt::new().unwrap();
        let text = prompts.confluence(&bullish_result(), Language::English).unwrap();

        assert!(text.contains("for BBCA (swing mode)"));
        assert!(text.contains("Current price: 100.00"));
        assert!(text.contains("Confluence: BULLISH, strength 85.00% (3/4 timeframes aligned)"));
        assert!(text.contains("- 1h: NEUTRAL, strength 45.00"));
        assert!(text.contains("- 1d: BULLISH, strength 72.50, support 95.00, resistance 110.00"));
        assert!(text.contains("Recommendation: BUY, confidence 85.00%"));
        assert!(text.contains("Entry zone: 99.70 - 100.30"));
        assert!(text.contains("Stop loss: 96.00"));
        assert!(text.contains("Take profit: 104.00, 108.00, 112.00"));
    }

    #[test]
    fn test_confluence_prompt_indonesian() {
        let prompts = CommentaryPrompt::new().unwrap();
        let text = prompts
            .confluence(&bullish_result(), Language::Indonesian)
            .unwrap();

        assert!(text.contains("(mode swing)"));
        assert!(text.contains("Harga saat ini: 100.00"));
        assert!(text.contains("Rekomendasi: BUY, keyakinan 85.00%"));
        assert!(text.contains("Take profit: 104.00, 108.00, 112.00"));
    }

    #[test]
    fn test_neutral_result_omits_stop_and_targets() {
        let mut result = bullish_result();
        result.confluence.direction = Trend::Neutral;
        result.confluence.strength = 0.0;
        result.recommendation.action = Action::Wait;
        result.recommendation.confidence = 0.0;
        result.recommendation.stop_loss = None;
        result.recommendation.take_profit.clear();

        let text = CommentaryPrompt::new()
            .unwrap()
            .confluence(&result, Language::English)
            .unwrap();

        assert!(text.contains("Recommendation: WAIT"));
        assert!(!text.contains("Stop loss"));
        assert!(!text.contains("Take profit"));
    }

    #[test]
    fn test_screening_prompt() {
        let prompts = CommentaryPrompt::new().unwrap();
        let scores = vec![score("BBCA", 82.5, 2.1), score("TLKM", 61.0, 1.25)];

        let en = prompts.screening(&scores, Language::English).unwrap();
        assert!(en.contains("1. BBCA: score 82.50, volume ratio 2.10"));
        assert!(en.contains("2. TLKM: score 61.00, volume ratio 1.25"));

        let id = prompts.screening(&scores, Language::Indonesian).unwrap();
        assert!(id.contains("1. BBCA: skor 82.50, rasio volume 2.10"));
    }

    #[test]
    fn test_empty_screening_prompt() {
        let prompts = CommentaryPrompt::new().unwrap();
        let en = prompts.screening(&[], Language::English).unwrap();
        assert!(en.contains("No candidates passed the screen."));
        let id = prompts.screening(&[], Language::Indonesian).unwrap();
        assert!(id.contains("Tidak ada kandidat"));
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let err = CommentaryTemplate::bilingual("broken", "{% if %}", "ok").unwrap_err();
        assert!(matches!(
            err,
            PromptError::TemplateParseFailed { ref name, ref language, .. }
                if name == "broken" && language == "en"
        ));
    }

    #[test]
    fn test_custom_templates() {
        let prompts = CommentaryPrompt::with_templates(
            CommentaryTemplate::bilingual(
                "short",
                "{{ symbol }} {{ recommendation.action }}",
                "{{ symbol }} aksi {{ recommendation.action }}",
            )
            .unwrap(),
            CommentaryTemplate::bilingual("list", "{{ scores | length }}", "{{ scores | length }}")
                .unwrap(),
        );
        assert_eq!(
            prompts.confluence(&bullish_result(), Language::English).unwrap(),
            "BBCA BUY"
        );
        assert_eq!(
            prompts.confluence(&bullish_result(), Language::Indonesian).unwrap(),
            "BBCA aksi BUY"
        );
        assert_eq!(
            prompts.screening(&[score("A", 1.0, 1.0)], Language::English).unwrap(),
            "1"
        );
    }
}
