//! Commentary languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PromptError;

/// Language a prompt is written in
///
/// # Examples
///
/// ```
/// use signal_llm::Language;
///
/// let lang: Language = "bahasa".parse().unwrap();
/// assert_eq!(lang, Language::Indonesian);
/// assert_eq!(lang.code(), "id");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Indonesian,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Indonesian => "id",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Indonesian => "Indonesian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "id" | "indonesian" | "bahasa" => Ok(Language::Indonesian),
            other => Err(PromptError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_names() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("ID".parse::<Language>().unwrap(), Language::Indonesian);
        assert_eq!(" indonesian ".parse::<Language>().unwrap(), Language::Indonesian);
        assert!(matches!(
            "zh".parse::<Language>(),
            Err(PromptError::UnsupportedLanguage(code)) if code == "zh"
        ));
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::Indonesian.to_string(), "Indonesian");
        assert_eq!(Language::Indonesian.code(), "id");
    }
}
