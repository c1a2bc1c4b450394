//! Wire models for the translation service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How language codes are cased before they are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LangCase {
    /// `EN` -> `en`
    #[default]
    Lower,
    /// `en` -> `EN`
    Upper,
    /// Sent exactly as given
    Preserve,
}

impl LangCase {
    /// Apply this casing to a language code
    pub fn apply(&self, code: &str) -> String {
        match self {
            LangCase::Lower => code.to_lowercase(),
            LangCase::Upper => code.to_uppercase(),
            LangCase::Preserve => code.to_string(),
        }
    }
}

impl fmt::Display for LangCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LangCase::Lower => write!(f, "lower"),
            LangCase::Upper => write!(f, "upper"),
            LangCase::Preserve => write!(f, "preserve"),
        }
    }
}

impl FromStr for LangCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lower" => Ok(LangCase::Lower),
            "upper" => Ok(LangCase::Upper),
            "preserve" => Ok(LangCase::Preserve),
            other => Err(format!(
                "unknown language case '{}', expected lower, upper or preserve",
                other
            )),
        }
    }
}

/// One element of the request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One element of the response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationItem {
    #[serde(default)]
    pub translations: Vec<TranslatedText>,
}

impl TranslationItem {
    /// First translation text, or empty when the service gave none
    pub fn into_text(self) -> String {
        self.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .unwrap_or_default()
    }
}

/// A single translation of one input text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}
