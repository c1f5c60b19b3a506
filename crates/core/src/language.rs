//! Supported segmentation languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SegmentError;

/// A language the service can segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Portuguese
    Pt,
    /// English
    En,
}

impl Language {
    /// Every supported language, in a stable order.
    pub const ALL: [Language; 2] = [Language::Pt, Language::En];

    /// The two-letter code used on the wire and in config.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }

    /// Name of the pretrained model used when config does not override it.
    pub fn default_model(&self) -> &'static str {
        match self {
            Language::Pt => "pt_core_news_sm",
            Language::En => "en_core_web_sm",
        }
    }

    /// Acronyms rendered in uppercase instead of capitalized.
    pub fn default_acronyms(&self) -> &'static [&'static str] {
        match self {
            Language::Pt => &["sp", "ti", "mg", "pi", "pr"],
            Language::En => &["usa", "uk", "ai", "it", "hr"],
        }
    }

    /// Parse a language code, case-insensitively.
    pub fn parse(code: &str) -> Result<Self, SegmentError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "pt" => Ok(Language::Pt),
            "en" => Ok(Language::En),
            _ => Err(SegmentError::UnsupportedLanguage(code.to_string())),
        }
    }
}

impl FromStr for Language {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
