use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the translation backend is able to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Pt,
    Fr,
    Ar,
    Zh,
    Ja,
}

impl Language {
    pub const SUPPORTED: [Language; 7] = [
        Language::En,
        Language::Es,
        Language::Pt,
        Language::Fr,
        Language::Ar,
        Language::Zh,
        Language::Ja,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::Fr => "fr",
            Language::Ar => "ar",
            Language::Zh => "zh",
            Language::Ja => "ja",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "english",
            Language::Es => "spanish",
            Language::Pt => "portuguese",
            Language::Fr => "french",
            Language::Ar => "arabic",
            Language::Zh => "chinese",
            Language::Ja => "japanese",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Language::SUPPORTED
            .into_iter()
            .find(|lang| lang.code() == normalized)
            .ok_or_else(|| format!("Unsupported language: {}", s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
