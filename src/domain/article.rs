use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Language;

/// An article as it arrives from the newsletter builder, before translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArticle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
}

impl SourceArticle {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            url: url.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description worth translating, if any. Blank descriptions count as missing.
    pub fn usable_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedArticle {
    pub id: String,
    pub title: BTreeMap<Language, String>,
    pub summary: BTreeMap<Language, String>,
}

/// Merges one article translation into a language bucket. An entry that
/// already carries `id` is overwritten for `language`; no duplicate is added.
pub fn merge_translated_article(
    bucket: &mut Vec<TranslatedArticle>,
    id: &str,
    language: Language,
    title: String,
    summary: String,
) {
    match bucket.iter_mut().find(|entry| entry.id == id) {
        Some(entry) => {
            entry.title.insert(language, title);
            entry.summary.insert(language, summary);
        }
        None => {
            let mut entry = TranslatedArticle {
                id: id.to_string(),
                ..Default::default()
            };
            entry.title.insert(language, title);
            entry.summary.insert(language, summary);
            bucket.push(entry);
        }
    }
}
