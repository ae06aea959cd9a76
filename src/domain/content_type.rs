use serde::{Deserialize, Serialize};

/// What kind of text is being translated. Backends may tune prompts per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Title,
    Description,
    Content,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Title => "title",
            ContentType::Description => "description",
            ContentType::Content => "content",
        }
    }
}
