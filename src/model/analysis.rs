use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub term: String,
    pub meaning: String,
    pub pinyin: String,
}

/// Shape the model is asked to reply with. Every field is required; a reply
/// missing any of them fails to deserialize.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AnalysisPayload {
    pub japanese: String,
    pub pinyin: String,
    pub glossary: Vec<GlossaryEntry>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub original: String,
    pub japanese: String,
    pub pinyin: String,
    pub glossary: Vec<GlossaryEntry>,
}

impl AnalysisResult {
    pub fn from_payload(original: &str, payload: AnalysisPayload) -> Self {
        AnalysisResult {
            original: original.to_string(),
            japanese: payload.japanese,
            pinyin: payload.pinyin,
            glossary: payload.glossary,
        }
    }
}
