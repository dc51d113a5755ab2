use serde::{Deserialize, Serialize};

//
// ─── WORD ──────────────────────────────────────────────────────────────────────
//

/// A single English–Hebrew vocabulary pair with an English description.
///
/// Words have no key of their own; they are identified by their position in
/// the catalog they came from. Fields may be empty when the source row was
/// malformed; they are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordRecord {
    #[serde(rename = "word_english", default)]
    pub english: String,
    #[serde(rename = "word_hebrew", default)]
    pub hebrew: String,
    #[serde(rename = "description_en", default)]
    pub description: String,
}

impl WordRecord {
    #[must_use]
    pub fn new(
        english: impl Into<String>,
        hebrew: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            english: english.into(),
            hebrew: hebrew.into(),
            description: description.into(),
        }
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// The operator's self-assessment for one word of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub word: WordRecord,
    pub known: bool,
}

impl Answer {
    #[must_use]
    pub fn new(word: WordRecord, known: bool) -> Self {
        Self { word, known }
    }
}
