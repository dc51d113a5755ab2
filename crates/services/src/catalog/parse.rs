use vocab_core::model::WordRecord;

use crate::error::CatalogError;

const EXPECTED_COLUMNS: [&str; 3] = ["word_english", "word_hebrew", "description_en"];

/// Parse a catalog CSV with a `word_english,word_hebrew,description_en` header.
///
/// Blank lines are skipped. Short rows keep empty fields; rows that cannot be
/// decoded at all are logged and dropped.
///
/// # Errors
///
/// Returns `CatalogError::Csv` if the header row itself cannot be read.
pub fn parse_catalog(text: &str) -> Result<Vec<WordRecord>, CatalogError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h.trim() == column);
    let [english, hebrew, description] = EXPECTED_COLUMNS.map(|column| {
        let index = position(column);
        if index.is_none() {
            tracing::warn!(column, "catalog header is missing a column");
        }
        index
    });

    let mut words = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(row = row + 1, %err, "skipping unreadable catalog row");
                continue;
            }
        };
        let field = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        words.push(WordRecord::new(field(english), field(hebrew), field(description)));
    }
    tracing::debug!(rows = words.len(), "catalog parsed");
    Ok(words)
}

/// Tiny built-in word set used when no catalog source can be loaded.
#[must_use]
pub fn fallback_words() -> Vec<WordRecord> {
    vec![
        WordRecord::new("apple", "תפוח", "A round fruit"),
        WordRecord::new("book", "ספר", "A set of printed pages"),
        WordRecord::new("cat", "חתול", "A small domesticated carnivorous mammal"),
    ]
}
