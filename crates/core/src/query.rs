//! Query results and their rendering from records

use crate::types::Record;
use serde::{Deserialize, Serialize};

/// Separator between `key: value` pairs in a snippet
pub const SNIPPET_SEPARATOR: &str = " | ";

/// Marker appended to truncated text
pub const ELLIPSIS: char = '…';

/// One search match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl SearchHit {
    /// Build a hit for a matching record
    pub fn from_record(record: &Record, title_fields: &[String], snippet_length: usize) -> Self {
        Self {
            id: record.id.clone(),
            title: render_title(record, title_fields),
            snippet: render_snippet(record, snippet_length),
        }
    }
}

/// Matches for a search, in snapshot order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Where a fetched record came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub source: String,
}

/// Full textual rendering of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedRecord {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}

impl FetchedRecord {
    /// Render a record with its snapshot source
    pub fn from_record(record: &Record, source: &str) -> Self {
        Self {
            id: record.id.clone(),
            text: render_text(record),
            metadata: Some(RecordMetadata {
                source: source.to_string(),
            }),
        }
    }
}

/// Result of an id lookup
///
/// A missing id is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(FetchedRecord),
    NotFound { id: String },
}

impl FetchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<FetchedRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound { .. } => None,
        }
    }
}

/// Title of a record: first configured name-like field, else first value
pub fn render_title(record: &Record, title_fields: &[String]) -> Option<String> {
    record
        .first_present(title_fields)
        .or_else(|| record.fields.values().find(|value| !value.is_empty()))
        .map(|value| value.to_string())
}

/// `key: value` pairs joined by [`SNIPPET_SEPARATOR`], cut to `max_chars`
pub fn render_snippet(record: &Record, max_chars: usize) -> Option<String> {
    if record.fields.is_empty() {
        return None;
    }

    let joined = record
        .fields
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(SNIPPET_SEPARATOR);

    Some(truncate_chars(&joined, max_chars))
}

/// One `key: value` line per field in document order
pub fn render_text(record: &Record) -> String {
    record
        .fields
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max_chars` characters, appending [`ELLIPSIS`] when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push(ELLIPSIS);
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::infer(v)))
            .collect();
        Record::new("42", "product", fields)
    }

    fn titles() -> Vec<String> {
        vec!["title".to_string(), "name".to_string()]
    }

    #[test]
    fn test_title_prefers_configured_fields() {
        let rec = record(&[("sku", "A1"), ("name", "Rioja Reserva")]);
        assert_eq!(render_title(&rec, &titles()).as_deref(), Some("Rioja Reserva"));
    }

    #[test]
    fn test_title_falls_back_to_first_value() {
        let rec = record(&[("note", ""), ("sku", "A1")]);
        assert_eq!(render_title(&rec, &titles()).as_deref(), Some("A1"));
        assert_eq!(render_title(&record(&[]), &titles()), None);
    }

    #[test]
    fn test_snippet_and_text() {
        let rec = record(&[("name", "Rioja Reserva"), ("price", "12.5")]);
        assert_eq!(
            render_snippet(&rec, 200).as_deref(),
            Some("name: Rioja Reserva | price: 12.5")
        );
        assert_eq!(render_text(&rec), "name: Rioja Reserva\nprice: 12.5");
        assert_eq!(render_snippet(&record(&[]), 200), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc…");
        assert_eq!(truncate_chars("Albariño tinto", 8), "Albariño…");
        assert_eq!(truncate_chars("€€€€", 2), "€€…");
    }

    #[test]
    fn test_hit_serialization_skips_absent_fields() {
        let hit = SearchHit {
            id: "7".to_string(),
            title: None,
            snippet: None,
        };
        assert_eq!(serde_json::to_string(&hit).unwrap(), r#"{"id":"7"}"#);
    }

    #[test]
    fn test_fetched_record_includes_source() {
        let rec = record(&[("name", "Rioja Reserva")]);
        let fetched = FetchedRecord::from_record(&rec, "https://example.com/feed.xml");
        let json = serde_json::to_value(&fetched).unwrap();
        assert_eq!(json["metadata"]["source"], "https://example.com/feed.xml");
        assert_eq!(json["text"], "name: Rioja Reserva");
    }
}
