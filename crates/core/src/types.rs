//! Core types used throughout feedcache

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Primitive value of a flattened record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Infer a typed value from feed text without losing information
    ///
    /// Text only becomes a number or boolean when rendering the typed value
    /// reproduces the original text exactly, so `"00042"` or `"12.50"` stay text.
    pub fn infer(text: &str) -> Self {
        match text {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }

        if let Ok(value) = text.parse::<i64>() {
            if value.to_string() == text {
                return Self::Integer(value);
            }
        }

        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() && value.to_string() == text {
                return Self::Float(value);
            }
        }

        Self::Text(text.to_string())
    }

    /// Whether the value renders as an empty string
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

/// A single flattened catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique within its snapshot
    pub id: String,
    /// Name of the feed element the record was built from
    pub entry: String,
    /// Flattened scalar fields in document order
    pub fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create a record from its parts
    pub fn new<S: Into<String>, E: Into<String>>(
        id: S,
        entry: E,
        fields: IndexMap<String, FieldValue>,
    ) -> Self {
        Self {
            id: id.into(),
            entry: entry.into(),
            fields,
        }
    }

    /// First non-empty value among the given field names
    pub fn first_present<'a, I>(&self, names: I) -> Option<&FieldValue>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter_map(|name| self.fields.get(name))
            .find(|value| !value.is_empty())
    }

    /// Field values joined with single spaces, lowercased for matching
    fn haystack(&self) -> String {
        let joined = self
            .fields
            .values()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        joined.to_lowercase()
    }
}

/// Immutable generation of loaded records
///
/// A snapshot is built once and never mutated; refreshing the cache replaces
/// it as a whole.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<Record>,
    haystacks: Vec<String>,
    index: HashMap<String, usize>,
    total_entries: usize,
    source: String,
    created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot from records whose ids are already unique
    pub fn new<S: Into<String>>(records: Vec<Record>, total_entries: usize, source: S) -> Self {
        let haystacks = records.iter().map(Record::haystack).collect();
        let index = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id.clone(), position))
            .collect();

        Self {
            records,
            haystacks,
            index,
            total_entries,
            source: source.into(),
            created_at: Utc::now(),
        }
    }

    /// Records in feed order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries found in the feed before the ingest cap was applied
    pub fn total_entries(&self) -> usize {
        self.total_entries
    }

    /// Whether the ingest cap dropped entries
    pub fn is_truncated(&self) -> bool {
        self.total_entries > self.records.len()
    }

    /// Credential-free rendering of the feed address
    pub fn source(&self) -> &str {
        &self.source
    }

    /// When the snapshot was built
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Records whose field values contain `needle`, in feed order
    ///
    /// `needle` must already be lowercased.
    pub fn matching<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .zip(self.haystacks.iter())
            .filter(move |(_, haystack)| haystack.contains(needle))
            .map(|(record, _)| record)
    }
}
