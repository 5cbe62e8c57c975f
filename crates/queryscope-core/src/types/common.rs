//! Shared primitive types: spans, cursors, languages, schema snapshots.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Byte range into the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Byte offset from start of the query (inclusive)
    pub start: usize,
    /// Byte offset from start of the query (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns true when `offset` falls inside the span (end-exclusive).
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Editor cursor position.
///
/// Both fields are 1-based; column `n` sits before the `n`-th character of
/// the line, so the cursor at the very end of a line has column
/// `line length + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// Query language served by the engine.
///
/// Each language carries its own token dictionary, ignored-token set and
/// rule-mapping table; nothing is shared across languages at runtime beyond
/// the lexical token space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Language {
    /// SQL-style statements (`SELECT ... FROM ... WHERE ...`).
    #[default]
    Sql,
    /// Piped Processing Language (`source = idx | where ... | stats ...`).
    Ppl,
    /// Dashboards Query Language filter expressions (`field : value and ...`).
    Dql,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Ppl => "ppl",
            Self::Dql => "dql",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "ppl" => Ok(Self::Ppl),
            "dql" | "kuery" => Ok(Self::Dql),
            other => Err(format!("unknown query language: {other}")),
        }
    }
}

/// A single field of an index pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Read-only schema snapshot supplied by the caller.
///
/// The engine never fetches this itself; it is handed in per request and the
/// engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatternSchema {
    /// Index pattern title, e.g. `logs-*` or `test-index`.
    pub title: String,
    pub fields: Vec<SchemaField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::new(3, 7);
        assert!(!span.contains(2));
        assert!(span.contains(3));
        assert!(span.contains(6));
        assert!(!span.contains(7));
    }

    #[test]
    fn test_language_round_trip() {
        for language in [Language::Sql, Language::Ppl, Language::Dql] {
            assert_eq!(language.as_str().parse::<Language>(), Ok(language));
        }
    }

    #[test]
    fn test_language_accepts_kuery_alias() {
        assert_eq!("kuery".parse::<Language>(), Ok(Language::Dql));
    }

    #[test]
    fn test_language_rejects_unknown() {
        assert!("esql".parse::<Language>().is_err());
    }

    #[test]
    fn test_schema_deserializes_type_field() {
        let json = r#"{"title":"test-index","fields":[{"name":"field1","type":"string"}]}"#;
        let schema: IndexPatternSchema = serde_json::from_str(json).expect("valid schema");
        assert_eq!(schema.title, "test-index");
        assert_eq!(schema.fields[0].field_type, "string");
    }
}
