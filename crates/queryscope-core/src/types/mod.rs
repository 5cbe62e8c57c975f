//! Types for the query autocomplete API.
//!
//! This module defines the data model shared by every stage of the suggestion
//! pipeline: cursor positions and spans, the caller-supplied schema snapshot,
//! and the suggestion output consumed by editor completion widgets.

mod common;
mod suggestion;

pub use common::{Cursor, IndexPatternSchema, Language, SchemaField, Span};
pub use suggestion::{
    AutocompleteResult, ColumnValuePredicate, KeywordSuggestion, QuerySuggestion, SuggestionKind,
};
