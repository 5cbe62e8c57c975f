//! queryscope-core: a context-aware autocomplete engine for structured
//! query languages (SQL, PPL, DQL).
//!
//! Given partial, often syntactically invalid query text and a cursor
//! position, the engine determines which grammar constructs are reachable
//! at the cursor and produces a ranked list of completions: keywords,
//! index/table names, column names, operators, aggregate functions and
//! literal values.
//!
//! The pipeline runs in five stages: an error-tolerant parser adapter
//! ([`parser::parse`]), cursor-context extraction ([`cursor::locate`]),
//! rule-to-suggestion mapping ([`mapper::process_visited_rules`]),
//! schema/value enrichment ([`enrich::enrich_autocomplete_result`]) and
//! ranking/formatting ([`format::format_suggestions`]). The
//! [`SuggestionEngine`] ties them together behind one async entry point
//! that never fails.

pub mod cursor;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod format;
pub mod languages;
pub mod lexer;
pub mod mapper;
pub mod parser;
pub mod rules;
pub mod types;

// Re-export the main entry points
pub use engine::{SuggestionEngine, SuggestionRequest, SuggestionServices};
pub use enrich::{enrich_autocomplete_result, ValueFetcher};
pub use format::format_suggestions;
pub use mapper::process_visited_rules;
pub use parser::{parse, EntryRule, ParseResult, ParseTree};

// Re-export types explicitly
pub use error::{ParseError, ParseErrorKind, Position, ValueFetchError};
pub use lexer::{TokenInfo, TokenType};
pub use rules::{CandidateSet, RuleContext, RuleId, VisitedRules};
pub use types::{
    AutocompleteResult, ColumnValuePredicate, Cursor, IndexPatternSchema, KeywordSuggestion,
    Language, QuerySuggestion, SchemaField, Span, SuggestionKind,
};
