//! Suggestion output types and the intermediate autocomplete result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

use super::Span;

/// Category of a completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Keyword,
    Field,
    Struct,
    Function,
    Operator,
    Value,
}

/// A single ranked completion item, consumed directly by the editor's
/// completion-item protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuerySuggestion {
    /// Display text shown in the completion list.
    pub text: String,
    pub kind: SuggestionKind,
    /// Text inserted on accept when it differs from `text` (snippet syntax
    /// with `$0` tab stops is allowed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    /// Short annotation shown next to the item, e.g. `Field: keyword`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Byte range the insertion replaces (the partially-typed word, or the
    /// caller's selection).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_range: Option<Span>,
    /// Within-category rank; lower sorts first. Absent means neutral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_priority: Option<u8>,
}

impl QuerySuggestion {
    pub fn new(text: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            kind,
            insert_text: None,
            detail: None,
            insert_range: None,
            sort_priority: None,
        }
    }

    pub fn with_insert_text(mut self, insert_text: impl Into<String>) -> Self {
        self.insert_text = Some(insert_text.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_sort_priority(mut self, priority: u8) -> Self {
        self.sort_priority = Some(priority);
        self
    }
}

/// Stage of the column-value predicate walker at the cursor.
///
/// `a = ` sits at [`Value`](Self::Value), `a IN ` at [`Lparen`](Self::Lparen),
/// `a IN ('x' ` at [`EndInTerm`](Self::EndInTerm), and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnValuePredicate {
    /// Expecting the column reference that opens the predicate.
    Column,
    /// Column seen; expecting a comparison operator.
    Operator,
    /// Operator seen; expecting a literal value.
    Value,
    /// `IN` seen; expecting the opening parenthesis.
    Lparen,
    /// A value inside `IN (...)` seen; expecting `,` or `)`.
    EndInTerm,
}

/// A keyword candidate derived from the grammar follow-set at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSuggestion {
    pub text: String,
    /// Command/keyword documentation, when the language defines one.
    pub detail: Option<String>,
}

impl KeywordSuggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: None,
        }
    }
}

/// The intermediate result flowing from the rule mapper through enrichment.
///
/// Category flags are independently settable and not mutually exclusive:
/// several grammar rules can be active at one cursor position and each raises
/// its own flag. The enricher materializes flags into `suggestions` and
/// `suggest_templates`; the formatter flattens, filters and orders them.
#[derive(Debug, Clone, Default)]
pub struct AutocompleteResult {
    /// Parse errors tolerated while building the token stream and tree.
    pub errors: Vec<ParseError>,
    /// Keyword candidates from the follow-set at the cursor.
    pub suggest_keywords: Vec<KeywordSuggestion>,
    /// Suggest index patterns / table names.
    pub suggest_views_or_tables: bool,
    /// Suggest schema columns.
    pub suggest_columns: bool,
    /// Suggest the language's aggregate functions.
    pub suggest_aggregate_functions: bool,
    /// Columns are being suggested inside an aggregate call, so the insert
    /// text is the bare field name.
    pub suggest_fields_in_aggregate_function: bool,
    /// Fetch and suggest values for this column.
    pub suggest_values_for_column: Option<String>,
    /// Where the cursor sits inside a comparison/IN predicate, if it does.
    pub column_value_predicate: Option<ColumnValuePredicate>,
    /// Static canned snippets, always populated by the enricher.
    pub suggest_templates: Vec<QuerySuggestion>,
    /// Concrete candidates materialized by the enricher.
    pub suggestions: Vec<QuerySuggestion>,
}
