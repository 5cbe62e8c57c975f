//! Suggestion enrichment.
//!
//! Resolves the base result's category flags into concrete candidates using
//! the caller-supplied schema snapshot and the async value-fetch
//! collaborator. Everything except the value fetch is synchronous and total;
//! the fetch is guarded here so a failure (or a stale response) only ever
//! costs the value suggestions, never the rest of the result.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::error::ValueFetchError;
use crate::languages;
use crate::types::{
    AutocompleteResult, ColumnValuePredicate, IndexPatternSchema, Language, QuerySuggestion,
    SuggestionKind,
};

/// Async collaborator resolving column values, owned by the data layer.
///
/// Implementations may reject; the engine wraps every call and omits value
/// suggestions on failure.
#[async_trait]
pub trait ValueFetcher: Send + Sync {
    async fn fetch_column_values(
        &self,
        index_pattern_title: &str,
        column_name: &str,
    ) -> Result<Vec<String>, ValueFetchError>;
}

/// Staleness guard threaded through the async enrichment branch.
///
/// A request captures the engine's generation counter at entry; when its
/// value fetch resolves, the values are applied only if the counter still
/// matches: cancellation by staleness, not true abort.
pub struct GenerationGuard<'a> {
    counter: &'a AtomicU64,
    generation: u64,
}

impl<'a> GenerationGuard<'a> {
    pub(crate) fn new(counter: &'a AtomicU64, generation: u64) -> Self {
        Self {
            counter,
            generation,
        }
    }

    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// Sort priority demoting fields with a leading underscore (internal
/// fields) to the bottom of the Field category.
const UNDERSCORE_FIELD_PRIORITY: u8 = 99;

/// Resolves flags into concrete suggestions.
///
/// Templates are always added, independent of schema availability. Schema-
/// driven categories (index patterns, columns, aggregate functions) require
/// `schema`; value suggestions additionally require `fetcher` and a fresh
/// `guard`.
pub async fn enrich_autocomplete_result(
    base: AutocompleteResult,
    language: Language,
    schema: Option<&IndexPatternSchema>,
    fetcher: Option<&dyn ValueFetcher>,
    guard: Option<&GenerationGuard<'_>>,
) -> AutocompleteResult {
    let mut result = base;

    result.suggest_templates = languages::templates(language)
        .iter()
        .map(|template| {
            QuerySuggestion::new(template.text, SuggestionKind::Keyword)
                .with_insert_text(template.insert_text)
        })
        .collect();

    if result.suggest_aggregate_functions {
        for function in languages::aggregate_functions(language) {
            result.suggestions.push(
                QuerySuggestion::new(function.text, SuggestionKind::Function)
                    .with_insert_text(function.insert_text)
                    .with_detail("Aggregate function"),
            );
        }
    }

    match result.column_value_predicate {
        Some(ColumnValuePredicate::Operator) => {
            for operator in languages::operator_texts(language) {
                result
                    .suggestions
                    .push(QuerySuggestion::new(*operator, SuggestionKind::Operator));
            }
        }
        Some(ColumnValuePredicate::Lparen) => {
            result
                .suggestions
                .push(QuerySuggestion::new("(", SuggestionKind::Keyword));
        }
        Some(ColumnValuePredicate::EndInTerm) => {
            result
                .suggestions
                .push(QuerySuggestion::new(",", SuggestionKind::Keyword));
            result
                .suggestions
                .push(QuerySuggestion::new(")", SuggestionKind::Keyword));
        }
        _ => {}
    }

    let Some(schema) = schema else {
        return result;
    };

    if result.suggest_views_or_tables {
        result.suggestions.push(
            QuerySuggestion::new(&schema.title, SuggestionKind::Struct)
                .with_detail("Index pattern"),
        );
    }

    if result.suggest_columns {
        // Duplicate field names keep the first occurrence.
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.name.as_str()) {
                continue;
            }
            let mut suggestion = QuerySuggestion::new(&field.name, SuggestionKind::Field)
                .with_insert_text(languages::field_insert_text(
                    language,
                    &field.name,
                    result.suggest_fields_in_aggregate_function,
                ))
                .with_detail(format!("Field: {}", field.field_type));
            if field.name.starts_with('_') {
                suggestion = suggestion.with_sort_priority(UNDERSCORE_FIELD_PRIORITY);
            }
            result.suggestions.push(suggestion);
        }
    }

    if let (Some(column), Some(fetcher)) = (result.suggest_values_for_column.clone(), fetcher) {
        match fetcher.fetch_column_values(&schema.title, &column).await {
            Ok(values) => {
                if guard.is_none_or(GenerationGuard::is_current) {
                    for (index, value) in values.iter().enumerate() {
                        result.suggestions.push(
                            QuerySuggestion::new(value, SuggestionKind::Value)
                                .with_insert_text(languages::value_insert_text(language, value))
                                .with_detail("Value")
                                .with_sort_priority(index.min(98) as u8 + 1),
                        );
                    }
                } else {
                    #[cfg(feature = "tracing")]
                    trace!("discarding stale value fetch for column `{column}`");
                }
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                trace!("value fetch failed for column `{column}`: {_err}");
            }
        }
    }

    result
}
