//! Suggestion ranking and formatting.
//!
//! Flattens the enriched result into the final suggestion list: filters by
//! the partially-typed word, collapses duplicates to the first-seen entry,
//! and orders by category precedence (Field → Struct → Function →
//! Operator/Keyword → Value), then sort priority, then alphabetically.
//! Ordering is deterministic for identical inputs.

use std::collections::HashSet;

use crate::types::{AutocompleteResult, QuerySuggestion, Span, SuggestionKind};

/// Category precedence; Operator and Keyword share a rank and interleave
/// alphabetically.
fn category_rank(kind: SuggestionKind) -> u8 {
    match kind {
        SuggestionKind::Field => 0,
        SuggestionKind::Struct => 1,
        SuggestionKind::Function => 2,
        SuggestionKind::Operator | SuggestionKind::Keyword => 3,
        SuggestionKind::Value => 4,
    }
}

/// Neutral rank for suggestions without an explicit priority.
const DEFAULT_PRIORITY: u8 = 50;

/// Produces the final ordered suggestion list.
///
/// `replace_range` is stamped onto entries that do not already carry an
/// insert range, so the editor replaces the partial word (or selection) on
/// accept.
#[must_use]
pub fn format_suggestions(
    result: &AutocompleteResult,
    partial_word: &str,
    replace_range: Option<Span>,
) -> Vec<QuerySuggestion> {
    let mut entries: Vec<QuerySuggestion> = Vec::new();
    entries.extend(result.suggestions.iter().cloned());
    for keyword in &result.suggest_keywords {
        let mut suggestion = QuerySuggestion::new(&keyword.text, SuggestionKind::Keyword);
        suggestion.detail = keyword.detail.clone();
        entries.push(suggestion);
    }
    entries.extend(result.suggest_templates.iter().cloned());

    let needle = partial_word.to_lowercase();
    let mut seen: HashSet<(String, SuggestionKind)> = HashSet::new();
    let mut suggestions: Vec<QuerySuggestion> = Vec::new();

    for mut entry in entries {
        if !needle.is_empty() && !entry.text.to_lowercase().starts_with(&needle) {
            continue;
        }
        if !seen.insert((entry.text.clone(), entry.kind)) {
            continue;
        }
        if entry.insert_range.is_none() {
            entry.insert_range = replace_range;
        }
        suggestions.push(entry);
    }

    suggestions.sort_by(|a, b| {
        category_rank(a.kind)
            .cmp(&category_rank(b.kind))
            .then_with(|| {
                a.sort_priority
                    .unwrap_or(DEFAULT_PRIORITY)
                    .cmp(&b.sort_priority.unwrap_or(DEFAULT_PRIORITY))
            })
            .then_with(|| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
    });

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeywordSuggestion;

    fn result_with(suggestions: Vec<QuerySuggestion>) -> AutocompleteResult {
        AutocompleteResult {
            suggestions,
            ..Default::default()
        }
    }

    #[test]
    fn test_category_order() {
        let result = result_with(vec![
            QuerySuggestion::new("value1", SuggestionKind::Value),
            QuerySuggestion::new("=", SuggestionKind::Operator),
            QuerySuggestion::new("AVG", SuggestionKind::Function),
            QuerySuggestion::new("test-index", SuggestionKind::Struct),
            QuerySuggestion::new("field1", SuggestionKind::Field),
        ]);
        let suggestions = format_suggestions(&result, "", None);
        let kinds: Vec<SuggestionKind> = suggestions.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SuggestionKind::Field,
                SuggestionKind::Struct,
                SuggestionKind::Function,
                SuggestionKind::Operator,
                SuggestionKind::Value,
            ]
        );
    }

    #[test]
    fn test_alphabetical_within_category() {
        let result = result_with(vec![
            QuerySuggestion::new("zeta", SuggestionKind::Field),
            QuerySuggestion::new("Alpha", SuggestionKind::Field),
            QuerySuggestion::new("beta", SuggestionKind::Field),
        ]);
        let suggestions = format_suggestions(&result, "", None);
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_sort_priority_precedes_alphabetical() {
        let result = result_with(vec![
            QuerySuggestion::new("_internal", SuggestionKind::Field).with_sort_priority(99),
            QuerySuggestion::new("zeta", SuggestionKind::Field),
        ]);
        let suggestions = format_suggestions(&result, "", None);
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        // `_internal` sorts after `zeta` despite being alphabetically first.
        assert_eq!(texts, vec!["zeta", "_internal"]);
    }

    #[test]
    fn test_prefix_filter_is_case_insensitive() {
        let mut result = result_with(vec![QuerySuggestion::new("field1", SuggestionKind::Field)]);
        result.suggest_keywords.push(KeywordSuggestion::new("FROM"));
        let suggestions = format_suggestions(&result, "fro", None);
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["FROM"]);
    }

    #[test]
    fn test_empty_partial_keeps_everything() {
        let result = result_with(vec![
            QuerySuggestion::new("a", SuggestionKind::Field),
            QuerySuggestion::new("b", SuggestionKind::Field),
        ]);
        assert_eq!(format_suggestions(&result, "", None).len(), 2);
    }

    #[test]
    fn test_duplicates_collapse_to_first_seen() {
        let result = result_with(vec![
            QuerySuggestion::new("field1", SuggestionKind::Field).with_detail("Field: string"),
            QuerySuggestion::new("field1", SuggestionKind::Field).with_detail("Field: keyword"),
            QuerySuggestion::new("field1", SuggestionKind::Value),
        ]);
        let suggestions = format_suggestions(&result, "", None);
        // Same text with a different kind survives; same (text, kind) does not.
        assert_eq!(suggestions.len(), 2);
        let field = suggestions
            .iter()
            .find(|s| s.kind == SuggestionKind::Field)
            .expect("field entry");
        assert_eq!(field.detail.as_deref(), Some("Field: string"));
    }

    #[test]
    fn test_replace_range_is_stamped() {
        let result = result_with(vec![QuerySuggestion::new("field1", SuggestionKind::Field)]);
        let range = Some(Span::new(10, 13));
        let suggestions = format_suggestions(&result, "fie", range);
        assert_eq!(suggestions[0].insert_range, range);
    }

    #[test]
    fn test_templates_and_keywords_are_included() {
        let mut result = result_with(vec![]);
        result.suggest_keywords.push(KeywordSuggestion::new("SELECT"));
        result
            .suggest_templates
            .push(QuerySuggestion::new("SELECT * FROM", SuggestionKind::Keyword));
        let suggestions = format_suggestions(&result, "", None);
        assert_eq!(suggestions.len(), 2);
    }
}
