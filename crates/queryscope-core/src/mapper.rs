//! Rule-to-suggestion mapping.
//!
//! Turns the rules visited at the cursor into base suggestion-category
//! flags through a static per-language action table, and classifies the
//! cursor's position inside comparison/IN predicates with a small token
//! state machine. Flags are raised with a non-exclusive OR: several rules
//! visited at one position each contribute their categories, reflecting
//! genuine grammar ambiguity rather than a single guess.

use crate::languages;
use crate::lexer::{TokenInfo, TokenType};
use crate::rules::{CandidateSet, RuleAction, RuleId};
use crate::types::{
    AutocompleteResult, ColumnValuePredicate, KeywordSuggestion, Language,
};

/// Derives the base [`AutocompleteResult`] from the candidate set.
///
/// No category flag is set without a corresponding visited rule; keyword
/// candidates from the follow-set become `suggest_keywords`.
#[must_use]
pub fn process_visited_rules(
    candidates: &CandidateSet,
    cursor_token_index: usize,
    tokens: &[TokenInfo],
    language: Language,
) -> AutocompleteResult {
    let mut result = AutocompleteResult::default();
    let action_table = languages::rule_actions(language);

    for (rule, context) in &candidates.rules {
        let Some((_, actions)) = action_table.iter().find(|(id, _)| id == rule) else {
            continue;
        };
        for action in *actions {
            match action {
                RuleAction::Tables => result.suggest_views_or_tables = true,
                RuleAction::Columns => {
                    result.suggest_columns = true;
                    if context.rule_list.contains(&RuleId::AggregateFunction) {
                        result.suggest_fields_in_aggregate_function = true;
                    }
                }
                RuleAction::AggregateFunctions => result.suggest_aggregate_functions = true,
                RuleAction::Predicate => {
                    let stage = predicate_stage(
                        tokens,
                        context.start_token_index,
                        cursor_token_index,
                        language,
                    );
                    if let Some((stage, column)) = stage {
                        result.column_value_predicate = Some(stage);
                        match stage {
                            ColumnValuePredicate::Column => result.suggest_columns = true,
                            ColumnValuePredicate::Value => {
                                result.suggest_values_for_column = column;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    for token in &candidates.tokens {
        if let Some(text) = languages::token_text(language, *token) {
            let mut keyword = KeywordSuggestion::new(text);
            keyword.detail =
                languages::token_documentation(language, *token).map(str::to_string);
            result.suggest_keywords.push(keyword);
        }
    }

    result
}

/// Classifies the cursor position within a predicate starting at `start`.
///
/// Walks the meaningful tokens in `[start, cursor_token_index)`:
///
/// - nothing yet ⇒ `Column`
/// - a column reference ⇒ `Operator`
/// - column + comparison ⇒ `Value` (with the resolved column name)
/// - column + `IN` ⇒ `Lparen`, then `Value`/`EndInTerm` through the list
///
/// Returns `None` when the tokens do not look like a predicate at all, or
/// when the predicate is already closed.
pub(crate) fn predicate_stage(
    tokens: &[TokenInfo],
    start: usize,
    cursor_token_index: usize,
    language: Language,
) -> Option<(ColumnValuePredicate, Option<String>)> {
    let ignored = languages::ignored_tokens(language);
    let comparisons = languages::comparison_tokens(language);

    let meaningful: Vec<usize> = (start..cursor_token_index.min(tokens.len()))
        .filter(|&i| !ignored.contains(&tokens[i].token_type))
        .collect();

    if meaningful.is_empty() {
        return Some((ColumnValuePredicate::Column, None));
    }

    // Column reference: identifier (`.` identifier)*
    if !tokens[meaningful[0]].token_type.is_identifier() {
        return None;
    }
    let mut pos = 1;
    while pos < meaningful.len() && tokens[meaningful[pos]].token_type == TokenType::Dot {
        match meaningful.get(pos + 1) {
            Some(&next) if tokens[next].token_type.is_identifier() => pos += 2,
            // Trailing dot: still typing the dotted column.
            None => return Some((ColumnValuePredicate::Column, None)),
            Some(_) => return None,
        }
    }
    let column = column_text(tokens, &meaningful[..pos]);

    if pos == meaningful.len() {
        return Some((ColumnValuePredicate::Operator, None));
    }

    let token_type = tokens[meaningful[pos]].token_type;
    if comparisons.contains(&token_type) {
        pos += 1;
        if pos == meaningful.len() {
            return Some((ColumnValuePredicate::Value, Some(column)));
        }
        // A value is already present; the predicate is closed.
        return None;
    }

    if token_type == TokenType::In {
        pos += 1;
        if pos == meaningful.len() {
            return Some((ColumnValuePredicate::Lparen, None));
        }
        if tokens[meaningful[pos]].token_type != TokenType::LParen {
            return None;
        }
        pos += 1;
        let mut expect_value = true;
        while pos < meaningful.len() {
            let tt = tokens[meaningful[pos]].token_type;
            match tt {
                TokenType::RParen => return None,
                TokenType::Comma => {
                    expect_value = true;
                    pos += 1;
                }
                _ if tt.is_literal() || tt.is_identifier() => {
                    expect_value = false;
                    pos += 1;
                }
                _ => return None,
            }
        }
        return if expect_value {
            Some((ColumnValuePredicate::Value, Some(column)))
        } else {
            Some((ColumnValuePredicate::EndInTerm, None))
        };
    }

    None
}

/// Joins the column-reference tokens into a dotted name, stripping
/// backtick/double-quote delimiters.
fn column_text(tokens: &[TokenInfo], indices: &[usize]) -> String {
    indices
        .iter()
        .filter(|&&i| tokens[i].token_type.is_identifier())
        .map(|&i| strip_quotes(&tokens[i].text).to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['`', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::locate;
    use crate::lexer::tokenize;
    use crate::rules::RuleContext;
    use rstest::rstest;

    /// Runs the walker on a query whose predicate starts at the first token,
    /// with the cursor at the end of the input.
    fn stage_for(
        query: &str,
        language: Language,
    ) -> Option<(ColumnValuePredicate, Option<String>)> {
        let (tokens, _) = tokenize(query, language);
        let ctx = locate(&tokens, query.len(), languages::ignored_tokens(language));
        predicate_stage(&tokens, 0, ctx.cursor_token_index, language)
    }

    #[rstest]
    #[case("", ColumnValuePredicate::Column)]
    #[case("field1 ", ColumnValuePredicate::Operator)]
    #[case("field1 = ", ColumnValuePredicate::Value)]
    #[case("field1 IN ", ColumnValuePredicate::Lparen)]
    #[case("field1 IN ( ", ColumnValuePredicate::Value)]
    #[case("field1 IN ('a' ", ColumnValuePredicate::EndInTerm)]
    #[case("field1 IN ('a', ", ColumnValuePredicate::Value)]
    fn test_predicate_stages(
        #[case] query: &str,
        #[case] expected: ColumnValuePredicate,
    ) {
        let (stage, _) = stage_for(query, Language::Sql).expect("stage");
        assert_eq!(stage, expected);
    }

    #[test]
    fn test_value_stage_resolves_column_name() {
        let (_, column) = stage_for("field1 = ", Language::Sql).expect("stage");
        assert_eq!(column.as_deref(), Some("field1"));
    }

    #[test]
    fn test_value_stage_without_spaces() {
        let (stage, column) = stage_for("field1=", Language::Sql).expect("stage");
        assert_eq!(stage, ColumnValuePredicate::Value);
        assert_eq!(column.as_deref(), Some("field1"));
    }

    #[test]
    fn test_value_stage_with_extra_spaces() {
        let (stage, _) = stage_for("  field1   =   ", Language::Sql).expect("stage");
        assert_eq!(stage, ColumnValuePredicate::Value);
    }

    #[test]
    fn test_dotted_column_name() {
        let (_, column) = stage_for("column.name = ", Language::Sql).expect("stage");
        assert_eq!(column.as_deref(), Some("column.name"));
    }

    #[test]
    fn test_backticked_column_name() {
        let (_, column) = stage_for("`column` = ", Language::Sql).expect("stage");
        assert_eq!(column.as_deref(), Some("column"));
    }

    #[test]
    fn test_backticked_column_with_inner_dot() {
        let (_, column) = stage_for("`column.name` = ", Language::Sql).expect("stage");
        assert_eq!(column.as_deref(), Some("column.name"));
    }

    #[test]
    fn test_dotted_backticked_parts() {
        let (_, column) = stage_for("`column`.`name` = ", Language::Sql).expect("stage");
        assert_eq!(column.as_deref(), Some("column.name"));
    }

    #[test]
    fn test_in_list_value_keeps_column() {
        let (stage, column) = stage_for("field1 IN ('a', ", Language::Sql).expect("stage");
        assert_eq!(stage, ColumnValuePredicate::Value);
        assert_eq!(column.as_deref(), Some("field1"));
    }

    #[test]
    fn test_invalid_leading_operator_yields_none() {
        assert_eq!(stage_for("= ", Language::Sql), None);
    }

    #[test]
    fn test_closed_predicate_yields_none() {
        assert_eq!(stage_for("field1 = 'x' ", Language::Sql), None);
        assert_eq!(stage_for("field1 IN ('a') ", Language::Sql), None);
    }

    #[test]
    fn test_dql_colon_acts_as_comparison() {
        let (stage, column) = stage_for("status : ", Language::Dql).expect("stage");
        assert_eq!(stage, ColumnValuePredicate::Value);
        assert_eq!(column.as_deref(), Some("status"));
    }

    #[test]
    fn test_process_visited_rules_sets_flags_independently() {
        let query = "SELECT * FROM ";
        let (tokens, _) = tokenize(query, Language::Sql);
        let mut candidates = CandidateSet::default();
        candidates.rule(RuleId::TableName, RuleContext::starting_at(0));
        candidates.rule(RuleId::AggregateFunction, RuleContext::starting_at(0));
        let result = process_visited_rules(&candidates, tokens.len() - 1, &tokens, Language::Sql);
        assert!(result.suggest_views_or_tables);
        assert!(result.suggest_aggregate_functions);
        assert!(!result.suggest_columns);
    }

    #[test]
    fn test_unmapped_rule_is_ignored() {
        let (tokens, _) = tokenize("x", Language::Sql);
        let mut candidates = CandidateSet::default();
        // SQL's table has no entry for DQL's field-expression rule.
        candidates.rule(RuleId::FieldExpression, RuleContext::starting_at(0));
        let result = process_visited_rules(&candidates, 0, &tokens, Language::Sql);
        assert!(!result.suggest_columns);
    }

    #[test]
    fn test_keyword_candidates_become_suggestions() {
        let (tokens, _) = tokenize("", Language::Ppl);
        let mut candidates = CandidateSet::default();
        candidates.token(TokenType::Where);
        candidates.token(TokenType::LParen);
        let result = process_visited_rules(&candidates, 0, &tokens, Language::Ppl);
        let texts: Vec<&str> = result
            .suggest_keywords
            .iter()
            .map(|k| k.text.as_str())
            .collect();
        assert_eq!(texts, vec!["where", "("]);
        // PPL commands carry documentation.
        assert!(result.suggest_keywords[0].detail.is_some());
        assert!(result.suggest_keywords[1].detail.is_none());
    }

    #[test]
    fn test_column_rule_inside_aggregate_sets_bare_insert_flag() {
        let (tokens, _) = tokenize("avg( ", Language::Ppl);
        let mut candidates = CandidateSet::default();
        candidates.rule(
            RuleId::ColumnName,
            RuleContext::starting_at(0).with_rule_list(vec![RuleId::AggregateFunction]),
        );
        let result = process_visited_rules(&candidates, 0, &tokens, Language::Ppl);
        assert!(result.suggest_columns);
        assert!(result.suggest_fields_in_aggregate_function);
    }
}
