//! DQL language artifacts: dictionaries, term segmentation and candidate
//! collection.
//!
//! DQL is a filter language: `field : value` terms joined by `and`/`or`,
//! with `not` negation. There are no statements or commands, so the tree is
//! a flat term list and the rule space is small.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::cursor::CursorContext;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{offset_to_line_col, TokenInfo, TokenType};
use crate::parser::{DqlQuery, DqlTerm};
use crate::rules::{CandidateSet, RuleAction, RuleContext, RuleId};

use super::sql::LEXICAL_TOKENS;
use super::Template;

pub(crate) const KEYWORDS: &[(&str, TokenType)] = &[
    ("AND", TokenType::And),
    ("OR", TokenType::Or),
    ("NOT", TokenType::Not),
    ("TRUE", TokenType::True),
    ("FALSE", TokenType::False),
];

pub(crate) static TOKEN_DICTIONARY: LazyLock<HashMap<&'static str, TokenType>> =
    LazyLock::new(|| {
        LEXICAL_TOKENS
            .iter()
            .chain(KEYWORDS.iter())
            .copied()
            .collect()
    });

pub(crate) static IGNORED_TOKENS: LazyLock<HashSet<TokenType>> =
    LazyLock::new(|| [TokenType::Space, TokenType::Comment, TokenType::Eof].into());

/// DQL has no explicit comparison operator: the colon separates field and
/// value, and the value position follows immediately.
pub(crate) const OPERATORS: &[&str] = &[":"];

pub(crate) const COMPARISON_TOKENS: &[TokenType] = &[TokenType::Colon];

pub(crate) const TEMPLATES: &[Template] = &[];

pub(crate) const RULE_ACTIONS: &[(RuleId, &[RuleAction])] = &[
    (RuleId::FieldExpression, &[RuleAction::Columns]),
    (RuleId::ValueExpression, &[RuleAction::Predicate]),
];

pub(crate) fn keyword_surface(token: TokenType) -> Option<&'static str> {
    Some(match token {
        TokenType::And => "and",
        TokenType::Or => "or",
        TokenType::Not => "not",
        TokenType::True => "true",
        TokenType::False => "false",
        _ => return None,
    })
}

/// Splits the token stream into terms at `and`/`or` connectives.
pub(crate) fn build_query(
    query: &str,
    tokens: &[TokenInfo],
    errors: &mut Vec<ParseError>,
) -> DqlQuery {
    let mut result = DqlQuery::default();
    let mut term_start: Option<usize> = None;

    for (index, token) in tokens.iter().enumerate() {
        match token.token_type {
            TokenType::Space | TokenType::Comment => continue,
            TokenType::And | TokenType::Or | TokenType::Eof => {
                if let Some(start) = term_start.take() {
                    result.terms.push(DqlTerm {
                        tokens: start..index,
                    });
                }
                if token.token_type == TokenType::Eof {
                    break;
                }
            }
            TokenType::Unknown => {
                let (line, column) = offset_to_line_col(query, token.span.start);
                errors.push(ParseError::with_position(
                    format!("unexpected input `{}`", token.text.trim()),
                    line,
                    column,
                ));
            }
            _ => {
                if term_start.is_none() {
                    term_start = Some(index);
                }
            }
        }
    }

    check_trailing_completeness(query, tokens, errors);

    result
}

fn check_trailing_completeness(query: &str, tokens: &[TokenInfo], errors: &mut Vec<ParseError>) {
    let Some(last) = tokens
        .iter()
        .rev()
        .find(|t| !IGNORED_TOKENS.contains(&t.token_type))
    else {
        return;
    };
    if matches!(
        last.token_type,
        TokenType::Colon | TokenType::And | TokenType::Or | TokenType::Not | TokenType::Dot
    ) {
        let (line, column) = offset_to_line_col(query, last.span.start);
        errors.push(
            ParseError::with_position(
                format!("input ends after `{}`", last.text.trim()),
                line,
                column,
            )
            .with_kind(ParseErrorKind::UnexpectedEof),
        );
    }
}

pub(crate) fn collect_candidates(
    dql: &DqlQuery,
    tokens: &[TokenInfo],
    ctx: &CursorContext,
) -> CandidateSet {
    let mut candidates = CandidateSet::default();

    let Some(prev) = ctx.previous_token_index else {
        candidates.rule(RuleId::FieldExpression, RuleContext::starting_at(0));
        candidates.token(TokenType::Not);
        return candidates;
    };

    let prev_type = tokens[prev].token_type;

    match prev_type {
        TokenType::And | TokenType::Or | TokenType::LParen => {
            candidates.rule(RuleId::FieldExpression, RuleContext::starting_at(prev + 1));
            candidates.token(TokenType::Not);
        }
        TokenType::Not => {
            candidates.rule(RuleId::FieldExpression, RuleContext::starting_at(prev + 1));
        }
        TokenType::Colon => {
            let start = field_start(tokens, prev);
            candidates.rule(RuleId::ValueExpression, RuleContext::starting_at(start));
            candidates.extend_tokens(&[TokenType::True, TokenType::False]);
        }
        TokenType::Dot => {
            // Continuing a dotted field name.
            let start = field_start(tokens, prev + 1);
            candidates.rule(RuleId::FieldExpression, RuleContext::starting_at(start));
        }
        _ if prev_type.is_identifier() || prev_type.is_literal() => {
            if colon_before(dql, tokens, prev) {
                // A complete `field : value` term.
                candidates.extend_tokens(&[TokenType::And, TokenType::Or]);
            } else {
                candidates.token(TokenType::Colon);
            }
        }
        _ => {}
    }

    candidates
}

/// Walks back from the colon to the start of the (possibly dotted) field
/// reference.
fn field_start(tokens: &[TokenInfo], colon: usize) -> usize {
    let mut start = colon;
    let mut index = colon;
    loop {
        let Some(previous) = tokens[..index]
            .iter()
            .rposition(|t| !IGNORED_TOKENS.contains(&t.token_type))
        else {
            break;
        };
        match tokens[previous].token_type {
            t if t.is_identifier() => {
                start = previous;
                index = previous;
            }
            TokenType::Dot => {
                index = previous;
            }
            _ => break,
        }
    }
    start
}

/// Is there a colon earlier in the term containing `prev`?
fn colon_before(dql: &DqlQuery, tokens: &[TokenInfo], prev: usize) -> bool {
    dql.terms
        .iter()
        .find(|term| term.tokens.contains(&prev))
        .map(|term| {
            (term.tokens.start..prev).any(|i| tokens[i].token_type == TokenType::Colon)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::locate;
    use crate::lexer::tokenize;
    use crate::types::Language;

    fn candidates_at_end(query: &str) -> CandidateSet {
        let (tokens, mut errors) = tokenize(query, Language::Dql);
        let dql = build_query(query, &tokens, &mut errors);
        let ctx = locate(&tokens, query.len(), &IGNORED_TOKENS);
        collect_candidates(&dql, &tokens, &ctx)
    }

    #[test]
    fn test_empty_query_offers_fields() {
        let candidates = candidates_at_end("");
        assert!(candidates.rules.contains_key(&RuleId::FieldExpression));
        assert!(candidates.tokens.contains(&TokenType::Not));
    }

    #[test]
    fn test_after_field_offers_colon() {
        let candidates = candidates_at_end("status ");
        assert!(candidates.tokens.contains(&TokenType::Colon));
    }

    #[test]
    fn test_after_colon_visits_value_rule() {
        let candidates = candidates_at_end("status : ");
        let ctx = candidates
            .rules
            .get(&RuleId::ValueExpression)
            .expect("value rule");
        // The rule starts at the field token so the walker can resolve the
        // column name.
        assert_eq!(ctx.start_token_index, 0);
    }

    #[test]
    fn test_dotted_field_value_rule_starts_at_field_head() {
        let candidates = candidates_at_end("machine.os : ");
        let ctx = candidates
            .rules
            .get(&RuleId::ValueExpression)
            .expect("value rule");
        assert_eq!(ctx.start_token_index, 0);
    }

    #[test]
    fn test_complete_term_offers_connectives() {
        let candidates = candidates_at_end("status : 200 ");
        assert!(candidates.tokens.contains(&TokenType::And));
        assert!(candidates.tokens.contains(&TokenType::Or));
    }

    #[test]
    fn test_after_connective_offers_fields() {
        let candidates = candidates_at_end("status : 200 and ");
        assert!(candidates.rules.contains_key(&RuleId::FieldExpression));
    }

    #[test]
    fn test_trailing_colon_records_eof_error() {
        let query = "status :";
        let (tokens, mut errors) = tokenize(query, Language::Dql);
        build_query(query, &tokens, &mut errors);
        assert!(errors
            .iter()
            .any(|e| e.kind == ParseErrorKind::UnexpectedEof));
    }
}
