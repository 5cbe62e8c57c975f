//! SQL language artifacts: dictionaries, follow-set tables, clause
//! segmentation and candidate collection.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::cursor::CursorContext;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{offset_to_line_col, TokenInfo, TokenType};
use crate::parser::{EntryRule, SqlClause, SqlClauseKind, SqlStatement};
use crate::rules::{CandidateSet, RuleAction, RuleContext, RuleId};
use crate::types::Span;

use super::{AggregateFunction, Template};

pub(crate) const KEYWORDS: &[(&str, TokenType)] = &[
    ("SELECT", TokenType::Select),
    ("FROM", TokenType::From),
    ("WHERE", TokenType::Where),
    ("GROUP", TokenType::Group),
    ("BY", TokenType::By),
    ("HAVING", TokenType::Having),
    ("ORDER", TokenType::Order),
    ("ASC", TokenType::Asc),
    ("DESC", TokenType::Desc),
    ("LIMIT", TokenType::Limit),
    ("JOIN", TokenType::Join),
    ("LEFT", TokenType::Left),
    ("RIGHT", TokenType::Right),
    ("INNER", TokenType::Inner),
    ("OUTER", TokenType::Outer),
    ("CROSS", TokenType::Cross),
    ("ON", TokenType::On),
    ("AS", TokenType::As),
    ("DISTINCT", TokenType::Distinct),
    ("AND", TokenType::And),
    ("OR", TokenType::Or),
    ("NOT", TokenType::Not),
    ("IN", TokenType::In),
    ("LIKE", TokenType::Like),
    ("BETWEEN", TokenType::Between),
    ("IS", TokenType::Is),
    ("NULL", TokenType::Null),
    ("TRUE", TokenType::True),
    ("FALSE", TokenType::False),
    ("EXISTS", TokenType::Exists),
];

/// Lexical token names shared by every language dictionary.
pub(super) const LEXICAL_TOKENS: &[(&str, TokenType)] = &[
    ("SPACE", TokenType::Space),
    ("COMMENT", TokenType::Comment),
    ("ID", TokenType::Ident),
    ("BACKTICK_QUOTE_ID", TokenType::BacktickIdent),
    ("DOUBLE_QUOTE_ID", TokenType::QuotedIdent),
    ("NUMBER", TokenType::Number),
    ("STRING_LITERAL", TokenType::StringLiteral),
    ("EQ", TokenType::Eq),
    ("NEQ", TokenType::NotEq),
    ("LT", TokenType::Lt),
    ("LTE", TokenType::LtEq),
    ("GT", TokenType::Gt),
    ("GTE", TokenType::GtEq),
    ("PLUS", TokenType::Plus),
    ("MINUS", TokenType::Minus),
    ("STAR", TokenType::Star),
    ("SLASH", TokenType::Slash),
    ("PERCENT", TokenType::Percent),
    ("COMMA", TokenType::Comma),
    ("DOT", TokenType::Dot),
    ("COLON", TokenType::Colon),
    ("SEMICOLON", TokenType::Semicolon),
    ("LPAREN", TokenType::LParen),
    ("RPAREN", TokenType::RParen),
    ("LBRACKET", TokenType::LBracket),
    ("RBRACKET", TokenType::RBracket),
    ("PIPE", TokenType::Pipe),
    ("EOF", TokenType::Eof),
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

/// OpenSearch-flavored SQL aggregate functions.
pub(crate) const AGGREGATE_FUNCTIONS: &[AggregateFunction] = &[
    AggregateFunction { text: "AVG", insert_text: "AVG($0)" },
    AggregateFunction { text: "COUNT", insert_text: "COUNT($0)" },
    AggregateFunction { text: "MAX", insert_text: "MAX($0)" },
    AggregateFunction { text: "MIN", insert_text: "MIN($0)" },
    AggregateFunction { text: "SUM", insert_text: "SUM($0)" },
    AggregateFunction { text: "STDDEV_POP", insert_text: "STDDEV_POP($0)" },
    AggregateFunction { text: "STDDEV_SAMP", insert_text: "STDDEV_SAMP($0)" },
    AggregateFunction { text: "VAR_POP", insert_text: "VAR_POP($0)" },
    AggregateFunction { text: "VAR_SAMP", insert_text: "VAR_SAMP($0)" },
];

pub(crate) const OPERATORS: &[&str] = &[
    "=", "!=", "<", "<=", ">", ">=", "LIKE", "IN", "BETWEEN", "IS NULL", "IS NOT NULL",
];

pub(crate) const COMPARISON_TOKENS: &[TokenType] = &[
    TokenType::Eq,
    TokenType::NotEq,
    TokenType::Lt,
    TokenType::LtEq,
    TokenType::Gt,
    TokenType::GtEq,
    TokenType::Like,
];

pub(crate) const TEMPLATES: &[Template] = &[
    Template { text: "SELECT * FROM", insert_text: "SELECT * FROM $0" },
    Template { text: "SELECT COUNT(*) FROM", insert_text: "SELECT COUNT(*) FROM $0" },
];

pub(crate) const RULE_ACTIONS: &[(RuleId, &[RuleAction])] = &[
    (RuleId::TableName, &[RuleAction::Tables]),
    (RuleId::ColumnName, &[RuleAction::Columns]),
    (RuleId::AggregateFunction, &[RuleAction::AggregateFunctions]),
    (RuleId::Predicate, &[RuleAction::Predicate]),
];

pub(crate) fn keyword_surface(token: TokenType) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, t)| *t == token)
        .map(|(name, _)| *name)
}

/// Segments the token stream into statements and clauses.
///
/// Panic-mode recovery: unknown tokens are recorded and skipped, statements
/// resynchronize at `;`, clauses at the next clause keyword. The resulting
/// tree is best-effort and always covers every statement present.
pub(crate) fn build_statements(
    query: &str,
    tokens: &[TokenInfo],
    entry_rule: EntryRule,
    errors: &mut Vec<ParseError>,
) -> Vec<SqlStatement> {
    let initial_kind = match entry_rule {
        EntryRule::Statement => SqlClauseKind::Leading,
        EntryRule::FromClause => SqlClauseKind::From,
    };

    let mut statements = Vec::new();
    let mut clauses: Vec<SqlClause> = Vec::new();
    let mut statement_first: Option<usize> = None;
    let mut clause_kind = initial_kind;
    let mut clause_start = 0usize;

    let flush_clause =
        |clauses: &mut Vec<SqlClause>, kind: SqlClauseKind, start: usize, end: usize| {
            if end > start {
                clauses.push(SqlClause {
                    kind,
                    tokens: start..end,
                });
            }
        };

    for (index, token) in tokens.iter().enumerate() {
        match token.token_type {
            TokenType::Eof => break,
            TokenType::Space | TokenType::Comment => continue,
            TokenType::Unknown => {
                let (line, column) = offset_to_line_col(query, token.span.start);
                errors.push(ParseError::with_position(
                    format!("unexpected input `{}`", token.text.trim()),
                    line,
                    column,
                ));
                continue;
            }
            TokenType::Semicolon => {
                if let Some(first) = statement_first {
                    flush_clause(&mut clauses, clause_kind, clause_start, index);
                    statements.push(SqlStatement {
                        span: Span::new(tokens[first].span.start, token.span.start),
                        clauses: std::mem::take(&mut clauses),
                    });
                }
                statement_first = None;
                clause_kind = initial_kind;
                clause_start = index + 1;
                continue;
            }
            _ => {}
        }

        if statement_first.is_none() {
            statement_first = Some(index);
            clause_start = index;
        }

        if let Some(kind) = clause_keyword(tokens, index) {
            if kind != clause_kind || clause_start < index {
                flush_clause(&mut clauses, clause_kind, clause_start, index);
                clause_kind = kind;
                clause_start = index;
            }
        }
    }

    if let Some(first) = statement_first {
        let end = tokens.len().saturating_sub(1); // exclude EOF
        flush_clause(&mut clauses, clause_kind, clause_start, end);
        let span_end = tokens
            .get(end.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(query.len());
        statements.push(SqlStatement {
            span: Span::new(tokens[first].span.start, span_end),
            clauses,
        });
    }

    check_trailing_completeness(query, tokens, errors);

    statements
}

/// Does the token at `index` introduce a new clause?
fn clause_keyword(tokens: &[TokenInfo], index: usize) -> Option<SqlClauseKind> {
    match tokens[index].token_type {
        TokenType::Select => Some(SqlClauseKind::Select),
        TokenType::From => Some(SqlClauseKind::From),
        TokenType::Where => Some(SqlClauseKind::Where),
        TokenType::Having => Some(SqlClauseKind::Having),
        TokenType::Limit => Some(SqlClauseKind::Limit),
        TokenType::On => Some(SqlClauseKind::On),
        TokenType::Group => {
            next_meaningful(tokens, index).filter(|&n| tokens[n].token_type == TokenType::By)?;
            Some(SqlClauseKind::GroupBy)
        }
        TokenType::Order => {
            next_meaningful(tokens, index).filter(|&n| tokens[n].token_type == TokenType::By)?;
            Some(SqlClauseKind::OrderBy)
        }
        _ => None,
    }
}

fn next_meaningful(tokens: &[TokenInfo], index: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(index + 1)
        .find(|(_, t)| !IGNORED_TOKENS.contains(&t.token_type))
        .map(|(i, _)| i)
}

/// Records an UnexpectedEof error when the input is cut off mid-clause,
/// the normal state during typing: tolerated but reported.
fn check_trailing_completeness(query: &str, tokens: &[TokenInfo], errors: &mut Vec<ParseError>) {
    let Some(last) = tokens
        .iter()
        .rev()
        .find(|t| !IGNORED_TOKENS.contains(&t.token_type))
    else {
        return;
    };
    // Keywords that legitimately end a statement.
    let terminal_keyword = matches!(
        last.token_type,
        TokenType::Null | TokenType::True | TokenType::False | TokenType::Asc | TokenType::Desc
    );
    let incomplete = (last.token_type.is_keyword() && !terminal_keyword)
        || matches!(
            last.token_type,
            TokenType::Eq
                | TokenType::NotEq
                | TokenType::Lt
                | TokenType::LtEq
                | TokenType::Gt
                | TokenType::GtEq
                | TokenType::Comma
                | TokenType::Dot
        );
    if incomplete {
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

/// Boundary tokens that start a fresh condition inside WHERE/HAVING/ON.
const CONDITION_BOUNDARIES: &[TokenType] = &[
    TokenType::Where,
    TokenType::Having,
    TokenType::On,
    TokenType::And,
    TokenType::Or,
];

pub(crate) fn collect_candidates(
    statements: &[SqlStatement],
    tokens: &[TokenInfo],
    ctx: &CursorContext,
) -> CandidateSet {
    let mut candidates = CandidateSet::default();

    let Some(prev) = ctx.previous_token_index else {
        statement_start(&mut candidates);
        return candidates;
    };

    let Some(clause) = find_clause(statements, prev) else {
        // Between statements (e.g. right after a semicolon).
        statement_start(&mut candidates);
        return candidates;
    };

    let prev_type = tokens[prev].token_type;

    match clause.kind {
        SqlClauseKind::Leading => {
            statement_start(&mut candidates);
        }
        SqlClauseKind::Select => {
            if matches!(
                prev_type,
                TokenType::Select | TokenType::Comma | TokenType::LParen
            ) {
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1)
                        .with_rule_list(vec![RuleId::SelectElements]),
                );
                candidates.rule(RuleId::AggregateFunction, RuleContext::starting_at(prev + 1));
                candidates.token(TokenType::Star);
                if prev_type == TokenType::Select {
                    candidates.token(TokenType::Distinct);
                }
            } else {
                candidates.extend_tokens(&[TokenType::From, TokenType::Comma, TokenType::As]);
            }
        }
        SqlClauseKind::From => {
            if matches!(
                prev_type,
                TokenType::From | TokenType::Join | TokenType::Comma
            ) {
                candidates.rule(RuleId::TableName, RuleContext::starting_at(prev + 1));
                candidates.rule(
                    RuleId::FromClause,
                    RuleContext::starting_at(clause.tokens.start),
                );
            } else if matches!(prev_type, TokenType::Group | TokenType::Order) {
                candidates.token(TokenType::By);
            } else if matches!(
                prev_type,
                TokenType::Left | TokenType::Right | TokenType::Inner | TokenType::Cross
            ) {
                candidates.extend_tokens(&[TokenType::Join, TokenType::Outer]);
            } else {
                candidates.extend_tokens(&[
                    TokenType::Where,
                    TokenType::Join,
                    TokenType::Left,
                    TokenType::Inner,
                    TokenType::Group,
                    TokenType::Order,
                    TokenType::Limit,
                ]);
            }
        }
        SqlClauseKind::Where | SqlClauseKind::Having | SqlClauseKind::On => {
            let start = condition_start(tokens, &clause, prev);
            candidates.rule(RuleId::Predicate, RuleContext::starting_at(start));
            if CONDITION_BOUNDARIES.contains(&prev_type) {
                candidates.token(TokenType::Not);
            }
            if condition_complete(tokens, start, prev) {
                candidates.extend_tokens(&[TokenType::And, TokenType::Or]);
                if clause.kind == SqlClauseKind::Where {
                    candidates.extend_tokens(&[
                        TokenType::Group,
                        TokenType::Order,
                        TokenType::Limit,
                    ]);
                }
            }
        }
        SqlClauseKind::GroupBy | SqlClauseKind::OrderBy => {
            if matches!(prev_type, TokenType::By | TokenType::Comma) {
                let list_rule = if clause.kind == SqlClauseKind::GroupBy {
                    RuleId::GroupByElements
                } else {
                    RuleId::OrderByElements
                };
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1).with_rule_list(vec![list_rule]),
                );
            } else if clause.kind == SqlClauseKind::GroupBy {
                candidates.extend_tokens(&[
                    TokenType::Having,
                    TokenType::Order,
                    TokenType::Limit,
                ]);
            } else {
                candidates.extend_tokens(&[TokenType::Asc, TokenType::Desc, TokenType::Limit]);
            }
        }
        SqlClauseKind::Limit => {}
    }

    candidates
}

fn statement_start(candidates: &mut CandidateSet) {
    candidates.token(TokenType::Select);
    candidates.rule(RuleId::Statement, RuleContext::starting_at(0));
}

fn find_clause(statements: &[SqlStatement], token_index: usize) -> Option<SqlClause> {
    statements
        .iter()
        .flat_map(|s| s.clauses.iter())
        .find(|c| c.tokens.contains(&token_index))
        .cloned()
}

/// First meaningful token index of the trailing condition before `prev`.
fn condition_start(tokens: &[TokenInfo], clause: &SqlClause, prev: usize) -> usize {
    let mut start = clause.tokens.start;
    for index in (clause.tokens.start..=prev).rev() {
        if CONDITION_BOUNDARIES.contains(&tokens[index].token_type) {
            start = index;
            break;
        }
    }
    next_meaningful(tokens, start).unwrap_or(start + 1)
}

/// A condition is complete when its last meaningful token closes a value:
/// a literal, a closed IN-list, or `NULL`.
fn condition_complete(tokens: &[TokenInfo], start: usize, prev: usize) -> bool {
    if prev < start {
        return false;
    }
    let last = tokens[prev].token_type;
    last.is_literal() || matches!(last, TokenType::RParen | TokenType::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::locate;
    use crate::lexer::tokenize;
    use crate::types::Language;

    fn candidates_at_end(query: &str) -> CandidateSet {
        let (tokens, mut errors) = tokenize(query, Language::Sql);
        let statements = build_statements(query, &tokens, EntryRule::Statement, &mut errors);
        let ctx = locate(&tokens, query.len(), &IGNORED_TOKENS);
        collect_candidates(&statements, &tokens, &ctx)
    }

    #[test]
    fn test_empty_query_suggests_select() {
        let candidates = candidates_at_end("");
        assert!(candidates.tokens.contains(&TokenType::Select));
        assert!(candidates.rules.contains_key(&RuleId::Statement));
    }

    #[test]
    fn test_after_from_visits_table_rule() {
        let candidates = candidates_at_end("SELECT * FROM ");
        assert!(candidates.rules.contains_key(&RuleId::TableName));
        assert!(candidates.rules.contains_key(&RuleId::FromClause));
    }

    #[test]
    fn test_after_table_suggests_follow_keywords() {
        let candidates = candidates_at_end("SELECT * FROM users ");
        assert!(candidates.tokens.contains(&TokenType::Where));
        assert!(candidates.tokens.contains(&TokenType::Join));
        assert!(!candidates.rules.contains_key(&RuleId::TableName));
    }

    #[test]
    fn test_after_select_visits_column_and_aggregate_rules() {
        let candidates = candidates_at_end("SELECT ");
        assert!(candidates.rules.contains_key(&RuleId::ColumnName));
        assert!(candidates.rules.contains_key(&RuleId::AggregateFunction));
        let ctx = candidates.rules.get(&RuleId::ColumnName).unwrap();
        assert_eq!(ctx.rule_list, vec![RuleId::SelectElements]);
    }

    #[test]
    fn test_where_visits_predicate_rule() {
        let candidates = candidates_at_end("SELECT * FROM t WHERE ");
        let predicate = candidates.rules.get(&RuleId::Predicate).expect("predicate");
        // Predicate starts after the WHERE keyword, at the (future) column.
        assert!(predicate.start_token_index > 0);
    }

    #[test]
    fn test_complete_condition_suggests_connectives() {
        let candidates = candidates_at_end("SELECT * FROM t WHERE a = 1 ");
        assert!(candidates.tokens.contains(&TokenType::And));
        assert!(candidates.tokens.contains(&TokenType::Or));
        assert!(candidates.tokens.contains(&TokenType::Order));
    }

    #[test]
    fn test_and_starts_new_condition() {
        let candidates = candidates_at_end("SELECT * FROM t WHERE a = 1 AND ");
        let predicate = candidates.rules.get(&RuleId::Predicate).expect("predicate");
        let (tokens, _) = tokenize("SELECT * FROM t WHERE a = 1 AND ", Language::Sql);
        // The new condition starts after AND, so no meaningful token exists
        // at or after its start yet (only spaces/EOF).
        assert!(tokens[predicate.start_token_index..]
            .iter()
            .all(|t| IGNORED_TOKENS.contains(&t.token_type)));
    }

    #[test]
    fn test_group_by_visits_column_rule_with_context() {
        let candidates = candidates_at_end("SELECT a FROM t GROUP BY ");
        let ctx = candidates.rules.get(&RuleId::ColumnName).expect("columns");
        assert_eq!(ctx.rule_list, vec![RuleId::GroupByElements]);
    }

    #[test]
    fn test_order_without_by_suggests_by() {
        let candidates = candidates_at_end("SELECT a FROM t ORDER ");
        assert!(candidates.tokens.contains(&TokenType::By));
    }

    #[test]
    fn test_between_statements_restarts() {
        let candidates = candidates_at_end("SELECT 1; ");
        assert!(candidates.tokens.contains(&TokenType::Select));
    }

    #[test]
    fn test_hyphenated_table_name_stays_in_from_clause() {
        let candidates = candidates_at_end("SELECT * FROM test-index ");
        // `test-index` lexes as ident/minus/ident; the trailing position
        // still offers the FROM follow-set.
        assert!(candidates.tokens.contains(&TokenType::Where));
    }
}
