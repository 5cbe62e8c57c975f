//! PPL language artifacts: dictionaries, command tables, pipeline
//! segmentation and candidate collection.
//!
//! The pipeline model follows simplified PPL: a leading search command
//! (`source = idx` plus optional bare `field = value` filters) and piped
//! commands (`where`, `fields`, `stats`, ...).

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;

use crate::cursor::CursorContext;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{offset_to_line_col, TokenInfo, TokenType};
use crate::parser::{EntryRule, PplCommand, PplCommandKind, PplPipeline};
use crate::rules::{CandidateSet, RuleAction, RuleContext, RuleId};

use super::sql::LEXICAL_TOKENS;
use super::{AggregateFunction, Template};

pub(crate) const KEYWORDS: &[(&str, TokenType)] = &[
    ("SOURCE", TokenType::Source),
    ("WHERE", TokenType::Where),
    ("FIELDS", TokenType::Fields),
    ("STATS", TokenType::Stats),
    ("SORT", TokenType::Sort),
    ("EVAL", TokenType::Eval),
    ("RENAME", TokenType::Rename),
    ("HEAD", TokenType::Head),
    ("DEDUP", TokenType::Dedup),
    ("TOP", TokenType::Top),
    ("RARE", TokenType::Rare),
    ("PARSE", TokenType::Parse),
    ("AS", TokenType::As),
    ("BY", TokenType::By),
    ("AND", TokenType::And),
    ("OR", TokenType::Or),
    ("NOT", TokenType::Not),
    ("IN", TokenType::In),
    ("LIKE", TokenType::Like),
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

/// PPL aggregate functions with their snippet insert texts. `count` takes no
/// argument, so the tab stop lands after the call.
pub(crate) const AGGREGATE_FUNCTIONS: &[AggregateFunction] = &[
    AggregateFunction { text: "avg()", insert_text: "avg($0)" },
    AggregateFunction { text: "count()", insert_text: "count() $0" },
    AggregateFunction { text: "max()", insert_text: "max($0)" },
    AggregateFunction { text: "min()", insert_text: "min($0)" },
    AggregateFunction { text: "stddev_pop()", insert_text: "stddev_pop($0)" },
    AggregateFunction { text: "stddev_samp()", insert_text: "stddev_samp($0)" },
    AggregateFunction { text: "sum()", insert_text: "sum($0)" },
    AggregateFunction { text: "var_pop()", insert_text: "var_pop($0)" },
    AggregateFunction { text: "var_samp()", insert_text: "var_samp($0)" },
];

pub(crate) const OPERATORS: &[&str] = &["=", "!=", "<", "<=", ">", ">=", "like", "in"];

pub(crate) const COMPARISON_TOKENS: &[TokenType] = &[
    TokenType::Eq,
    TokenType::NotEq,
    TokenType::Lt,
    TokenType::LtEq,
    TokenType::Gt,
    TokenType::GtEq,
    TokenType::Like,
];

pub(crate) const TEMPLATES: &[Template] = &[Template {
    text: "source =",
    insert_text: "source = $0",
}];

/// Commands offered after a pipe.
const PIPE_COMMANDS: &[TokenType] = &[
    TokenType::Where,
    TokenType::Fields,
    TokenType::Stats,
    TokenType::Sort,
    TokenType::Eval,
    TokenType::Rename,
    TokenType::Head,
    TokenType::Dedup,
    TokenType::Top,
    TokenType::Rare,
    TokenType::Parse,
];

pub(crate) const RULE_ACTIONS: &[(RuleId, &[RuleAction])] = &[
    (RuleId::TableName, &[RuleAction::Tables]),
    (RuleId::ColumnName, &[RuleAction::Columns]),
    (RuleId::FieldList, &[RuleAction::Columns]),
    (RuleId::AggregateFunction, &[RuleAction::AggregateFunctions]),
    (RuleId::Predicate, &[RuleAction::Predicate]),
];

pub(crate) fn keyword_surface(token: TokenType) -> Option<&'static str> {
    Some(match token {
        TokenType::Source => "source",
        TokenType::Where => "where",
        TokenType::Fields => "fields",
        TokenType::Stats => "stats",
        TokenType::Sort => "sort",
        TokenType::Eval => "eval",
        TokenType::Rename => "rename",
        TokenType::Head => "head",
        TokenType::Dedup => "dedup",
        TokenType::Top => "top",
        TokenType::Rare => "rare",
        TokenType::Parse => "parse",
        TokenType::As => "as",
        TokenType::By => "by",
        TokenType::And => "and",
        TokenType::Or => "or",
        TokenType::Not => "not",
        TokenType::In => "in",
        TokenType::Like => "like",
        TokenType::True => "true",
        TokenType::False => "false",
        _ => return None,
    })
}

pub(crate) fn command_documentation(token: TokenType) -> Option<&'static str> {
    Some(match token {
        TokenType::Where => "Filters results with a boolean expression",
        TokenType::Fields => "Keeps or removes fields from the results",
        TokenType::Stats => "Aggregates results with statistical functions",
        TokenType::Sort => "Sorts results by the given fields",
        TokenType::Eval => "Computes a new field from an expression",
        TokenType::Rename => "Renames one or more fields",
        TokenType::Head => "Returns the first N results",
        TokenType::Dedup => "Removes duplicate results by field",
        TokenType::Top => "Finds the most common field values",
        TokenType::Rare => "Finds the least common field values",
        TokenType::Parse => "Extracts fields from text with a pattern",
        _ => return None,
    })
}

/// Segments the token stream into pipeline commands at pipe boundaries.
pub(crate) fn build_pipeline(
    query: &str,
    tokens: &[TokenInfo],
    _entry_rule: EntryRule,
    errors: &mut Vec<ParseError>,
) -> PplPipeline {
    let mut pipeline = PplPipeline::default();
    let mut segment_start = 0usize;
    let mut first_segment = true;

    let flush = |pipeline: &mut PplPipeline,
                     errors: &mut Vec<ParseError>,
                     range: Range<usize>,
                     first: bool| {
        let Some(head) = first_meaningful(tokens, &range) else {
            return;
        };
        let kind = if first {
            PplCommandKind::Search
        } else {
            match command_kind(tokens[head].token_type) {
                Some(kind) => kind,
                None => {
                    let (line, column) = offset_to_line_col(query, tokens[head].span.start);
                    errors.push(ParseError::with_position(
                        format!("unknown command `{}`", tokens[head].text.trim()),
                        line,
                        column,
                    ));
                    PplCommandKind::Unknown
                }
            }
        };
        pipeline.commands.push(PplCommand {
            kind,
            tokens: range,
        });
    };

    for (index, token) in tokens.iter().enumerate() {
        match token.token_type {
            TokenType::Pipe => {
                flush(&mut pipeline, errors, segment_start..index, first_segment);
                first_segment = false;
                segment_start = index + 1;
            }
            TokenType::Eof => {
                flush(&mut pipeline, errors, segment_start..index, first_segment);
                break;
            }
            TokenType::Unknown => {
                let (line, column) = offset_to_line_col(query, token.span.start);
                errors.push(ParseError::with_position(
                    format!("unexpected input `{}`", token.text.trim()),
                    line,
                    column,
                ));
            }
            _ => {}
        }
    }

    check_trailing_completeness(query, tokens, errors);

    pipeline
}

fn command_kind(token: TokenType) -> Option<PplCommandKind> {
    Some(match token {
        TokenType::Where => PplCommandKind::Where,
        TokenType::Fields => PplCommandKind::Fields,
        TokenType::Stats => PplCommandKind::Stats,
        TokenType::Sort => PplCommandKind::Sort,
        TokenType::Eval => PplCommandKind::Eval,
        TokenType::Rename => PplCommandKind::Rename,
        TokenType::Head => PplCommandKind::Head,
        TokenType::Dedup => PplCommandKind::Dedup,
        TokenType::Top => PplCommandKind::Top,
        TokenType::Rare => PplCommandKind::Rare,
        TokenType::Parse => PplCommandKind::Parse,
        _ => return None,
    })
}

fn first_meaningful(tokens: &[TokenInfo], range: &Range<usize>) -> Option<usize> {
    range
        .clone()
        .find(|&i| !IGNORED_TOKENS.contains(&tokens[i].token_type))
}

fn check_trailing_completeness(query: &str, tokens: &[TokenInfo], errors: &mut Vec<ParseError>) {
    let Some(last) = tokens
        .iter()
        .rev()
        .find(|t| !IGNORED_TOKENS.contains(&t.token_type))
    else {
        return;
    };
    let incomplete = matches!(
        last.token_type,
        TokenType::Source
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::LtEq
            | TokenType::Gt
            | TokenType::GtEq
            | TokenType::Comma
            | TokenType::Pipe
            | TokenType::As
            | TokenType::By
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

pub(crate) fn collect_candidates(
    pipeline: &PplPipeline,
    tokens: &[TokenInfo],
    ctx: &CursorContext,
) -> CandidateSet {
    let mut candidates = CandidateSet::default();

    let Some(prev) = ctx.previous_token_index else {
        // Empty query: the search command can open with `source =` or a
        // bare field filter.
        candidates.token(TokenType::Source);
        candidates.rule(RuleId::Predicate, RuleContext::starting_at(0));
        return candidates;
    };

    let prev_type = tokens[prev].token_type;

    if prev_type == TokenType::Pipe {
        candidates.extend_tokens(PIPE_COMMANDS);
        return candidates;
    }

    let Some(command) = find_command(pipeline, prev) else {
        candidates.token(TokenType::Source);
        candidates.rule(RuleId::Predicate, RuleContext::starting_at(prev + 1));
        return candidates;
    };

    match command.kind {
        PplCommandKind::Search => search_candidates(&mut candidates, tokens, &command, prev),
        PplCommandKind::Where => {
            let start = condition_start(tokens, &command, prev);
            candidates.rule(RuleId::Predicate, RuleContext::starting_at(start));
            if condition_closed(tokens, start, prev) {
                candidates.extend_tokens(&[TokenType::And, TokenType::Or, TokenType::Pipe]);
            }
        }
        PplCommandKind::Fields => {
            if matches!(
                prev_type,
                TokenType::Fields | TokenType::Comma | TokenType::Minus | TokenType::Plus
            ) {
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1).with_rule_list(vec![RuleId::FieldList]),
                );
            } else {
                candidates.extend_tokens(&[TokenType::Comma, TokenType::Pipe]);
            }
        }
        PplCommandKind::Sort | PplCommandKind::Dedup | PplCommandKind::Top | PplCommandKind::Rare => {
            if matches!(
                prev_type,
                TokenType::Sort
                    | TokenType::Dedup
                    | TokenType::Top
                    | TokenType::Rare
                    | TokenType::Comma
                    | TokenType::Minus
                    | TokenType::Plus
            ) {
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1).with_rule_list(vec![RuleId::FieldList]),
                );
            } else {
                candidates.extend_tokens(&[TokenType::Comma, TokenType::Pipe]);
            }
        }
        PplCommandKind::Stats => stats_candidates(&mut candidates, tokens, &command, prev),
        PplCommandKind::Rename => {
            if prev_type == TokenType::Rename || prev_type == TokenType::Comma {
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1).with_rule_list(vec![RuleId::FieldList]),
                );
            } else if prev_type.is_identifier() && !alias_seen(tokens, &command, prev) {
                candidates.token(TokenType::As);
            } else if prev_type.is_identifier() {
                candidates.extend_tokens(&[TokenType::Comma, TokenType::Pipe]);
            }
        }
        PplCommandKind::Parse => {
            if prev_type == TokenType::Parse {
                candidates.rule(
                    RuleId::ColumnName,
                    RuleContext::starting_at(prev + 1).with_rule_list(vec![RuleId::FieldList]),
                );
            }
        }
        PplCommandKind::Eval => {
            if prev_type == TokenType::Eq {
                candidates.rule(RuleId::ColumnName, RuleContext::starting_at(prev + 1));
            } else if prev_type.is_identifier() || prev_type.is_literal() {
                candidates.extend_tokens(&[TokenType::Comma, TokenType::Pipe]);
            }
        }
        PplCommandKind::Head => {
            if prev_type == TokenType::Number {
                candidates.token(TokenType::Pipe);
            }
        }
        PplCommandKind::Unknown => {}
    }

    candidates
}

/// Candidate logic inside the leading search command.
fn search_candidates(
    candidates: &mut CandidateSet,
    tokens: &[TokenInfo],
    command: &PplCommand,
    prev: usize,
) {
    let prev_type = tokens[prev].token_type;

    if prev_type == TokenType::Source {
        candidates.token(TokenType::Eq);
        return;
    }

    // `source = ` names an index pattern; any other `=` is a field filter
    // handled by the predicate walker.
    if prev_type == TokenType::Eq {
        if let Some(before) = previous_meaningful(tokens, prev) {
            if tokens[before].token_type == TokenType::Source {
                candidates.rule(RuleId::TableName, RuleContext::starting_at(prev + 1));
                candidates.rule(
                    RuleId::FromClause,
                    RuleContext::starting_at(command.tokens.start),
                );
                return;
            }
        }
    }

    let filters_start = source_assignment_end(tokens, command);
    let start = trailing_filter_start(tokens, filters_start, prev);
    candidates.rule(RuleId::Predicate, RuleContext::starting_at(start));

    // Once the source (or a complete filter) is in place the pipeline can
    // continue.
    let source_present = first_meaningful(tokens, &command.tokens)
        .map(|i| tokens[i].token_type == TokenType::Source)
        .unwrap_or(false);
    let filters_closed = no_open_filter(tokens, start, prev);
    if (source_present || filters_start <= prev) && filters_closed {
        candidates.token(TokenType::Pipe);
    }
}

fn stats_candidates(
    candidates: &mut CandidateSet,
    tokens: &[TokenInfo],
    command: &PplCommand,
    prev: usize,
) {
    let prev_type = tokens[prev].token_type;
    match prev_type {
        TokenType::Stats | TokenType::Comma => {
            candidates.rule(RuleId::AggregateFunction, RuleContext::starting_at(prev + 1));
        }
        TokenType::LParen => {
            candidates.rule(
                RuleId::ColumnName,
                RuleContext::starting_at(prev + 1)
                    .with_rule_list(vec![RuleId::AggregateFunction]),
            );
        }
        TokenType::RParen => {
            candidates.extend_tokens(&[TokenType::By, TokenType::As, TokenType::Comma, TokenType::Pipe]);
        }
        TokenType::By => {
            candidates.rule(
                RuleId::ColumnName,
                RuleContext::starting_at(prev + 1).with_rule_list(vec![RuleId::FieldList]),
            );
        }
        TokenType::As => {}
        _ if prev_type.is_identifier() => {
            // After a `by` field or an `as` alias.
            if by_seen(tokens, command, prev) {
                candidates.extend_tokens(&[TokenType::Comma, TokenType::Pipe]);
            } else {
                candidates.extend_tokens(&[TokenType::By, TokenType::Comma, TokenType::Pipe]);
            }
        }
        _ => {}
    }
}

fn find_command(pipeline: &PplPipeline, token_index: usize) -> Option<PplCommand> {
    pipeline
        .commands
        .iter()
        .find(|c| c.tokens.contains(&token_index))
        .cloned()
}

fn previous_meaningful(tokens: &[TokenInfo], index: usize) -> Option<usize> {
    tokens[..index]
        .iter()
        .rposition(|t| !IGNORED_TOKENS.contains(&t.token_type))
}

/// Index just past the `source = <value>` assignment, where bare filters
/// begin. The source value is a run of tokens with no intervening space
/// (hyphenated index names lex as several tokens).
fn source_assignment_end(tokens: &[TokenInfo], command: &PplCommand) -> usize {
    let Some(head) = first_meaningful(tokens, &command.tokens) else {
        return command.tokens.start;
    };
    if tokens[head].token_type != TokenType::Source {
        return command.tokens.start;
    }
    let Some(eq) = next_meaningful(tokens, head, command.tokens.end) else {
        return command.tokens.end;
    };
    if tokens[eq].token_type != TokenType::Eq {
        return eq;
    }
    let Some(value_start) = next_meaningful(tokens, eq, command.tokens.end) else {
        return command.tokens.end;
    };
    let mut end = value_start;
    while end + 1 < command.tokens.end && tokens[end + 1].span.start == tokens[end].span.end {
        end += 1;
    }
    end + 1
}

fn next_meaningful(tokens: &[TokenInfo], index: usize, limit: usize) -> Option<usize> {
    ((index + 1)..limit).find(|&i| !IGNORED_TOKENS.contains(&tokens[i].token_type))
}

/// Start of the trailing (incomplete) `field = value` filter, past any
/// complete filters.
fn trailing_filter_start(tokens: &[TokenInfo], filters_start: usize, prev: usize) -> usize {
    let meaningful: Vec<usize> = (filters_start..=prev)
        .filter(|&i| !IGNORED_TOKENS.contains(&tokens[i].token_type))
        .collect();

    let mut start_pos = 0;
    let mut k = 0;
    while k < meaningful.len() {
        let token_type = tokens[meaningful[k]].token_type;
        if COMPARISON_TOKENS.contains(&token_type) {
            if k + 1 < meaningful.len() {
                // Consume the value (plus adjacent continuation tokens).
                let mut end = k + 1;
                while end + 1 < meaningful.len()
                    && tokens[meaningful[end + 1]].span.start == tokens[meaningful[end]].span.end
                {
                    end += 1;
                }
                start_pos = end + 1;
                k = end + 1;
                continue;
            }
            break;
        }
        k += 1;
    }

    meaningful.get(start_pos).copied().unwrap_or(prev + 1)
}

/// True when every filter before the cursor is complete.
fn no_open_filter(tokens: &[TokenInfo], start: usize, prev: usize) -> bool {
    (start..=prev).all(|i| IGNORED_TOKENS.contains(&tokens[i].token_type))
        || start > prev
}

/// Start of the trailing condition in a `where` command.
fn condition_start(tokens: &[TokenInfo], command: &PplCommand, prev: usize) -> usize {
    let boundaries = [TokenType::Where, TokenType::And, TokenType::Or];
    let mut boundary = command.tokens.start;
    for index in (command.tokens.start..=prev).rev() {
        if boundaries.contains(&tokens[index].token_type) {
            boundary = index;
            break;
        }
    }
    next_meaningful(tokens, boundary, tokens.len()).unwrap_or(boundary + 1)
}

fn condition_closed(tokens: &[TokenInfo], start: usize, prev: usize) -> bool {
    if prev < start {
        return false;
    }
    tokens[prev].token_type.is_literal()
}

fn alias_seen(tokens: &[TokenInfo], command: &PplCommand, prev: usize) -> bool {
    (command.tokens.start..prev).any(|i| tokens[i].token_type == TokenType::As)
}

fn by_seen(tokens: &[TokenInfo], command: &PplCommand, prev: usize) -> bool {
    (command.tokens.start..prev).any(|i| tokens[i].token_type == TokenType::By)
}
