//! Per-language static artifacts and candidate collection.
//!
//! Each language owns a token dictionary, an ignored-token set, keyword
//! follow-set tables, operator/aggregate-function/template tables, a
//! rule-action table for the mapper, and a candidate collector that walks
//! the parse tree at the cursor. All static artifacts are process-wide
//! immutable configuration behind read-only accessors; nothing here is
//! mutated after first use.

pub(crate) mod dql;
pub(crate) mod ppl;
pub(crate) mod sql;

use std::collections::{HashMap, HashSet};

use crate::cursor::CursorContext;
use crate::lexer::TokenType;
use crate::parser::{ParseResult, ParseTree};
use crate::rules::{CandidateSet, RuleAction, RuleId};
use crate::types::Language;

/// An aggregate function entry: completion text plus snippet insert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateFunction {
    pub text: &'static str,
    pub insert_text: &'static str,
}

/// A canned statement skeleton offered regardless of schema availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub text: &'static str,
    pub insert_text: &'static str,
}

/// The language's token dictionary: symbolic token name → token-type id.
///
/// Built once per language and never mutated afterwards.
pub fn token_dictionary(language: Language) -> &'static HashMap<&'static str, TokenType> {
    match language {
        Language::Sql => &sql::TOKEN_DICTIONARY,
        Language::Ppl => &ppl::TOKEN_DICTIONARY,
        Language::Dql => &dql::TOKEN_DICTIONARY,
    }
}

/// Token types excluded when resolving the previous meaningful token.
pub fn ignored_tokens(language: Language) -> &'static HashSet<TokenType> {
    match language {
        Language::Sql => &sql::IGNORED_TOKENS,
        Language::Ppl => &ppl::IGNORED_TOKENS,
        Language::Dql => &dql::IGNORED_TOKENS,
    }
}

/// Classifies an uppercased word as one of the language's keywords.
pub(crate) fn keyword_token(language: Language, upper: &str) -> Option<TokenType> {
    let keywords: &[(&str, TokenType)] = match language {
        Language::Sql => sql::KEYWORDS,
        Language::Ppl => ppl::KEYWORDS,
        Language::Dql => dql::KEYWORDS,
    };
    keywords
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, token)| *token)
}

/// Static rule-id → suggestion-action table for the mapper.
pub(crate) fn rule_actions(language: Language) -> &'static [(RuleId, &'static [RuleAction])] {
    match language {
        Language::Sql => sql::RULE_ACTIONS,
        Language::Ppl => ppl::RULE_ACTIONS,
        Language::Dql => dql::RULE_ACTIONS,
    }
}

/// Collects the grammar rules and keyword tokens reachable at the cursor.
pub(crate) fn collect_candidates(
    language: Language,
    parsed: &ParseResult,
    ctx: &CursorContext,
) -> CandidateSet {
    match (language, &parsed.tree) {
        (Language::Sql, ParseTree::Sql(statements)) => {
            sql::collect_candidates(statements, &parsed.tokens, ctx)
        }
        (Language::Ppl, ParseTree::Ppl(pipeline)) => {
            ppl::collect_candidates(pipeline, &parsed.tokens, ctx)
        }
        (Language::Dql, ParseTree::Dql(query)) => {
            dql::collect_candidates(query, &parsed.tokens, ctx)
        }
        // A tree of the wrong language cannot occur through `parse`, but a
        // caller assembling a ParseResult by hand degrades to no candidates.
        _ => CandidateSet::default(),
    }
}

/// The language's aggregate-function table.
pub fn aggregate_functions(language: Language) -> &'static [AggregateFunction] {
    match language {
        Language::Sql => sql::AGGREGATE_FUNCTIONS,
        Language::Ppl => ppl::AGGREGATE_FUNCTIONS,
        Language::Dql => &[],
    }
}

/// Comparison operators offered at the operator position of a predicate.
pub(crate) fn operator_texts(language: Language) -> &'static [&'static str] {
    match language {
        Language::Sql => sql::OPERATORS,
        Language::Ppl => ppl::OPERATORS,
        Language::Dql => dql::OPERATORS,
    }
}

/// Token types acting as comparison operators in the predicate walker.
pub(crate) fn comparison_tokens(language: Language) -> &'static [TokenType] {
    match language {
        Language::Sql => sql::COMPARISON_TOKENS,
        Language::Ppl => ppl::COMPARISON_TOKENS,
        Language::Dql => dql::COMPARISON_TOKENS,
    }
}

/// Static canned snippets for the language.
pub fn templates(language: Language) -> &'static [Template] {
    match language {
        Language::Sql => sql::TEMPLATES,
        Language::Ppl => ppl::TEMPLATES,
        Language::Dql => dql::TEMPLATES,
    }
}

/// Surface text a keyword/punctuation token renders as in suggestions.
/// SQL keywords render uppercase, PPL and DQL keywords lowercase.
pub(crate) fn token_text(language: Language, token: TokenType) -> Option<&'static str> {
    if let Some(text) = punctuation_text(token) {
        return Some(text);
    }
    match language {
        Language::Sql => sql::keyword_surface(token),
        Language::Ppl => ppl::keyword_surface(token),
        Language::Dql => dql::keyword_surface(token),
    }
}

/// Documentation string for a keyword, when the language defines one.
pub(crate) fn token_documentation(language: Language, token: TokenType) -> Option<&'static str> {
    match language {
        Language::Ppl => ppl::command_documentation(token),
        Language::Sql | Language::Dql => None,
    }
}

/// Insert text for a schema field suggestion.
///
/// Inside an aggregate call the bare name is inserted; elsewhere the
/// language's continuation (trailing space, or ` : ` for DQL) is appended.
pub(crate) fn field_insert_text(language: Language, name: &str, in_aggregate: bool) -> String {
    if in_aggregate {
        return name.to_string();
    }
    match language {
        Language::Sql | Language::Ppl => format!("{name} "),
        Language::Dql => format!("{name} : "),
    }
}

/// Insert text for a fetched column value.
pub(crate) fn value_insert_text(language: Language, value: &str) -> String {
    let quoted = value.parse::<f64>().is_err() && value != "true" && value != "false";
    match (language, quoted) {
        (Language::Dql, true) => format!("\"{value}\" "),
        (_, true) => format!("'{value}' "),
        (_, false) => format!("{value} "),
    }
}

fn punctuation_text(token: TokenType) -> Option<&'static str> {
    Some(match token {
        TokenType::Eq => "=",
        TokenType::NotEq => "!=",
        TokenType::Lt => "<",
        TokenType::LtEq => "<=",
        TokenType::Gt => ">",
        TokenType::GtEq => ">=",
        TokenType::Plus => "+",
        TokenType::Minus => "-",
        TokenType::Star => "*",
        TokenType::Slash => "/",
        TokenType::Percent => "%",
        TokenType::Comma => ",",
        TokenType::Dot => ".",
        TokenType::Colon => ":",
        TokenType::Semicolon => ";",
        TokenType::LParen => "(",
        TokenType::RParen => ")",
        TokenType::LBracket => "[",
        TokenType::RBracket => "]",
        TokenType::Pipe => "|",
        _ => return None,
    })
}
