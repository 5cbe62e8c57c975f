//! Error-tolerant parser adapter.
//!
//! `parse` never fails: syntax problems are recorded as [`ParseError`]s and
//! the result still carries a token stream spanning the full input plus a
//! best-effort tree. The tree is a clause/command segmentation built by
//! panic-mode scanning: SQL resynchronizes at statement boundaries (`;`)
//! and clause keywords, PPL at pipe (`|`) boundaries, DQL at `and`/`or`
//! connectives. That is all the downstream candidate collectors need.

use std::ops::Range;

use crate::error::ParseError;
use crate::languages;
use crate::lexer::{self, TokenInfo};
use crate::types::{Language, Span};

/// Grammar production the parse is rooted at.
///
/// The adapter is a thin dispatcher: the caller selects the entry rule, the
/// adapter does not guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryRule {
    /// A full top-level statement (the default).
    #[default]
    Statement,
    /// A from/source-clause fragment, e.g. a bare `tbl AS t` or `source=x`
    /// pasted without its surrounding statement.
    FromClause,
}

/// Output of the parser adapter.
///
/// Created fresh per suggestion request and discarded after use.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Best-effort, possibly error-recovered tree.
    pub tree: ParseTree,
    /// Token stream covering the entire input, EOF-terminated.
    pub tokens: Vec<TokenInfo>,
    /// Tolerated syntax errors.
    pub errors: Vec<ParseError>,
}

/// The (possibly partial) syntactic structure of the input.
#[derive(Debug, Clone)]
pub enum ParseTree {
    Sql(Vec<SqlStatement>),
    Ppl(PplPipeline),
    Dql(DqlQuery),
}

/// One SQL statement, segmented into clauses.
#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub span: Span,
    pub clauses: Vec<SqlClause>,
}

/// A clause segment: its kind and the token-index range it covers
/// (including the introducing keyword).
#[derive(Debug, Clone)]
pub struct SqlClause {
    pub kind: SqlClauseKind,
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlClauseKind {
    /// Tokens before any recognized clause keyword.
    Leading,
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    On,
}

/// A PPL pipeline: the search command plus piped commands.
#[derive(Debug, Clone, Default)]
pub struct PplPipeline {
    pub commands: Vec<PplCommand>,
}

/// A command segment between pipes (the pipe token itself is not included).
#[derive(Debug, Clone)]
pub struct PplCommand {
    pub kind: PplCommandKind,
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PplCommandKind {
    /// The leading `source = idx` / bare filter command.
    Search,
    Where,
    Fields,
    Stats,
    Sort,
    Eval,
    Rename,
    Head,
    Dedup,
    Top,
    Rare,
    Parse,
    Unknown,
}

/// A DQL query: terms separated by `and`/`or` connectives.
#[derive(Debug, Clone, Default)]
pub struct DqlQuery {
    pub terms: Vec<DqlTerm>,
}

/// One `field : value` (or bare) term; the connective is not included.
#[derive(Debug, Clone)]
pub struct DqlTerm {
    pub tokens: Range<usize>,
}

/// Parses `query` for `language`, rooted at `entry_rule`.
#[must_use]
pub fn parse(query: &str, language: Language, entry_rule: EntryRule) -> ParseResult {
    let (tokens, mut errors) = lexer::tokenize(query, language);

    let tree = match language {
        Language::Sql => ParseTree::Sql(languages::sql::build_statements(
            query,
            &tokens,
            entry_rule,
            &mut errors,
        )),
        Language::Ppl => ParseTree::Ppl(languages::ppl::build_pipeline(
            query,
            &tokens,
            entry_rule,
            &mut errors,
        )),
        Language::Dql => ParseTree::Dql(languages::dql::build_query(query, &tokens, &mut errors)),
    };

    ParseResult {
        tree,
        tokens,
        errors,
    }
}
