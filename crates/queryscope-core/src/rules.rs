//! Grammar rule identities shared by the per-language candidate collectors
//! and the rule-to-suggestion mapper.
//!
//! A rule is "visited" when the derivation of the input up to the cursor
//! touches it. Collectors record each visited rule together with a small
//! per-occurrence context (where the occurrence started, and the rules
//! enclosing it); the mapper turns visited rules into suggestion flags via a
//! static per-language action table.

use std::collections::HashMap;

use crate::lexer::TokenType;

/// Named grammar productions recognized across the supported languages.
///
/// Not every language uses every rule; each language's action table maps the
/// subset it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// Top-level statement (SQL) or pipeline (PPL).
    Statement,
    /// Contents of a FROM/source clause.
    FromClause,
    /// A table / index-pattern reference position.
    TableName,
    /// A column reference position.
    ColumnName,
    /// An aggregate-function position.
    AggregateFunction,
    /// A comparison/IN predicate; drives the column-value state machine.
    Predicate,
    /// SQL `SELECT` projection list.
    SelectElements,
    /// SQL `GROUP BY` element list.
    GroupByElements,
    /// SQL `ORDER BY` element list.
    OrderByElements,
    /// PPL field list (`fields`, `sort`, `dedup`, ...).
    FieldList,
    /// DQL `field` position.
    FieldExpression,
    /// DQL `field : value` position.
    ValueExpression,
}

/// Per-occurrence context captured for a visited rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleContext {
    /// Index of the token where this rule occurrence starts.
    pub start_token_index: usize,
    /// Rules enclosing this occurrence, outermost first.
    pub rule_list: Vec<RuleId>,
}

impl RuleContext {
    pub fn starting_at(start_token_index: usize) -> Self {
        Self {
            start_token_index,
            rule_list: Vec::new(),
        }
    }

    pub fn with_rule_list(mut self, rule_list: Vec<RuleId>) -> Self {
        self.rule_list = rule_list;
        self
    }
}

/// Rules visited at the cursor, keyed by rule id.
///
/// A rule may recur within one parse; the map holds the occurrence relevant
/// to the cursor. Created fresh per suggestion request.
pub type VisitedRules = HashMap<RuleId, RuleContext>;

/// Everything a language's candidate collector reports for one cursor
/// position: the visited rules plus the keyword tokens in the follow-set.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub rules: VisitedRules,
    pub tokens: Vec<TokenType>,
}

impl CandidateSet {
    pub(crate) fn rule(&mut self, id: RuleId, context: RuleContext) -> &mut Self {
        self.rules.insert(id, context);
        self
    }

    pub(crate) fn token(&mut self, token: TokenType) -> &mut Self {
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
        self
    }

    pub(crate) fn extend_tokens(&mut self, tokens: &[TokenType]) -> &mut Self {
        for token in tokens {
            self.token(*token);
        }
        self
    }
}

/// Suggestion-flag mutation triggered by a visited rule.
///
/// The per-language `rule_actions` tables pair rule ids with these; the
/// mapper applies them with a non-exclusive OR, so several rules visited at
/// one cursor position each contribute their categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Set `suggest_views_or_tables`.
    Tables,
    /// Set `suggest_columns`.
    Columns,
    /// Set `suggest_aggregate_functions`.
    AggregateFunctions,
    /// Run the column-value predicate walker from the rule's start token.
    Predicate,
}
