//! The suggestion engine: the public entry point tying the pipeline
//! together.
//!
//! Each keystroke issues a new, independent request. The synchronous stages
//! (parse, cursor resolution, rule mapping, ranking) complete inline; only
//! the schema-driven value fetch awaits, guarded by a monotonically
//! increasing generation counter so a slow fetch from an earlier request can
//! never contribute to a later request's output.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cursor;
use crate::enrich::{enrich_autocomplete_result, GenerationGuard, ValueFetcher};
use crate::format::format_suggestions;
use crate::languages;
use crate::lexer;
use crate::mapper;
use crate::parser::{parse, EntryRule, ParseResult};
use crate::types::{Cursor, IndexPatternSchema, Language, QuerySuggestion, Span};

/// Caller-supplied collaborators.
///
/// The request is served only when services are present at all; the value
/// fetcher inside may still be absent, which only disables value
/// suggestions.
#[derive(Default)]
pub struct SuggestionServices<'a> {
    pub value_fetcher: Option<&'a dyn ValueFetcher>,
}

/// One suggestion request.
#[derive(Default)]
pub struct SuggestionRequest<'a> {
    pub query: &'a str,
    pub language: Language,
    /// Editor cursor (1-based line/column).
    pub position: Cursor,
    /// Active selection, as byte offsets; equal offsets mean no selection.
    pub selection_start: usize,
    pub selection_end: usize,
    pub index_pattern: Option<&'a IndexPatternSchema>,
    pub services: Option<&'a SuggestionServices<'a>>,
}

/// The autocomplete engine.
///
/// Holds no per-request state beyond the generation counter; one engine
/// serves all languages and all editors of a process.
#[derive(Debug, Default)]
pub struct SuggestionEngine {
    generation: AtomicU64,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Computes ranked suggestions for the request.
    ///
    /// Never fails: missing `index_pattern` or `services` resolve
    /// immediately to an empty list, and every internal error path degrades
    /// instead of propagating.
    pub async fn get_suggestions(&self, request: &SuggestionRequest<'_>) -> Vec<QuerySuggestion> {
        let (Some(schema), Some(services)) = (request.index_pattern, request.services) else {
            return Vec::new();
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let cursor_offset = resolve_cursor_offset(request.query, &request.position);
        let parsed = parse(request.query, request.language, EntryRule::Statement);
        let ctx = cursor::locate(
            &parsed.tokens,
            cursor_offset,
            languages::ignored_tokens(request.language),
        );

        let candidates = languages::collect_candidates(request.language, &parsed, &ctx);
        let mut base = mapper::process_visited_rules(
            &candidates,
            ctx.cursor_token_index,
            &parsed.tokens,
            request.language,
        );
        base.errors = parsed.errors.clone();

        let guard = GenerationGuard::new(&self.generation, generation);
        let enriched = enrich_autocomplete_result(
            base,
            request.language,
            Some(schema),
            services.value_fetcher,
            Some(&guard),
        )
        .await;

        let replace_range = replace_range(request, &parsed, &ctx, cursor_offset);
        format_suggestions(&enriched, &ctx.partial_word, replace_range)
    }
}

/// Resolves the editor position to a byte offset, clamped into the query
/// and floored to a character boundary (fail-soft for out-of-range
/// positions).
fn resolve_cursor_offset(query: &str, position: &Cursor) -> usize {
    let mut offset = lexer::line_col_to_offset(query, position.line, position.column)
        .unwrap_or(query.len())
        .min(query.len());
    while offset > 0 && !query.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn replace_range(
    request: &SuggestionRequest<'_>,
    parsed: &ParseResult,
    ctx: &cursor::CursorContext,
    cursor_offset: usize,
) -> Option<Span> {
    if request.selection_end > request.selection_start {
        return Some(Span::new(
            request.selection_start,
            request.selection_end.min(request.query.len()),
        ));
    }
    if ctx.partial_word.is_empty() {
        return None;
    }
    let token = parsed.tokens.get(ctx.cursor_token_index)?;
    Some(Span::new(token.span.start, cursor_offset))
}
