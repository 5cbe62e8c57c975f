//! Cursor-context extraction.
//!
//! Maps a byte offset into the token stream: the token index at the cursor,
//! the nearest meaningful previous token, and the partially-typed word under
//! the cursor.

use std::collections::HashSet;

use crate::lexer::{TokenInfo, TokenType};

/// Where the cursor sits in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorContext {
    /// Index of the token the cursor is typing into, or of the first token
    /// at/after the cursor (the EOF token when the cursor is past all real
    /// tokens, so follow-set suggestions still apply).
    pub cursor_token_index: usize,
    /// Nearest previous token whose type is not in the ignored set.
    pub previous_token_index: Option<usize>,
    /// The portion of the word under the cursor from its start to the
    /// cursor; empty at a token boundary.
    pub partial_word: String,
}

/// Resolves `cursor_offset` against the token stream.
///
/// `ignored` is the language's ignored-token set (whitespace, comments,
/// end-of-input marker), consulted when walking back to the previous token.
pub fn locate(
    tokens: &[TokenInfo],
    cursor_offset: usize,
    ignored: &HashSet<TokenType>,
) -> CursorContext {
    // A cursor strictly inside (or at the end of) a word token is mid-typing:
    // extract the partial word. Boundaries and whitespace fall through.
    let inside = tokens.iter().enumerate().find(|(_, token)| {
        token.token_type.is_word()
            && token.span.start < cursor_offset
            && cursor_offset <= token.span.end
    });

    let (cursor_token_index, partial_word) = match inside {
        Some((index, token)) => {
            let typed = cursor_offset - token.span.start;
            (index, token.text.get(..typed).unwrap_or_default().to_string())
        }
        None => {
            let index = tokens
                .iter()
                .position(|token| token.span.start >= cursor_offset)
                .unwrap_or(tokens.len().saturating_sub(1));
            (index, String::new())
        }
    };

    let previous_token_index = tokens[..cursor_token_index]
        .iter()
        .rposition(|token| !ignored.contains(&token.token_type));

    CursorContext {
        cursor_token_index,
        previous_token_index,
        partial_word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages;
    use crate::lexer::tokenize;
    use crate::types::Language;

    fn locate_sql(query: &str, cursor_offset: usize) -> (Vec<TokenInfo>, CursorContext) {
        let (tokens, _) = tokenize(query, Language::Sql);
        let ctx = locate(
            &tokens,
            cursor_offset,
            languages::ignored_tokens(Language::Sql),
        );
        (tokens, ctx)
    }

    #[test]
    fn test_cursor_at_start() {
        let (tokens, ctx) = locate_sql("SELECT 1", 0);
        assert_eq!(ctx.cursor_token_index, 0);
        assert_eq!(tokens[0].token_type, TokenType::Select);
        assert_eq!(ctx.previous_token_index, None);
        assert_eq!(ctx.partial_word, "");
    }

    #[test]
    fn test_cursor_mid_word_extracts_partial() {
        let query = "SELECT * FRO";
        let (_, ctx) = locate_sql(query, query.len());
        assert_eq!(ctx.partial_word, "FRO");
    }

    #[test]
    fn test_cursor_inside_keyword() {
        // Cursor between "SEL" and "ECT".
        let (tokens, ctx) = locate_sql("SELECT 1", 3);
        assert_eq!(tokens[ctx.cursor_token_index].token_type, TokenType::Select);
        assert_eq!(ctx.partial_word, "SEL");
    }

    #[test]
    fn test_cursor_in_trailing_whitespace_resolves_to_eof() {
        let query = "SELECT * FROM ";
        let (tokens, ctx) = locate_sql(query, query.len());
        assert_eq!(
            tokens[ctx.cursor_token_index].token_type,
            TokenType::Eof,
            "trailing cursor should resolve to the end-of-input token"
        );
        assert_eq!(ctx.partial_word, "");
        // Previous token skips the whitespace.
        let prev = ctx.previous_token_index.expect("previous token");
        assert_eq!(tokens[prev].token_type, TokenType::From);
    }

    #[test]
    fn test_previous_token_skips_comments() {
        let query = "SELECT a /* projection */ ";
        let (tokens, ctx) = locate_sql(query, query.len());
        let prev = ctx.previous_token_index.expect("previous token");
        assert_eq!(tokens[prev].token_type, TokenType::Ident);
        assert_eq!(tokens[prev].text, "a");
    }

    #[test]
    fn test_cursor_at_word_boundary_has_empty_partial() {
        // Cursor right before FROM.
        let query = "SELECT * FROM t";
        let offset = query.find("FROM").unwrap();
        let (tokens, ctx) = locate_sql(query, offset);
        assert_eq!(ctx.partial_word, "");
        assert_eq!(tokens[ctx.cursor_token_index].token_type, TokenType::From);
    }

    #[test]
    fn test_cursor_after_operator_has_empty_partial() {
        let query = "a = ";
        let offset = 3;
        let (_, ctx) = locate_sql(query, offset);
        assert_eq!(ctx.partial_word, "");
        let prev = ctx.previous_token_index.expect("previous token");
        assert_eq!(prev, 2); // the `=` token (a, space, =)
    }
}
