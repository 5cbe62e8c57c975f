//! Shared lexer for the suggestion pipeline.
//!
//! Tokenization is built on the `sqlparser` tokenizer with per-language
//! keyword classification layered on top. SQL and PPL tokenize with the
//! MySQL-flavored dialect (backtick-quoted identifiers), DQL with the generic
//! dialect. The token stream always covers the entire input and is terminated
//! by a synthetic [`TokenType::Eof`] token, even when the input cannot be
//! fully lexed: an unterminated quote is patched and retokenized, and any
//! remaining unlexable tail is represented as a single
//! [`TokenType::Unknown`] token.

use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect};
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Whitespace};

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::error::{ParseError, ParseErrorKind};
use crate::languages;
use crate::types::{Language, Span};

/// Maximum query size (1MB). Per-keystroke input far beyond this indicates a
/// runaway caller, not a query.
pub const MAX_QUERY_LENGTH: usize = 1024 * 1024;

/// Token-type id shared by all query languages.
///
/// The space is the union of the lexical classes and every language's
/// keywords; each language's token dictionary selects the names it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Lexical classes
    Space,
    Comment,
    Ident,
    BacktickIdent,
    QuotedIdent,
    Number,
    StringLiteral,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Comma,
    Dot,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Unknown,
    /// Synthetic end-of-input marker appended to every token stream.
    Eof,
    // SQL keywords
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Limit,
    Join,
    Left,
    Right,
    Inner,
    Outer,
    Cross,
    On,
    As,
    Distinct,
    And,
    Or,
    Not,
    In,
    Like,
    Between,
    Is,
    Null,
    True,
    False,
    Exists,
    // PPL command keywords
    Source,
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
}

impl TokenType {
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::Ident | Self::BacktickIdent | Self::QuotedIdent)
    }

    pub fn is_keyword(self) -> bool {
        !matches!(
            self,
            Self::Space
                | Self::Comment
                | Self::Ident
                | Self::BacktickIdent
                | Self::QuotedIdent
                | Self::Number
                | Self::StringLiteral
                | Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Slash
                | Self::Percent
                | Self::Comma
                | Self::Dot
                | Self::Colon
                | Self::Semicolon
                | Self::LParen
                | Self::RParen
                | Self::LBracket
                | Self::RBracket
                | Self::Pipe
                | Self::Unknown
                | Self::Eof
        )
    }

    /// Identifier or keyword: something the user types character by
    /// character, eligible for partial-word extraction.
    pub fn is_word(self) -> bool {
        self.is_identifier() || self.is_keyword()
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Number | Self::StringLiteral | Self::True | Self::False
        )
    }
}

/// A lexical unit with its type id and byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub token_type: TokenType,
    pub text: String,
    pub span: Span,
}

impl TokenInfo {
    fn eof(offset: usize) -> Self {
        Self {
            token_type: TokenType::Eof,
            text: String::new(),
            span: Span::new(offset, offset),
        }
    }
}

/// Tokenizes `query` for `language`.
///
/// Never fails: lexer problems are recorded as [`ParseError`]s and the
/// returned stream still spans the full input.
pub fn tokenize(query: &str, language: Language) -> (Vec<TokenInfo>, Vec<ParseError>) {
    let mut errors = Vec::new();

    if query.len() > MAX_QUERY_LENGTH {
        errors.push(
            ParseError::new(format!(
                "query exceeds maximum length of {MAX_QUERY_LENGTH} bytes ({} bytes provided)",
                query.len()
            ))
            .with_kind(ParseErrorKind::LexerError),
        );
        return (vec![TokenInfo::eof(0)], errors);
    }

    match raw_tokens(query, language) {
        Ok(raw) => {
            let mut tokens = classify(query, &raw, language);
            tokens.push(TokenInfo::eof(query.len()));
            (tokens, errors)
        }
        Err(err) => {
            let parse_error = ParseError::from(err);
            errors.push(parse_error.clone());
            let tokens = recover_tokens(query, language, &parse_error);
            (tokens, errors)
        }
    }
}

fn dialect_for(language: Language) -> Box<dyn Dialect> {
    match language {
        // SQL and PPL both use backtick-quoted identifiers and
        // double-quoted string literals.
        Language::Sql | Language::Ppl => Box::new(MySqlDialect {}),
        Language::Dql => Box::new(GenericDialect {}),
    }
}

fn raw_tokens(
    query: &str,
    language: Language,
) -> Result<Vec<TokenWithSpan>, sqlparser::tokenizer::TokenizerError> {
    let dialect = dialect_for(language);
    let mut tokenizer = Tokenizer::new(dialect.as_ref(), query);
    tokenizer.tokenize_with_location()
}

/// Recovery path when the tokenizer rejects the input outright.
///
/// First patches an unterminated quote (the dominant mid-keystroke failure)
/// and retokenizes; otherwise lexes the prefix before the error position and
/// covers the tail with a single `Unknown` token.
fn recover_tokens(query: &str, language: Language, error: &ParseError) -> Vec<TokenInfo> {
    if let Some(patched) = patch_unclosed_quote(query) {
        if let Ok(raw) = raw_tokens(&patched, language) {
            #[cfg(feature = "tracing")]
            trace!("tokenizer recovered by closing an unterminated quote");
            // Spans from the patched text are clipped back to the source
            // inside `classify`.
            let mut tokens = classify(query, &raw, language);
            tokens.push(TokenInfo::eof(query.len()));
            return tokens;
        }
    }

    let split = error
        .position
        .and_then(|pos| line_col_to_offset(query, pos.line, pos.column))
        .unwrap_or(0);

    let mut tokens = match raw_tokens(&query[..split], language) {
        Ok(raw) if split > 0 => classify(query, &raw, language),
        _ => Vec::new(),
    };
    let unknown_start = tokens.last().map(|t| t.span.end).unwrap_or(0);
    if unknown_start < query.len() {
        tokens.push(TokenInfo {
            token_type: TokenType::Unknown,
            text: query[unknown_start..].to_string(),
            span: Span::new(unknown_start, query.len()),
        });
    }
    tokens.push(TokenInfo::eof(query.len()));
    tokens
}

fn patch_unclosed_quote(query: &str) -> Option<String> {
    for quote in ['\'', '"', '`'] {
        if query.chars().filter(|&c| c == quote).count() % 2 != 0 {
            return Some(format!("{query}{quote}"));
        }
    }
    None
}

fn classify(query: &str, raw: &[TokenWithSpan], language: Language) -> Vec<TokenInfo> {
    let mut tokens = Vec::with_capacity(raw.len());
    for token in raw {
        let Some(span) = token_span_to_offsets(query, &token.span) else {
            continue;
        };
        let span = Span::new(span.start.min(query.len()), span.end.min(query.len()));
        let token_type = classify_token(&token.token, language);
        let text = query.get(span.start..span.end).unwrap_or_default().to_string();
        tokens.push(TokenInfo {
            token_type,
            text,
            span,
        });
    }
    tokens
}

fn classify_token(token: &Token, language: Language) -> TokenType {
    match token {
        Token::Whitespace(Whitespace::SingleLineComment { .. })
        | Token::Whitespace(Whitespace::MultiLineComment(_)) => TokenType::Comment,
        Token::Whitespace(_) => TokenType::Space,
        Token::Word(word) => match word.quote_style {
            Some('`') => TokenType::BacktickIdent,
            Some(_) => TokenType::QuotedIdent,
            None => languages::keyword_token(language, &word.value.to_ascii_uppercase())
                .unwrap_or(TokenType::Ident),
        },
        Token::Number(_, _) => TokenType::Number,
        Token::SingleQuotedString(_)
        | Token::DoubleQuotedString(_)
        | Token::NationalStringLiteral(_)
        | Token::EscapedStringLiteral(_)
        | Token::HexStringLiteral(_) => TokenType::StringLiteral,
        Token::Eq | Token::DoubleEq | Token::Assignment => TokenType::Eq,
        Token::Neq => TokenType::NotEq,
        Token::Lt => TokenType::Lt,
        Token::LtEq => TokenType::LtEq,
        Token::Gt => TokenType::Gt,
        Token::GtEq => TokenType::GtEq,
        Token::Plus => TokenType::Plus,
        Token::Minus => TokenType::Minus,
        Token::Mul => TokenType::Star,
        Token::Div => TokenType::Slash,
        Token::Mod => TokenType::Percent,
        Token::Comma => TokenType::Comma,
        Token::Period => TokenType::Dot,
        Token::Colon => TokenType::Colon,
        Token::SemiColon => TokenType::Semicolon,
        Token::LParen => TokenType::LParen,
        Token::RParen => TokenType::RParen,
        Token::LBracket => TokenType::LBracket,
        Token::RBracket => TokenType::RBracket,
        Token::Pipe => TokenType::Pipe,
        _ => TokenType::Unknown,
    }
}

fn token_span_to_offsets(query: &str, span: &sqlparser::tokenizer::Span) -> Option<Span> {
    let start = line_col_to_offset(query, span.start.line as usize, span.start.column as usize)?;
    let end = line_col_to_offset(query, span.end.line as usize, span.end.column as usize)
        .unwrap_or(query.len());
    Some(Span::new(start, end))
}

/// Calculates the byte offset for a given 1-indexed line and column.
///
/// Columns are counted in characters, matching tokenizer and editor
/// conventions; the result is a byte offset into `query`.
pub fn line_col_to_offset(query: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }

    let bytes = query.as_bytes();
    let mut current_line = 1;
    let mut offset = 0;

    while current_line < line {
        let remaining = bytes.get(offset..)?;
        let newline_pos = remaining.iter().position(|&b| b == b'\n')?;
        offset += newline_pos + 1;
        current_line += 1;
    }

    let line_start = offset;
    let remaining = bytes.get(line_start..)?;
    let line_len = remaining
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(remaining.len());
    let line_end = line_start + line_len;
    let line_slice = &query[line_start..line_end];

    let mut current_column = 1;
    for (rel_offset, _) in line_slice.char_indices() {
        if current_column == column {
            return Some(line_start + rel_offset);
        }
        current_column += 1;
    }

    if column == current_column {
        return Some(line_end);
    }

    None
}

/// Converts a byte offset back into a 1-indexed line/column pair.
pub fn offset_to_line_col(query: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(query.len());
    let before = &query[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map(|pos| pos + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(tokens: &[TokenInfo]) -> Vec<TokenType> {
        tokens.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_tokenize_sql_keywords() {
        let (tokens, errors) = tokenize("SELECT * FROM users", Language::Sql);
        assert!(errors.is_empty());
        assert_eq!(
            types(&tokens),
            vec![
                TokenType::Select,
                TokenType::Space,
                TokenType::Star,
                TokenType::Space,
                TokenType::From,
                TokenType::Space,
                TokenType::Ident,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_spans_cover_input() {
        let query = "SELECT a FROM t";
        let (tokens, _) = tokenize(query, Language::Sql);
        let eof = tokens.last().expect("eof token");
        assert_eq!(eof.token_type, TokenType::Eof);
        assert_eq!(eof.span, Span::new(query.len(), query.len()));
        // Non-EOF tokens tile the input without gaps.
        let mut expected_start = 0;
        for token in &tokens[..tokens.len() - 1] {
            assert_eq!(token.span.start, expected_start, "gap before {token:?}");
            expected_start = token.span.end;
        }
        assert_eq!(expected_start, query.len());
    }

    #[test]
    fn test_tokenize_ppl_commands() {
        let (tokens, errors) = tokenize("source = logs | stats avg(bytes)", Language::Ppl);
        assert!(errors.is_empty());
        let meaningful: Vec<TokenType> = tokens
            .iter()
            .map(|t| t.token_type)
            .filter(|t| *t != TokenType::Space)
            .collect();
        assert_eq!(
            meaningful,
            vec![
                TokenType::Source,
                TokenType::Eq,
                TokenType::Ident,
                TokenType::Pipe,
                TokenType::Stats,
                TokenType::Ident,
                TokenType::LParen,
                TokenType::Ident,
                TokenType::RParen,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_ppl_keywords_are_plain_idents_in_sql() {
        let (tokens, _) = tokenize("source", Language::Sql);
        assert_eq!(tokens[0].token_type, TokenType::Ident);
    }

    #[test]
    fn test_tokenize_dql_colon_expression() {
        let (tokens, errors) = tokenize("status : 200 and level : error", Language::Dql);
        assert!(errors.is_empty());
        let meaningful: Vec<TokenType> = tokens
            .iter()
            .map(|t| t.token_type)
            .filter(|t| *t != TokenType::Space)
            .collect();
        assert_eq!(
            meaningful,
            vec![
                TokenType::Ident,
                TokenType::Colon,
                TokenType::Number,
                TokenType::And,
                TokenType::Ident,
                TokenType::Colon,
                TokenType::Ident,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_backtick_identifier() {
        let (tokens, _) = tokenize("`my-field`", Language::Ppl);
        assert_eq!(tokens[0].token_type, TokenType::BacktickIdent);
        assert_eq!(tokens[0].text, "`my-field`");
    }

    #[test]
    fn test_unterminated_string_recovers() {
        let query = "SELECT 'abc";
        let (tokens, errors) = tokenize(query, Language::Sql);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::LexerError);
        assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::Eof));
        assert!(tokens
            .iter()
            .any(|t| t.token_type == TokenType::StringLiteral));
        // Stream still covers the whole input.
        assert!(tokens.iter().all(|t| t.span.end <= query.len()));
    }

    #[test]
    fn test_empty_input_yields_only_eof() {
        let (tokens, errors) = tokenize("", Language::Sql);
        assert!(errors.is_empty());
        assert_eq!(types(&tokens), vec![TokenType::Eof]);
    }

    #[test]
    fn test_line_col_to_offset() {
        let query = "SELECT 1\nFROM t";
        assert_eq!(line_col_to_offset(query, 1, 1), Some(0));
        assert_eq!(line_col_to_offset(query, 2, 1), Some(9));
        assert_eq!(line_col_to_offset(query, 2, 7), Some(query.len()));
        assert_eq!(line_col_to_offset(query, 3, 1), None);
        assert_eq!(line_col_to_offset(query, 0, 1), None);
    }

    #[test]
    fn test_line_col_to_offset_multibyte() {
        let query = "SELECT μ, x";
        // Column counts characters, not bytes.
        assert_eq!(line_col_to_offset(query, 1, 9), Some("SELECT μ".len()));
    }

    #[test]
    fn test_offset_to_line_col() {
        let query = "SELECT 1\nFROM t";
        assert_eq!(offset_to_line_col(query, 0), (1, 1));
        assert_eq!(offset_to_line_col(query, 9), (2, 1));
        assert_eq!(offset_to_line_col(query, query.len()), (2, 7));
    }
}
