//! Token cursor shared by the grammar parsers
//!
//! One `TokenStream` is owned by the root parser of a statement and lent (`&mut`) to each nested
//! parser in turn. Besides the cursor it carries the stop-token set: tokens at which a nested
//! parser must hand control back to its caller without consuming them.

use crate::common::config::ParserConfig;
use crate::common::error::{DdlError, DdlResult};
use crate::parser::ast::quote_string;
use crate::parser::tokenizer::{Token, TokenKind, Tokenizer};
use std::collections::BTreeSet;
use tracing::trace;

/// Set of stop tokens, normalized to upper case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopTokens(BTreeSet<String>);

impl StopTokens {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_tokens(tokens: &[&str]) -> Self {
        Self::new().with(tokens)
    }

    /// Union of this set and `extra`; the receiver is left untouched
    pub fn with(&self, extra: &[&str]) -> Self {
        let mut set = self.0.clone();
        set.extend(extra.iter().map(|token| token.to_ascii_uppercase()));
        Self(set)
    }

    /// Whether `token` is one of the stop tokens. Quoted identifiers and strings never are.
    pub fn contains(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Word => self.0.contains(&token.text.to_ascii_uppercase()),
            _ if token.is_punctuation() => self.0.contains(&token.text),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Positioned cursor over a token sequence
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
    stop_tokens: StopTokens,
    config: ParserConfig,
}

impl TokenStream {
    /// Create a stream over already tokenized input
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_config(tokens, ParserConfig::default())
    }

    pub fn with_config(mut tokens: Vec<Token>, config: ParserConfig) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, column) = tokens
                .last()
                .map(|token| (token.line, token.column + token.text.chars().count()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }

        Self {
            tokens,
            position: 0,
            stop_tokens: StopTokens::new(),
            config,
        }
    }

    /// Tokenize `sql` and wrap the result
    pub fn from_sql(sql: &str, config: ParserConfig) -> DdlResult<Self> {
        let tokens = Tokenizer::new().tokenize(sql)?;
        Ok(Self::with_config(tokens, config))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub fn peek(&self) -> &Token {
        if self.position + 1 < self.tokens.len() {
            &self.tokens[self.position + 1]
        } else {
            &self.tokens[self.tokens.len() - 1] // EOF token
        }
    }

    /// Move to the next token; the cursor never moves past EOF
    pub fn advance(&mut self) -> &mut Self {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        self
    }

    pub fn at_end(&self) -> bool {
        self.current().is_eof()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the current token is the keyword or punctuation `text`
    pub fn is(&self, text: &str) -> bool {
        self.current().matches(text)
    }

    pub fn is_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|text| self.is(text))
    }

    pub fn peek_is(&self, text: &str) -> bool {
        self.peek().matches(text)
    }

    /// Advance past the current token if it is `text`
    pub fn consume(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance past `text` or fail with `message`
    pub fn expect(&mut self, text: &str, message: &str) -> DdlResult<()> {
        if self.consume(text) {
            Ok(())
        } else {
            Err(self.error(message.to_string()))
        }
    }

    /// Parse error positioned at the current token
    pub fn error(&self, message: String) -> DdlError {
        let token = self.current();
        let text = if token.is_eof() {
            "end of input".to_string()
        } else {
            token.text.clone()
        };
        DdlError::parse(message, text, Some(token.line))
    }

    /// Whether the current token ends the statement
    pub fn is_terminator(&self) -> bool {
        self.at_end() || self.is(&self.config.statement_terminator)
    }

    pub fn stop_tokens(&self) -> &StopTokens {
        &self.stop_tokens
    }

    pub fn is_stop_token(&self) -> bool {
        self.stop_tokens.contains(self.current())
    }

    /// Replace the stop-token set, returning the previous one
    pub fn set_stop_tokens(&mut self, stop_tokens: StopTokens) -> StopTokens {
        std::mem::replace(&mut self.stop_tokens, stop_tokens)
    }

    /// Add `extra` to the stop-token set, returning the previous set for restoring
    pub fn push_stop_tokens(&mut self, extra: &[&str]) -> StopTokens {
        let extended = self.stop_tokens.with(extra);
        self.set_stop_tokens(extended)
    }

    /// Run `f` with `extra` registered as stop tokens. The caller's set is restored afterwards,
    /// whether `f` succeeds or fails.
    pub fn with_stop_tokens<T, F>(&mut self, extra: &[&str], f: F) -> DdlResult<T>
    where
        F: FnOnce(&mut Self) -> DdlResult<T>,
    {
        let saved = self.push_stop_tokens(extra);
        let result = f(self);
        self.stop_tokens = saved;
        result
    }

    /// Skip tokens that no grammar models.
    ///
    /// Stops, without consuming, at depth 0 on any of `extra_stops` or the stream's stop tokens,
    /// on an unmatched `)`, or at EOF. `visit` sees every other non-parenthesis token together
    /// with the current depth; it returns `true` when it consumed the token itself (and possibly
    /// more), `false` to let the scan step over it.
    pub fn skip_until<F>(&mut self, extra_stops: &[&str], mut visit: F) -> DdlResult<()>
    where
        F: FnMut(&mut Self, usize) -> DdlResult<bool>,
    {
        let stops = self.stop_tokens.with(extra_stops);
        let start_line = self.current().line;
        let mut depth = 0usize;

        while !self.at_end() {
            let position = self.position;

            match self.current().kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ if depth == 0 && stops.contains(self.current()) => break,
                _ => {
                    if visit(self, depth)? && self.position != position {
                        continue;
                    }
                    trace!(token = %self.current().text, depth, "skipping unmodeled token");
                }
            }

            self.advance();
        }

        if depth > 0 {
            return Err(DdlError::parse(
                "Unclosed parenthesis",
                "(",
                Some(start_line),
            ));
        }

        Ok(())
    }

    /// Consume a balanced `( ... )` group and return its inner text as normalized raw SQL
    pub fn capture_parenthesized(&mut self) -> DdlResult<String> {
        if !self.is("(") {
            return Err(self.error("Expected opening bracket \"(\"".to_string()));
        }

        let start_line = self.current().line;
        self.advance();

        let start = self.position;
        let mut depth = 0usize;

        loop {
            match self.current().kind {
                TokenKind::Eof => {
                    return Err(DdlError::parse(
                        "Unclosed parenthesis",
                        "(",
                        Some(start_line),
                    ));
                }
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        let raw = render_raw(&self.tokens[start..self.position]);
        self.advance(); // ')'

        Ok(raw)
    }

    /// Raw SQL text of the tokens between `start` and the cursor
    pub fn raw_since(&self, start: usize) -> String {
        render_raw(&self.tokens[start..self.position])
    }
}

/// Keywords followed by a parenthesized operand rather than called like a function
const SPACED_KEYWORDS: &[&str] = &[
    "AND", "OR", "XOR", "NOT", "IN", "IS", "LIKE", "BETWEEN", "CHECK", "AS", "VALUES", "CASE",
    "WHEN", "THEN", "ELSE",
];

/// Re-assemble tokens into SQL text with normalized spacing.
///
/// Backtick pairs collapse around their identifier, no space goes inside parentheses, before
/// `,` or around `.`, and a `(` directly after a name is a function call.
pub fn render_raw(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<TokenKind> = None;
    let mut previous_text: Option<&str> = None;

    for token in tokens {
        if token.kind == TokenKind::Backtick || token.is_eof() {
            continue;
        }

        let glue = match (previous, token.kind) {
            (None, _) => true,
            (Some(TokenKind::LeftParen), _) | (Some(TokenKind::Dot), _) => true,
            (_, TokenKind::RightParen) | (_, TokenKind::Comma) | (_, TokenKind::Dot) => true,
            (Some(TokenKind::Identifier), TokenKind::LeftParen) => true,
            (Some(TokenKind::Word), TokenKind::LeftParen) => !previous_text
                .is_some_and(|text: &str| SPACED_KEYWORDS.iter().any(|k| text.eq_ignore_ascii_case(k))),
            _ => false,
        };

        if !glue {
            out.push(' ');
        }

        match token.kind {
            TokenKind::Identifier => {
                out.push('`');
                out.push_str(&token.text.replace('`', "``"));
                out.push('`');
            }
            TokenKind::QuotedString => out.push_str(&quote_string(&token.text)),
            _ => out.push_str(&token.text),
        }

        previous = Some(token.kind);
        previous_text = Some(&token.text);
    }

    out
}
