//! MySQL DDL tokenizer
//!
//! Breaks SQL strings into the token stream consumed by the grammar parsers. Keywords are not
//! classified here: the parsers match them by text, since most MySQL keywords are also legal
//! identifiers in some position.

use crate::common::error::{DdlError, DdlResult};
use serde::Serialize;
use std::iter::Peekable;
use std::str::Chars;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Bare identifier or keyword
    Word,
    /// Content between backticks
    Identifier,
    /// Quoted string with the quotes stripped and escapes resolved
    QuotedString,
    Integer,
    Float,
    /// Bit-value or hexadecimal literal (`b'01'`, `X'FF'`), kept verbatim
    BinaryLiteral,

    Backtick,   // `
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,
    Equals,     // =
    Semicolon,  // ;
    Dot,        // .
    /// Any other operator character
    Symbol,

    Eof,
}

/// SQL token with position information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Case-insensitive keyword test; only bare words can be keywords
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Backtick
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::Comma
                | TokenKind::Equals
                | TokenKind::Semicolon
                | TokenKind::Dot
                | TokenKind::Symbol
        )
    }

    /// Whether the token is the keyword or punctuation spelled by `text`
    pub fn matches(&self, text: &str) -> bool {
        match self.kind {
            TokenKind::Word => self.text.eq_ignore_ascii_case(text),
            _ if self.is_punctuation() => self.text == text,
            _ => false,
        }
    }

    /// Upper-cased keyword text, if the token is a bare word
    pub fn keyword(&self) -> Option<String> {
        (self.kind == TokenKind::Word).then(|| self.text.to_ascii_uppercase())
    }
}

/// SQL tokenizer
#[derive(Debug, Default, Clone, Copy)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a SQL string into tokens, terminated by an `Eof` token
    pub fn tokenize(&self, sql: &str) -> DdlResult<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut chars = sql.chars().peekable();
        let mut line = 1;
        let mut column = 1;

        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() {
                self.consume_whitespace(&mut chars, &mut line, &mut column);
                continue;
            }

            let start_line = line;
            let start_column = column;

            match ch {
                '#' => {
                    self.consume_line_comment(&mut chars, &mut column);
                }
                '-' if self.second_char(&chars) == Some('-') => {
                    self.consume_line_comment(&mut chars, &mut column);
                }
                '/' if self.second_char(&chars) == Some('*') => {
                    self.consume_block_comment(&mut chars, &mut line, &mut column)?;
                }
                '\'' | '"' => {
                    let text = self.consume_string(&mut chars, ch, &mut line, &mut column)?;
                    tokens.push(Token::new(
                        TokenKind::QuotedString,
                        text,
                        start_line,
                        start_column,
                    ));
                }
                '`' => {
                    chars.next();
                    column += 1;
                    tokens.push(Token::new(TokenKind::Backtick, "`", start_line, start_column));

                    let (name_line, name_column) = (line, column);
                    let name = self.consume_backtick_identifier(&mut chars, &mut line, &mut column)?;
                    if !name.is_empty() {
                        tokens.push(Token::new(
                            TokenKind::Identifier,
                            name,
                            name_line,
                            name_column,
                        ));
                    }
                    tokens.push(Token::new(TokenKind::Backtick, "`", line, column - 1));
                }
                '0'..='9' => {
                    let (kind, text) = self.consume_number(&mut chars, &mut column, String::new());
                    tokens.push(Token::new(kind, text, start_line, start_column));
                }
                '-' if self.starts_signed_number(&tokens, &chars) => {
                    chars.next();
                    column += 1;
                    let (kind, text) = self.consume_number(&mut chars, &mut column, "-".to_string());
                    tokens.push(Token::new(kind, text, start_line, start_column));
                }
                '(' | ')' | ',' | '=' | ';' | '.' => {
                    chars.next();
                    column += 1;
                    let kind = match ch {
                        '(' => TokenKind::LeftParen,
                        ')' => TokenKind::RightParen,
                        ',' => TokenKind::Comma,
                        '=' => TokenKind::Equals,
                        ';' => TokenKind::Semicolon,
                        _ => TokenKind::Dot,
                    };
                    tokens.push(Token::new(kind, ch.to_string(), start_line, start_column));
                }
                '+' | '-' | '*' | '/' | '<' | '>' | '!' | '%' | '|' | '&' | '^' | '~' | ':' | '@' => {
                    chars.next();
                    column += 1;
                    tokens.push(Token::new(
                        TokenKind::Symbol,
                        ch.to_string(),
                        start_line,
                        start_column,
                    ));
                }
                'b' | 'B' | 'x' | 'X' if self.second_char(&chars) == Some('\'') => {
                    chars.next();
                    column += 1;
                    let digits = self.consume_string(&mut chars, '\'', &mut line, &mut column)?;
                    tokens.push(Token::new(
                        TokenKind::BinaryLiteral,
                        format!("{}'{}'", ch, digits),
                        start_line,
                        start_column,
                    ));
                }
                _ if self.is_identifier_start(ch) => {
                    let text = self.consume_word(&mut chars, &mut column);
                    tokens.push(Token::new(TokenKind::Word, text, start_line, start_column));
                }
                _ => {
                    return Err(DdlError::parse(
                        "Unexpected character",
                        ch.to_string(),
                        Some(start_line),
                    ));
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, "", line, column));

        Ok(tokens)
    }

    fn second_char(&self, chars: &Peekable<Chars>) -> Option<char> {
        let mut ahead = chars.clone();
        ahead.next();
        ahead.next()
    }

    /// A `-` glued to a digit is a sign unless the previous token ends an operand
    fn starts_signed_number(&self, tokens: &[Token], chars: &Peekable<Chars>) -> bool {
        let next_is_digit = self
            .second_char(chars)
            .is_some_and(|ch| ch.is_ascii_digit());

        let after_operand = tokens.last().is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::BinaryLiteral
                    | TokenKind::Word
                    | TokenKind::QuotedString
                    | TokenKind::RightParen
                    | TokenKind::Backtick
            ) && !token.is_keyword("DEFAULT")
                && !token.is_keyword("THAN")
        });

        next_is_digit && !after_operand
    }

    fn consume_whitespace(&self, chars: &mut Peekable<Chars>, line: &mut usize, column: &mut usize) {
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() {
                chars.next();
                if ch == '\n' {
                    *line += 1;
                    *column = 1;
                } else {
                    *column += 1;
                }
            } else {
                break;
            }
        }
    }

    fn consume_line_comment(&self, chars: &mut Peekable<Chars>, column: &mut usize) {
        // The newline itself is left for consume_whitespace so line counting stays in one place
        while let Some(&ch) = chars.peek() {
            if ch == '\n' {
                break;
            }
            chars.next();
            *column += 1;
        }
    }

    fn consume_block_comment(
        &self,
        chars: &mut Peekable<Chars>,
        line: &mut usize,
        column: &mut usize,
    ) -> DdlResult<()> {
        let start_line = *line;
        chars.next(); // '/'
        chars.next(); // '*'
        *column += 2;

        let mut previous = '\0';
        while let Some(ch) = chars.next() {
            if ch == '\n' {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
            if previous == '*' && ch == '/' {
                return Ok(());
            }
            previous = ch;
        }

        Err(DdlError::parse("Unterminated comment", "/*", Some(start_line)))
    }

    fn consume_string(
        &self,
        chars: &mut Peekable<Chars>,
        quote: char,
        line: &mut usize,
        column: &mut usize,
    ) -> DdlResult<String> {
        let start_line = *line;
        chars.next(); // Consume opening quote
        *column += 1;

        let mut result = String::new();
        let mut escaped = false;

        while let Some(ch) = chars.next() {
            *column += 1;

            if escaped {
                match ch {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    '0' => result.push('\0'),
                    _ => result.push(ch),
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                // A doubled quote is an escaped quote
                if chars.peek() == Some(&quote) {
                    chars.next();
                    *column += 1;
                    result.push(quote);
                } else {
                    return Ok(result);
                }
            } else {
                if ch == '\n' {
                    *line += 1;
                    *column = 1;
                }
                result.push(ch);
            }
        }

        Err(DdlError::parse(
            "Unterminated string literal",
            format!("{}{}", quote, result),
            Some(start_line),
        ))
    }

    fn consume_backtick_identifier(
        &self,
        chars: &mut Peekable<Chars>,
        line: &mut usize,
        column: &mut usize,
    ) -> DdlResult<String> {
        let start_line = *line;
        let mut result = String::new();

        while let Some(ch) = chars.next() {
            *column += 1;

            if ch == '`' {
                if chars.peek() == Some(&'`') {
                    chars.next();
                    *column += 1;
                    result.push('`');
                } else {
                    return Ok(result);
                }
            } else {
                if ch == '\n' {
                    *line += 1;
                    *column = 1;
                }
                result.push(ch);
            }
        }

        Err(DdlError::parse(
            "Unterminated quoted identifier",
            format!("`{}", result),
            Some(start_line),
        ))
    }

    fn consume_number(
        &self,
        chars: &mut Peekable<Chars>,
        column: &mut usize,
        mut result: String,
    ) -> (TokenKind, String) {
        let mut kind = TokenKind::Integer;

        // Integer part
        while let Some(&ch) = chars.peek() {
            if ch.is_ascii_digit() {
                result.push(ch);
                chars.next();
                *column += 1;
            } else {
                break;
            }
        }

        // Fractional part
        if let Some(&'.') = chars.peek() {
            kind = TokenKind::Float;
            result.push('.');
            chars.next();
            *column += 1;

            while let Some(&ch) = chars.peek() {
                if ch.is_ascii_digit() {
                    result.push(ch);
                    chars.next();
                    *column += 1;
                } else {
                    break;
                }
            }
        }

        // Exponent part
        if let Some(&exponent) = chars.peek() {
            if exponent == 'e' || exponent == 'E' {
                let mut lookahead = chars.clone();
                lookahead.next();
                let sign = lookahead.peek().copied().filter(|ch| *ch == '+' || *ch == '-');
                if sign.is_some() {
                    lookahead.next();
                }

                if lookahead.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                    kind = TokenKind::Float;
                    result.push(exponent);
                    chars.next();
                    *column += 1;
                    if let Some(sign) = sign {
                        result.push(sign);
                        chars.next();
                        *column += 1;
                    }
                    while let Some(&ch) = chars.peek() {
                        if ch.is_ascii_digit() {
                            result.push(ch);
                            chars.next();
                            *column += 1;
                        } else {
                            break;
                        }
                    }
                }
            }
        }

        // Identifiers may start with digits in MySQL (e.g. `1st_column` unquoted)
        if kind == TokenKind::Integer {
            if let Some(&ch) = chars.peek() {
                if self.is_identifier_start(ch) {
                    result.push_str(&self.consume_word(chars, column));
                    return (TokenKind::Word, result);
                }
            }
        }

        (kind, result)
    }

    fn consume_word(&self, chars: &mut Peekable<Chars>, column: &mut usize) -> String {
        let mut result = String::new();

        while let Some(&ch) = chars.peek() {
            if self.is_identifier_char(ch) {
                result.push(ch);
                chars.next();
                *column += 1;
            } else {
                break;
            }
        }

        result
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    fn is_identifier_char(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }
}
