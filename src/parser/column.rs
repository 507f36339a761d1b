//! Column definition grammar
//!
//! ```text
//! name type [(width[,digits])] [UNSIGNED] [ZEROFILL] [CHARACTER SET x] [COLLATE y]
//!      [NOT NULL | NULL] [DEFAULT literal] [attributes...]
//! ```
//!
//! Also hosts the name, name-list and literal helpers shared by the other grammars.

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::{ColumnDefinition, Literal};
use crate::parser::keywords::TypeFamily;
use crate::parser::stream::TokenStream;
use crate::parser::tokenizer::{Token, TokenKind};
use crate::parser::DdlParser;

/// Read a bare or backtick-quoted name, if the stream is positioned at one
pub fn parse_optional_name(tokens: &mut TokenStream) -> DdlResult<Option<String>> {
    if tokens.consume("`") {
        if tokens.current().kind != TokenKind::Identifier {
            return Err(parse_err!(tokens, "Expected identifier between backticks"));
        }
        let name = tokens.current().text.clone();
        tokens.advance();
        tokens.expect("`", "Expected closing backtick")?;
        return Ok(Some(name));
    }

    if tokens.current().kind == TokenKind::Word && !tokens.is_stop_token() {
        let name = tokens.current().text.clone();
        tokens.advance();
        return Ok(Some(name));
    }

    Ok(None)
}

/// Read a bare or backtick-quoted name
pub fn parse_column_name(tokens: &mut TokenStream) -> DdlResult<String> {
    match parse_optional_name(tokens)? {
        Some(name) => Ok(name),
        None => Err(parse_err!(tokens, "Expected name")),
    }
}

/// Read a name given either as an identifier or as a quoted string (charset, engine, ...)
pub fn parse_name_or_string(tokens: &mut TokenStream) -> DdlResult<String> {
    if tokens.current().kind == TokenKind::QuotedString {
        let value = tokens.current().text.clone();
        tokens.advance();
        return Ok(value);
    }
    parse_column_name(tokens)
}

/// Read `(name, name, ...)`
pub fn parse_column_list(tokens: &mut TokenStream) -> DdlResult<Vec<String>> {
    tokens.expect("(", "Expected opening bracket \"(\" of column list")?;

    let mut columns = vec![parse_column_name(tokens)?];
    while tokens.consume(",") {
        columns.push(parse_column_name(tokens)?);
    }

    tokens.expect(")", "Expected closing bracket \")\" of column list")?;
    Ok(columns)
}

/// Type a numeric token. Integers outside `i64` and non-finite floats keep their source text.
pub fn numeric_literal(token: &Token) -> Literal {
    let typed = match token.kind {
        TokenKind::Integer => token.text.parse::<i64>().ok().map(Literal::Int),
        _ => token
            .text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Literal::Float),
    };
    typed.unwrap_or_else(|| Literal::Raw(token.text.clone()))
}

/// Read one literal, typed by its lexical class.
///
/// Bare words become raw expressions; a word followed by `(` is a function call and a
/// parenthesized group is an expression, both kept verbatim.
pub fn parse_literal(tokens: &mut TokenStream) -> DdlResult<Literal> {
    let token = tokens.current().clone();

    let literal = match token.kind {
        TokenKind::Integer | TokenKind::Float => numeric_literal(&token),
        TokenKind::QuotedString => Literal::Str(token.text),
        TokenKind::BinaryLiteral => Literal::Raw(token.text),
        TokenKind::Word => {
            tokens.advance();
            if tokens.is("(") {
                let arguments = tokens.capture_parenthesized()?;
                return Ok(Literal::Raw(format!("{}({})", token.text, arguments)));
            }
            return Ok(Literal::Raw(token.text));
        }
        TokenKind::LeftParen => {
            let expression = tokens.capture_parenthesized()?;
            return Ok(Literal::Raw(format!("({})", expression)));
        }
        _ => return Err(parse_err!(tokens, "Expected literal value")),
    };

    tokens.advance();
    Ok(literal)
}

/// Read an unsigned integer, as used for widths, counts and lengths
pub fn parse_unsigned(tokens: &mut TokenStream, what: &str) -> DdlResult<u32> {
    if tokens.current().kind != TokenKind::Integer {
        return Err(parse_err!(tokens, "Expected integer {}", what));
    }
    let value = tokens
        .current()
        .text
        .parse::<u32>()
        .map_err(|_| parse_err!(tokens, "Invalid {}", what))?;
    tokens.advance();
    Ok(value)
}

/// Parser for a single column definition
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnDefinitionParser;

impl ColumnDefinitionParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_width(&self, tokens: &mut TokenStream) -> DdlResult<Option<u32>> {
        if !tokens.consume("(") {
            return Ok(None);
        }
        let width = parse_unsigned(tokens, "type width")?;
        tokens.expect(")", "Expected closing bracket \")\" after type width")?;
        Ok(Some(width))
    }

    fn parse_precision(
        &self,
        tokens: &mut TokenStream,
        column: &mut ColumnDefinition,
    ) -> DdlResult<()> {
        if !tokens.consume("(") {
            return Ok(());
        }
        column.display_width = Some(parse_unsigned(tokens, "type width")?);
        if tokens.consume(",") {
            column.decimal_digits = Some(parse_unsigned(tokens, "decimal digits")?);
        }
        tokens.expect(")", "Expected closing bracket \")\" after type precision")
    }

    fn parse_numeric_flags(&self, tokens: &mut TokenStream, column: &mut ColumnDefinition) {
        loop {
            if tokens.consume("UNSIGNED") {
                column.is_unsigned = true;
            } else if tokens.consume("ZEROFILL") {
                // MySQL adds UNSIGNED to every ZEROFILL column
                column.is_zerofill = true;
                column.is_unsigned = true;
            } else if !tokens.consume("SIGNED") {
                break;
            }
        }
    }

    fn parse_variants(&self, tokens: &mut TokenStream) -> DdlResult<Vec<Literal>> {
        tokens.expect("(", "Expected opening bracket \"(\" of value list")?;

        let mut variants = vec![parse_literal(tokens)?];
        while tokens.consume(",") {
            variants.push(parse_literal(tokens)?);
        }

        tokens.expect(")", "Expected closing bracket \")\" of value list")?;
        Ok(variants)
    }

    fn parse_character_set(&self, tokens: &mut TokenStream) -> DdlResult<()> {
        loop {
            if tokens.consume("CHARACTER") {
                tokens.expect("SET", "Expected keyword SET after CHARACTER")?;
                parse_name_or_string(tokens)?;
            } else if tokens.consume("CHARSET") || tokens.consume("COLLATE") {
                parse_name_or_string(tokens)?;
            } else {
                return Ok(());
            }
        }
    }

    /// Attributes recognized by the trailing scan at depth 0. Returns whether the tokens
    /// were consumed here. Inside an inline `REFERENCES` clause `ON UPDATE` is a
    /// referential action, not the column's update value.
    fn parse_attribute(
        &self,
        tokens: &mut TokenStream,
        column: &mut ColumnDefinition,
        in_reference: bool,
    ) -> DdlResult<bool> {
        if tokens.consume("NOT") {
            tokens.expect("NULL", "Expected keyword NULL after NOT")?;
            column.is_nullable = false;
        } else if tokens.consume("NULL") {
            column.is_nullable = true;
        } else if tokens.consume("DEFAULT") {
            column.default_value = Some(parse_literal(tokens)?);
        } else if !in_reference && tokens.is("ON") && tokens.peek_is("UPDATE") {
            tokens.advance().advance();
            column.on_update = Some(parse_literal(tokens)?);
        } else if tokens.consume("COMMENT") {
            if tokens.current().kind != TokenKind::QuotedString {
                return Err(parse_err!(tokens, "Expected quoted string after COMMENT"));
            }
            column.comment = Some(tokens.current().text.clone());
            tokens.advance();
        } else if tokens.is("AUTO_INCREMENT") {
            column.is_auto_increment = true;
            return Ok(false);
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// Everything after the column name: type, parameters and attributes
    pub fn parse_after_name(
        &self,
        tokens: &mut TokenStream,
        name: String,
    ) -> DdlResult<ColumnDefinition> {
        let type_name = match tokens.current().keyword() {
            Some(keyword) => keyword,
            None => return Err(parse_err!(tokens, "Expected data type of column '{}'", name)),
        };
        tokens.advance();

        let mut column = ColumnDefinition::new(name, type_name);

        match TypeFamily::of(&column.type_name) {
            TypeFamily::Integer => {
                column.display_width = self.parse_width(tokens)?;
                self.parse_numeric_flags(tokens, &mut column);
            }
            TypeFamily::FixedPoint => {
                self.parse_precision(tokens, &mut column)?;
                self.parse_numeric_flags(tokens, &mut column);
            }
            TypeFamily::Temporal | TypeFamily::SizedString => {
                column.display_width = self.parse_width(tokens)?;
            }
            TypeFamily::Enumerated => {
                column.enum_variants = Some(self.parse_variants(tokens)?);
            }
            TypeFamily::Plain | TypeFamily::Other => {}
        }

        self.parse_character_set(tokens)?;

        let mut in_reference = false;
        tokens.skip_until(&[","], |tokens, depth| {
            if depth > 0 {
                return Ok(false);
            }
            if tokens.is("REFERENCES") {
                in_reference = true;
                return Ok(false);
            }
            self.parse_attribute(tokens, &mut column, in_reference)
        })?;

        Ok(column)
    }
}

impl DdlParser for ColumnDefinitionParser {
    type Node = ColumnDefinition;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<ColumnDefinition> {
        let name = parse_column_name(tokens)?;
        self.parse_after_name(tokens, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::ParserConfig;

    fn parse(sql: &str) -> DdlResult<ColumnDefinition> {
        ColumnDefinitionParser::new().parse(sql)
    }

    #[test]
    fn test_varchar_not_null() -> DdlResult<()> {
        let column = parse("`id` varchar(36) NOT NULL")?;
        assert_eq!(column.name, "id");
        assert_eq!(column.type_name, "VARCHAR");
        assert_eq!(column.display_width, Some(36));
        assert!(!column.is_nullable);
        assert_eq!(column.to_string(), "`id` VARCHAR (36) NOT NULL");
        Ok(())
    }

    #[test]
    fn test_zerofill_implies_unsigned() -> DdlResult<()> {
        let column = parse("n INT(5) ZEROFILL")?;
        assert!(column.is_zerofill);
        assert!(column.is_unsigned);

        let column = parse("d DECIMAL(10, 2) ZEROFILL NOT NULL")?;
        assert_eq!(column.display_width, Some(10));
        assert_eq!(column.decimal_digits, Some(2));
        assert!(column.is_unsigned);
        Ok(())
    }

    #[test]
    fn test_enum_variants_are_typed() -> DdlResult<()> {
        let column = parse("e ENUM('a', 2, 3.5, MAXVALUE) DEFAULT 'a'")?;
        assert_eq!(
            column.enum_variants,
            Some(vec![
                Literal::Str("a".into()),
                Literal::Int(2),
                Literal::Float(3.5),
                Literal::Raw("MAXVALUE".into()),
            ])
        );
        assert_eq!(column.default_value, Some(Literal::Str("a".into())));
        Ok(())
    }

    #[test]
    fn test_trailing_attributes() -> DdlResult<()> {
        let column = parse(
            "updated_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6) \
             ON UPDATE CURRENT_TIMESTAMP(6) INVISIBLE COMMENT 'Updated at'",
        )?;
        assert_eq!(column.display_width, Some(6));
        assert_eq!(
            column.default_value,
            Some(Literal::Raw("CURRENT_TIMESTAMP(6)".into()))
        );
        assert_eq!(
            column.on_update,
            Some(Literal::Raw("CURRENT_TIMESTAMP(6)".into()))
        );
        assert_eq!(column.comment.as_deref(), Some("Updated at"));
        Ok(())
    }

    #[test]
    fn test_auto_increment_and_charset() -> DdlResult<()> {
        let column =
            parse("name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NULL")?;
        assert!(column.is_nullable);

        let column = parse("id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT")?;
        assert!(column.is_auto_increment);
        assert!(column.is_unsigned);
        Ok(())
    }

    #[test]
    fn test_character_set_without_collate() -> DdlResult<()> {
        let column = parse("a VARCHAR(10) CHARACTER SET utf8 NOT NULL")?;
        assert!(!column.is_nullable);
        assert_eq!(column.to_string(), "`a` VARCHAR (10) NOT NULL");
        Ok(())
    }

    #[test]
    fn test_out_of_range_numbers_keep_source_text() -> DdlResult<()> {
        let column = parse("id BIGINT UNSIGNED DEFAULT 18446744073709551615")?;
        assert_eq!(
            column.default_value,
            Some(Literal::Raw("18446744073709551615".into()))
        );
        assert_eq!(
            column.to_string(),
            "`id` BIGINT UNSIGNED NULL DEFAULT 18446744073709551615"
        );

        let column = parse("f DOUBLE DEFAULT 1e999")?;
        assert_eq!(column.default_value, Some(Literal::Raw("1e999".into())));
        assert_eq!(parse(&column.to_string())?, column);
        Ok(())
    }

    #[test]
    fn test_bit_default() -> DdlResult<()> {
        let column = parse("flag BIT(1) NOT NULL DEFAULT b'0'")?;
        assert_eq!(column.default_value, Some(Literal::Raw("b'0'".into())));
        assert_eq!(column.to_string(), "`flag` BIT (1) NOT NULL DEFAULT b'0'");
        assert_eq!(parse(&column.to_string())?, column);
        Ok(())
    }

    #[test]
    fn test_inline_reference_actions_are_not_on_update() -> DdlResult<()> {
        let column = parse("author_id INT NOT NULL REFERENCES authors (id) ON UPDATE CASCADE")?;
        assert_eq!(column.on_update, None);
        assert!(!column.is_nullable);
        Ok(())
    }

    #[test]
    fn test_stops_at_comma_and_closing_bracket() -> DdlResult<()> {
        let mut tokens = TokenStream::from_sql(
            "a INT CHECK (a > 0), b INT)",
            ParserConfig::default(),
        )?;
        let parser = ColumnDefinitionParser::new();

        parser.parse_tokens(&mut tokens)?;
        assert!(tokens.consume(","));
        let column = parser.parse_tokens(&mut tokens)?;
        assert_eq!(column.name, "b");
        assert!(tokens.is(")"));
        Ok(())
    }

    #[test]
    fn test_errors() {
        assert!(parse("a DECIMAL(x)").is_err());
        assert!(parse("a INT NOT DEFAULT 1").is_err());
        assert!(parse("a VARCHAR(10").is_err());
        assert!(parse("a CHAR(1) CHARACTER utf8").is_err());
        assert!(parse("a INT GENERATED ALWAYS AS (a + 1").is_err());
    }
}
