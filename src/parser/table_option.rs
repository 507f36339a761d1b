//! Table option grammar (`ENGINE = InnoDB`, `DEFAULT CHARSET = utf8mb4`, ...)

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::{Literal, TableOption, TableOptionValue};
use crate::parser::column::{
    numeric_literal, parse_column_list, parse_column_name, parse_name_or_string,
};
use crate::parser::keywords::is_table_option;
use crate::parser::stream::TokenStream;
use crate::parser::tokenizer::TokenKind;
use crate::parser::DdlParser;

/// Parser for a single table option and for runs of them
#[derive(Debug, Default, Clone, Copy)]
pub struct TableOptionParser;

impl TableOptionParser {
    pub fn new() -> Self {
        Self
    }

    /// Whether the stream is positioned at the start of a table option.
    ///
    /// `DEFAULT`, `DATA` and `INDEX` only count when the next word completes an option, so
    /// `ADD INDEX` or a column `DEFAULT` is never mistaken for one.
    pub fn is_option_start(tokens: &TokenStream) -> bool {
        let Some(keyword) = tokens.current().keyword() else {
            return false;
        };

        match keyword.as_str() {
            "DEFAULT" => ["CHARSET", "CHARACTER", "COLLATE"]
                .iter()
                .any(|next| tokens.peek_is(next)),
            "DATA" | "INDEX" => tokens.peek_is("DIRECTORY"),
            _ => is_table_option(&keyword),
        }
    }

    /// Parse options for as long as they follow each other, separated by `,` or whitespace
    pub fn parse_options(&self, tokens: &mut TokenStream) -> DdlResult<Vec<TableOption>> {
        let mut options = Vec::new();

        while Self::is_option_start(tokens) {
            options.push(self.parse_tokens(tokens)?);
            tokens.consume(",");
        }

        Ok(options)
    }

    fn parse_equal_value(&self, tokens: &mut TokenStream) -> DdlResult<Literal> {
        tokens.consume("=");

        let token = tokens.current();
        let value = match token.kind {
            TokenKind::Integer | TokenKind::Float => numeric_literal(token),
            TokenKind::Word => Literal::Raw(token.text.clone()),
            TokenKind::QuotedString => Literal::Str(token.text.clone()),
            _ => return Err(parse_err!(tokens, "Expected table option value")),
        };

        tokens.advance();
        Ok(value)
    }
}

impl DdlParser for TableOptionParser {
    type Node = TableOption;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<TableOption> {
        let mut key = match tokens.current().keyword() {
            Some(keyword) => keyword,
            None => return Err(parse_err!(tokens, "Expected table option")),
        };

        if matches!(key.as_str(), "DEFAULT" | "DATA" | "INDEX") {
            tokens.advance();
            match tokens.current().keyword() {
                Some(next) => key = format!("{} {}", key, next),
                None => return Err(parse_err!(tokens, "Expected table option after {}", key)),
            }
        }

        let option = key.rsplit(' ').next().unwrap_or_default().to_string();
        tokens.advance();

        let value = match option.as_str() {
            "CHARACTER" => {
                tokens.expect("SET", "Expected keyword SET after CHARACTER")?;
                key.push_str(" SET");
                tokens.consume("=");
                TableOptionValue::Literal(Literal::Raw(parse_name_or_string(tokens)?))
            }
            "CHARSET" | "COLLATE" => {
                tokens.consume("=");
                TableOptionValue::Literal(Literal::Raw(parse_name_or_string(tokens)?))
            }
            "TABLESPACE" => {
                tokens.consume("=");
                let name = parse_column_name(tokens)?;
                let storage = if tokens.consume("STORAGE") {
                    if !tokens.is_any(&["DISK", "MEMORY"]) {
                        return Err(parse_err!(tokens, "Expected DISK or MEMORY after STORAGE"));
                    }
                    let storage = tokens.current().text.to_ascii_uppercase();
                    tokens.advance();
                    Some(storage)
                } else {
                    None
                };
                TableOptionValue::Tablespace { name, storage }
            }
            "UNION" => {
                tokens.consume("=");
                TableOptionValue::List(parse_column_list(tokens)?)
            }
            other if is_table_option(other) => {
                TableOptionValue::Literal(self.parse_equal_value(tokens)?)
            }
            _ => return Err(parse_err!(tokens, "Unknown table option: {}", key)),
        };

        Ok(TableOption { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::ParserConfig;

    #[test]
    fn test_scalar_options() -> DdlResult<()> {
        let parser = TableOptionParser::new();

        let option = parser.parse("ENGINE = InnoDB")?;
        assert_eq!(option.key, "ENGINE");
        assert_eq!(
            option.value,
            TableOptionValue::Literal(Literal::Raw("InnoDB".into()))
        );

        let option = parser.parse("AUTO_INCREMENT 100")?;
        assert_eq!(option.value, TableOptionValue::Literal(Literal::Int(100)));

        let option = parser.parse("AUTO_INCREMENT = 18446744073709551615")?;
        assert_eq!(
            option.value,
            TableOptionValue::Literal(Literal::Raw("18446744073709551615".into()))
        );

        let option = parser.parse("COMMENT='Users'")?;
        assert_eq!(option.to_string(), "COMMENT = 'Users'");
        Ok(())
    }

    #[test]
    fn test_multi_word_keys() -> DdlResult<()> {
        let parser = TableOptionParser::new();

        assert_eq!(parser.parse("DEFAULT CHARSET=utf8mb4")?.key, "DEFAULT CHARSET");
        assert_eq!(
            parser.parse("default character set = latin1")?.key,
            "DEFAULT CHARACTER SET"
        );
        assert_eq!(
            parser.parse("DATA DIRECTORY = '/var/data'")?.to_string(),
            "DATA DIRECTORY = '/var/data'"
        );
        Ok(())
    }

    #[test]
    fn test_union_and_tablespace() -> DdlResult<()> {
        let parser = TableOptionParser::new();

        let option = parser.parse("UNION = (t1, `t2`)")?;
        assert_eq!(
            option.value,
            TableOptionValue::List(vec!["t1".into(), "t2".into()])
        );

        let option = parser.parse("TABLESPACE ts1 STORAGE disk")?;
        assert_eq!(option.to_string(), "TABLESPACE `ts1` STORAGE DISK");
        Ok(())
    }

    #[test]
    fn test_option_run_stops_at_action() -> DdlResult<()> {
        let mut tokens =
            TokenStream::from_sql("ENGINE=InnoDB, ROW_FORMAT=DYNAMIC ADD INDEX", ParserConfig::default())?;
        let options = TableOptionParser::new().parse_options(&mut tokens)?;
        assert_eq!(options.len(), 2);
        assert!(tokens.is("ADD"));
        Ok(())
    }

    #[test]
    fn test_index_is_not_an_option_without_directory() -> DdlResult<()> {
        let tokens = TokenStream::from_sql("INDEX idx (a)", ParserConfig::default())?;
        assert!(!TableOptionParser::is_option_start(&tokens));
        Ok(())
    }
}
