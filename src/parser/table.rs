//! CREATE TABLE grammar
//!
//! ```text
//! CREATE [TEMPORARY] TABLE [IF NOT EXISTS] name (create_definition, ...)
//!     [table_options] [PARTITION BY ...]
//! ```

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::Table;
use crate::parser::column::{parse_column_name, ColumnDefinitionParser};
use crate::parser::constraint::ConstraintParser;
use crate::parser::index::IndexDefinitionParser;
use crate::parser::keywords::starts_index_definition;
use crate::parser::partition::PartitionByParser;
use crate::parser::stream::TokenStream;
use crate::parser::tokenizer::TokenKind;
use crate::parser::DdlParser;
use tracing::debug;

/// Root parser of CREATE TABLE statements
#[derive(Debug, Default, Clone, Copy)]
pub struct TableParser;

impl TableParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_create_definitions(&self, tokens: &mut TokenStream, table: &mut Table) -> DdlResult<()> {
        tokens.expect("(", "Expected start bracket \"(\" for create definitions")?;

        loop {
            let keyword = tokens.current().keyword().unwrap_or_default();

            if starts_index_definition(&keyword) {
                table
                    .indexes
                    .push(IndexDefinitionParser::new().parse_tokens(tokens)?);
            } else if matches!(keyword.as_str(), "CONSTRAINT" | "FOREIGN" | "CHECK") {
                table
                    .constraints
                    .push(ConstraintParser::new().parse_tokens(tokens)?);
            } else {
                table
                    .columns
                    .push(ColumnDefinitionParser::new().parse_tokens(tokens)?);
            }

            if !tokens.consume(",") {
                break;
            }
        }

        tokens.expect(")", "Expected closed bracket \")\" for create definitions")
    }

    /// Table options after the definitions. Only COMMENT and PARTITION BY are kept.
    fn parse_table_options(&self, tokens: &mut TokenStream, table: &mut Table) -> DdlResult<()> {
        tokens.skip_until(&[], |tokens, depth| {
            if depth > 0 {
                return Ok(false);
            }

            if tokens.consume("COMMENT") {
                tokens.consume("=");
                if tokens.current().kind != TokenKind::QuotedString {
                    return Err(parse_err!(tokens, "Expected COMMENT string for table"));
                }
                table.comment = Some(tokens.current().text.clone());
                tokens.advance();
                return Ok(true);
            }

            if tokens.is("PARTITION") && tokens.peek_is("BY") {
                table.partition_by = Some(PartitionByParser::new().parse_tokens(tokens)?);
                return Ok(true);
            }

            Ok(false)
        })
    }
}

impl DdlParser for TableParser {
    type Node = Table;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<Table> {
        tokens.expect("CREATE", "Expected keyword CREATE")?;
        let is_temporary = tokens.consume("TEMPORARY");
        tokens.expect("TABLE", "Expected keyword TABLE")?;

        let if_not_exists = tokens.consume("IF");
        if if_not_exists {
            tokens.expect("NOT", "Expected IF NOT EXISTS")?;
            tokens.expect("EXISTS", "Expected IF NOT EXISTS")?;
        }

        let name = match parse_column_name(tokens) {
            Ok(name) => name,
            Err(_) => return Err(parse_err!(tokens, "Expected table name")),
        };

        debug!(table = %name, "parsing CREATE TABLE");

        let mut table = Table {
            name,
            is_temporary,
            if_not_exists,
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            comment: None,
            partition_by: None,
        };

        let terminator = tokens.config().statement_terminator.clone();
        tokens.with_stop_tokens(&[terminator.as_str()], |tokens| {
            self.parse_create_definitions(tokens, &mut table)?;
            self.parse_table_options(tokens, &mut table)
        })?;

        if !tokens.is_terminator() {
            return Err(parse_err!(tokens, "Expected end of CREATE TABLE statement"));
        }

        debug!(
            table = %table.name,
            columns = table.columns.len(),
            indexes = table.indexes.len(),
            constraints = table.constraints.len(),
            "parsed CREATE TABLE"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Literal;
    use crate::parser::keywords::IndexRole;

    #[test]
    fn test_create_definitions_are_dispatched() -> DdlResult<()> {
        let table = TableParser::new().parse(
            "CREATE TABLE IF NOT EXISTS `test` (
                `id` INT NOT NULL AUTO_INCREMENT,
                `book_id` INT,
                PRIMARY KEY (`id`),
                KEY `test_fk0` (`book_id`),
                CONSTRAINT `test_fk0` FOREIGN KEY (`book_id`) REFERENCES `book` (`id`)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='Test table';",
        )?;

        assert_eq!(table.name, "test");
        assert!(table.if_not_exists);
        assert!(!table.is_temporary);
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.indexes.len(), 2);
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.primary_key().map(|index| index.role), Some(Some(IndexRole::Primary)));
        assert_eq!(table.comment.as_deref(), Some("Test table"));
        Ok(())
    }

    #[test]
    fn test_temporary_table_with_partitions() -> DdlResult<()> {
        let table = TableParser::new().parse(
            "CREATE TEMPORARY TABLE t (id INT, created DATE DEFAULT '2000-01-01') \
             COMMENT 'tmp' PARTITION BY HASH(id) PARTITIONS 8",
        )?;
        assert!(table.is_temporary);
        assert_eq!(
            table.column("created").and_then(|c| c.default_value.clone()),
            Some(Literal::Str("2000-01-01".into()))
        );
        assert_eq!(table.partition_by.map(|p| p.partitions_count), Some(Some(8)));
        Ok(())
    }

    #[test]
    fn test_errors() {
        let parser = TableParser::new();
        assert!(parser.parse("CREATE TABLE t id INT").is_err());
        assert!(parser.parse("CREATE TABLE t (id INT").is_err());
        assert!(parser.parse("CREATE TABLE IF EXISTS t (id INT)").is_err());
        assert!(parser.parse("CREATE TABLE t (id INT) COMMENT = 5").is_err());
        assert!(parser.parse("CREATE VIEW v AS SELECT 1").is_err());
    }
}
