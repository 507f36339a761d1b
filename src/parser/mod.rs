//! MySQL DDL parser
//!
//! A family of recursive-descent grammars sharing one `TokenStream` per statement. Root
//! grammars (`TableParser`, `AlterTableParser`) delegate sub-ranges to the leaf grammars,
//! which advance the shared cursor and hand back typed AST nodes.

pub mod alter;
pub mod ast;
pub mod column;
pub mod constraint;
pub mod index;
pub mod keywords;
pub mod partition;
pub mod rename;
pub mod stream;
pub mod table;
pub mod table_option;
pub mod tokenizer;

pub use alter::{AlterOptionParser, AlterTableParser};
pub use ast::*;
pub use column::ColumnDefinitionParser;
pub use constraint::ConstraintParser;
pub use index::IndexDefinitionParser;
pub use keywords::IndexRole;
pub use partition::PartitionByParser;
pub use rename::RenameParser;
pub use stream::{StopTokens, TokenStream};
pub use table::TableParser;
pub use table_option::TableOptionParser;
pub use tokenizer::{Token, TokenKind, Tokenizer};

use crate::common::config::ParserConfig;
use crate::common::error::DdlResult;
use crate::parse_err;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A grammar producing one kind of AST node from a shared token stream
pub trait DdlParser {
    type Node;

    /// Parse from the current position, leaving the stream on the first unconsumed token
    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<Self::Node>;

    /// Tokenize `sql` and parse it with the default configuration
    fn parse(&self, sql: &str) -> DdlResult<Self::Node> {
        self.parse_with_config(sql, ParserConfig::default())
    }

    fn parse_with_config(&self, sql: &str, config: ParserConfig) -> DdlResult<Self::Node> {
        let mut tokens = TokenStream::from_sql(sql, config)?;
        self.parse_tokens(&mut tokens)
    }
}

/// Supported DDL statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum Statement {
    CreateTable(Table),
    AlterTable(AlterTable),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::CreateTable(table) => write!(f, "{}", table),
            Statement::AlterTable(alter) => write!(f, "{}", alter),
        }
    }
}

/// Main parser interface
#[derive(Debug, Clone, Default)]
pub struct SqlParser {
    config: ParserConfig,
}

impl SqlParser {
    /// Create a new SQL parser
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a single statement, optionally followed by the terminator
    pub fn parse(&self, sql: &str) -> DdlResult<Statement> {
        let mut tokens = self.tokens(sql)?;
        self.skip_terminators(&mut tokens);

        let statement = self.parse_statement(&mut tokens)?;

        self.skip_terminators(&mut tokens);
        if !tokens.at_end() {
            return Err(parse_err!(tokens, "Unexpected input after statement"));
        }
        Ok(statement)
    }

    /// Parse a script of statements separated by the terminator
    pub fn parse_multiple(&self, sql: &str) -> DdlResult<Vec<Statement>> {
        let mut tokens = self.tokens(sql)?;
        let mut statements = Vec::new();

        loop {
            self.skip_terminators(&mut tokens);
            if tokens.at_end() {
                break;
            }
            statements.push(self.parse_statement(&mut tokens)?);
        }

        Ok(statements)
    }

    /// Read a DDL script from disk and parse every statement in it
    pub fn parse_file(&self, path: impl AsRef<Path>) -> DdlResult<Vec<Statement>> {
        let sql = std::fs::read_to_string(path)?;
        self.parse_multiple(&sql)
    }

    pub fn parse_create_table(&self, sql: &str) -> DdlResult<Table> {
        self.parse_single(&TableParser::new(), sql)
    }

    pub fn parse_alter_table(&self, sql: &str) -> DdlResult<AlterTable> {
        self.parse_single(&AlterTableParser::new(), sql)
    }

    fn tokens(&self, sql: &str) -> DdlResult<TokenStream> {
        TokenStream::from_sql(sql, self.config.clone())
    }

    fn skip_terminators(&self, tokens: &mut TokenStream) {
        while !tokens.at_end() && tokens.consume(&self.config.statement_terminator) {}
    }

    fn parse_single<P: DdlParser>(&self, parser: &P, sql: &str) -> DdlResult<P::Node> {
        let mut tokens = self.tokens(sql)?;
        let node = parser.parse_tokens(&mut tokens)?;

        self.skip_terminators(&mut tokens);
        if !tokens.at_end() {
            return Err(parse_err!(tokens, "Unexpected input after statement"));
        }
        Ok(node)
    }

    fn parse_statement(&self, tokens: &mut TokenStream) -> DdlResult<Statement> {
        if tokens.is("CREATE") {
            Ok(Statement::CreateTable(TableParser::new().parse_tokens(tokens)?))
        } else if tokens.is("ALTER") {
            Ok(Statement::AlterTable(AlterTableParser::new().parse_tokens(tokens)?))
        } else {
            Err(parse_err!(tokens, "Expected CREATE TABLE or ALTER TABLE statement"))
        }
    }
}

/// Parse a single SQL statement (convenience function)
pub fn parse_sql(sql: &str) -> DdlResult<Statement> {
    SqlParser::new().parse(sql)
}

/// Parse multiple SQL statements (convenience function)
pub fn parse_sql_multiple(sql: &str) -> DdlResult<Vec<Statement>> {
    SqlParser::new().parse_multiple(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::DdlError;

    #[test]
    fn test_parse_dispatches_on_first_keyword() -> DdlResult<()> {
        assert!(matches!(
            parse_sql("CREATE TABLE t (id INT);")?,
            Statement::CreateTable(_)
        ));
        assert!(matches!(
            parse_sql("alter table t drop column id")?,
            Statement::AlterTable(_)
        ));
        assert!(parse_sql("DROP TABLE t").is_err());
        assert!(parse_sql("").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_rejects_second_statement() {
        assert!(parse_sql("CREATE TABLE a (id INT); CREATE TABLE b (id INT);").is_err());
    }

    #[test]
    fn test_parse_multiple() -> DdlResult<()> {
        let statements = parse_sql_multiple(
            ";; CREATE TABLE a (id INT);\nALTER TABLE a ADD COLUMN b INT;\n;",
        )?;
        assert_eq!(statements.len(), 2);
        Ok(())
    }

    #[test]
    fn test_parse_file_reports_io_errors() {
        let err = SqlParser::new()
            .parse_file("/nonexistent/prism-ddl/schema.sql")
            .unwrap_err();
        assert!(matches!(err, DdlError::Io(_)));
        assert!(!err.is_parse());
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_custom_terminator() -> DdlResult<()> {
        let parser = SqlParser::with_config(ParserConfig::with_terminator("GO"));
        let statements = parser.parse_multiple(
            "CREATE TABLE a (id INT) GO ALTER TABLE a ADD COLUMN b INT GO",
        )?;
        assert_eq!(statements.len(), 2);
        Ok(())
    }
}
