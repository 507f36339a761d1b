//! Prism DDL - MySQL DDL grammar engine
//!
//! Parses MySQL `CREATE TABLE` and `ALTER TABLE` statements, including column types, indexes,
//! foreign keys, table options and the full `PARTITION BY` grammar, into a typed AST that
//! renders back to normalized SQL.
//!
pub mod common;
pub mod parser;

// Re-export common types for convenience
pub use common::{DdlError, DdlResult, ParserConfig};

// Re-export the parser facade and AST for convenience
pub use parser::{
    parse_sql, parse_sql_multiple, AlterAction, AlterOption, AlterPayload, AlterTable,
    AlterTarget, ColumnDefinition, ColumnPosition, ConstraintDefinition, ConstraintKind,
    DdlParser, IndexDefinition, IndexRole, Literal, PartitionBy, PartitionDefinition,
    PartitionKind, PartitionValuesKind, SqlParser, Statement, Table, TableOption,
    TableOptionValue,
};
