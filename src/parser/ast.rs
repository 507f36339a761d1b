//! Abstract Syntax Tree (AST) for MySQL DDL statements
//!
//! Every node renders back to normalized SQL through `fmt::Display`: upper-case keywords,
//! backtick-quoted identifiers and a single space before `(`.

use crate::parser::keywords::IndexRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Quote an identifier with backticks
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal with single quotes
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

fn quoted_list(names: &[String], separator: &str) -> String {
    names
        .iter()
        .map(|name| quote_ident(name))
        .collect::<Vec<_>>()
        .join(separator)
}

fn literal_list(values: &[Literal], separator: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// A typed literal as it appears in defaults, enum variants and partition values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// Quoted string with the quotes stripped
    Str(String),
    /// Bare keyword or expression kept verbatim, e.g. `CURRENT_TIMESTAMP` or `MAXVALUE`
    Raw(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{}", i),
            // Debug keeps the fraction (`1.0`) so the value lexes as a float again
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Str(s) => write!(f, "{}", quote_string(s)),
            Literal::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// Position hint of a column added or changed by ALTER TABLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    First,
    After(String),
}

impl fmt::Display for ColumnPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnPosition::First => write!(f, "FIRST"),
            ColumnPosition::After(column) => write!(f, "AFTER {}", quote_ident(column)),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Upper-cased type keyword
    pub type_name: String,
    pub display_width: Option<u32>,
    pub decimal_digits: Option<u32>,
    pub is_unsigned: bool,
    pub is_nullable: bool,
    pub is_zerofill: bool,
    pub is_auto_increment: bool,
    pub default_value: Option<Literal>,
    pub on_update: Option<Literal>,
    pub enum_variants: Option<Vec<Literal>>,
    pub comment: Option<String>,
    pub position: Option<ColumnPosition>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            display_width: None,
            decimal_digits: None,
            is_unsigned: false,
            is_nullable: true,
            is_zerofill: false,
            is_auto_increment: false,
            default_value: None,
            on_update: None,
            enum_variants: None,
            comment: None,
            position: None,
        }
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.name), self.type_name)?;

        if let Some(variants) = &self.enum_variants {
            write!(f, " ({})", literal_list(variants, ","))?;
        } else if let Some(width) = self.display_width {
            match self.decimal_digits {
                Some(digits) => write!(f, " ({},{})", width, digits)?,
                None => write!(f, " ({})", width)?,
            }
        }

        if self.is_unsigned {
            write!(f, " UNSIGNED")?;
        }
        if self.is_zerofill {
            write!(f, " ZEROFILL")?;
        }

        write!(f, "{}", if self.is_nullable { " NULL" } else { " NOT NULL" })?;

        if let Some(default) = &self.default_value {
            write!(f, " DEFAULT {}", default)?;
        }
        if let Some(on_update) = &self.on_update {
            write!(f, " ON UPDATE {}", on_update)?;
        }
        if self.is_auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        if let Some(position) = &self.position {
            write!(f, " {}", position)?;
        }

        Ok(())
    }
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: Option<String>,
    /// Index type hint from `USING`, e.g. `BTREE`
    pub index_type: Option<String>,
    pub role: Option<IndexRole>,
    pub columns: Vec<String>,
}

impl fmt::Display for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "{} KEY", role.keyword())?,
            None => write!(f, "KEY")?,
        }
        if let Some(name) = &self.name {
            write!(f, " {}", quote_ident(name))?;
        }
        write!(f, " ({})", quoted_list(&self.columns, ","))?;
        if let Some(index_type) = &self.index_type {
            write!(f, " USING {}", index_type)?;
        }
        Ok(())
    }
}

/// Event a foreign key action fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferenceEvent {
    Delete,
    Update,
}

impl fmt::Display for ReferenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ReferenceEvent::Delete => "DELETE",
            ReferenceEvent::Update => "UPDATE",
        })
    }
}

/// `<referential_action> =
/// { RESTRICT | CASCADE | SET NULL | NO ACTION | SET DEFAULT }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    Restrict,
    Cascade,
    SetNull,
    NoAction,
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
        })
    }
}

/// Body of a `CONSTRAINT` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    ForeignKey {
        /// Optional index name between `FOREIGN KEY` and the column list
        index_name: Option<String>,
        local_columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
        reference_actions: BTreeMap<ReferenceEvent, ReferentialAction>,
    },
    /// Any other constraint body (CHECK, UNIQUE, ...), kept as raw text
    Unsupported { clause: String },
}

/// Table constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub name: Option<String>,
    pub kind: ConstraintKind,
}

impl ConstraintDefinition {
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey { .. })
    }
}

impl fmt::Display for ConstraintDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CONSTRAINT")?;
        if let Some(name) = &self.name {
            write!(f, " {}", quote_ident(name))?;
        }

        match &self.kind {
            ConstraintKind::ForeignKey {
                index_name,
                local_columns,
                referenced_table,
                referenced_columns,
                reference_actions,
            } => {
                write!(f, " FOREIGN KEY")?;
                if let Some(index_name) = index_name {
                    write!(f, " {}", quote_ident(index_name))?;
                }
                write!(
                    f,
                    " ({}) REFERENCES {} ({})",
                    quoted_list(local_columns, ","),
                    quote_ident(referenced_table),
                    quoted_list(referenced_columns, ","),
                )?;
                for (event, action) in reference_actions {
                    write!(f, " ON {} {}", event, action)?;
                }
                Ok(())
            }
            ConstraintKind::Unsupported { clause } => write!(f, " {}", clause),
        }
    }
}

/// Value of a table option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TableOptionValue {
    Literal(Literal),
    /// Table names of `UNION = (...)`
    List(Vec<String>),
    Tablespace {
        name: String,
        storage: Option<String>,
    },
}

/// Table-level option such as `ENGINE = InnoDB`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOption {
    /// Upper-cased option keywords, space separated (`DEFAULT CHARSET`)
    pub key: String,
    pub value: TableOptionValue,
}

impl fmt::Display for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            TableOptionValue::Literal(value) => write!(f, "{} = {}", self.key, value),
            TableOptionValue::List(tables) => {
                write!(f, "{} = ({})", self.key, quoted_list(tables, ","))
            }
            TableOptionValue::Tablespace { name, storage } => {
                write!(f, "{} {}", self.key, quote_ident(name))?;
                if let Some(storage) = storage {
                    write!(f, " STORAGE {}", storage)?;
                }
                Ok(())
            }
        }
    }
}

/// Partitioning function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionKind {
    Hash,
    Key,
    Range,
    List,
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PartitionKind::Hash => "HASH",
            PartitionKind::Key => "KEY",
            PartitionKind::Range => "RANGE",
            PartitionKind::List => "LIST",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionValuesKind {
    LessThan,
    In,
}

impl fmt::Display for PartitionValuesKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PartitionValuesKind::LessThan => "LESS THAN",
            PartitionValuesKind::In => "IN",
        })
    }
}

/// One `PARTITION p VALUES ...` entry of a RANGE/LIST partition list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDefinition {
    pub name: String,
    pub values_kind: Option<PartitionValuesKind>,
    pub values: Vec<Literal>,
    /// Partition-level options are consumed but not modeled; always empty
    pub options: Vec<TableOption>,
}

impl fmt::Display for PartitionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PARTITION {}", quote_ident(&self.name))?;
        if let Some(kind) = self.values_kind {
            write!(f, " VALUES {} ({})", kind, literal_list(&self.values, ", "))?;
        }
        Ok(())
    }
}

/// `PARTITION BY` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionBy {
    pub kind: PartitionKind,
    pub is_linear: bool,
    pub is_columns: bool,
    /// Partitioning expression of HASH/RANGE/LIST without COLUMNS
    pub expression: Option<String>,
    /// Columns of KEY and of the COLUMNS variants
    pub columns: Vec<String>,
    pub partitions_count: Option<u32>,
    /// `ALGORITHM = {1|2}` of KEY partitioning
    pub key_algorithm: Option<u8>,
    pub subpartition_by: Option<Box<PartitionBy>>,
    pub definitions: Vec<PartitionDefinition>,
}

impl PartitionBy {
    pub fn new(kind: PartitionKind) -> Self {
        Self {
            kind,
            is_linear: false,
            is_columns: false,
            expression: None,
            columns: Vec::new(),
            partitions_count: None,
            key_algorithm: None,
            subpartition_by: None,
            definitions: Vec::new(),
        }
    }

    fn fmt_clause(&self, f: &mut fmt::Formatter, keyword: &str) -> fmt::Result {
        write!(f, "{} BY ", keyword)?;
        if self.is_linear {
            write!(f, "LINEAR ")?;
        }
        write!(f, "{}", self.kind)?;

        if let Some(algorithm) = self.key_algorithm {
            write!(f, " ALGORITHM = {}", algorithm)?;
        }
        if self.is_columns {
            write!(f, " COLUMNS")?;
        }
        match &self.expression {
            Some(expression) => write!(f, " ({})", expression)?,
            None => write!(f, " ({})", quoted_list(&self.columns, ", "))?,
        }

        if let Some(count) = self.partitions_count {
            write!(f, " {}S {}", keyword, count)?;
        }
        if let Some(subpartition) = &self.subpartition_by {
            write!(f, " ")?;
            subpartition.fmt_clause(f, "SUBPARTITION")?;
        }

        if !self.definitions.is_empty() {
            let definitions = self
                .definitions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",\n");
            write!(f, " (\n{}\n)", definitions)?;
        }

        Ok(())
    }
}

impl fmt::Display for PartitionBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_clause(f, "PARTITION")
    }
}

/// `old TO new` rename of a column or index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameDefinition {
    pub old_name: String,
    pub new_name: String,
}

impl fmt::Display for RenameDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} TO {}",
            quote_ident(&self.old_name),
            quote_ident(&self.new_name)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlterTarget {
    Column,
    Index,
    Table,
}

impl fmt::Display for AlterTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AlterTarget::Column => "COLUMN",
            AlterTarget::Index => "INDEX",
            AlterTarget::Table => "TABLE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlterAction {
    Add,
    Drop,
    Rename,
    Change,
    Modify,
}

impl fmt::Display for AlterAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AlterAction::Add => "ADD",
            AlterAction::Drop => "DROP",
            AlterAction::Rename => "RENAME",
            AlterAction::Change => "CHANGE",
            AlterAction::Modify => "MODIFY",
        })
    }
}

/// `CHANGE COLUMN old new_definition`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeColumn {
    pub old_name: String,
    pub column: ColumnDefinition,
}

/// What an ALTER clause operates on; determined by its target and action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AlterPayload {
    Column(ColumnDefinition),
    /// `ADD (col def, col def, ...)`
    Columns(Vec<ColumnDefinition>),
    Index(IndexDefinition),
    Rename(RenameDefinition),
    ChangeColumn(ChangeColumn),
    /// Dropped object (`PRIMARY KEY`, `FOREIGN KEY name` or a bare name) or a new table name
    Name(String),
}

/// One clause of ALTER TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterOption {
    pub target: AlterTarget,
    pub action: AlterAction,
    pub payload: AlterPayload,
    /// Table options prefixing the clause
    pub table_options: Vec<TableOption>,
}

impl fmt::Display for AlterOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for option in &self.table_options {
            write!(f, "{} ", option)?;
        }

        match (&self.action, &self.payload) {
            (AlterAction::Add, AlterPayload::Column(column)) => write!(f, "ADD COLUMN {}", column),
            (AlterAction::Add, AlterPayload::Columns(columns)) => {
                let columns = columns
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "ADD COLUMN ({})", columns)
            }
            (AlterAction::Add, AlterPayload::Index(index)) => write!(f, "ADD {}", index),
            (AlterAction::Drop, AlterPayload::Name(name)) => {
                if name == "PRIMARY KEY" {
                    write!(f, "DROP PRIMARY KEY")
                } else if let Some(foreign_key) = name.strip_prefix("FOREIGN KEY ") {
                    write!(f, "DROP FOREIGN KEY {}", quote_ident(foreign_key))
                } else if self.target == AlterTarget::Table {
                    write!(f, "DROP {}", quote_ident(name))
                } else {
                    write!(f, "DROP {} {}", self.target, quote_ident(name))
                }
            }
            (AlterAction::Rename, AlterPayload::Rename(rename)) => {
                write!(f, "RENAME {} {}", self.target, rename)
            }
            (AlterAction::Rename, AlterPayload::Name(name)) => {
                write!(f, "RENAME TO {}", quote_ident(name))
            }
            (AlterAction::Change, AlterPayload::ChangeColumn(change)) => write!(
                f,
                "CHANGE COLUMN {} {}",
                quote_ident(&change.old_name),
                change.column
            ),
            (AlterAction::Modify, AlterPayload::Column(column)) => {
                write!(f, "MODIFY COLUMN {}", column)
            }
            (action, _) => write!(f, "{} {}", action, self.target),
        }
    }
}

/// ALTER TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub table_name: String,
    pub options: Vec<AlterOption>,
    pub partition_by: Option<PartitionBy>,
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ALTER TABLE {}", quote_ident(&self.table_name))?;
        if !self.options.is_empty() {
            let options = self
                .options
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",\n");
            write!(f, "\n{}", options)?;
        }
        if let Some(partition_by) = &self.partition_by {
            write!(f, "\n{}", partition_by)?;
        }
        Ok(())
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub is_temporary: bool,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
    pub constraints: Vec<ConstraintDefinition>,
    pub comment: Option<String>,
    pub partition_by: Option<PartitionBy>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key(&self) -> Option<&IndexDefinition> {
        self.indexes
            .iter()
            .find(|index| index.role == Some(IndexRole::Primary))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.is_temporary {
            write!(f, "TEMPORARY ")?;
        }
        write!(f, "TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }

        let definitions = self
            .columns
            .iter()
            .map(ToString::to_string)
            .chain(self.indexes.iter().map(ToString::to_string))
            .chain(self.constraints.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join(",\n");
        write!(f, "{} (\n{}\n)", quote_ident(&self.name), definitions)?;

        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        if let Some(partition_by) = &self.partition_by {
            write!(f, "\n{}", partition_by)?;
        }
        Ok(())
    }
}
