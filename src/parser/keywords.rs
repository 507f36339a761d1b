//! Keyword tables used to dispatch between grammars

use serde::{Deserialize, Serialize};

/// How a data type's parameters are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// Optional `(width)`, then UNSIGNED / ZEROFILL
    Integer,
    /// Optional `(width[, decimals])`, then UNSIGNED / ZEROFILL
    FixedPoint,
    /// Optional fractional seconds precision `(fsp)`
    Temporal,
    /// No parameters
    Plain,
    /// `(length)`, then CHARACTER SET / COLLATE
    SizedString,
    /// `('a', 'b', ...)`, then CHARACTER SET / COLLATE
    Enumerated,
    /// Anything else is kept by name without parameters
    Other,
}

impl TypeFamily {
    pub fn of(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "BIT" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
                TypeFamily::Integer
            }
            "REAL" | "DOUBLE" | "FLOAT" | "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => {
                TypeFamily::FixedPoint
            }
            "TIME" | "TIMESTAMP" | "DATETIME" => TypeFamily::Temporal,
            "DATE" | "YEAR" | "BOOL" | "BOOLEAN" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB"
            | "LONGBLOB" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "JSON" => {
                TypeFamily::Plain
            }
            "CHAR" | "VARCHAR" | "BINARY" | "VARBINARY" => TypeFamily::SizedString,
            "ENUM" | "SET" => TypeFamily::Enumerated,
            _ => TypeFamily::Other,
        }
    }
}

/// Role keyword of an index definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexRole {
    Primary,
    Unique,
    Fulltext,
    Spatial,
    Foreign,
}

impl IndexRole {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "PRIMARY" => Some(IndexRole::Primary),
            "UNIQUE" => Some(IndexRole::Unique),
            "FULLTEXT" => Some(IndexRole::Fulltext),
            "SPATIAL" => Some(IndexRole::Spatial),
            "FOREIGN" => Some(IndexRole::Foreign),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            IndexRole::Primary => "PRIMARY",
            IndexRole::Unique => "UNIQUE",
            IndexRole::Fulltext => "FULLTEXT",
            IndexRole::Spatial => "SPATIAL",
            IndexRole::Foreign => "FOREIGN",
        }
    }
}

/// Keywords that open an index definition inside CREATE TABLE
pub fn starts_index_definition(keyword: &str) -> bool {
    matches!(
        keyword.to_ascii_uppercase().as_str(),
        "INDEX" | "KEY" | "PRIMARY" | "UNIQUE" | "FULLTEXT" | "SPATIAL"
    )
}

/// Target keyword of an ALTER clause, normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKeyword {
    Column,
    /// `INDEX`/`KEY`, optionally preceded by a role keyword
    Index(Option<IndexRole>),
    Constraint,
    Partition,
    /// `TO`/`AS` continuing a table RENAME
    Table,
}

pub fn classify_alter_target(keyword: &str) -> Option<TargetKeyword> {
    let target = match keyword.to_ascii_uppercase().as_str() {
        "COLUMN" => TargetKeyword::Column,
        "INDEX" | "KEY" => TargetKeyword::Index(None),
        "CONSTRAINT" => TargetKeyword::Constraint,
        "PARTITION" => TargetKeyword::Partition,
        "TO" | "AS" => TargetKeyword::Table,
        other => TargetKeyword::Index(Some(IndexRole::from_keyword(other)?)),
    };
    Some(target)
}

/// Table options recognized in ALTER TABLE prefixes
pub fn is_table_option(keyword: &str) -> bool {
    matches!(
        keyword.to_ascii_uppercase().as_str(),
        "AUTOEXTEND_SIZE"
            | "AUTO_INCREMENT"
            | "AVG_ROW_LENGTH"
            | "DEFAULT"
            | "CHARACTER"
            | "CHARSET"
            | "COLLATE"
            | "CHECKSUM"
            | "COMMENT"
            | "COMPRESSION"
            | "CONNECTION"
            | "DATA"
            | "INDEX"
            | "DIRECTORY"
            | "DELAY_KEY_WRITE"
            | "ENCRYPTION"
            | "ENGINE"
            | "ENGINE_ATTRIBUTE"
            | "INSERT_METHOD"
            | "KEY_BLOCK_SIZE"
            | "MAX_ROWS"
            | "MIN_ROWS"
            | "PACK_KEYS"
            | "PASSWORD"
            | "ROW_FORMAT"
            | "SECONDARY_ENGINE_ATTRIBUTE"
            | "STATS_AUTO_RECALC"
            | "STATS_PERSISTENT"
            | "STATS_SAMPLE_PAGES"
            | "TABLESPACE"
            | "UNION"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_families() {
        assert_eq!(TypeFamily::of("bigint"), TypeFamily::Integer);
        assert_eq!(TypeFamily::of("DECIMAL"), TypeFamily::FixedPoint);
        assert_eq!(TypeFamily::of("datetime"), TypeFamily::Temporal);
        assert_eq!(TypeFamily::of("TEXT"), TypeFamily::Plain);
        assert_eq!(TypeFamily::of("varchar"), TypeFamily::SizedString);
        assert_eq!(TypeFamily::of("SET"), TypeFamily::Enumerated);
        assert_eq!(TypeFamily::of("GEOMETRY"), TypeFamily::Other);
    }

    #[test]
    fn test_index_roles() {
        assert_eq!(IndexRole::from_keyword("unique"), Some(IndexRole::Unique));
        assert_eq!(IndexRole::from_keyword("KEY"), None);
        assert!(starts_index_definition("fulltext"));
        assert!(!starts_index_definition("CONSTRAINT"));
    }

    #[test]
    fn test_alter_targets() {
        assert_eq!(classify_alter_target("key"), Some(TargetKeyword::Index(None)));
        assert_eq!(
            classify_alter_target("PRIMARY"),
            Some(TargetKeyword::Index(Some(IndexRole::Primary)))
        );
        assert_eq!(classify_alter_target("AS"), Some(TargetKeyword::Table));
        assert_eq!(classify_alter_target("email"), None);
    }

    #[test]
    fn test_table_option_allow_list() {
        assert!(is_table_option("engine"));
        assert!(is_table_option("ROW_FORMAT"));
        assert!(!is_table_option("ADD"));
    }
}
