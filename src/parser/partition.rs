//! `PARTITION BY` grammar
//!
//! ```text
//! PARTITION BY [LINEAR] HASH (expr) | [LINEAR] KEY [ALGORITHM = {1|2}] (cols)
//!            | RANGE {(expr) | COLUMNS (cols)} | LIST {(expr) | COLUMNS (cols)}
//!     [PARTITIONS n]
//!     [SUBPARTITION BY [LINEAR] {HASH (expr) | KEY [ALGORITHM = {1|2}] (cols)} [SUBPARTITIONS n]]
//!     [(PARTITION name [VALUES {LESS THAN | IN} (values)] [options], ...)]
//! ```

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::{
    Literal, PartitionBy, PartitionDefinition, PartitionKind, PartitionValuesKind,
};
use crate::parser::column::{parse_column_list, parse_column_name, parse_literal, parse_unsigned};
use crate::parser::stream::TokenStream;
use crate::parser::tokenizer::TokenKind;
use crate::parser::DdlParser;
use tracing::warn;

/// Whether a clause partitions the table or the partitions themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionLevel {
    Partition,
    Subpartition,
}

impl PartitionLevel {
    fn keyword(self) -> &'static str {
        match self {
            PartitionLevel::Partition => "PARTITION",
            PartitionLevel::Subpartition => "SUBPARTITION",
        }
    }

    fn count_keyword(self) -> &'static str {
        match self {
            PartitionLevel::Partition => "PARTITIONS",
            PartitionLevel::Subpartition => "SUBPARTITIONS",
        }
    }
}

/// Parser for a `PARTITION BY` clause, or a `SUBPARTITION BY` clause nested in one
#[derive(Debug, Clone, Copy)]
pub struct PartitionByParser {
    level: PartitionLevel,
}

impl Default for PartitionByParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionByParser {
    pub fn new() -> Self {
        Self {
            level: PartitionLevel::Partition,
        }
    }

    pub fn subpartition() -> Self {
        Self {
            level: PartitionLevel::Subpartition,
        }
    }

    fn parse_kind(&self, tokens: &mut TokenStream) -> DdlResult<PartitionKind> {
        let kind = match tokens.current().keyword().as_deref() {
            Some("HASH") => PartitionKind::Hash,
            Some("KEY") => PartitionKind::Key,
            Some("RANGE") if self.level == PartitionLevel::Partition => PartitionKind::Range,
            Some("LIST") if self.level == PartitionLevel::Partition => PartitionKind::List,
            _ if self.level == PartitionLevel::Subpartition => {
                return Err(parse_err!(tokens, "Expected HASH or KEY in SUBPARTITION BY"));
            }
            _ => return Err(parse_err!(tokens, "Expected HASH, KEY, RANGE or LIST")),
        };
        tokens.advance();
        Ok(kind)
    }

    fn parse_key_algorithm(&self, tokens: &mut TokenStream) -> DdlResult<Option<u8>> {
        if !tokens.consume("ALGORITHM") {
            return Ok(None);
        }
        tokens.expect("=", "Expected \"=\" after ALGORITHM")?;

        let algorithm = match tokens.current() {
            token if token.kind == TokenKind::Integer && token.text == "1" => 1,
            token if token.kind == TokenKind::Integer && token.text == "2" => 2,
            _ => return Err(parse_err!(tokens, "Expected ALGORITHM value 1 or 2")),
        };
        tokens.advance();
        Ok(Some(algorithm))
    }

    fn parse_definitions(&self, tokens: &mut TokenStream) -> DdlResult<Vec<PartitionDefinition>> {
        tokens.expect("(", "Expected opening bracket \"(\" of partition definitions")?;

        let mut definitions = vec![self.parse_definition(tokens)?];
        while tokens.consume(",") {
            definitions.push(self.parse_definition(tokens)?);
        }

        tokens.expect(")", "Expected closing bracket \")\" after partition definitions")?;
        Ok(definitions)
    }

    fn parse_definition(&self, tokens: &mut TokenStream) -> DdlResult<PartitionDefinition> {
        tokens.expect("PARTITION", "Expected keyword PARTITION in partition definition")?;
        let name = parse_column_name(tokens)?;

        let mut values_kind = None;
        let mut values = Vec::new();

        if tokens.consume("VALUES") {
            if tokens.consume("LESS") {
                tokens.expect("THAN", "Expected keyword THAN after LESS")?;
                values_kind = Some(PartitionValuesKind::LessThan);
            } else if tokens.consume("IN") {
                values_kind = Some(PartitionValuesKind::In);
            } else {
                return Err(parse_err!(tokens, "Expected LESS THAN or IN after VALUES"));
            }

            if values_kind == Some(PartitionValuesKind::LessThan) && tokens.is("MAXVALUE") {
                tokens.advance();
                values.push(Literal::Raw("MAXVALUE".to_string()));
            } else {
                values = self.parse_values(tokens)?;
            }
        }

        // ENGINE, COMMENT, DATA DIRECTORY and inline subpartitions are consumed, not modeled
        let mut discarded = 0usize;
        tokens.skip_until(&[","], |_, _| {
            discarded += 1;
            Ok(false)
        })?;
        if discarded > 0 {
            warn!(partition = %name, tokens = discarded, "discarding partition options");
        }

        Ok(PartitionDefinition {
            name,
            values_kind,
            values,
            options: Vec::new(),
        })
    }

    fn parse_values(&self, tokens: &mut TokenStream) -> DdlResult<Vec<Literal>> {
        tokens.expect("(", "Expected opening bracket \"(\" after VALUES clause")?;

        let mut values = vec![parse_literal(tokens)?];
        while tokens.consume(",") {
            values.push(parse_literal(tokens)?);
        }

        tokens.expect(")", "Expected closing bracket \")\" after VALUES list")?;
        Ok(values)
    }
}

impl DdlParser for PartitionByParser {
    type Node = PartitionBy;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<PartitionBy> {
        let keyword = self.level.keyword();
        if !tokens.consume(keyword) {
            return Err(parse_err!(tokens, "Expected keyword {}", keyword));
        }
        tokens.expect("BY", "Expected keyword BY")?;

        let is_linear = tokens.consume("LINEAR");
        let mut partition_by = PartitionBy::new(self.parse_kind(tokens)?);
        partition_by.is_linear = is_linear;

        match partition_by.kind {
            PartitionKind::Key => {
                partition_by.key_algorithm = self.parse_key_algorithm(tokens)?;
                if tokens.is("COLUMNS") {
                    return Err(parse_err!(tokens, "COLUMNS is only allowed for RANGE or LIST"));
                }
                // KEY () partitions by the primary key
                if tokens.is("(") && tokens.peek_is(")") {
                    tokens.advance().advance();
                } else {
                    partition_by.columns = parse_column_list(tokens)?;
                }
            }
            kind => {
                if tokens.is("COLUMNS") {
                    if kind == PartitionKind::Hash {
                        return Err(parse_err!(tokens, "COLUMNS is only allowed for RANGE or LIST"));
                    }
                    tokens.advance();
                    partition_by.is_columns = true;
                    partition_by.columns = parse_column_list(tokens)?;
                } else {
                    let expression = tokens.capture_parenthesized()?;
                    if expression.is_empty() {
                        return Err(parse_err!(tokens, "Expected partition expression"));
                    }
                    partition_by.expression = Some(expression);
                }
            }
        }

        if tokens.consume(self.level.count_keyword()) {
            partition_by.partitions_count = Some(parse_unsigned(tokens, "partition count")?);
        }

        if self.level == PartitionLevel::Partition && tokens.is("SUBPARTITION") {
            let subpartition = PartitionByParser::subpartition().parse_tokens(tokens)?;
            partition_by.subpartition_by = Some(Box::new(subpartition));
        }

        if self.level == PartitionLevel::Partition
            && matches!(partition_by.kind, PartitionKind::Range | PartitionKind::List)
            && tokens.is("(")
        {
            partition_by.definitions = self.parse_definitions(tokens)?;
        }

        Ok(partition_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> DdlResult<PartitionBy> {
        PartitionByParser::new().parse(sql)
    }

    #[test]
    fn test_hash_expression() -> DdlResult<()> {
        let partition_by = parse("PARTITION BY HASH(YEAR(created_at)) PARTITIONS 4")?;
        assert_eq!(partition_by.kind, PartitionKind::Hash);
        assert_eq!(partition_by.expression.as_deref(), Some("YEAR(created_at)"));
        assert!(partition_by.columns.is_empty());
        assert_eq!(partition_by.partitions_count, Some(4));
        Ok(())
    }

    #[test]
    fn test_key_algorithm() -> DdlResult<()> {
        let partition_by = parse("PARTITION BY KEY ALGORITHM = 1 (id)")?;
        assert_eq!(partition_by.key_algorithm, Some(1));
        assert!(parse("PARTITION BY KEY ALGORITHM = 3 (id)").is_err());
        assert!(parse("PARTITION BY KEY ALGORITHM 2 (id)").is_err());
        Ok(())
    }

    #[test]
    fn test_subpartition() -> DdlResult<()> {
        let partition_by = parse(
            "PARTITION BY RANGE (YEAR(purchased)) SUBPARTITION BY HASH (TO_DAYS(purchased)) \
             SUBPARTITIONS 2 (PARTITION p0 VALUES LESS THAN (1990), \
             PARTITION p1 VALUES LESS THAN MAXVALUE)",
        )?;

        let subpartition = partition_by.subpartition_by.as_deref().unwrap();
        assert_eq!(subpartition.kind, PartitionKind::Hash);
        assert_eq!(subpartition.expression.as_deref(), Some("TO_DAYS(purchased)"));
        assert_eq!(subpartition.partitions_count, Some(2));
        assert_eq!(partition_by.definitions.len(), 2);
        assert_eq!(
            partition_by.definitions[1].values,
            vec![Literal::Raw("MAXVALUE".into())]
        );
        assert!(partition_by
            .to_string()
            .contains("SUBPARTITION BY HASH (TO_DAYS(purchased)) SUBPARTITIONS 2"));
        Ok(())
    }

    #[test]
    fn test_key_without_columns() -> DdlResult<()> {
        let partition_by = parse("PARTITION BY KEY() PARTITIONS 4")?;
        assert_eq!(partition_by.kind, PartitionKind::Key);
        assert!(partition_by.columns.is_empty());
        assert_eq!(partition_by.expression, None);
        assert_eq!(partition_by.to_string(), "PARTITION BY KEY () PARTITIONS 4");
        assert_eq!(parse(&partition_by.to_string())?, partition_by);

        assert!(parse("PARTITION BY HASH () PARTITIONS 4").is_err());
        Ok(())
    }

    #[test]
    fn test_subpartition_rejects_range() {
        assert!(parse("PARTITION BY RANGE (a) SUBPARTITION BY RANGE (b)").is_err());
    }

    #[test]
    fn test_definition_options_are_skipped() -> DdlResult<()> {
        let partition_by = parse(
            "PARTITION BY LIST (region) (\
             PARTITION pn VALUES IN (1, 2) ENGINE = InnoDB COMMENT = 'north' \
             (SUBPARTITION s0, SUBPARTITION s1), \
             PARTITION ps VALUES IN ('s'))",
        )?;
        assert_eq!(partition_by.definitions.len(), 2);
        assert!(partition_by.definitions[0].options.is_empty());
        assert_eq!(
            partition_by.definitions[1].values,
            vec![Literal::Str("s".into())]
        );
        Ok(())
    }

    #[test]
    fn test_errors() {
        assert!(parse("PARTITION BY HASH COLUMNS(x)").is_err());
        assert!(parse("PARTITION BY KEY COLUMNS(x)").is_err());
        assert!(parse("PARTITION BY SPLIT (x)").is_err());
        assert!(parse("PARTITION BY RANGE (a) (PARTITION p0 VALUES LESS THAN (1)").is_err());
        assert!(parse("PARTITION BY RANGE (a) (PARTITION p0 VALUES BELOW (1))").is_err());
    }
}
