//! ALTER TABLE grammar
//!
//! ```text
//! ALTER TABLE name alter_option [, alter_option ...] [PARTITION BY ...]
//!
//! alter_option:
//!     [table_option ...] ADD COLUMN col_def [FIRST | AFTER col] | ADD [COLUMN] (col_def, ...)
//!   | [table_option ...] ADD [role] {INDEX | KEY} index_def
//!   | [table_option ...] DROP {COLUMN | INDEX | KEY} name | DROP PRIMARY KEY | DROP FOREIGN KEY name
//!   | [table_option ...] RENAME {COLUMN | INDEX | KEY} old TO new | RENAME [TO | AS] new_table
//!   | [table_option ...] CHANGE [COLUMN] old col_def [FIRST | AFTER col]
//!   | [table_option ...] MODIFY [COLUMN] col_def [FIRST | AFTER col]
//! ```

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::{
    AlterAction, AlterOption, AlterPayload, AlterTable, AlterTarget, ChangeColumn,
    ColumnDefinition, ColumnPosition,
};
use crate::parser::column::{parse_column_name, ColumnDefinitionParser};
use crate::parser::index::IndexDefinitionParser;
use crate::parser::keywords::{classify_alter_target, IndexRole, TargetKeyword};
use crate::parser::partition::PartitionByParser;
use crate::parser::rename::RenameParser;
use crate::parser::stream::TokenStream;
use crate::parser::table_option::TableOptionParser;
use crate::parser::DdlParser;
use tracing::debug;

/// Parser for one ALTER TABLE clause
#[derive(Debug, Default, Clone, Copy)]
pub struct AlterOptionParser;

impl AlterOptionParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_action(&self, tokens: &mut TokenStream) -> DdlResult<AlterAction> {
        let action = match tokens.current().keyword().as_deref() {
            Some("ADD") => AlterAction::Add,
            Some("DROP") => AlterAction::Drop,
            Some("RENAME") => AlterAction::Rename,
            Some("CHANGE") => AlterAction::Change,
            Some("MODIFY") => AlterAction::Modify,
            _ => return Err(parse_err!(tokens, "Expected ALTER action ADD, DROP, RENAME, CHANGE or MODIFY")),
        };
        tokens.advance();
        Ok(action)
    }

    /// Read and normalize the target keywords. Returns the target and, for indexes, the role.
    fn parse_target(
        &self,
        tokens: &mut TokenStream,
        action: AlterAction,
    ) -> DdlResult<(AlterTarget, Option<IndexRole>)> {
        let keyword = tokens.current().keyword();
        let classified = keyword.as_deref().and_then(classify_alter_target);

        if matches!(action, AlterAction::Change | AlterAction::Modify)
            && classified != Some(TargetKeyword::Column)
        {
            // COLUMN is optional after CHANGE and MODIFY
            return Ok((AlterTarget::Column, None));
        }
        if action == AlterAction::Add && tokens.is("(") {
            return Ok((AlterTarget::Column, None));
        }

        let target = match classified {
            Some(target) => target,
            None => {
                return Err(parse_err!(
                    tokens,
                    "Not supported ALTER TABLE expression '{} {}'",
                    action,
                    tokens.current().text
                ));
            }
        };
        tokens.advance();

        match target {
            TargetKeyword::Column => Ok((AlterTarget::Column, None)),
            TargetKeyword::Table => Ok((AlterTarget::Table, None)),
            TargetKeyword::Index(None) => Ok((AlterTarget::Index, None)),
            TargetKeyword::Index(Some(role)) => {
                match role {
                    IndexRole::Primary | IndexRole::Foreign => {
                        tokens.expect("KEY", "Expected keyword KEY")?;
                    }
                    IndexRole::Fulltext | IndexRole::Spatial => {
                        if !tokens.consume("INDEX") && !tokens.consume("KEY") {
                            return Err(parse_err!(tokens, "Expected keyword INDEX or KEY"));
                        }
                    }
                    IndexRole::Unique => {
                        if !tokens.consume("INDEX") {
                            tokens.consume("KEY");
                        }
                    }
                }
                Ok((AlterTarget::Index, Some(role)))
            }
            TargetKeyword::Constraint | TargetKeyword::Partition => Err(parse_err!(
                tokens,
                "Unsupported operation: {} {}",
                action,
                keyword.unwrap_or_default()
            )),
        }
    }

    /// Column definition followed by an optional `FIRST` or `AFTER col` position.
    /// The name is read before FIRST/AFTER become stop tokens; both are legal column names.
    fn parse_positioned_column(&self, tokens: &mut TokenStream) -> DdlResult<ColumnDefinition> {
        let name = parse_column_name(tokens)?;
        let mut column = tokens.with_stop_tokens(&["FIRST", "AFTER"], |tokens| {
            ColumnDefinitionParser::new().parse_after_name(tokens, name)
        })?;

        if tokens.consume("FIRST") {
            column.position = Some(ColumnPosition::First);
        } else if tokens.consume("AFTER") {
            column.position = Some(ColumnPosition::After(parse_column_name(tokens)?));
        }

        Ok(column)
    }

    /// `(col_def, col_def, ...)`
    fn parse_column_group(&self, tokens: &mut TokenStream) -> DdlResult<Vec<ColumnDefinition>> {
        tokens.expect("(", "Expected opening bracket \"(\"")?;

        let mut columns = vec![self.parse_positioned_column(tokens)?];
        while tokens.consume(",") {
            columns.push(self.parse_positioned_column(tokens)?);
        }

        tokens.expect(")", "Column definition expected closing bracket \")\"")?;
        Ok(columns)
    }

    fn unsupported(
        &self,
        tokens: &TokenStream,
        action: AlterAction,
        target: AlterTarget,
    ) -> crate::common::error::DdlError {
        parse_err!(tokens, "Unsupported operation: {} {}", action, target)
    }
}

impl DdlParser for AlterOptionParser {
    type Node = AlterOption;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<AlterOption> {
        let table_options = TableOptionParser::new().parse_options(tokens)?;
        let action = self.parse_action(tokens)?;

        // RENAME new_table_name, without TO/AS
        if action == AlterAction::Rename
            && !tokens.is_any(&["TO", "AS", "COLUMN", "INDEX", "KEY"])
        {
            let new_name = parse_column_name(tokens)?;
            return Ok(AlterOption {
                target: AlterTarget::Table,
                action,
                payload: AlterPayload::Name(new_name),
                table_options,
            });
        }

        let (target, role) = self.parse_target(tokens, action)?;

        let payload = match (action, target) {
            (AlterAction::Add, AlterTarget::Column) => {
                if tokens.is("(") {
                    AlterPayload::Columns(self.parse_column_group(tokens)?)
                } else {
                    AlterPayload::Column(self.parse_positioned_column(tokens)?)
                }
            }
            (AlterAction::Add, AlterTarget::Index) => {
                let mut index = IndexDefinitionParser::new().parse_body(tokens)?;
                index.role = role;
                AlterPayload::Index(index)
            }
            (AlterAction::Drop, AlterTarget::Column) | (AlterAction::Drop, AlterTarget::Index) => {
                let name = match role {
                    Some(IndexRole::Primary) => "PRIMARY KEY".to_string(),
                    Some(IndexRole::Foreign) => format!("FOREIGN KEY {}", parse_column_name(tokens)?),
                    _ => parse_column_name(tokens)?,
                };
                AlterPayload::Name(name)
            }
            (AlterAction::Rename, AlterTarget::Column) | (AlterAction::Rename, AlterTarget::Index) => {
                AlterPayload::Rename(RenameParser::new().parse_tokens(tokens)?)
            }
            (AlterAction::Rename, AlterTarget::Table) => {
                AlterPayload::Name(parse_column_name(tokens)?)
            }
            (AlterAction::Change, AlterTarget::Column) => {
                let old_name = parse_column_name(tokens)?;
                let column = self.parse_positioned_column(tokens)?;
                AlterPayload::ChangeColumn(ChangeColumn { old_name, column })
            }
            (AlterAction::Modify, AlterTarget::Column) => {
                AlterPayload::Column(self.parse_positioned_column(tokens)?)
            }
            (action, target) => return Err(self.unsupported(tokens, action, target)),
        };

        Ok(AlterOption {
            target,
            action,
            payload,
            table_options,
        })
    }
}

/// Root parser of ALTER TABLE statements
#[derive(Debug, Default, Clone, Copy)]
pub struct AlterTableParser;

impl AlterTableParser {
    pub fn new() -> Self {
        Self
    }
}

impl DdlParser for AlterTableParser {
    type Node = AlterTable;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<AlterTable> {
        tokens.expect("ALTER", "Expected keyword ALTER")?;
        tokens.expect("TABLE", "Expected keyword TABLE")?;
        let table_name = parse_column_name(tokens)?;

        debug!(table = %table_name, "parsing ALTER TABLE");

        let terminator = tokens.config().statement_terminator.clone();
        let options = tokens.with_stop_tokens(&[terminator.as_str(), "PARTITION"], |tokens| {
            let mut options = Vec::new();
            while !tokens.is_terminator() && !tokens.is("PARTITION") {
                options.push(AlterOptionParser::new().parse_tokens(tokens)?);
                if !tokens.consume(",") {
                    break;
                }
            }
            Ok(options)
        })?;

        let partition_by = if tokens.is("PARTITION") {
            Some(PartitionByParser::new().parse_tokens(tokens)?)
        } else {
            None
        };

        if !tokens.is_terminator() {
            return Err(parse_err!(tokens, "Expected \",\" or end of ALTER TABLE statement"));
        }
        if options.is_empty() && partition_by.is_none() {
            return Err(parse_err!(tokens, "Expected ALTER TABLE clause"));
        }

        debug!(table = %table_name, options = options.len(), "parsed ALTER TABLE");

        Ok(AlterTable {
            table_name,
            options,
            partition_by,
        })
    }
}
