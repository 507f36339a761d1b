//! `old_name TO new_name` grammar of column and index renames

use crate::common::error::DdlResult;
use crate::parser::ast::RenameDefinition;
use crate::parser::column::parse_column_name;
use crate::parser::stream::TokenStream;
use crate::parser::DdlParser;

#[derive(Debug, Default, Clone, Copy)]
pub struct RenameParser;

impl RenameParser {
    pub fn new() -> Self {
        Self
    }
}

impl DdlParser for RenameParser {
    type Node = RenameDefinition;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<RenameDefinition> {
        let old_name = parse_column_name(tokens)?;
        tokens.expect("TO", "Expected keyword TO in RENAME")?;
        let new_name = parse_column_name(tokens)?;

        Ok(RenameDefinition { old_name, new_name })
    }
}
