//! Index definition grammar
//!
//! ```text
//! [PRIMARY | UNIQUE | FULLTEXT | SPATIAL | FOREIGN] {INDEX | KEY} [name] [USING type]
//!     (key_part, ...) [USING type] [index_option ...]
//! ```

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::IndexDefinition;
use crate::parser::column::{parse_column_name, parse_optional_name, parse_unsigned};
use crate::parser::keywords::IndexRole;
use crate::parser::stream::TokenStream;
use crate::parser::DdlParser;

/// Parser for index definitions in CREATE TABLE and `ALTER TABLE ... ADD INDEX`
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexDefinitionParser;

impl IndexDefinitionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the part after the role and `INDEX`/`KEY` keywords. The role is attached by
    /// the caller.
    pub fn parse_body(&self, tokens: &mut TokenStream) -> DdlResult<IndexDefinition> {
        let name = if tokens.is("USING") {
            None
        } else {
            parse_optional_name(tokens)?
        };

        let mut index_type = self.parse_index_type(tokens)?;
        let columns = self.parse_key_parts(tokens)?;
        if index_type.is_none() {
            index_type = self.parse_index_type(tokens)?;
        }

        // Index options (COMMENT, VISIBLE, KEY_BLOCK_SIZE, ...) are not modeled
        tokens.skip_until(&[","], |_, _| Ok(false))?;

        Ok(IndexDefinition {
            name,
            index_type,
            role: None,
            columns,
        })
    }

    fn parse_index_type(&self, tokens: &mut TokenStream) -> DdlResult<Option<String>> {
        if !tokens.consume("USING") {
            return Ok(None);
        }
        match tokens.current().keyword() {
            Some(index_type) => {
                tokens.advance();
                Ok(Some(index_type))
            }
            None => Err(parse_err!(tokens, "Expected index type after USING")),
        }
    }

    /// `(name [(length)] [ASC | DESC], ...)`; prefix lengths and ordering are not modeled
    fn parse_key_parts(&self, tokens: &mut TokenStream) -> DdlResult<Vec<String>> {
        tokens.expect("(", "Expected opening bracket \"(\" of index columns")?;

        let mut columns = Vec::new();
        loop {
            columns.push(parse_column_name(tokens)?);

            if tokens.consume("(") {
                parse_unsigned(tokens, "key prefix length")?;
                tokens.expect(")", "Expected closing bracket \")\" after key prefix length")?;
            }
            if !tokens.consume("ASC") {
                tokens.consume("DESC");
            }

            if !tokens.consume(",") {
                break;
            }
        }

        tokens.expect(")", "Expected closing bracket \")\" of index columns")?;
        Ok(columns)
    }
}

impl DdlParser for IndexDefinitionParser {
    type Node = IndexDefinition;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<IndexDefinition> {
        let role = tokens
            .current()
            .keyword()
            .and_then(|keyword| IndexRole::from_keyword(&keyword));
        if role.is_some() {
            tokens.advance();
        }

        let has_keyword = tokens.consume("INDEX") || tokens.consume("KEY");
        let keyword_optional = matches!(
            role,
            Some(IndexRole::Unique) | Some(IndexRole::Fulltext) | Some(IndexRole::Spatial)
        );
        if !has_keyword && !keyword_optional {
            return Err(parse_err!(tokens, "Expected keyword INDEX or KEY"));
        }

        let mut index = self.parse_body(tokens)?;
        index.role = role;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::ParserConfig;

    fn parse(sql: &str) -> DdlResult<IndexDefinition> {
        IndexDefinitionParser::new().parse(sql)
    }

    #[test]
    fn test_primary_key() -> DdlResult<()> {
        let index = parse("PRIMARY KEY (`id`)")?;
        assert_eq!(index.role, Some(IndexRole::Primary));
        assert_eq!(index.name, None);
        assert_eq!(index.columns, vec!["id"]);
        assert_eq!(index.to_string(), "PRIMARY KEY (`id`)");
        Ok(())
    }

    #[test]
    fn test_named_unique_key() -> DdlResult<()> {
        let index = parse("UNIQUE KEY `uniq_key` (`book_id`,`section_id`)")?;
        assert_eq!(index.role, Some(IndexRole::Unique));
        assert_eq!(index.name.as_deref(), Some("uniq_key"));
        assert_eq!(index.columns, vec!["book_id", "section_id"]);

        let index = parse("UNIQUE email_unique (email)")?;
        assert_eq!(index.name.as_deref(), Some("email_unique"));
        Ok(())
    }

    #[test]
    fn test_index_type_and_options() -> DdlResult<()> {
        let mut tokens = TokenStream::from_sql(
            "KEY idx_name USING BTREE (name(10) DESC, id) COMMENT 'x' INVISIBLE, next",
            ParserConfig::default(),
        )?;
        let index = IndexDefinitionParser::new().parse_tokens(&mut tokens)?;
        assert_eq!(index.index_type.as_deref(), Some("BTREE"));
        assert_eq!(index.columns, vec!["name", "id"]);
        assert!(tokens.is(","));

        let index = parse("INDEX idx (a) USING HASH")?;
        assert_eq!(index.index_type.as_deref(), Some("HASH"));
        Ok(())
    }

    #[test]
    fn test_requires_index_keyword() {
        assert!(parse("PRIMARY (id)").is_err());
        assert!(parse("KEY idx id").is_err());
    }
}
