//! Table constraint grammar
//!
//! ```text
//! [CONSTRAINT [symbol]] FOREIGN KEY [index_name] (col, ...)
//!     REFERENCES tbl (col, ...) [MATCH type] [ON DELETE action] [ON UPDATE action]
//! ```
//!
//! Any other constraint body is kept as raw text, or rejected under strict configuration.

use crate::common::error::DdlResult;
use crate::parse_err;
use crate::parser::ast::{ConstraintDefinition, ConstraintKind, ReferenceEvent, ReferentialAction};
use crate::parser::column::{parse_column_list, parse_column_name, parse_optional_name};
use crate::parser::stream::TokenStream;
use crate::parser::DdlParser;
use std::collections::BTreeMap;
use tracing::warn;

/// Keywords that open a constraint body; a name is never one of them unless quoted
const BODY_KEYWORDS: &[&str] = &["FOREIGN", "CHECK", "UNIQUE", "PRIMARY"];

/// Parser for `CONSTRAINT` clauses
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintParser;

impl ConstraintParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_foreign_key(&self, tokens: &mut TokenStream) -> DdlResult<ConstraintKind> {
        tokens.expect("FOREIGN", "Expected keyword FOREIGN")?;
        tokens.expect("KEY", "Expected keyword KEY after FOREIGN")?;

        let index_name = parse_optional_name(tokens)?;
        let local_columns = parse_column_list(tokens)?;

        tokens.expect("REFERENCES", "Expected keyword REFERENCES")?;
        let referenced_table = parse_column_name(tokens)?;
        let referenced_columns = parse_column_list(tokens)?;

        if tokens.consume("MATCH") {
            if !tokens.is_any(&["FULL", "PARTIAL", "SIMPLE"]) {
                return Err(parse_err!(tokens, "Expected FULL, PARTIAL or SIMPLE after MATCH"));
            }
            tokens.advance();
        }

        let mut reference_actions = BTreeMap::new();
        while tokens.consume("ON") {
            let event = if tokens.consume("DELETE") {
                ReferenceEvent::Delete
            } else if tokens.consume("UPDATE") {
                ReferenceEvent::Update
            } else {
                return Err(parse_err!(tokens, "Expected keyword DELETE or UPDATE"));
            };

            // A repeated event overwrites the earlier action
            reference_actions.insert(event, self.parse_referential_action(tokens)?);
        }

        Ok(ConstraintKind::ForeignKey {
            index_name,
            local_columns,
            referenced_table,
            referenced_columns,
            reference_actions,
        })
    }

    fn parse_referential_action(&self, tokens: &mut TokenStream) -> DdlResult<ReferentialAction> {
        if tokens.consume("RESTRICT") {
            Ok(ReferentialAction::Restrict)
        } else if tokens.consume("CASCADE") {
            Ok(ReferentialAction::Cascade)
        } else if tokens.consume("SET") {
            if tokens.consume("NULL") {
                Ok(ReferentialAction::SetNull)
            } else if tokens.consume("DEFAULT") {
                Ok(ReferentialAction::SetDefault)
            } else {
                Err(parse_err!(tokens, "Expected keyword NULL or DEFAULT after SET"))
            }
        } else if tokens.consume("NO") {
            tokens.expect("ACTION", "Expected keyword ACTION after NO")?;
            Ok(ReferentialAction::NoAction)
        } else {
            Err(parse_err!(tokens, "Expected keyword RESTRICT or CASCADE"))
        }
    }
}

impl DdlParser for ConstraintParser {
    type Node = ConstraintDefinition;

    fn parse_tokens(&self, tokens: &mut TokenStream) -> DdlResult<ConstraintDefinition> {
        let name = if tokens.consume("CONSTRAINT") && !tokens.is_any(BODY_KEYWORDS) {
            parse_optional_name(tokens)?
        } else {
            None
        };

        if tokens.is("FOREIGN") {
            let kind = self.parse_foreign_key(tokens)?;
            return Ok(ConstraintDefinition { name, kind });
        }

        if tokens.config().strict_constraints {
            return Err(parse_err!(tokens, "Unsupported constraint, only FOREIGN KEY is supported"));
        }

        let start = tokens.position();
        tokens.skip_until(&[","], |_, _| Ok(false))?;
        let clause = tokens.raw_since(start);
        if clause.is_empty() {
            return Err(parse_err!(tokens, "Expected constraint body"));
        }

        warn!(
            constraint = name.as_deref().unwrap_or(""),
            clause = %clause,
            "keeping unsupported constraint as raw clause"
        );

        Ok(ConstraintDefinition {
            name,
            kind: ConstraintKind::Unsupported { clause },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::ParserConfig;

    #[test]
    fn test_foreign_key_with_actions() -> DdlResult<()> {
        let constraint = ConstraintParser::new().parse(
            "CONSTRAINT fk1 FOREIGN KEY (book_id) REFERENCES book (id) \
             ON DELETE CASCADE ON UPDATE NO ACTION",
        )?;

        assert_eq!(constraint.name.as_deref(), Some("fk1"));
        match constraint.kind {
            ConstraintKind::ForeignKey {
                local_columns,
                referenced_table,
                referenced_columns,
                reference_actions,
                ..
            } => {
                assert_eq!(local_columns, vec!["book_id"]);
                assert_eq!(referenced_table, "book");
                assert_eq!(referenced_columns, vec!["id"]);
                assert_eq!(
                    reference_actions.get(&ReferenceEvent::Delete),
                    Some(&ReferentialAction::Cascade)
                );
                assert_eq!(
                    reference_actions.get(&ReferenceEvent::Update),
                    Some(&ReferentialAction::NoAction)
                );
            }
            other => panic!("expected foreign key, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_repeated_event_overwrites() -> DdlResult<()> {
        let constraint = ConstraintParser::new().parse(
            "CONSTRAINT FOREIGN KEY `fk_idx` (a) REFERENCES t (b) ON DELETE RESTRICT ON DELETE SET NULL",
        )?;
        assert_eq!(constraint.name, None);
        assert_eq!(
            constraint.to_string(),
            "CONSTRAINT FOREIGN KEY `fk_idx` (`a`) REFERENCES `t` (`b`) ON DELETE SET NULL"
        );
        Ok(())
    }

    #[test]
    fn test_check_constraint_is_unsupported() -> DdlResult<()> {
        let mut tokens = TokenStream::from_sql(
            "CONSTRAINT chk_price CHECK (price > 0 AND price IN (1, 2)), next",
            ParserConfig::default(),
        )?;
        let constraint = ConstraintParser::new().parse_tokens(&mut tokens)?;
        assert_eq!(constraint.name.as_deref(), Some("chk_price"));
        assert_eq!(
            constraint.kind,
            ConstraintKind::Unsupported {
                clause: "CHECK (price > 0 AND price IN (1, 2))".into()
            }
        );
        assert!(tokens.is(","));
        Ok(())
    }

    #[test]
    fn test_strict_rejects_check_constraint() {
        let result = ConstraintParser::new()
            .parse_with_config("CONSTRAINT c CHECK (a > 0)", ParserConfig::strict());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_action() {
        let result = ConstraintParser::new()
            .parse("CONSTRAINT c FOREIGN KEY (a) REFERENCES t (b) ON DELETE SET");
        assert!(result.is_err());
    }
}
