//! Parser configuration

use serde::{Deserialize, Serialize};

/// Settings shared by every grammar during one parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// End-of-statement token used by the root parsers
    pub statement_terminator: String,
    /// Reject `CONSTRAINT` clauses that are not foreign keys instead of keeping them as
    /// unsupported raw clauses
    pub strict_constraints: bool,
}

impl ParserConfig {
    /// Configuration that rejects non foreign-key constraints
    pub fn strict() -> Self {
        Self {
            strict_constraints: true,
            ..Default::default()
        }
    }

    pub fn with_terminator(terminator: impl Into<String>) -> Self {
        Self {
            statement_terminator: terminator.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from its JSON form; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            statement_terminator: ";".to_string(),
            strict_constraints: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_partial_json() {
        let config = ParserConfig::from_json(r#"{"strict_constraints": true}"#).unwrap();
        assert!(config.strict_constraints);
        assert_eq!(config.statement_terminator, ";");

        let config = ParserConfig::from_json("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }
}
