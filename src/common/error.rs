//! Error handling for the DDL front end

use thiserror::Error;

/// Main error type for DDL parsing
#[derive(Error, Debug)]
pub enum DdlError {
    /// A grammar violation. Raised at the point of detection and never recovered from
    /// inside the parsers.
    #[error("Parse error: {message} (got '{token}'){}", line_suffix(.line))]
    Parse {
        message: String,
        token: String,
        line: Option<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" on line {}", line),
        None => String::new(),
    }
}

impl DdlError {
    pub fn parse(message: impl Into<String>, token: impl Into<String>, line: Option<usize>) -> Self {
        DdlError::Parse {
            message: message.into(),
            token: token.into(),
            line,
        }
    }

    /// Source line of a parse error, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            DdlError::Parse { line, .. } => *line,
            DdlError::Io(_) => None,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, DdlError::Parse { .. })
    }
}

/// Result type alias for DDL operations
pub type DdlResult<T> = std::result::Result<T, DdlError>;

/// Macro for creating a parse error positioned at the current token of a stream
#[macro_export]
macro_rules! parse_err {
    ($tokens:expr, $msg:expr) => {
        $tokens.error($msg.to_string())
    };
    ($tokens:expr, $fmt:expr, $($arg:tt)*) => {
        $tokens.error(format!($fmt, $($arg)*))
    };
}
