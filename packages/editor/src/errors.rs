//! Error types for the editor

use hcledit_parser::ParseError;
use thiserror::Error;

/// Errors surfaced by filters and operators.
///
/// A filter that matches nothing is not an error: it succeeds and leaves the
/// document unchanged.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{filename}: {source}")]
    Syntax {
        filename: String,
        #[source]
        source: ParseError,
    },

    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid value expression {value:?}: {source}")]
    InvalidValueExpression {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        EditorError::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub fn syntax(filename: &str, source: ParseError) -> Self {
        EditorError::Syntax {
            filename: filename.to_string(),
            source,
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
