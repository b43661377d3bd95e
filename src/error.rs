//! Error handling for houston-tools
//!
//! Library operations return the typed [`HoustonError`]; the binary wraps
//! them in anyhow for context chaining and error propagation.

use std::path::PathBuf;

use thiserror::Error;

/// Core error types for segmentation and Pnl CSV operations
#[derive(Error, Debug)]
pub enum HoustonError {
    /// Start date after end date, unparseable date, or unknown period code
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("malformed input{}: {message}", line_suffix(.line))]
    MalformedInput { line: Option<u64>, message: String },

    #[error("source not found: {}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl HoustonError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        HoustonError::MalformedInput {
            line: None,
            message: message.into(),
        }
    }

    pub(crate) fn malformed_at(line: u64, message: impl Into<String>) -> Self {
        HoustonError::MalformedInput {
            line: Some(line),
            message: message.into(),
        }
    }
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(l) => format!(" at line {}", l),
        None => String::new(),
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, HoustonError>;
