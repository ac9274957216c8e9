//! Error types for the pattern crate.

use thiserror::Error;

/// Errors that can occur when compiling a route pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The generated expression was rejected by the regex engine.
    #[error("invalid route expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// An optional group was opened but never closed, or closed without being opened.
    #[error("unbalanced parenthesis at byte {position} in route '{route}'")]
    UnbalancedParen { route: String, position: usize },
}

/// Result type for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
