//! Error types for chain building, dispatch and configuration.

use std::path::PathBuf;

use chainroute_pattern::PatternError;
use thiserror::Error;

use crate::hooks::HookError;

/// Errors raised while building or running a handler chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A segment does not follow `name` or `[name]`.
    #[error("malformed segment '{segment}' in chain '{chain}'")]
    MalformedSegment { segment: String, chain: String },

    /// A segment names a handler that is not registered.
    #[error("no handler registered for segment '{segment}' of chain '{chain}'")]
    MissingHandler { segment: String, chain: String },

    /// A chain must contain at least one handler.
    #[error("chain '{chain}' has no handlers")]
    EmptyChain { chain: String },

    /// An explicit handler list does not line up with the chain name.
    #[error("chain '{chain}' names {segments} segments but {handlers} handlers were given")]
    ArityMismatch {
        chain: String,
        segments: usize,
        handlers: usize,
    },

    /// A handler failed; the rest of the chain did not run.
    #[error("handler '{segment}' (position {position}) failed: {source}")]
    Handler {
        segment: String,
        position: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A handler was entered again while it was still running.
    #[error("handler '{segment}' is already running")]
    Reentrant { segment: String },
}

/// Errors raised by the router and history.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Hook(#[from] HookError),

    /// Navigation was attempted before [`History::start`](crate::History::start).
    #[error("history has not been started")]
    NotStarted,

    /// [`History::start`](crate::History::start) was called twice.
    #[error("history has already been started")]
    AlreadyStarted,
}

/// Errors raised while loading a route table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML route table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON route table: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `.yaml`, `.yml` and `.json` files are understood.
    #[error("unsupported route table format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
