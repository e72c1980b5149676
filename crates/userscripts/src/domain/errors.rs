//! Domain-specific errors.

use thiserror::Error;

/// Failure raised by a [`ScriptHost`](crate::app::runner::ScriptHost) while executing source.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to start interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("exited with {status}{}", stderr_suffix(.stderr))]
    ExitStatus { status: String, stderr: String },
    #[error("{0}")]
    Raised(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Reasons an import file is rejected before any state changes.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Expected a JSON array")]
    NotAnArray,
    #[error("entry {index} is not a script record: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Errors from dispatching a UI command against the current list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("no script at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the editor is not open")]
    NoOpenEditor,
}
