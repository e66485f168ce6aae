//! Error types shared by the enveomics tools
//!
//! Four failure categories, surfaced distinctly:
//! - option errors: a flag value the tool does not support, caught before any I/O
//! - parse errors: malformed input, fatal immediately (silent continuation would
//!   corrupt downstream statistics)
//! - command errors: an external program exited non-zero, with its stderr attached
//! - remote errors: a REST endpoint kept answering non-2xx after retries

use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for enveomics operations
pub type Result<T> = std::result::Result<T, EnveomicsError>;

#[derive(Debug, Error)]
pub enum EnveomicsError {
    /// Unsupported or inconsistent option value
    #[error("invalid option: {0}")]
    Option(String),

    /// Malformed input at a known line
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// External program failed
    #[error("{program} failed ({status}): {stderr}")]
    Command {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Remote service kept failing after retries
    #[error("remote service error: {0}")]
    Remote(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnveomicsError {
    /// Parse error constructor, used all over the line-oriented readers
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        EnveomicsError::Parse {
            line,
            msg: msg.into(),
        }
    }
}
