//! Error types for the NFL season collector

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectError>;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Source '{source_name}' unavailable after {attempts} attempts: {message}")]
    SourceUnavailable {
        source_name: String,
        attempts: u32,
        message: String,
    },

    #[error("Malformed record {context}: {reason}")]
    RecordMalformed { context: String, reason: String },

    #[error("Referential violation: {detail}")]
    ReferentialViolation { detail: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Collection attempt {attempt} timed out after {timeout_secs}s")]
    ProcessTimeout { attempt: u32, timeout_secs: u64 },

    #[error("Collector process exited with {status}")]
    ProcessExit { status: String },

    #[error("Collection cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),
}

impl CollectError {
    pub fn config(message: impl Into<String>) -> Self {
        CollectError::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CollectError::RecordMalformed {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Errors that abort a run before any network I/O happens.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::Configuration { .. })
    }
}
