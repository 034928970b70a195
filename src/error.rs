//! Error types shared across the resolver, embedders, roster loading and
//! meeting assembly.

use std::path::PathBuf;
use std::time::Duration;

/// Errors produced by an [`Embedder`](crate::embedding::Embedder).
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),
    #[error("embedding provider returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("expected a {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),
    #[error("invalid embedding configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::Request(err.to_string())
    }
}

/// Errors returned by [`DirectoryResolver`](crate::resolver::DirectoryResolver).
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The query was empty or only whitespace.
    #[error("invalid query: attendee name must not be empty")]
    InvalidQuery,
    /// The directory is empty, so no result would be meaningful.
    #[error("directory unavailable: no people are loaded")]
    DirectoryUnavailable,
    /// The embedder failed or timed out.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),
    /// The embedder does not serve the configured model.
    #[error("embedding model mismatch: configured '{configured}', embedder provides '{provided}'")]
    ModelMismatch { configured: String, provided: String },
    #[error("invalid resolver settings: {0}")]
    InvalidSettings(String),
}

/// Errors raised while building or importing a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("duplicate person id {0}")]
    DuplicateId(i64),
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid roster row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("roster is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Errors raised while interpreting model output or assembling a meeting.
#[derive(Debug, thiserror::Error)]
pub enum MeetingError {
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("meeting {start} - {end} falls outside business hours {open} - {close}")]
    OutsideBusinessHours {
        start: String,
        end: String,
        open: String,
        close: String,
    },
    #[error("meeting has no attendees")]
    NoAttendees,
    #[error("invalid meeting rules: {0}")]
    InvalidRules(String),
}

/// Errors raised while interpreting a user's clarification answer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClarificationError {
    #[error("choice {choice} is out of range (1-{max})")]
    OutOfRange { choice: usize, max: usize },
    #[error("'{0}' does not match any of the offered people")]
    Unrecognized(String),
    #[error("empty answer")]
    Empty,
}
