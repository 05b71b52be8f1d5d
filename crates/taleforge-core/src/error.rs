//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The external provider is not configured (missing credential).
    /// Fatal to a single job, never to the process.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external provider call failed or returned unusable output.
    #[error("story generation failed: {0}")]
    Generation(String),

    /// A story was not found at query time.
    #[error("story not found: {0}")]
    StoryNotFound(Uuid),

    /// A story job was not found at query time.
    #[error("story job not found: {0}")]
    JobNotFound(Uuid),

    /// A persisted story is missing its mandatory root node. Signals data
    /// corruption rather than a missing or garbled request.
    #[error("story {0} has no root node")]
    MissingRootNode(Uuid),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
