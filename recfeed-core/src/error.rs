//! Error taxonomy for the recommendation core.
//!
//! One variant per row of the error taxonomy: `config_missing`,
//! `embedding_unavailable`, `data_quality`, `session_not_found`,
//! `session_exhausted`, `empty_feed`, `invariant_violation`,
//! `deadline_exceeded`. Data-quality and embedding faults are recovered
//! locally by callers within this crate; the remaining variants propagate to
//! the enclosing application.

use uuid::Uuid;

/// Result type alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the recommendation core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No catalog or embeddings were loaded before a request was served.
    #[error("config missing: {0}")]
    ConfigMissing(String),

    /// The embedding provider failed transiently; callers degrade to a null
    /// user vector rather than failing the request.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// An episode failed a data invariant at catalog load and was excluded.
    #[error("data quality fault for episode {episode_id}: {reason}")]
    DataQuality {
        /// The episode that failed validation.
        episode_id: Uuid,
        /// Human-readable reason.
        reason: String,
    },

    /// `load_more` was called with an unknown or expired session id.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// All candidates were rejected by the quality gate.
    #[error("empty feed: {0}")]
    EmptyFeed(String),

    /// A configuration invariant was violated (weights don't sum to 1,
    /// threshold out of its allowed range, etc). Always fatal at startup.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// `create_session` exceeded its configured deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),
}

impl Error {
    /// Whether a caller can reasonably retry this error without changing
    /// anything about the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmbeddingUnavailable(_) | Error::DataQuality { .. }
        )
    }
}

// `session_exhausted` is not an error variant here: `load_more` on a drained
// queue returns an empty list and `remaining_count == 0` rather than `Err`.
// See `session::SessionPool::load_more`.
