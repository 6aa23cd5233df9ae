use async_trait::async_trait;
use thiserror::Error;

use crate::{thoughts::Thought, validation::ValidationError};

/// Failure reported by a [`ThoughtSource`], before the feed turns it into
/// something a user can read.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never got an answer.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("rejected with status {status}: {message:?}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// Refused before being stored, by a source that validates locally.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("thought {0} not found")]
    NotFound(String),

    /// Local file I/O failed, or a response body could not be decoded.
    #[error(transparent)]
    Data(#[from] anyhow::Error),
}

/// What the feed needs from a backend: read the feed, post, like.
#[async_trait]
pub trait ThoughtSource: Send + Sync {
    /// Newest first.
    async fn load(&self) -> Result<Vec<Thought>, SourceError>;
    async fn submit(&self, message: &str) -> Result<Thought, SourceError>;
    async fn like(&self, id: &str) -> Result<Thought, SourceError>;
}
