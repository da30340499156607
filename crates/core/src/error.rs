use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the sync jobs and their adapters.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected payload: {0}")]
    Protocol(String),

    #[error("credential file '{}' is unusable: {reason}", .path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("backend error: {context}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SyncError {
    /// Wraps a library error with a short description of what was being attempted.
    pub fn backend(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
