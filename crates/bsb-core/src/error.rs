//! Error types for the reader core

use thiserror::Error;

/// Errors raised by the reader core.
///
/// Collaborator failures (network, storage) never surface here; they are
/// folded into controller state as user-visible messages. These variants
/// cover malformed input and lifecycle misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Invalid chapter number '{0}'")]
    InvalidChapter(String),

    #[error("Preferences used after shutdown")]
    PreferencesClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
