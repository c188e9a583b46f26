//! Data handling and sources for the Bible reader

pub mod audio;
pub mod canon;
pub mod config;
pub mod sources;
pub mod store;

use thiserror::Error;

// Re-exports
pub use audio::AudioIndex;
pub use canon::{default_aliases, standard_corpus, StandardCanon};
pub use config::ReaderConfig;
pub use sources::{HttpContentSource, MemorySource};
pub use store::JsonPreferenceStore;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Http(String),

    #[error("Chapter not found: {book} {chapter}")]
    ChapterNotFound { book: String, chapter: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DataError {
    fn from(error: reqwest::Error) -> Self {
        tracing::debug!("HTTP error: {}", error);
        DataError::Http(sources::friendly_message(&error))
    }
}
