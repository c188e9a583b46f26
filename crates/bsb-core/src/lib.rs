//! Core functionality for the Bible reader
//!
//! This crate models the reading position (book + chapter), computes
//! previous/next positions across the corpus, resolves quick-jump text, and
//! owns the session state: selection, preferences and audio playback.

pub mod corpus;
pub mod error;
pub mod events;
pub mod jump;
pub mod navigation;
pub mod playback;
pub mod preferences;
pub mod reference;
pub mod selection;
pub mod state;

// Re-export commonly used types
pub use corpus::{Book, ChapterLookup, ChapterSet, Corpus};
pub use error::{Error, Result};
pub use events::{EventBus, Subscription};
pub use jump::AliasIndex;
pub use navigation::{Availability, Navigator};
pub use preferences::{FontSize, PreferenceStore, Preferences, Theme};
pub use reference::{clamp, BookId, Reference};
pub use selection::{ContentLoad, LoadOutcome, SelectionController, SelectionSnapshot};
pub use source::ContentSource;
pub use state::{AppState, AppStateConfig};

/// The external text host
pub mod source {
    use crate::corpus::Book;

    /// Trait for chapter content providers
    #[async_trait::async_trait]
    pub trait ContentSource: Send + Sync {
        /// Get the ordered book list
        async fn list_books(&self) -> anyhow::Result<Vec<Book>>;

        /// Fetch a chapter as markup
        async fn fetch_chapter_html(&self, book_id: &str, chapter: u32) -> anyhow::Result<String>;

        /// Get the source name
        fn source_name(&self) -> &str;
    }
}
