//! In-memory content source

use ahash::AHashMap;
use async_trait::async_trait;
use bsb_core::{Book, BookId, ContentSource};
use parking_lot::RwLock;

use crate::DataError;

/// Books and chapter markup held in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    name: String,
    books: Vec<Book>,
    chapters: RwLock<AHashMap<(BookId, u32), String>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, books: Vec<Book>) -> Self {
        Self {
            name: name.into(),
            books,
            chapters: RwLock::new(AHashMap::new()),
        }
    }

    pub fn with_chapter(self, book_id: &str, chapter: u32, html: impl Into<String>) -> Self {
        self.insert(book_id, chapter, html);
        self
    }

    /// Add or replace a chapter
    pub fn insert(&self, book_id: &str, chapter: u32, html: impl Into<String>) {
        self.chapters
            .write()
            .insert((book_id.to_string(), chapter), html.into());
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.read().len()
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        Ok(self.books.clone())
    }

    async fn fetch_chapter_html(&self, book_id: &str, chapter: u32) -> anyhow::Result<String> {
        self.chapters
            .read()
            .get(&(book_id.to_string(), chapter))
            .cloned()
            .ok_or_else(|| {
                DataError::ChapterNotFound {
                    book: book_id.to_string(),
                    chapter,
                }
                .into()
            })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bsb_core::events::events::ContentFailed;
    use bsb_core::{EventBus, LoadOutcome, Reference, SelectionController};

    use crate::canon::StandardCanon;

    fn source() -> MemorySource {
        MemorySource::new(
            "memory",
            vec![Book::new("GEN", "Genesis"), Book::new("JHN", "John")],
        )
        .with_chapter("JHN", 1, "<p>In the beginning was the Word</p>")
        .with_chapter("JHN", 3, "<p>For God so loved the world</p>")
    }

    #[tokio::test]
    async fn test_fetch() {
        let source = source();
        assert_eq!(source.list_books().await.unwrap().len(), 2);
        assert_eq!(source.chapter_count(), 2);
        assert!(source
            .fetch_chapter_html("JHN", 3)
            .await
            .unwrap()
            .contains("loved the world"));

        let err = source.fetch_chapter_html("JHN", 4).await.unwrap_err();
        assert_eq!(err.to_string(), "Chapter not found: JHN 4");
    }

    #[tokio::test]
    async fn test_drives_selection_controller() {
        let events = Arc::new(EventBus::new());
        let failures = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = failures.clone();
        let _sub = events
            .subscribe_fn::<ContentFailed, _>(move |e| sink.lock().push(e.error.clone()));

        let controller =
            SelectionController::new(Arc::new(source()), Arc::new(StandardCanon), events);
        let load = controller.load_books().await.unwrap();
        assert_eq!(controller.load(load).await, LoadOutcome::Applied);
        assert_eq!(controller.reference(), Reference::new("JHN", 1));

        let load = controller.go_next().unwrap();
        assert_eq!(controller.load(load).await, LoadOutcome::Failed);
        assert_eq!(controller.reference(), Reference::new("JHN", 2));
        assert_eq!(failures.lock().len(), 1);
    }
}
