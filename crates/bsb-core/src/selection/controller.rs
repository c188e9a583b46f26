//! The single source of truth for where the reader currently is

use std::sync::Arc;
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::corpus::{Book, ChapterLookup};
use crate::error::Result;
use crate::events::events::{
    BooksFailed, BooksLoaded, ContentFailed, ContentLoaded, ReferenceChanged,
};
use crate::events::EventBus;
use crate::jump::{self, AliasIndex};
use crate::navigation::{Availability, Navigator};
use crate::reference::Reference;
use crate::source::ContentSource;

use super::load::{ContentLoad, LoadOutcome};
use super::SelectionSnapshot;

/// Book chosen when the list loads and nothing is selected yet
const DEFAULT_BOOK_NAME: &str = "John";

/// Selection state stored internally
#[derive(Debug, Default)]
struct SelectionState {
    reference: Reference,
    books: Vec<Book>,
    aliases: AliasIndex,
    loading: bool,
    error: Option<String>,
    content: Option<String>,
    content_reference: Option<Reference>,
}

/// Holds the current reference, applies navigation and quick-jump results,
/// and loads chapter content for each commit.
pub struct SelectionController {
    state: Arc<RwLock<SelectionState>>,
    source: Arc<dyn ContentSource>,
    lookup: Arc<dyn ChapterLookup + Send + Sync>,
    alias_table: &'static [(&'static str, &'static str)],
    navigator: Navigator,
    generation: watch::Sender<u64>,
    events: Arc<EventBus>,
}

impl SelectionController {
    /// Create a controller with no book selected
    pub fn new(
        source: Arc<dyn ContentSource>,
        lookup: Arc<dyn ChapterLookup + Send + Sync>,
        events: Arc<EventBus>,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(SelectionState::default())),
            source,
            lookup,
            alias_table: &[],
            navigator: Navigator::default(),
            generation,
            events,
        }
    }

    /// Extra quick-jump aliases as `(alias, book id)` pairs
    pub fn with_aliases(mut self, aliases: &'static [(&'static str, &'static str)]) -> Self {
        self.alias_table = aliases;
        self
    }

    pub fn with_navigator(mut self, navigator: Navigator) -> Self {
        self.navigator = navigator;
        self
    }

    /// Fetch the book list and select the default book if none is selected.
    ///
    /// Failure is recorded as a user-visible message and leaves the current
    /// reference untouched. Returns the load for a default commit, if any.
    pub async fn load_books(&self) -> Option<ContentLoad> {
        let books = match self.source.list_books().await {
            Ok(books) => books,
            Err(e) => {
                let message = format!("Failed to load books: {}", e);
                tracing::error!("{}", message);
                self.state.write().error = Some(message.clone());
                self.events.publish(BooksFailed { error: message });
                return None;
            }
        };

        let aliases = AliasIndex::with_aliases(&books, self.alias_table);
        let book_count = books.len();

        let commit = {
            let mut state = self.state.write();
            state.books = books;
            state.aliases = aliases;
            state.error = None;

            if state.reference.is_set() {
                // A restored chapter is only checked once the book is known
                let fitted = self.fit_chapter(&state.books, &state.reference);
                (fitted != state.reference).then_some(fitted)
            } else {
                state
                    .books
                    .iter()
                    .find(|b| b.name == DEFAULT_BOOK_NAME)
                    .or_else(|| state.books.first())
                    .map(|book| {
                        let chapters = self.lookup.chapter_numbers(&book.id);
                        let wanted = state.reference.chapter;
                        let chapter = if (chapters.first()..=chapters.last()).contains(&wanted) {
                            wanted
                        } else {
                            chapters.first()
                        };
                        Reference::new(book.id.clone(), chapter)
                    })
            }
        };

        tracing::info!("Loaded {} books from {}", book_count, self.source.source_name());
        self.events.publish(BooksLoaded { book_count });

        commit.map(|reference| self.set_reference(reference))
    }

    /// `reference` with its chapter clamped into its book's chapter range.
    ///
    /// Books missing from `books` are left alone.
    fn fit_chapter(&self, books: &[Book], reference: &Reference) -> Reference {
        match reference.book_id() {
            Some(id) if books.iter().any(|b| b.id == id) => {
                let chapter = self.lookup.chapter_numbers(id).clamp(reference.chapter);
                if chapter != reference.chapter {
                    tracing::debug!(
                        "Chapter {} clamped to {} for {}",
                        reference.chapter,
                        chapter,
                        id
                    );
                }
                reference.with_chapter(chapter)
            }
            _ => reference.clone(),
        }
    }

    /// Commit a reference and return the load that fetches its content.
    ///
    /// Any load issued for an earlier commit becomes stale.
    pub fn set_reference(&self, reference: Reference) -> ContentLoad {
        let (previous, generation) = {
            let mut state = self.state.write();
            let previous = std::mem::replace(&mut state.reference, reference.clone());
            if reference.is_set() {
                state.loading = true;
                state.error = None;
            }
            self.generation.send_modify(|g| *g += 1);
            (previous, *self.generation.borrow())
        };

        tracing::debug!("Committed {} (generation {})", reference, generation);
        self.events.publish(ReferenceChanged {
            previous,
            current: reference.clone(),
        });

        ContentLoad::new(reference, generation, self.generation.subscribe())
    }

    /// Select a book, starting at its first chapter
    pub fn select_book(&self, book_id: &str) -> Option<ContentLoad> {
        if !self.state.read().books.iter().any(|b| b.id == book_id) {
            tracing::warn!("Cannot select unknown book '{}'", book_id);
            return None;
        }
        let chapter = self.lookup.chapter_numbers(book_id).first();
        Some(self.set_reference(Reference::new(book_id, chapter)))
    }

    /// Select a chapter of the current book, clamped into the book's range
    pub fn select_chapter(&self, chapter: u32) -> Option<ContentLoad> {
        let target = {
            let state = self.state.read();
            if !state.reference.is_set() {
                return None;
            }
            self.fit_chapter(&state.books, &state.reference.with_chapter(chapter))
        };
        Some(self.set_reference(target))
    }

    /// Step to the next chapter, crossing books and wrapping at the end
    pub fn go_next(&self) -> Option<ContentLoad> {
        let next = self.availability().next?;
        Some(self.set_reference(next))
    }

    /// Step to the previous chapter, crossing books and wrapping at the start
    pub fn go_previous(&self) -> Option<ContentLoad> {
        let previous = self.availability().previous?;
        Some(self.set_reference(previous))
    }

    /// Resolve quick-jump text and commit the result.
    ///
    /// Unresolvable text changes nothing.
    pub fn jump(&self, text: &str) -> Option<ContentLoad> {
        let target = {
            let state = self.state.read();
            jump::resolve(text, &state.books, self.lookup.as_ref(), &state.aliases)
        }?;
        Some(self.set_reference(target))
    }

    /// Previous/next candidates at the current reference
    pub fn availability(&self) -> Availability {
        let state = self.state.read();
        self.navigator
            .availability(&state.reference, &state.books, self.lookup.as_ref())
    }

    /// Fetch and apply content for a load.
    ///
    /// A load superseded by a newer commit is abandoned mid-flight and its
    /// result is dropped. Failures are recorded as a message; the reference
    /// is kept either way.
    pub async fn load(&self, mut load: ContentLoad) -> LoadOutcome {
        let reference = load.reference().clone();
        let Some(book_id) = reference.book_id() else {
            return LoadOutcome::Skipped;
        };

        let result = tokio::select! {
            _ = load.cancelled() => {
                tracing::debug!("Load of {} cancelled", reference);
                return LoadOutcome::Cancelled;
            }
            result = self.source.fetch_chapter_html(book_id, reference.chapter) => result,
        };

        let outcome = {
            let mut state = self.state.write();
            if !load.is_current() {
                tracing::debug!("Discarding stale content for {}", reference);
                return LoadOutcome::Cancelled;
            }
            state.loading = false;
            match result {
                Ok(html) => {
                    state.error = None;
                    state.content = Some(html);
                    state.content_reference = Some(reference.clone());
                    Ok(state.content.as_ref().map(String::len).unwrap_or(0))
                }
                Err(e) => {
                    let message = format!("Failed to load chapter: {}", e);
                    state.error = Some(message.clone());
                    Err(message)
                }
            }
        };

        match outcome {
            Ok(bytes) => {
                tracing::debug!("Loaded {} ({} bytes)", reference, bytes);
                self.events.publish(ContentLoaded { reference, bytes });
                LoadOutcome::Applied
            }
            Err(error) => {
                tracing::warn!("{} ({})", error, reference);
                self.events.publish(ContentFailed { reference, error });
                LoadOutcome::Failed
            }
        }
    }

    /// Re-issue a load for the current reference
    pub fn reload(&self) -> ContentLoad {
        self.set_reference(self.reference())
    }

    /// The committed reference
    pub fn reference(&self) -> Reference {
        self.state.read().reference.clone()
    }

    pub fn books(&self) -> Vec<Book> {
        self.state.read().books.clone()
    }

    /// Label for the current book: name, else abbreviation, else upper-cased id
    pub fn book_label(&self) -> String {
        let state = self.state.read();
        let Some(id) = state.reference.book_id() else {
            return String::new();
        };
        state
            .books
            .iter()
            .find(|b| b.id.eq_ignore_ascii_case(id))
            .map(|b| b.name.clone())
            .unwrap_or_else(|| id.to_uppercase())
    }

    /// Everything a view needs to render the current selection
    pub fn snapshot(&self) -> SelectionSnapshot {
        let availability = self.availability();
        let state = self.state.read();
        SelectionSnapshot {
            reference: state.reference.clone(),
            loading: state.loading,
            error: state.error.clone(),
            content: state.content.clone(),
            content_reference: state.content_reference.clone(),
            availability,
        }
    }

    /// Shareable query string for the current reference
    pub fn to_query(&self) -> String {
        self.state.read().reference.to_query()
    }

    /// Commit a reference decoded from a query string.
    ///
    /// The chapter is clamped now if the book list is loaded, otherwise by
    /// [`load_books`](Self::load_books). Returns `Ok(None)` when the query
    /// names no book.
    pub fn restore_from_query(&self, query: &str) -> Result<Option<ContentLoad>> {
        let reference = Reference::from_query(query)?;
        if !reference.is_set() {
            self.state.write().reference.chapter = reference.chapter;
            return Ok(None);
        }
        let reference = self.fit_chapter(&self.state.read().books, &reference);
        Ok(Some(self.set_reference(reference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ChapterSet, Corpus};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Content source whose chapters take `delay_ms * chapter` to arrive
    struct TestSource {
        corpus: Corpus,
        fail_books: Arc<AtomicBool>,
        fail_chapters: bool,
        delay_ms: u64,
        slow_chapter: Option<u32>,
    }

    impl TestSource {
        fn new(corpus: Corpus) -> Self {
            Self {
                corpus,
                fail_books: Arc::new(AtomicBool::new(false)),
                fail_chapters: false,
                delay_ms: 0,
                slow_chapter: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl ContentSource for TestSource {
        async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
            if self.fail_books.load(Ordering::SeqCst) {
                anyhow::bail!("network down");
            }
            Ok(self.corpus.books().to_vec())
        }

        async fn fetch_chapter_html(&self, book_id: &str, chapter: u32) -> anyhow::Result<String> {
            if self.fail_chapters {
                anyhow::bail!("timeout");
            }
            let delay = if self.slow_chapter == Some(chapter) {
                self.delay_ms * 10
            } else {
                self.delay_ms
            };
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(format!("<p>{} {}</p>", book_id, chapter))
        }

        fn source_name(&self) -> &str {
            "test"
        }
    }

    fn corpus() -> Corpus {
        Corpus::new()
            .with_book(Book::new("GEN", "Genesis"), ChapterSet::contiguous(50))
            .with_book(Book::new("JHN", "John").with_abbr("Jn"), ChapterSet::contiguous(21))
            .with_book(Book::new("REV", "Revelation"), ChapterSet::contiguous(22))
    }

    fn controller(source: TestSource) -> SelectionController {
        let lookup = Arc::new(source.corpus.clone());
        SelectionController::new(Arc::new(source), lookup, Arc::new(EventBus::new()))
            .with_aliases(&[("jhn", "JHN")])
    }

    #[tokio::test]
    async fn test_default_book_is_john() {
        let c = controller(TestSource::new(corpus()));
        assert!(!c.reference().is_set());

        let load = c.load_books().await.expect("default commit");
        assert_eq!(load.reference(), &Reference::new("JHN", 1));
        assert_eq!(c.load(load).await, LoadOutcome::Applied);

        let snap = c.snapshot();
        assert_eq!(snap.content.as_deref(), Some("<p>JHN 1</p>"));
        assert!(!snap.loading);
        assert_eq!(c.book_label(), "John");
    }

    #[tokio::test]
    async fn test_default_book_falls_back_to_first() {
        let corpus = Corpus::new()
            .with_book(Book::new("GEN", "Genesis"), ChapterSet::contiguous(50))
            .with_book(Book::new("EXO", "Exodus"), ChapterSet::contiguous(40));
        let c = controller(TestSource::new(corpus));

        let load = c.load_books().await.expect("default commit");
        assert_eq!(load.reference(), &Reference::new("GEN", 1));
    }

    #[tokio::test]
    async fn test_existing_selection_is_kept() {
        let c = controller(TestSource::new(corpus()));
        c.restore_from_query("bookId=REV&chapter=22").unwrap();

        assert!(c.load_books().await.is_none());
        assert_eq!(c.reference(), Reference::new("REV", 22));
    }

    #[tokio::test]
    async fn test_book_list_failure_is_recorded() {
        let source = TestSource::new(corpus());
        source.fail_books.store(true, Ordering::SeqCst);
        let c = controller(source);
        c.restore_from_query("bookId=GEN&chapter=3").unwrap();

        assert!(c.load_books().await.is_none());
        let snap = c.snapshot();
        assert_eq!(snap.reference, Reference::new("GEN", 3));
        assert!(snap.error.unwrap().contains("network down"));
    }

    #[tokio::test]
    async fn test_book_list_success_clears_earlier_failure() {
        let source = TestSource::new(corpus());
        let failing = source.fail_books.clone();
        failing.store(true, Ordering::SeqCst);
        let c = controller(source);
        c.restore_from_query("bookId=GEN&chapter=3").unwrap();

        c.load_books().await;
        assert!(c.snapshot().error.is_some());

        failing.store(false, Ordering::SeqCst);
        assert!(c.load_books().await.is_none());
        let snap = c.snapshot();
        assert_eq!(snap.error, None);
        assert_eq!(snap.reference, Reference::new("GEN", 3));
    }

    #[tokio::test]
    async fn test_chapter_only_query_kept_for_default_book() {
        let c = controller(TestSource::new(corpus()));
        assert!(c.restore_from_query("chapter=5").unwrap().is_none());

        let load = c.load_books().await.expect("default commit");
        assert_eq!(load.reference(), &Reference::new("JHN", 5));
    }

    #[tokio::test]
    async fn test_chapter_only_query_out_of_range_starts_book() {
        let c = controller(TestSource::new(corpus()));
        assert!(c.restore_from_query("chapter=40").unwrap().is_none());

        let load = c.load_books().await.expect("default commit");
        assert_eq!(load.reference(), &Reference::new("JHN", 1));
    }

    #[tokio::test]
    async fn test_restored_chapter_clamped_once_books_load() {
        let c = controller(TestSource::new(corpus()));
        c.restore_from_query("bookId=JHN&chapter=99").unwrap();
        assert_eq!(c.reference(), Reference::new("JHN", 99));

        let load = c.load_books().await.expect("clamped commit");
        assert_eq!(load.reference(), &Reference::new("JHN", 21));
        assert_eq!(c.availability().previous, Some(Reference::new("JHN", 20)));

        // With books known the clamp is immediate
        let load = c.restore_from_query("bookId=GEN&chapter=77").unwrap().unwrap();
        assert_eq!(load.reference(), &Reference::new("GEN", 50));
    }

    #[tokio::test]
    async fn test_select_chapter_stays_in_book() {
        let c = controller(TestSource::new(corpus()));
        c.load_books().await;

        c.select_chapter(999).unwrap();
        assert_eq!(c.reference(), Reference::new("JHN", 21));
        assert_eq!(c.availability().previous, Some(Reference::new("JHN", 20)));

        c.select_chapter(0).unwrap();
        assert_eq!(c.reference(), Reference::new("JHN", 1));
    }

    #[tokio::test]
    async fn test_chapter_failure_keeps_reference() {
        let mut source = TestSource::new(corpus());
        source.fail_chapters = true;
        let c = controller(source);

        let load = c.load_books().await.unwrap();
        assert_eq!(c.load(load).await, LoadOutcome::Failed);

        let snap = c.snapshot();
        assert_eq!(snap.reference, Reference::new("JHN", 1));
        assert!(!snap.loading);
        assert!(snap.error.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_navigation_and_jump() {
        let c = controller(TestSource::new(corpus()));
        c.load_books().await;

        c.jump("Rev 22").unwrap();
        assert_eq!(c.reference(), Reference::new("REV", 22));

        c.go_next().unwrap();
        assert_eq!(c.reference(), Reference::new("GEN", 1));

        c.go_previous().unwrap();
        assert_eq!(c.reference(), Reference::new("REV", 22));

        assert!(c.jump("Zzzz 3").is_none());
        assert!(c.jump("John").is_none());
        assert_eq!(c.reference(), Reference::new("REV", 22));

        c.jump("jhn 50").unwrap();
        assert_eq!(c.reference(), Reference::new("JHN", 21));
    }

    #[tokio::test]
    async fn test_select_book_and_chapter() {
        let c = controller(TestSource::new(corpus()));
        assert!(c.select_chapter(4).is_none());
        c.load_books().await;

        assert!(c.select_book("XYZ").is_none());
        c.select_book("GEN").unwrap();
        assert_eq!(c.reference(), Reference::new("GEN", 1));
        c.select_chapter(12).unwrap();
        assert_eq!(c.reference(), Reference::new("GEN", 12));
        assert_eq!(c.to_query(), "bookId=GEN&chapter=12");
    }

    #[tokio::test]
    async fn test_availability_before_books() {
        let c = controller(TestSource::new(corpus()));
        let availability = c.availability();
        assert!(!availability.can_go_next());
        assert!(!availability.can_go_previous());
        assert!(c.go_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fetch_never_overwrites_newer_selection() {
        let mut source = TestSource::new(corpus());
        source.delay_ms = 10;
        source.slow_chapter = Some(1);
        let c = controller(source);
        c.load_books().await;

        let first = c.set_reference(Reference::new("GEN", 1));
        let (first_outcome, second_outcome) = tokio::join!(c.load(first), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let second = c.set_reference(Reference::new("GEN", 2));
            c.load(second).await
        });

        assert_eq!(first_outcome, LoadOutcome::Cancelled);
        assert_eq!(second_outcome, LoadOutcome::Applied);
        let snap = c.snapshot();
        assert_eq!(snap.content.as_deref(), Some("<p>GEN 2</p>"));
        assert_eq!(snap.content_reference, Some(Reference::new("GEN", 2)));
    }

    #[tokio::test]
    async fn test_superseded_load_is_not_applied() {
        let c = controller(TestSource::new(corpus()));
        c.load_books().await;

        let first = c.set_reference(Reference::new("GEN", 1));
        let second = c.set_reference(Reference::new("GEN", 2));

        assert_eq!(c.load(second).await, LoadOutcome::Applied);
        assert_eq!(c.load(first).await, LoadOutcome::Cancelled);
        assert_eq!(c.snapshot().content.as_deref(), Some("<p>GEN 2</p>"));
    }

    #[tokio::test]
    async fn test_commits_publish_events() {
        let events = Arc::new(EventBus::new());
        let source = TestSource::new(corpus());
        let lookup = Arc::new(source.corpus.clone());
        let c = SelectionController::new(Arc::new(source), lookup, events.clone());

        let commits = Arc::new(AtomicUsize::new(0));
        let counter = commits.clone();
        let _sub = events.subscribe_fn(move |_: &ReferenceChanged| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        c.load_books().await;
        c.go_next();
        assert_eq!(commits.load(Ordering::SeqCst), 2);
    }
}
