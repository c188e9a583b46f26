//! Books, chapter sets and the chapter lookup seam

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::reference::{clamp, BookId};

/// A book of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique, corpus-stable identifier (e.g. "GEN")
    pub id: BookId,
    /// Display name (e.g. "Genesis")
    pub name: String,
    /// Optional short label (e.g. "Gen")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbr: Option<String>,
}

impl Book {
    pub fn new(id: impl Into<BookId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbr: None,
        }
    }

    pub fn with_abbr(mut self, abbr: impl Into<String>) -> Self {
        self.abbr = Some(abbr.into());
        self
    }
}

/// Valid chapter numbers of one book.
///
/// Membership is not assumed to be `1..=N`; bounds are the min and max of the
/// set. An empty set behaves as the single chapter 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSet(Vec<u32>);

impl ChapterSet {
    pub fn new(chapters: Vec<u32>) -> Self {
        Self(chapters)
    }

    /// Chapters `1..=count`
    pub fn contiguous(count: u32) -> Self {
        Self((1..=count).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Lowest chapter number, 1 when empty
    pub fn first(&self) -> u32 {
        self.0.iter().copied().min().unwrap_or(1)
    }

    /// Highest chapter number, 1 when empty
    pub fn last(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(1)
    }

    /// Bound a chapter number into `[first, last]`
    pub fn clamp(&self, chapter: u32) -> u32 {
        clamp(chapter, self.first(), self.last())
    }
}

impl From<Vec<u32>> for ChapterSet {
    fn from(chapters: Vec<u32>) -> Self {
        Self(chapters)
    }
}

/// Per-book chapter numbers.
///
/// Lookups are local and cheap. They never fail: an unknown book yields an
/// empty set.
pub trait ChapterLookup {
    fn chapter_numbers(&self, book_id: &str) -> ChapterSet;
}

impl<F> ChapterLookup for F
where
    F: Fn(&str) -> ChapterSet,
{
    fn chapter_numbers(&self, book_id: &str) -> ChapterSet {
        self(book_id)
    }
}

/// An ordered book list together with each book's chapter set
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    books: Vec<Book>,
    chapters: AHashMap<BookId, ChapterSet>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a book. A book whose id is already present is ignored.
    pub fn push(&mut self, book: Book, chapters: ChapterSet) {
        if self.chapters.contains_key(&book.id) {
            tracing::warn!("Ignoring duplicate book id '{}'", book.id);
            return;
        }
        self.chapters.insert(book.id.clone(), chapters);
        self.books.push(book);
    }

    pub fn with_book(mut self, book: Book, chapters: ChapterSet) -> Self {
        self.push(book, chapters);
        self
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }
}

impl ChapterLookup for Corpus {
    fn chapter_numbers(&self, book_id: &str) -> ChapterSet {
        self.chapters.get(book_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_set_bounds() {
        let set = ChapterSet::new(vec![3, 1, 7]);
        assert_eq!(set.first(), 1);
        assert_eq!(set.last(), 7);
        assert_eq!(set.clamp(0), 1);
        assert_eq!(set.clamp(9), 7);

        let sparse = ChapterSet::new(vec![5, 6]);
        assert_eq!(sparse.clamp(1), 5);
    }

    #[test]
    fn test_empty_chapter_set_is_chapter_one() {
        let set = ChapterSet::default();
        assert_eq!(set.first(), 1);
        assert_eq!(set.last(), 1);
        assert_eq!(set.clamp(40), 1);
    }

    #[test]
    fn test_corpus_lookup() {
        let corpus = Corpus::new()
            .with_book(Book::new("GEN", "Genesis"), ChapterSet::contiguous(50))
            .with_book(Book::new("GEN", "Duplicate"), ChapterSet::contiguous(2));

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.book("GEN").map(|b| b.name.as_str()), Some("Genesis"));
        assert_eq!(corpus.chapter_numbers("GEN").last(), 50);
        assert!(corpus.chapter_numbers("XYZ").is_empty());
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |id: &str| {
            if id == "JUD" {
                ChapterSet::contiguous(1)
            } else {
                ChapterSet::default()
            }
        };
        assert_eq!(lookup.chapter_numbers("JUD").last(), 1);
        assert!(lookup.chapter_numbers("JHN").is_empty());
    }
}
