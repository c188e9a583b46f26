//! Previous/next computation across the corpus

use crate::corpus::{Book, ChapterLookup};
use crate::reference::Reference;

use super::Availability;

/// Computes neighbouring references in corpus order
#[derive(Debug, Clone, Copy)]
pub struct Navigator {
    /// Step from the very last chapter to the very first (and back)
    pub wrap: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self { wrap: true }
    }
}

impl Navigator {
    pub fn new(wrap: bool) -> Self {
        Self { wrap }
    }

    /// Reference after `current`, or `None` when there is nothing to move to
    pub fn next<L>(&self, current: &Reference, books: &[Book], lookup: &L) -> Option<Reference>
    where
        L: ChapterLookup + ?Sized,
    {
        let idx = locate(current, books)?;
        let book_id = &books[idx].id;

        // Same book, next chapter
        if current.chapter < lookup.chapter_numbers(book_id).last() {
            return Some(current.with_chapter(current.chapter + 1));
        }

        // Next book
        if let Some(next_book) = books.get(idx + 1) {
            let first = lookup.chapter_numbers(&next_book.id).first();
            return Some(Reference::new(next_book.id.clone(), first));
        }

        // Revelation 22 -> Genesis 1
        if self.wrap {
            let first_book = &books[0];
            let first = lookup.chapter_numbers(&first_book.id).first();
            return Some(Reference::new(first_book.id.clone(), first));
        }

        None
    }

    /// Reference before `current`, or `None` when there is nothing to move to
    pub fn previous<L>(
        &self,
        current: &Reference,
        books: &[Book],
        lookup: &L,
    ) -> Option<Reference>
    where
        L: ChapterLookup + ?Sized,
    {
        let idx = locate(current, books)?;
        let book_id = &books[idx].id;

        // Same book, previous chapter
        if current.chapter > lookup.chapter_numbers(book_id).first() {
            return Some(current.with_chapter(current.chapter - 1));
        }

        // Previous book
        if idx > 0 {
            let prev_book = &books[idx - 1];
            let last = lookup.chapter_numbers(&prev_book.id).last();
            return Some(Reference::new(prev_book.id.clone(), last));
        }

        // Genesis 1 -> Revelation 22
        if self.wrap {
            let last_book = &books[books.len() - 1];
            let last = lookup.chapter_numbers(&last_book.id).last();
            return Some(Reference::new(last_book.id.clone(), last));
        }

        None
    }

    /// Both neighbours of `current`
    pub fn availability<L>(&self, current: &Reference, books: &[Book], lookup: &L) -> Availability
    where
        L: ChapterLookup + ?Sized,
    {
        Availability {
            previous: self.previous(current, books, lookup),
            next: self.next(current, books, lookup),
        }
    }
}

/// Index of the current book, `None` if unset or not in the list
fn locate(current: &Reference, books: &[Book]) -> Option<usize> {
    let book_id = current.book_id()?;
    books.iter().position(|b| b.id == book_id)
}
