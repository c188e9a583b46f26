//! Exact-match lookup from lower-cased names to books

use ahash::AHashMap;

use crate::corpus::Book;
use crate::reference::BookId;

/// Lower-cased names, abbreviations and configured aliases mapped to book ids.
///
/// Names and abbreviations are indexed before aliases, and the first book in
/// corpus order claims a key, so a configured alias never shadows a real
/// book name.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: AHashMap<String, BookId>,
}

impl AliasIndex {
    /// Index names and abbreviations only
    pub fn new(books: &[Book]) -> Self {
        Self::with_aliases(books, &[])
    }

    /// Index names, abbreviations and `(alias, book id)` pairs.
    ///
    /// Aliases pointing at a book that is not in `books` are skipped.
    pub fn with_aliases(books: &[Book], aliases: &[(&str, &str)]) -> Self {
        let mut entries = AHashMap::with_capacity(books.len() * 2 + aliases.len());

        for book in books {
            entries
                .entry(book.name.to_lowercase())
                .or_insert_with(|| book.id.clone());
            if let Some(abbr) = &book.abbr {
                entries
                    .entry(abbr.to_lowercase())
                    .or_insert_with(|| book.id.clone());
            }
        }

        for (alias, book_id) in aliases {
            if !books.iter().any(|b| b.id == *book_id) {
                tracing::debug!("Skipping alias '{}' for unknown book '{}'", alias, book_id);
                continue;
            }
            entries
                .entry(alias.to_lowercase())
                .or_insert_with(|| book_id.to_string());
        }

        Self { entries }
    }

    /// Book id for an exact (already lower-cased) token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_index() {
        let books = vec![
            Book::new("JHN", "John").with_abbr("Jn"),
            Book::new("JUD", "Jude"),
        ];
        let index =
            AliasIndex::with_aliases(&books, &[("jhn", "JHN"), ("jude", "JHN"), ("x", "NOPE")]);

        assert_eq!(index.get("john"), Some("JHN"));
        assert_eq!(index.get("jn"), Some("JHN"));
        assert_eq!(index.get("jhn"), Some("JHN"));
        // Book names win over aliases
        assert_eq!(index.get("jude"), Some("JUD"));
        assert_eq!(index.get("x"), None);
        assert_eq!(index.len(), 4);
    }
}
