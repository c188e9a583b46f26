//! The reading position: a book plus a chapter

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Corpus-stable book identifier (e.g. `"JHN"`)
pub type BookId = String;

const QUERY_BOOK_KEY: &str = "bookId";
const QUERY_CHAPTER_KEY: &str = "chapter";

/// Bound `n` to `[min, max]`.
///
/// When `min > max` the lower bound wins, so callers that pass a degenerate
/// range still get a value no smaller than `min`.
pub fn clamp(n: u32, min: u32, max: u32) -> u32 {
    n.min(max).max(min)
}

/// A position in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Selected book, `None` until the book list has loaded
    pub book_id: Option<BookId>,
    /// Chapter number, only meaningful relative to the book's chapter set
    pub chapter: u32,
}

impl Reference {
    /// Create a reference to a chapter of a book
    pub fn new(book_id: impl Into<BookId>, chapter: u32) -> Self {
        Self {
            book_id: Some(book_id.into()),
            chapter,
        }
    }

    /// A reference with no book selected yet
    pub fn unset() -> Self {
        Self {
            book_id: None,
            chapter: 1,
        }
    }

    pub fn is_set(&self) -> bool {
        self.book_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn book_id(&self) -> Option<&str> {
        self.book_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Same book, different chapter
    pub fn with_chapter(&self, chapter: u32) -> Self {
        Self {
            book_id: self.book_id.clone(),
            chapter,
        }
    }

    /// Encode as shareable query parameters (`bookId=JHN&chapter=3`)
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(id) = self.book_id() {
            query.append_pair(QUERY_BOOK_KEY, id);
        }
        query.append_pair(QUERY_CHAPTER_KEY, &self.chapter.to_string());
        query.finish()
    }

    /// Decode query parameters produced by [`Reference::to_query`].
    ///
    /// A leading `?` is accepted, unknown keys are ignored and a missing
    /// chapter defaults to 1.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut reference = Self::unset();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                QUERY_BOOK_KEY => {
                    // Undecodable bytes come back as U+FFFD
                    if value.contains(char::REPLACEMENT_CHARACTER) {
                        return Err(Error::InvalidQuery(query.to_string()));
                    }
                    reference.book_id = (!value.is_empty()).then(|| value.into_owned());
                }
                QUERY_CHAPTER_KEY => {
                    reference.chapter = match value.parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(Error::InvalidChapter(value.into_owned())),
                    };
                }
                _ => {}
            }
        }

        Ok(reference)
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book_id().unwrap_or("-"), self.chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(5, 1, 10), 5);
        assert_eq!(clamp(0, 1, 10), 1);
        assert_eq!(clamp(99, 1, 1), 1);
        assert_eq!(clamp(11, 1, 10), 10);
    }

    proptest! {
        #[test]
        fn test_clamp_in_range_and_monotonic(
            n in any::<u32>(),
            m in any::<u32>(),
            min in 0u32..10_000,
            span in 0u32..10_000,
        ) {
            let max = min + span;
            let c = clamp(n, min, max);
            prop_assert!(c >= min && c <= max);
            if (min..=max).contains(&n) {
                prop_assert_eq!(c, n);
            }

            let (lo, hi) = if n <= m { (n, m) } else { (m, n) };
            prop_assert!(clamp(lo, min, max) <= clamp(hi, min, max));
        }
    }

    #[test]
    fn test_unset_reference() {
        let r = Reference::default();
        assert!(!r.is_set());
        assert_eq!(r.chapter, 1);
        assert_eq!(r.book_id(), None);

        let empty = Reference::new("", 4);
        assert!(!empty.is_set());
    }

    #[test]
    fn test_query_round_trip() {
        let r = Reference::new("JHN", 3);
        assert_eq!(r.to_query(), "bookId=JHN&chapter=3");
        assert_eq!(Reference::from_query(&r.to_query()).unwrap(), r);

        let odd = Reference::new("1 JN&x", 2);
        assert_eq!(odd.to_query(), "bookId=1+JN%26x&chapter=2");
        assert_eq!(Reference::from_query(&odd.to_query()).unwrap(), odd);
        assert_eq!(Reference::unset().to_query(), "chapter=1");
    }

    #[test]
    fn test_query_defaults_and_errors() {
        let r = Reference::from_query("?bookId=PSA&utm=x").unwrap();
        assert_eq!(r, Reference::new("PSA", 1));

        assert_eq!(Reference::from_query("").unwrap(), Reference::unset());
        assert!(matches!(
            Reference::from_query("bookId=GEN&chapter=abc"),
            Err(Error::InvalidChapter(_))
        ));
        assert!(matches!(
            Reference::from_query("bookId=%FF"),
            Err(Error::InvalidQuery(_))
        ));
        assert_eq!(
            Reference::from_query("bookId=1+JN&chapter=2").unwrap(),
            Reference::new("1 JN", 2)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Reference::new("GEN", 50).to_string(), "GEN 50");
        assert_eq!(Reference::unset().to_string(), "- 1");
    }
}
