//! Quick-jump: resolve free text like "Jn 3" or "ps23" into a reference

mod alias;
mod scanner;

pub use alias::AliasIndex;
pub use scanner::{scan, JumpQuery};

use crate::corpus::{Book, ChapterLookup};
use crate::reference::Reference;

/// How a book token matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Name, abbreviation or alias equals the token
    Exact,
    /// Name or abbreviation starts with the token
    Prefix,
    /// Name or abbreviation contains the token
    Substring,
}

/// Find the book a lower-cased token refers to.
///
/// Tiers are tried in order (exact, prefix, substring) and the first book in
/// corpus order wins within a tier.
pub fn match_book<'a>(
    token: &str,
    books: &'a [Book],
    aliases: &AliasIndex,
) -> Option<(&'a Book, MatchTier)> {
    if let Some(id) = aliases.get(token) {
        if let Some(book) = books.iter().find(|b| b.id == id) {
            return Some((book, MatchTier::Exact));
        }
    }

    let fields = |b: &Book| {
        let name = b.name.to_lowercase();
        let abbr = b.abbr.as_ref().map(|a| a.to_lowercase());
        (name, abbr)
    };

    if let Some(book) = books.iter().find(|b| {
        let (name, abbr) = fields(b);
        name.starts_with(token) || abbr.is_some_and(|a| a.starts_with(token))
    }) {
        return Some((book, MatchTier::Prefix));
    }

    books
        .iter()
        .find(|b| {
            let (name, abbr) = fields(b);
            name.contains(token) || abbr.is_some_and(|a| a.contains(token))
        })
        .map(|book| (book, MatchTier::Substring))
}

/// Resolve quick-jump text into a reference.
///
/// The chapter is clamped into the matched book's range. Returns `None` when
/// the text has no trailing chapter number or no book matches.
pub fn resolve<L>(raw: &str, books: &[Book], lookup: &L, aliases: &AliasIndex) -> Option<Reference>
where
    L: ChapterLookup + ?Sized,
{
    let query = scan(raw)?;
    let Some((book, tier)) = match_book(&query.book_token, books, aliases) else {
        tracing::debug!("Quick jump '{}': no book matches '{}'", raw, query.book_token);
        return None;
    };

    let chapter = lookup.chapter_numbers(&book.id).clamp(query.chapter);
    tracing::debug!(
        "Quick jump '{}' -> {} {} ({:?} match)",
        raw,
        book.id,
        chapter,
        tier
    );
    Some(Reference::new(book.id.clone(), chapter))
}
