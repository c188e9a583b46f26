//! Splits quick-jump text into a book token and a chapter number

/// Result of scanning quick-jump text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpQuery {
    /// Lower-cased book text, e.g. `"jn"` for `"Jn 3"`
    pub book_token: String,
    /// Chapter as typed, before clamping. Saturates at `u32::MAX`.
    pub chapter: u32,
}

/// Scan `raw` for a book token followed by a trailing chapter number.
///
/// Accepts `"John 3"`, `"Ps. 23"` and `"Psalm119"`. Returns `None` when the
/// input is blank, has no trailing digits, or is digits only.
pub fn scan(raw: &str) -> Option<JumpQuery> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    let digit_count = text.bytes().rev().take_while(u8::is_ascii_digit).count();
    let digits_start = text.len() - digit_count;
    if digit_count == 0 || digits_start == 0 {
        return None;
    }

    // Only overflow can fail here; an absurdly large chapter gets clamped later
    let chapter = text[digits_start..].parse::<u32>().unwrap_or(u32::MAX);

    let book_token = text[..digits_start]
        .trim_end_matches(|c: char| c.is_whitespace() || c == '.')
        .to_lowercase();
    if book_token.is_empty() {
        return None;
    }

    Some(JumpQuery {
        book_token,
        chapter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(book: &str, chapter: u32) -> Option<JumpQuery> {
        Some(JumpQuery {
            book_token: book.to_string(),
            chapter,
        })
    }

    #[test]
    fn test_scan_basic() {
        assert_eq!(scan("John 3"), q("john", 3));
        assert_eq!(scan("  Jn   3 "), q("jn", 3));
        assert_eq!(scan("1 John 4"), q("1 john", 4));
        assert_eq!(scan("Ps. 23"), q("ps", 23));
    }

    #[test]
    fn test_scan_without_space() {
        assert_eq!(scan("Psalm119"), q("psalm", 119));
        assert_eq!(scan("ps23"), q("ps", 23));
    }

    #[test]
    fn test_scan_rejects() {
        assert_eq!(scan(""), None);
        assert_eq!(scan("   "), None);
        assert_eq!(scan("John"), None);
        assert_eq!(scan("316"), None);
        assert_eq!(scan(". 3"), None);
    }

    #[test]
    fn test_scan_huge_chapter_saturates() {
        assert_eq!(scan("Jude 99999999999999"), q("jude", u32::MAX));
    }
}
