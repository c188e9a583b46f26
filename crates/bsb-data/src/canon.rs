//! The standard 66-book Protestant canon

use bsb_core::{Book, ChapterLookup, ChapterSet, Corpus};
use once_cell::sync::Lazy;

/// `(USFM id, name, abbreviation, chapter count)` in canonical order
const BOOKS: [(&str, &str, &str, u32); 66] = [
    ("GEN", "Genesis", "Gen", 50),
    ("EXO", "Exodus", "Exod", 40),
    ("LEV", "Leviticus", "Lev", 27),
    ("NUM", "Numbers", "Num", 36),
    ("DEU", "Deuteronomy", "Deut", 34),
    ("JOS", "Joshua", "Josh", 24),
    ("JDG", "Judges", "Judg", 21),
    ("RUT", "Ruth", "Ruth", 4),
    ("1SA", "1 Samuel", "1Sam", 31),
    ("2SA", "2 Samuel", "2Sam", 24),
    ("1KI", "1 Kings", "1Kgs", 22),
    ("2KI", "2 Kings", "2Kgs", 25),
    ("1CH", "1 Chronicles", "1Chr", 29),
    ("2CH", "2 Chronicles", "2Chr", 36),
    ("EZR", "Ezra", "Ezra", 10),
    ("NEH", "Nehemiah", "Neh", 13),
    ("EST", "Esther", "Esth", 10),
    ("JOB", "Job", "Job", 42),
    ("PSA", "Psalms", "Ps", 150),
    ("PRO", "Proverbs", "Prov", 31),
    ("ECC", "Ecclesiastes", "Eccl", 12),
    ("SNG", "Song of Songs", "Song", 8),
    ("ISA", "Isaiah", "Isa", 66),
    ("JER", "Jeremiah", "Jer", 52),
    ("LAM", "Lamentations", "Lam", 5),
    ("EZK", "Ezekiel", "Ezek", 48),
    ("DAN", "Daniel", "Dan", 12),
    ("HOS", "Hosea", "Hos", 14),
    ("JOL", "Joel", "Joel", 3),
    ("AMO", "Amos", "Amos", 9),
    ("OBA", "Obadiah", "Obad", 1),
    ("JON", "Jonah", "Jonah", 4),
    ("MIC", "Micah", "Mic", 7),
    ("NAM", "Nahum", "Nah", 3),
    ("HAB", "Habakkuk", "Hab", 3),
    ("ZEP", "Zephaniah", "Zeph", 3),
    ("HAG", "Haggai", "Hag", 2),
    ("ZEC", "Zechariah", "Zech", 14),
    ("MAL", "Malachi", "Mal", 4),
    ("MAT", "Matthew", "Matt", 28),
    ("MRK", "Mark", "Mark", 16),
    ("LUK", "Luke", "Luke", 24),
    ("JHN", "John", "John", 21),
    ("ACT", "Acts", "Acts", 28),
    ("ROM", "Romans", "Rom", 16),
    ("1CO", "1 Corinthians", "1Cor", 16),
    ("2CO", "2 Corinthians", "2Cor", 13),
    ("GAL", "Galatians", "Gal", 6),
    ("EPH", "Ephesians", "Eph", 6),
    ("PHP", "Philippians", "Phil", 4),
    ("COL", "Colossians", "Col", 4),
    ("1TH", "1 Thessalonians", "1Thess", 5),
    ("2TH", "2 Thessalonians", "2Thess", 3),
    ("1TI", "1 Timothy", "1Tim", 6),
    ("2TI", "2 Timothy", "2Tim", 4),
    ("TIT", "Titus", "Titus", 3),
    ("PHM", "Philemon", "Phlm", 1),
    ("HEB", "Hebrews", "Heb", 13),
    ("JAS", "James", "Jas", 5),
    ("1PE", "1 Peter", "1Pet", 5),
    ("2PE", "2 Peter", "2Pet", 3),
    ("1JN", "1 John", "1John", 5),
    ("2JN", "2 John", "2John", 1),
    ("3JN", "3 John", "3John", 1),
    ("JUD", "Jude", "Jude", 1),
    ("REV", "Revelation", "Rev", 22),
];

/// Common short forms beyond the names and abbreviations above
const EXTRA_ALIASES: &[(&str, &str)] = &[
    ("gn", "GEN"),
    ("ex", "EXO"),
    ("lv", "LEV"),
    ("nm", "NUM"),
    ("dt", "DEU"),
    ("jgs", "JDG"),
    ("psalm", "PSA"),
    ("pss", "PSA"),
    ("prv", "PRO"),
    ("qoh", "ECC"),
    ("song of solomon", "SNG"),
    ("sos", "SNG"),
    ("canticles", "SNG"),
    ("ezk", "EZK"),
    ("mt", "MAT"),
    ("mk", "MRK"),
    ("lk", "LUK"),
    ("jn", "JHN"),
    ("rm", "ROM"),
    ("phm", "PHM"),
    ("jm", "JAS"),
    ("1 jn", "1JN"),
    ("1jn", "1JN"),
    ("2jn", "2JN"),
    ("3jn", "3JN"),
    ("rv", "REV"),
    ("revelations", "REV"),
];

static CORPUS: Lazy<Corpus> = Lazy::new(|| {
    BOOKS
        .iter()
        .fold(Corpus::new(), |corpus, &(id, name, abbr, chapters)| {
            let book = if abbr == name {
                Book::new(id, name)
            } else {
                Book::new(id, name).with_abbr(abbr)
            };
            corpus.with_book(book, ChapterSet::contiguous(chapters))
        })
});

static ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    // Book ids double as aliases ("jhn", "1co")
    BOOKS
        .iter()
        .map(|&(id, ..)| (id, id))
        .chain(EXTRA_ALIASES.iter().copied())
        .collect()
});

/// The canon as a corpus
pub fn standard_corpus() -> &'static Corpus {
    &CORPUS
}

/// `(alias, book id)` pairs for quick-jump
pub fn default_aliases() -> &'static [(&'static str, &'static str)] {
    ALIASES.as_slice()
}

/// Chapter lookup backed by the standard canon
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCanon;

impl ChapterLookup for StandardCanon {
    fn chapter_numbers(&self, book_id: &str) -> ChapterSet {
        CORPUS.chapter_numbers(book_id)
    }
}
