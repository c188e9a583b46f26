//! Chapter audio URLs

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;
use bsb_core::{Book, ChapterLookup};

use crate::DataError;

/// Folder and file stem for a book name: whitespace runs become `_`
pub fn slug_for_book(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Per-book lists of audio files relative to a base URL.
///
/// Entry `i` of a book's list is chapter `i + 1`.
#[derive(Debug, Clone, Default)]
pub struct AudioIndex {
    base: String,
    files: AHashMap<String, Vec<String>>,
}

impl AudioIndex {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            files: AHashMap::new(),
        }
    }

    /// Load from a JSON manifest mapping book ids to relative paths:
    /// `{"JHN": ["John/John_01.mp3", ...]}`
    pub fn from_manifest_json(base: impl Into<String>, json: &str) -> Result<Self, DataError> {
        let manifest: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut index = Self::new(base);
        for (book_id, files) in manifest {
            index.insert(&book_id, files);
        }
        tracing::debug!("Audio manifest covers {} books", index.files.len());
        Ok(index)
    }

    pub fn from_manifest_file(base: impl Into<String>, path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_manifest_json(base, &json)
    }

    /// Generate `<Book_Name>/<Book_Name>_<NN>.mp3` for every chapter of
    /// every book
    pub fn from_slug_scheme<L>(base: impl Into<String>, books: &[Book], lookup: &L) -> Self
    where
        L: ChapterLookup + ?Sized,
    {
        let mut index = Self::new(base);
        for book in books {
            let chapters = lookup.chapter_numbers(&book.id);
            if chapters.is_empty() {
                continue;
            }
            let slug = slug_for_book(&book.name);
            let files = (1..=chapters.last())
                .map(|chapter| format!("{slug}/{slug}_{chapter:02}.mp3"))
                .collect();
            index.insert(&book.id, files);
        }
        index
    }

    pub fn insert(&mut self, book_id: &str, files: Vec<String>) {
        self.files.insert(book_id.to_uppercase(), files);
    }

    /// Audio URL for a chapter, or `None` when the book or chapter has no file
    pub fn build_audio_url(&self, book_id: &str, chapter: u32) -> Option<String> {
        let list = self.files.get(&book_id.to_uppercase())?;
        let idx = usize::try_from(chapter).ok()?.checked_sub(1)?;
        let rel = list.get(idx).filter(|rel| !rel.is_empty())?;
        Some(format!("{}{}", self.base, rel))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
