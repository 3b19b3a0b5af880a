//! The readable units produced from a package.

#[cfg(feature = "cli")]
use serde::Serialize;

use crate::text::content_hash;

/// A package reduced to its readable chapters.
///
/// `chapters` is never empty for a `Book` returned by the readers; zero
/// chapters is reported as [`crate::Error::NoReadableContent`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct Book {
    pub title: String,
    pub chapters: Vec<ChapterRecord>,
    /// Cover image as a `data:` URL.
    pub cover: Option<String>,
}

/// One chapter, ready for display once its markup has been sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(Serialize))]
pub struct ChapterRecord {
    /// `"<spine id>_<ordinal>"` for split files, the spine id otherwise.
    pub id: String,
    pub title: String,
    /// Trimmed plain text, paragraphs separated by a blank line.
    pub content: String,
    /// Unsanitized markup of the chapter.
    pub raw_markup: String,
}

impl ChapterRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        raw_markup: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            raw_markup: raw_markup.into(),
        }
    }

    /// Fingerprint of the plain-text content.
    pub fn content_hash(&self) -> String {
        content_hash(&self.content)
    }

    /// Content length in characters.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// An item in the reading order (spine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    /// Manifest id of the item.
    pub id: String,
    /// href as declared in the manifest.
    pub href: String,
    /// Archive path the href resolves to.
    pub path: String,
}

impl SpineItem {
    pub fn new(id: impl Into<String>, href: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            path: path.into(),
        }
    }
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_chapter(mut self, chapter: ChapterRecord) -> Self {
        self.chapters.push(chapter);
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Look up a chapter by id.
    pub fn chapter(&self, id: &str) -> Option<&ChapterRecord> {
        self.chapters.iter().find(|c| c.id == id)
    }
}
