//! Chapter heading classification.
//!
//! A heading marks a chapter start when its trimmed text looks like a chapter
//! number. Rules are checked in order, first match wins:
//!
//! 1. Roman numeral (`IV`, `xii`)
//! 2. Arabic number (`42`)
//! 3. Chapter word followed by digits (`Chapter 3`, `Capítulo 1`, `kapitel7`)
//! 4. Very short text (1–5 characters) that is not a common short word
//!
//! Rule 4 is a heuristic: genuine short prose headings such as `Intro` are
//! accepted as chapter markers too.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::error::Result;

/// Chapter words by locale token.
pub const CHAPTER_WORDS: &[(&str, &str)] = &[
    ("en", "chapter"),
    ("es", "capítulo"),
    ("fr", "chapitre"),
    ("it", "capitolo"),
    ("de", "kapitel"),
];

/// Short words that are never chapter markers on their own.
pub const STOP_WORDS: &[&str] = &["the", "and", "but", "for", "with", "about"];

/// Tags whose elements are heading candidates.
pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

const DEFAULT_MAX_SHORT_HEADING_LEN: usize = 5;

static DEFAULT_CLASSIFIER: LazyLock<HeadingClassifier> = LazyLock::new(|| {
    ClassifierConfig::default()
        .build()
        .expect("built-in chapter words form a valid pattern")
});

/// Settings for [`HeadingClassifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub chapter_words: Vec<String>,
    pub stop_words: Vec<String>,
    /// Upper bound (inclusive, in characters) for the short-heading rule.
    pub max_short_heading_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            chapter_words: CHAPTER_WORDS.iter().map(|(_, w)| w.to_string()).collect(),
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            max_short_heading_len: DEFAULT_MAX_SHORT_HEADING_LEN,
        }
    }
}

impl ClassifierConfig {
    /// Default configuration restricted to the chapter words of `locales`.
    ///
    /// Unknown locale tokens are ignored.
    pub fn for_locales(locales: &[&str]) -> Self {
        Self {
            chapter_words: CHAPTER_WORDS
                .iter()
                .filter(|(locale, _)| locales.contains(locale))
                .map(|(_, w)| w.to_string())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_chapter_word(mut self, word: impl Into<String>) -> Self {
        self.chapter_words.push(word.into());
        self
    }

    pub fn with_stop_word(mut self, word: impl Into<String>) -> Self {
        self.stop_words.push(word.into());
        self
    }

    pub fn with_max_short_heading_len(mut self, len: usize) -> Self {
        self.max_short_heading_len = len;
        self
    }

    /// Compile the configuration into a classifier.
    pub fn build(&self) -> Result<HeadingClassifier> {
        let chapter_pattern = if self.chapter_words.is_empty() {
            None
        } else {
            let alternatives = self
                .chapter_words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)^(?:{alternatives})\s*[0-9]+"))?)
        };

        Ok(HeadingClassifier {
            chapter_pattern,
            stop_words: self.stop_words.iter().map(|w| w.to_lowercase()).collect(),
            max_short_heading_len: self.max_short_heading_len,
        })
    }
}

/// Pure predicate deciding whether a heading marks a chapter start.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    chapter_pattern: Option<Regex>,
    stop_words: Vec<String>,
    max_short_heading_len: usize,
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

impl HeadingClassifier {
    /// Classify heading text. Surrounding whitespace is ignored.
    pub fn is_chapter_heading(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        if is_roman_numeral(text) || is_arabic_number(text) {
            return true;
        }

        if self
            .chapter_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
        {
            return true;
        }

        text.chars().count() <= self.max_short_heading_len
            && !self.stop_words.contains(&text.to_lowercase())
    }

    /// Classify a heading element by its trimmed text content.
    pub fn is_chapter_heading_node(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        self.is_chapter_heading(&dom.text_content(id))
    }
}

fn is_roman_numeral(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
}

fn is_arabic_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
