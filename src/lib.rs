//! # shiori
//!
//! Split EPUB books into readable, titled chapters.
//!
//! ## Features
//!
//! - Reads EPUB 2/3 packages (container, package document, spine, manifest)
//! - Splits content files at chapter-like headings (`I`, `42`, `Chapter 3`, `Capítulo 1`)
//! - Falls back to one chapter per file when a file has no chapter structure
//! - Optionally splits at the table of contents (nav document or NCX) instead
//! - Loads the cover image as a `data:` URL
//!
//! ## Quick Start
//!
//! ```no_run
//! let book = shiori::open_book("input.epub").unwrap();
//! println!("{} ({} chapters)", book.title, book.chapters.len());
//! for chapter in &book.chapters {
//!     println!("{} {}", chapter.id, chapter.title);
//! }
//! ```
//!
//! ## Segmenting a single document
//!
//! ```
//! use shiori::chapters::{HeadingClassifier, PositionIndex, build_segments, heading_candidates};
//! use shiori::dom::Document;
//!
//! let doc = Document::parse("<h2>I</h2><p>One.</p><h2>II</h2><p>Two.</p>");
//! let index = PositionIndex::build(doc.dom(), doc.body());
//! let candidates = heading_candidates(doc.dom(), &index);
//! let segments = build_segments(doc.dom(), &index, &candidates, &HeadingClassifier::default());
//!
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[1].title, "II");
//! assert_eq!(segments[1].content, "Two.");
//! ```
//!
//! Chapter markup is returned unsanitized; sanitize [`ChapterRecord::raw_markup`]
//! before displaying it.

pub mod book;
pub mod chapters;
pub mod dom;
pub mod epub;
pub mod error;
pub mod text;
pub(crate) mod util;

pub use book::{Book, ChapterRecord, SpineItem};
pub use chapters::{ClassifierConfig, Diagnostic, Diagnostics, HeadingClassifier};
pub use epub::{ChapterStrategy, ReadOptions, open_book, open_book_with, read_book, read_book_with};
pub use error::{Error, Result};
