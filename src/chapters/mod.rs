//! Chapter segmentation.
//!
//! Each content file of a package is parsed into a [`Document`](crate::dom::Document)
//! and split at the headings that look like chapter markers:
//!
//! - [`HeadingClassifier`] decides which `h1`-`h4` elements start a chapter.
//! - [`PositionIndex`] numbers the body's elements in document order.
//! - [`build_segments`] collects the content between consecutive chapter headings.
//! - [`extract_single`] turns a file with fewer than two chapter headings into one chapter.
//! - [`ChapterAssembler`] runs the above over a whole reading order.
//!
//! Books with a usable table of contents can instead be split at its entries
//! with [`assemble_toc`].

mod assemble;
mod classify;
mod fallback;
mod position;
mod segment;
mod toc;

pub use assemble::{
    ChapterAssembler, ContentSource, Diagnostic, Diagnostics, TracingDiagnostics,
};
pub use classify::{CHAPTER_WORDS, ClassifierConfig, HEADING_TAGS, HeadingClassifier, STOP_WORDS};
pub use fallback::{FallbackChapter, extract_single};
pub use position::PositionIndex;
pub use segment::{
    CONTENT_TAGS, ChapterSegment, MIN_CHAPTER_HEADINGS, accepted_headings, build_segments,
    heading_candidates, segments_for_headings,
};
pub use toc::{TocSection, TocTarget, assemble_toc, extract_toc_sections, find_fragment};
