//! Chapter assembly across the reading order of a package.

use tracing::{debug, info, warn};

use crate::book::{ChapterRecord, SpineItem};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::text::canonicalize;

use super::classify::HeadingClassifier;
use super::fallback::extract_single;
use super::position::PositionIndex;
use super::segment::{accepted_headings, heading_candidates, segments_for_headings};

/// Structured events emitted while assembling chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Heading classification finished for one content file.
    HeadingsClassified {
        spine_id: String,
        candidates: usize,
        accepted: usize,
    },
    /// Too few chapter headings, the whole file became one chapter.
    FallbackUsed { spine_id: String },
    /// A segment had no text and was not turned into a chapter.
    EmptySegmentDropped { spine_id: String, ordinal: usize },
    /// A content file could not be loaded.
    ItemSkipped {
        spine_id: String,
        path: String,
        reason: String,
    },
    /// A content file loaded fine but produced no chapters.
    EmptyItem { spine_id: String },
    /// A spine `itemref` names no manifest item.
    UnknownItemref { idref: String },
    /// A file listed in the table of contents could not be loaded.
    TocFileSkipped { path: String, reason: String },
    /// A table of contents entry had no text.
    EmptyTocEntry { href: String },
}

/// Sink for assembly diagnostics.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects every diagnostic in order.
impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::HeadingsClassified {
                spine_id,
                candidates,
                accepted,
            } => debug!(%spine_id, candidates, accepted, "classified headings"),
            Diagnostic::FallbackUsed { spine_id } => {
                debug!(%spine_id, "too few chapter headings, using whole file")
            }
            Diagnostic::EmptySegmentDropped { spine_id, ordinal } => {
                debug!(%spine_id, ordinal, "dropped empty segment")
            }
            Diagnostic::ItemSkipped {
                spine_id,
                path,
                reason,
            } => warn!(%spine_id, %path, %reason, "skipping unreadable content file"),
            Diagnostic::EmptyItem { spine_id } => {
                info!(%spine_id, "content file has no readable text")
            }
            Diagnostic::UnknownItemref { idref } => {
                warn!(%idref, "spine entry not in manifest")
            }
            Diagnostic::TocFileSkipped { path, reason } => {
                warn!(%path, %reason, "skipping unreadable table of contents target")
            }
            Diagnostic::EmptyTocEntry { href } => debug!(%href, "table of contents entry has no text"),
        }
    }
}

/// Loads the parsed document stored at an archive path.
pub trait ContentSource {
    fn load(&mut self, path: &str) -> Result<Document>;
}

impl<F> ContentSource for F
where
    F: FnMut(&str) -> Result<Document>,
{
    fn load(&mut self, path: &str) -> Result<Document> {
        self(path)
    }
}

/// Turns spine items into the ordered chapter list of a book.
#[derive(Debug, Clone, Default)]
pub struct ChapterAssembler {
    classifier: HeadingClassifier,
}

impl ChapterAssembler {
    pub fn new(classifier: HeadingClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &HeadingClassifier {
        &self.classifier
    }

    /// Assemble chapters for `items` in order.
    ///
    /// Items that fail to load are skipped with a diagnostic. Fails with
    /// [`Error::NoReadableContent`] when no item yields a chapter.
    pub fn assemble(
        &self,
        items: &[SpineItem],
        source: &mut dyn ContentSource,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Vec<ChapterRecord>> {
        let mut chapters = Vec::new();

        for item in items {
            let doc = match source.load(&item.path) {
                Ok(doc) => doc,
                Err(e) => {
                    diagnostics.report(Diagnostic::ItemSkipped {
                        spine_id: item.id.clone(),
                        path: item.path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let before = chapters.len();
            self.append_document(&item.id, &doc, &mut chapters, diagnostics);
            if chapters.len() == before {
                diagnostics.report(Diagnostic::EmptyItem {
                    spine_id: item.id.clone(),
                });
            }
        }

        if chapters.is_empty() {
            return Err(Error::NoReadableContent);
        }
        Ok(chapters)
    }

    /// Append the chapters of one parsed content file to `chapters`.
    ///
    /// Placeholder titles are numbered from the length of `chapters`, so the
    /// same vector must be threaded through every item of a book.
    pub fn append_document(
        &self,
        spine_id: &str,
        doc: &Document,
        chapters: &mut Vec<ChapterRecord>,
        diagnostics: &mut dyn Diagnostics,
    ) {
        let dom = doc.dom();
        let index = PositionIndex::build(dom, doc.body());
        let candidates = heading_candidates(dom, &index);
        let headings = accepted_headings(dom, &candidates, &self.classifier);
        diagnostics.report(Diagnostic::HeadingsClassified {
            spine_id: spine_id.to_string(),
            candidates: candidates.len(),
            accepted: headings.len(),
        });

        let segments = segments_for_headings(dom, &index, &headings);
        if !segments.is_empty() {
            for segment in segments {
                let content = canonicalize(&segment.content);
                if content.is_empty() {
                    diagnostics.report(Diagnostic::EmptySegmentDropped {
                        spine_id: spine_id.to_string(),
                        ordinal: segment.ordinal,
                    });
                    continue;
                }
                let title = title_or_placeholder(segment.title, chapters.len());
                chapters.push(ChapterRecord::new(
                    format!("{spine_id}_{}", segment.ordinal),
                    title,
                    content,
                    segment.raw_markup,
                ));
            }
            return;
        }

        diagnostics.report(Diagnostic::FallbackUsed {
            spine_id: spine_id.to_string(),
        });
        let single = extract_single(doc);
        let content = canonicalize(&single.content);
        if content.is_empty() {
            return;
        }
        let title = title_or_placeholder(single.title, chapters.len());
        chapters.push(ChapterRecord::new(spine_id, title, content, single.raw_markup));
    }
}

/// `title`, or `"Chapter <n>"` for the chapter that would be number `n`.
fn title_or_placeholder(title: String, existing: usize) -> String {
    if title.is_empty() {
        format!("Chapter {}", existing + 1)
    } else {
        title
    }
}
