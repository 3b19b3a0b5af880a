//! Heading-based chapter segmentation of one content file.

use crate::dom::{ArenaDom, ArenaNodeId, outer_html};
use crate::text::PARAGRAPH_SEPARATOR;

use super::classify::{HEADING_TAGS, HeadingClassifier};
use super::position::PositionIndex;

/// Block elements that can carry chapter content.
pub const CONTENT_TAGS: &[&str] = &[
    "p",
    "div",
    "blockquote",
    "ul",
    "ol",
    "pre",
    "table",
    "figure",
    "img",
    "hr",
    "section",
    "article",
];

/// Content elements kept for their markup even when they have no text.
const TEXTLESS_CONTENT_TAGS: &[&str] = &["img", "hr"];

/// Minimum number of chapter headings needed to split a file.
pub const MIN_CHAPTER_HEADINGS: usize = 2;

/// The content between one chapter heading and the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSegment {
    /// Zero-based index among the accepted headings of the file.
    pub ordinal: usize,
    pub title: String,
    /// Plain text, paragraphs separated by a blank line.
    pub content: String,
    /// Concatenated markup of the included elements, newline separated.
    pub raw_markup: String,
}

/// Heading candidates of the indexed subtree in document order.
pub fn heading_candidates(dom: &ArenaDom, index: &PositionIndex) -> Vec<ArenaNodeId> {
    index.iter().filter(|&id| dom.has_tag(id, HEADING_TAGS)).collect()
}

/// Candidates the classifier accepts as chapter headings, in document order.
pub fn accepted_headings(
    dom: &ArenaDom,
    candidates: &[ArenaNodeId],
    classifier: &HeadingClassifier,
) -> Vec<ArenaNodeId> {
    candidates
        .iter()
        .copied()
        .filter(|&id| classifier.is_chapter_heading_node(dom, id))
        .collect()
}

/// Split an indexed subtree into one segment per accepted chapter heading.
///
/// `candidates` must be indexed elements in document order. Returns an empty
/// vector when fewer than [`MIN_CHAPTER_HEADINGS`] candidates are accepted;
/// the caller is expected to fall back to whole-file extraction.
///
/// Segments with no content are kept so ordinals match the source headings.
pub fn build_segments(
    dom: &ArenaDom,
    index: &PositionIndex,
    candidates: &[ArenaNodeId],
    classifier: &HeadingClassifier,
) -> Vec<ChapterSegment> {
    let headings = accepted_headings(dom, candidates, classifier);
    segments_for_headings(dom, index, &headings)
}

/// Build segments from already accepted headings.
pub fn segments_for_headings(
    dom: &ArenaDom,
    index: &PositionIndex,
    headings: &[ArenaNodeId],
) -> Vec<ChapterSegment> {
    if headings.len() < MIN_CHAPTER_HEADINGS {
        return Vec::new();
    }

    // Headings outside the index cannot bound a range
    let bounds: Vec<(ArenaNodeId, usize)> = headings
        .iter()
        .filter_map(|&id| index.position(id).map(|pos| (id, pos)))
        .collect();

    bounds
        .iter()
        .enumerate()
        .map(|(ordinal, &(heading, start))| {
            let end = bounds
                .get(ordinal + 1)
                .map(|&(_, pos)| pos)
                .unwrap_or(index.len());
            collect_segment(dom, index, &bounds, ordinal, heading, start, end)
        })
        .collect()
}

fn collect_segment(
    dom: &ArenaDom,
    index: &PositionIndex,
    bounds: &[(ArenaNodeId, usize)],
    ordinal: usize,
    heading: ArenaNodeId,
    start: usize,
    end: usize,
) -> ChapterSegment {
    let mut content_parts = Vec::new();
    let mut markup_parts = Vec::new();
    // Last position covered by an already included element's subtree
    let mut covered_until: Option<usize> = None;
    // Last position of a subtree already known to hold no text
    let mut textless_until: Option<usize> = None;

    for pos in start + 1..end {
        let Some(el) = index.element_at(pos) else {
            break;
        };

        if covered_until.is_some_and(|last| pos <= last) {
            continue;
        }
        if bounds.iter().any(|&(h, _)| h == el) {
            break;
        }
        if bounds.iter().any(|&(h, _)| index.contains(h, el)) {
            continue;
        }
        // A container of a later heading is walked into, never taken whole
        if holds_later_heading(index, bounds, pos) {
            continue;
        }
        if !dom.has_tag(el, CONTENT_TAGS) {
            continue;
        }

        let known_textless = textless_until.is_some_and(|last| pos <= last);
        let text = if known_textless {
            String::new()
        } else {
            dom.trimmed_text(el)
        };
        if text.is_empty() && !known_textless {
            textless_until = index.subtree_end(pos);
        }

        let keep_markup = !text.is_empty() || dom.has_tag(el, TEXTLESS_CONTENT_TAGS);
        if !keep_markup {
            continue;
        }

        if !text.is_empty() {
            content_parts.push(text);
        }
        markup_parts.push(outer_html(dom, el));
        covered_until = index.subtree_end(pos);
    }

    ChapterSegment {
        ordinal,
        title: dom.trimmed_text(heading),
        content: content_parts.join(PARAGRAPH_SEPARATOR),
        raw_markup: markup_parts.join("\n"),
    }
}

/// True if the subtree at `pos` contains one of `bounds`, which are sorted by position.
fn holds_later_heading(index: &PositionIndex, bounds: &[(ArenaNodeId, usize)], pos: usize) -> bool {
    let Some(last) = index.subtree_end(pos) else {
        return false;
    };
    let next = bounds.partition_point(|&(_, p)| p <= pos);
    bounds.get(next).is_some_and(|&(_, p)| p <= last)
}
