//! Whole-body extraction for content files that cannot be segmented.

use crate::dom::{ArenaDom, ArenaNodeId, Document};
use crate::text::PARAGRAPH_SEPARATOR;

/// Heading tags searched for the fallback title.
const TITLE_TAGS: &[&str] = &["h1", "h2", "h3"];

/// Block elements whose text makes up the fallback content.
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "div", "li", "blockquote"];

/// A single chapter taken from a whole content file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackChapter {
    /// Trimmed text of the first h1-h3 in the document, or empty.
    pub title: String,
    pub content: String,
    /// Markup of the entire body.
    pub raw_markup: String,
}

/// Extract one chapter from the whole document.
///
/// Nested blocks each contribute their own text, so text inside a `div`
/// wrapping paragraphs appears once for the `div` and once per paragraph.
/// When the body has no block elements at all its full text is used instead.
pub fn extract_single(doc: &Document) -> FallbackChapter {
    let dom = doc.dom();

    let title = dom
        .descendant_elements(dom.document())
        .find(|&id| dom.has_tag(id, TITLE_TAGS))
        .map(|id| dom.trimmed_text(id))
        .unwrap_or_default();

    let content = block_text(dom, doc.body());

    FallbackChapter {
        title,
        content,
        raw_markup: doc.body_html(),
    }
}

/// Text of the block elements below `root`, or its whole text when it has none.
pub(crate) fn block_text(dom: &ArenaDom, root: ArenaNodeId) -> String {
    let blocks: Vec<_> = dom
        .descendant_elements(root)
        .filter(|&id| dom.has_tag(id, BLOCK_TAGS))
        .collect();

    if blocks.is_empty() {
        return dom.trimmed_text(root);
    }
    blocks
        .iter()
        .map(|&id| dom.trimmed_text(id))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}
