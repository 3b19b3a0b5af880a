//! Chapter extraction driven by a table of contents.
//!
//! Every entry names a content file and optionally an anchor inside it. An
//! entry's chapter runs from its anchor up to the anchor of the next entry in
//! the same file, or to the end of the file.

use percent_encoding::percent_decode_str;

use crate::book::ChapterRecord;
use crate::dom::{ArenaDom, ArenaNodeId, Document, inner_html, outer_html};
use crate::text::{PARAGRAPH_SEPARATOR, canonicalize, fnv1a32_hex};

use super::assemble::{ContentSource, Diagnostic, Diagnostics};
use super::fallback::block_text;
use super::position::PositionIndex;

/// Elements collected between two anchors.
const TOC_CONTENT_TAGS: &[&str] = &[
    "p", "div", "blockquote", "ul", "ol", "li", "pre", "table", "figure", "section", "article",
    "h1", "h2", "h3", "h4", "h5", "h6",
];

const ANCHOR_HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Anchored containers whose contents are the whole chapter.
const CONTAINER_TAGS: &[&str] = &["section", "article", "div", "main"];

/// A table of contents entry resolved to an archive path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TocTarget {
    /// Trimmed entry label, may be empty.
    pub title: String,
    /// href as written in the table of contents.
    pub href: String,
    /// Archive path of the content file.
    pub path: String,
    pub fragment: Option<String>,
}

/// Content of one entry within its file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TocSection {
    /// Trimmed text of the anchor element, empty without an anchor.
    pub anchor_text: String,
    pub content: String,
    pub raw_markup: String,
}

/// Element a fragment points at: by `id`, then `<a name>`, then by the percent-decoded `id`.
pub fn find_fragment(dom: &ArenaDom, fragment: &str) -> Option<ArenaNodeId> {
    let find = |attr: &str, value: &str, tag: Option<&str>| {
        dom.descendant_elements(dom.document()).find(|&id| {
            dom.get_attr(id, attr) == Some(value) && tag.is_none_or(|tag| dom.tag(id) == Some(tag))
        })
    };

    find("id", fragment, None)
        .or_else(|| find("name", fragment, Some("a")))
        .or_else(|| {
            let decoded = percent_decode_str(fragment).decode_utf8().ok()?;
            if decoded == fragment {
                return None;
            }
            find("id", &decoded, None)
        })
}

/// The nearest heading enclosing `id` (or `id` itself) below `body`, else `id`.
fn widen_to_heading(dom: &ArenaDom, body: ArenaNodeId, id: ArenaNodeId) -> ArenaNodeId {
    let mut current = id;
    while current.is_some() && current != body {
        if dom.has_tag(current, ANCHOR_HEADING_TAGS) {
            return current;
        }
        current = dom.get(current).map_or(ArenaNodeId::NONE, |n| n.parent);
    }
    id
}

/// Split one document at the given entry anchors, in entry order.
///
/// `fragments[i]` starts section `i` and `fragments[i + 1]` ends it; `None`
/// means the start (or the end) of the body.
pub fn extract_toc_sections(doc: &Document, fragments: &[Option<&str>]) -> Vec<TocSection> {
    let dom = doc.dom();
    let body = doc.body();
    let index = PositionIndex::build(dom, body);
    let anchors: Vec<Option<ArenaNodeId>> = fragments
        .iter()
        .map(|&fragment| {
            fragment
                .and_then(|f| find_fragment(dom, f))
                .map(|id| widen_to_heading(dom, body, id))
        })
        .collect();

    (0..anchors.len())
        .map(|i| {
            let start = anchors[i];
            let end = anchors.get(i + 1).copied().flatten();
            let anchor_text = start.map(|id| dom.trimmed_text(id)).unwrap_or_default();

            if let Some(el) = start
                && dom.has_tag(el, CONTAINER_TAGS)
            {
                return TocSection {
                    anchor_text,
                    content: canonicalize(&block_text(dom, el)),
                    raw_markup: inner_html(dom, el),
                };
            }

            let (content, raw_markup) = content_between(dom, &index, start, end);
            TocSection {
                anchor_text,
                content,
                raw_markup,
            }
        })
        .collect()
}

fn content_between(
    dom: &ArenaDom,
    index: &PositionIndex,
    start: Option<ArenaNodeId>,
    end: Option<ArenaNodeId>,
) -> (String, String) {
    let first = start.and_then(|id| index.position(id)).map_or(0, |pos| pos + 1);
    let last = end.and_then(|id| index.position(id)).unwrap_or(index.len());

    let mut content_parts = Vec::new();
    let mut markup_parts = Vec::new();
    let mut covered_until: Option<usize> = None;

    for pos in first..last {
        let Some(el) = index.element_at(pos) else {
            break;
        };
        if covered_until.is_some_and(|covered| pos <= covered) {
            continue;
        }
        if start.is_some_and(|s| index.contains(s, el)) {
            continue;
        }
        // The next entry's container is walked into so its content stays with that entry
        if end.is_some_and(|e| index.contains(el, e)) {
            continue;
        }
        if !dom.has_tag(el, TOC_CONTENT_TAGS) {
            continue;
        }

        let text = dom.trimmed_text(el);
        if !text.is_empty() {
            content_parts.push(text);
        }
        markup_parts.push(outer_html(dom, el));
        covered_until = index.subtree_end(pos);
    }

    (
        canonicalize(&content_parts.join(PARAGRAPH_SEPARATOR)),
        markup_parts.join("\n"),
    )
}

/// Build chapters from table of contents targets.
///
/// Files are visited in the order they are first listed. Unreadable files are
/// skipped with a diagnostic, entries without text are dropped, and repeated
/// entries for the same anchor are ignored. Ids are `toc-<hash>` of
/// `path#fragment`, so they do not depend on the entry order.
pub fn assemble_toc(
    targets: &[TocTarget],
    source: &mut dyn ContentSource,
    diagnostics: &mut dyn Diagnostics,
) -> Vec<ChapterRecord> {
    let mut files: Vec<(&str, Vec<&TocTarget>)> = Vec::new();
    for target in targets.iter().filter(|t| !t.href.is_empty()) {
        match files.iter_mut().find(|(path, _)| *path == target.path) {
            Some((_, list)) => {
                if !list.iter().any(|t| t.fragment == target.fragment) {
                    list.push(target);
                }
            }
            None => files.push((target.path.as_str(), vec![target])),
        }
    }

    let mut chapters = Vec::new();
    for (path, entries) in files {
        let doc = match source.load(path) {
            Ok(doc) => doc,
            Err(e) => {
                diagnostics.report(Diagnostic::TocFileSkipped {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let fragments: Vec<Option<&str>> = entries.iter().map(|t| t.fragment.as_deref()).collect();
        for (target, section) in entries.iter().zip(extract_toc_sections(&doc, &fragments)) {
            if section.content.is_empty() {
                diagnostics.report(Diagnostic::EmptyTocEntry {
                    href: target.href.clone(),
                });
                continue;
            }

            let key = format!("{path}#{}", target.fragment.as_deref().unwrap_or_default());
            let title = if !target.title.is_empty() {
                target.title.clone()
            } else if !section.anchor_text.is_empty() {
                section.anchor_text
            } else {
                format!("Chapter {}", chapters.len() + 1)
            };
            chapters.push(ChapterRecord::new(
                format!("toc-{}", fnv1a32_hex(&key)),
                title,
                section.content,
                section.raw_markup,
            ));
        }
    }
    chapters
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::{Error, Result};

    fn target(title: &str, path: &str, fragment: Option<&str>) -> TocTarget {
        let href = match fragment {
            Some(f) => format!("{path}#{f}"),
            None => path.to_string(),
        };
        TocTarget {
            title: title.into(),
            href,
            path: path.into(),
            fragment: fragment.map(str::to_string),
        }
    }

    fn source(files: &[(&'static str, &'static str)]) -> impl FnMut(&str) -> Result<Document> {
        let files: HashMap<&str, &str> = files.iter().copied().collect();
        move |path: &str| {
            files
                .get(path)
                .map(|html| Document::parse(html))
                .ok_or_else(|| Error::InvalidEpub(format!("missing {path}")))
        }
    }

    #[test]
    fn test_sections_between_anchors() {
        let doc = Document::parse(
            r#"<body><h2 id="one">One</h2><p>a</p><p>b</p><h2 id="two">Two</h2><p>c</p></body>"#,
        );
        let sections = extract_toc_sections(&doc, &[Some("one"), Some("two")]);
        assert_eq!(sections[0].anchor_text, "One");
        assert_eq!(sections[0].content, "a\n\nb");
        assert_eq!(sections[0].raw_markup, "<p>a</p>\n<p>b</p>");
        assert_eq!(sections[1].content, "c");
    }

    #[test]
    fn test_anchor_inside_heading_widens_to_heading() {
        let doc = Document::parse(
            r#"<body><h1><a id="c1"></a>Start</h1><p>x</p><h1><a name="c2"></a>Next</h1><p>y</p></body>"#,
        );
        let sections = extract_toc_sections(&doc, &[Some("c1"), Some("c2")]);
        assert_eq!(sections[0].anchor_text, "Start");
        assert_eq!(sections[0].content, "x");
        assert_eq!(sections[1].anchor_text, "Next");
        assert_eq!(sections[1].content, "y");
    }

    #[test]
    fn test_container_anchor_takes_its_contents() {
        let doc = Document::parse(
            r#"<body><section id="s1"><h2>First</h2><p>a</p></section><section id="s2"><p>b</p></section></body>"#,
        );
        let sections = extract_toc_sections(&doc, &[Some("s1"), Some("s2")]);
        assert_eq!(sections[0].content, "First\n\na");
        assert_eq!(sections[0].raw_markup, "<h2>First</h2><p>a</p>");
        assert_eq!(sections[1].content, "b");
    }

    #[test]
    fn test_container_of_next_anchor_is_not_taken_whole() {
        let doc = Document::parse(
            r#"<body><h2 id="a">A</h2><p>one</p><div><h2 id="b">B</h2><p>two</p></div></body>"#,
        );
        let sections = extract_toc_sections(&doc, &[Some("a"), Some("b")]);
        assert_eq!(sections[0].content, "one");
        assert_eq!(sections[1].content, "two");
    }

    #[test]
    fn test_missing_fragment_reads_from_body_start() {
        let doc = Document::parse("<body><p>a</p><h2 id=\"x\">X</h2><p>b</p></body>");
        let sections = extract_toc_sections(&doc, &[Some("nowhere"), Some("x")]);
        assert_eq!(sections[0].anchor_text, "");
        assert_eq!(sections[0].content, "a");
    }

    #[test]
    fn test_percent_encoded_fragment() {
        let doc = Document::parse(r#"<body><h2 id="ch 1">One</h2><p>a</p></body>"#);
        let found = find_fragment(doc.dom(), "ch%201").unwrap();
        assert_eq!(doc.dom().tag(found), Some("h2"));
    }

    #[test]
    fn test_assemble_toc_ids_titles_and_order() {
        let mut source = source(&[
            (
                "OEBPS/a.xhtml",
                r#"<body><h1 id="p1">Part One</h1><p>first</p><h1 id="p2"></h1><p>second</p></body>"#,
            ),
            ("OEBPS/b.xhtml", "<body><p>third</p></body>"),
        ]);
        let targets = vec![
            target("", "OEBPS/a.xhtml", Some("p1")),
            target("Whole B", "OEBPS/b.xhtml", None),
            target("", "OEBPS/a.xhtml", Some("p2")),
        ];
        let chapters = assemble_toc(&targets, &mut source, &mut Vec::<Diagnostic>::new());

        let summary: Vec<_> = chapters
            .iter()
            .map(|c| (c.title.as_str(), c.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("Part One", "first"), ("Chapter 2", "second"), ("Whole B", "third")]
        );
        assert_eq!(
            chapters[0].id,
            format!("toc-{}", fnv1a32_hex("OEBPS/a.xhtml#p1"))
        );
        assert_eq!(chapters[2].id, format!("toc-{}", fnv1a32_hex("OEBPS/b.xhtml#")));
    }

    #[test]
    fn test_assemble_toc_reports_skips() {
        let mut source = source(&[("OEBPS/a.xhtml", r#"<body><h1 id="x">X</h1></body>"#)]);
        let targets = vec![
            target("Gone", "OEBPS/gone.xhtml", None),
            target("Empty", "OEBPS/a.xhtml", Some("x")),
            target("Again", "OEBPS/a.xhtml", Some("x")),
        ];
        let mut diags: Vec<Diagnostic> = Vec::new();
        let chapters = assemble_toc(&targets, &mut source, &mut diags);

        assert!(chapters.is_empty());
        assert!(matches!(
            &diags[0],
            Diagnostic::TocFileSkipped { path, .. } if path == "OEBPS/gone.xhtml"
        ));
        assert_eq!(
            diags[1],
            Diagnostic::EmptyTocEntry {
                href: "OEBPS/a.xhtml#x".into()
            }
        );
        assert_eq!(diags.len(), 2);
    }
}
