//! Markup serialization for arena subtrees (`outerHTML` / `innerHTML`).

use std::fmt::Write;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a node including its own tags.
pub fn outer_html(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

/// Serialize only the children of a node.
pub fn inner_html(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, child, &mut out);
    }
    out
}

fn write_node(dom: &ArenaDom, id: ArenaNodeId, out: &mut String) {
    // Explicit stack of (node, closing) pairs; deeply nested markup must not overflow
    let mut stack = vec![(id, false)];

    while let Some((node_id, closing)) = stack.pop() {
        let Some(node) = dom.get(node_id) else {
            continue;
        };

        match &node.data {
            ArenaNodeData::Element { name, attrs } => {
                let tag = name.local.as_ref();
                if closing {
                    let _ = write!(out, "</{tag}>");
                    continue;
                }

                out.push('<');
                out.push_str(tag);
                for attr in attrs {
                    out.push(' ');
                    if let Some(prefix) = &attr.name.prefix {
                        out.push_str(prefix);
                        out.push(':');
                    }
                    out.push_str(&attr.name.local);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&attr.value));
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    continue;
                }

                stack.push((node_id, true));
                let start = stack.len();
                stack.extend(dom.children(node_id).map(|child| (child, false)));
                stack[start..].reverse();
            }
            ArenaNodeData::Text(text) => {
                let parent_raw = dom
                    .tag(node.parent)
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if parent_raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            ArenaNodeData::Comment(text) => {
                let _ = write!(out, "<!--{text}-->");
            }
            ArenaNodeData::Doctype { name } => {
                let _ = write!(out, "<!DOCTYPE {name}>");
            }
            ArenaNodeData::Document => {
                let start = stack.len();
                stack.extend(dom.children(node_id).map(|child| (child, false)));
                stack[start..].reverse();
            }
        }
    }
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            _ => result.push(c),
        }
    }
    result
}
