//! Parsed content documents.
//!
//! Content files are parsed leniently with html5ever into an [`ArenaDom`].
//! Many packages ship XHTML that is not well-formed XML, so the HTML parser is
//! used for every content file.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use serialize::{escape_attr, escape_text, inner_html, outer_html};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// One parsed content file: its tree and the body element within it.
pub struct Document {
    dom: ArenaDom,
    body: ArenaNodeId,
}

impl Document {
    /// Parse markup into a document.
    ///
    /// The HTML parser always synthesizes a `<body>`; should a tree somehow
    /// lack one, the document root stands in for it.
    pub fn parse(html: &str) -> Self {
        let sink = ArenaSink::new();
        let dom = parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_dom();
        let body = dom.find_by_tag("body").unwrap_or(dom.document());
        Self { dom, body }
    }

    /// Decode raw content bytes (XML declaration hint, UTF-8, Windows-1252) and parse.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&crate::util::decode_document(bytes))
    }

    pub fn dom(&self) -> &ArenaDom {
        &self.dom
    }

    /// The body element.
    pub fn body(&self) -> ArenaNodeId {
        self.body
    }

    /// Serialized markup of a node, including its own tags.
    pub fn outer_html(&self, id: ArenaNodeId) -> String {
        outer_html(&self.dom, id)
    }

    /// Serialized markup of the body's children.
    pub fn body_html(&self) -> String {
        inner_html(&self.dom, self.body)
    }
}
