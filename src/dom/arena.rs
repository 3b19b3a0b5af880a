//! Arena-based DOM for content documents.
//!
//! Every node of a parsed content file lives in one contiguous vector and
//! refers to its parent, children and siblings by index. Node identity is the
//! index itself, so a parsed tree needs no reference counting and can be
//! dropped in one go once a content file has been segmented.

use html5ever::{LocalName, QualName};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    /// Index into the arena's node vector.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    /// Text content.
    Text(String),
    /// Comment.
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
///
/// Nodes are allocated in creation order, which is NOT document order once
/// the parser has moved nodes around (foster parenting, adoption agency).
/// Use [`ArenaDom::descendants`] or a position index for document order.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Element { name, attrs }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype { name }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Unlink a node from its parent and siblings. The node stays allocated.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Iterate over all descendants of `root` in document order (pre-order),
    /// excluding `root` itself.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        let mut stack: Vec<_> = self.children(root).collect();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    /// Descendant elements of `root` in document order.
    pub fn descendant_elements(&self, root: ArenaNodeId) -> impl Iterator<Item = ArenaNodeId> + '_ {
        self.descendants(root).filter(|&id| self.is_element(id))
    }

    /// Find the first node in the whole document matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        let document = self.document;
        self.descendants(document)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find element by tag name (first match in document order).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|node| match &node.data {
            ArenaNodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }

    /// True if `ancestor` structurally contains `node` (strictly).
    ///
    /// Walks parent links; for repeated queries over one subtree prefer
    /// [`crate::chapters::PositionIndex::contains`].
    pub fn contains(&self, ancestor: ArenaNodeId, node: ArenaNodeId) -> bool {
        let mut current = self.get(node).map(|n| n.parent).unwrap_or(ArenaNodeId::NONE);
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map(|n| n.parent).unwrap_or(ArenaNodeId::NONE);
        }
        false
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    stack: Vec<ArenaNodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.dom.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}

/// Convenience methods for element and text nodes.
impl ArenaDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's tag as a string slice.
    pub fn tag(&self, id: ArenaNodeId) -> Option<&str> {
        self.element_name(id).map(|name| name.as_ref())
    }

    /// True if the node is an element whose tag is one of `tags`.
    pub fn has_tag(&self, id: ArenaNodeId, tags: &[&str]) -> bool {
        self.tag(id).is_some_and(|tag| tags.contains(&tag))
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    /// Get the data of a text node.
    pub fn text(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node in the subtree (DOM `textContent`).
    pub fn text_content(&self, id: ArenaNodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// `textContent` with surrounding whitespace removed.
    pub fn trimmed_text(&self, id: ArenaNodeId) -> String {
        let text = self.text_content(id);
        let trimmed = text.trim();
        if trimmed.len() == text.len() {
            text
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn element(dom: &mut ArenaDom, parent: ArenaNodeId, tag: &str) -> ArenaNodeId {
        let id = dom.create_element(make_qname(tag), vec![]);
        dom.append(parent, id);
        id
    }

    #[test]
    fn test_create_elements() {
        let mut dom = ArenaDom::new();

        let div = dom.create_element(
            make_qname("div"),
            vec![Attribute {
                name: make_qname("id"),
                value: "main".to_string(),
            }],
        );
        dom.append(dom.document(), div);

        assert_eq!(dom.tag(div), Some("div"));
        assert_eq!(dom.get_attr(div, "id"), Some("main"));
        assert_eq!(dom.get_attr(div, "class"), None);
    }

    #[test]
    fn test_append_children() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();

        let parent = element(&mut dom, doc, "div");
        let child1 = element(&mut dom, parent, "p");
        let child2 = element(&mut dom, parent, "p");

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let p = element(&mut dom, doc, "p");

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_descendants_follow_document_order_after_insert_before() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let body = element(&mut dom, doc, "body");
        let second = element(&mut dom, body, "p");
        let first = dom.create_element(make_qname("h1"), vec![]);
        dom.insert_before(second, first);
        let inner = element(&mut dom, first, "span");

        let order: Vec<_> = dom.descendants(body).collect();
        assert_eq!(order, vec![first, inner, second]);
    }

    #[test]
    fn test_detach() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let body = element(&mut dom, doc, "body");
        let a = element(&mut dom, body, "p");
        let b = element(&mut dom, body, "p");
        let c = element(&mut dom, body, "p");

        dom.detach(b);
        assert_eq!(dom.children(body).collect::<Vec<_>>(), vec![a, c]);
        assert!(!dom.contains(body, b));
    }

    #[test]
    fn test_text_content_and_contains() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let div = element(&mut dom, doc, "div");
        let p = element(&mut dom, div, "p");
        dom.append_text(p, "  One ");
        let em = element(&mut dom, p, "em");
        dom.append_text(em, "two  ");

        assert_eq!(dom.text_content(div), "  One two  ");
        assert_eq!(dom.trimmed_text(div), "One two");
        assert!(dom.contains(div, em));
        assert!(!dom.contains(em, div));
        assert!(!dom.contains(div, div));
    }
}
