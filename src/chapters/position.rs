//! Document-order positions for the elements of one subtree.

use crate::dom::{ArenaDom, ArenaNodeId};

const UNINDEXED: u32 = u32::MAX;

/// Document-order rank of every element below a root.
///
/// Positions are a pre-order numbering of the root's descendant elements
/// (the root itself is not indexed). Because a pre-order subtree occupies a
/// contiguous range of positions, containment reduces to two comparisons.
///
/// An index describes exactly one tree: build a new one per content file.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    /// position -> element
    order: Vec<ArenaNodeId>,
    /// position -> position of the last element in its subtree
    subtree_end: Vec<u32>,
    /// arena index -> position
    ranks: Vec<u32>,
}

enum Visit {
    Enter(ArenaNodeId),
    Exit(usize),
}

impl PositionIndex {
    /// Index every descendant element of `root`.
    pub fn build(dom: &ArenaDom, root: ArenaNodeId) -> Self {
        let mut index = Self {
            order: Vec::new(),
            subtree_end: Vec::new(),
            ranks: vec![UNINDEXED; dom.len()],
        };

        let mut stack = Vec::new();
        push_children(dom, root, &mut stack);

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    if !dom.is_element(id) {
                        continue;
                    }
                    let pos = index.order.len();
                    index.order.push(id);
                    index.subtree_end.push(pos as u32);
                    index.ranks[id.index()] = pos as u32;

                    stack.push(Visit::Exit(pos));
                    push_children(dom, id, &mut stack);
                }
                Visit::Exit(pos) => {
                    index.subtree_end[pos] = (index.order.len() - 1) as u32;
                }
            }
        }

        index
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of an element, or `None` if it is not below the indexed root.
    pub fn position(&self, id: ArenaNodeId) -> Option<usize> {
        match self.ranks.get(id.index()) {
            Some(&rank) if rank != UNINDEXED => Some(rank as usize),
            _ => None,
        }
    }

    /// Element at a position.
    pub fn element_at(&self, pos: usize) -> Option<ArenaNodeId> {
        self.order.get(pos).copied()
    }

    /// Position of the last element inside the subtree that starts at `pos`.
    pub fn subtree_end(&self, pos: usize) -> Option<usize> {
        self.subtree_end.get(pos).map(|&end| end as usize)
    }

    /// True if `ancestor` strictly contains `node`. Both must be indexed.
    pub fn contains(&self, ancestor: ArenaNodeId, node: ArenaNodeId) -> bool {
        match (self.position(ancestor), self.position(node)) {
            (Some(a), Some(n)) => a < n && n <= self.subtree_end[a] as usize,
            _ => false,
        }
    }

    /// Indexed elements in document order.
    pub fn iter(&self) -> impl Iterator<Item = ArenaNodeId> + '_ {
        self.order.iter().copied()
    }
}

fn push_children(dom: &ArenaDom, parent: ArenaNodeId, stack: &mut Vec<Visit>) {
    let start = stack.len();
    stack.extend(dom.children(parent).map(Visit::Enter));
    stack[start..].reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn tags(doc: &Document, index: &PositionIndex) -> Vec<String> {
        index
            .iter()
            .filter_map(|id| doc.dom().tag(id).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_positions_follow_document_order() {
        let doc = Document::parse(
            "<body><h1>I</h1><div><p>a <em>b</em></p><ul><li>c</li></ul></div><p>d</p></body>",
        );
        let index = PositionIndex::build(doc.dom(), doc.body());

        assert_eq!(tags(&doc, &index), vec!["h1", "div", "p", "em", "ul", "li", "p"]);

        let ranks: Vec<_> = index.iter().map(|id| index.position(id).unwrap()).collect();
        assert_eq!(ranks, (0..index.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_root_is_not_indexed() {
        let doc = Document::parse("<body><p>x</p></body>");
        let index = PositionIndex::build(doc.dom(), doc.body());
        assert_eq!(index.position(doc.body()), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_containment_matches_tree() {
        let doc = Document::parse(
            "<body><div><p>a <em>b</em></p></div><p>c <span>d</span></p><hr></body>",
        );
        let dom = doc.dom();
        let index = PositionIndex::build(dom, doc.body());

        for a in index.iter() {
            for b in index.iter() {
                assert_eq!(index.contains(a, b), dom.contains(a, b));
            }
        }
    }

    #[test]
    fn test_subtree_end() {
        let doc = Document::parse("<body><div><p>a</p><p>b</p></div><p>c</p></body>");
        let index = PositionIndex::build(doc.dom(), doc.body());
        assert_eq!(index.subtree_end(0), Some(2));
        assert_eq!(index.subtree_end(1), Some(1));
        assert_eq!(index.subtree_end(3), Some(3));
        assert_eq!(index.subtree_end(4), None);
    }

    #[test]
    fn test_empty_body() {
        let doc = Document::parse("<body>just text</body>");
        let index = PositionIndex::build(doc.dom(), doc.body());
        assert!(index.is_empty());
        assert_eq!(index.element_at(0), None);
    }
}
