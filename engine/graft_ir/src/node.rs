//! Node arena.
//!
//! A [`Tree`] owns every node in one flat `Vec`, addressed by [`NodeId`].
//! Nodes parsed from source carry their buffer span; nodes synthesized for
//! insertion carry [`Span::DUMMY`]. Nodes are never removed; structural
//! change is recorded as rewrite events against the unchanged arena.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{LanguageLevel, Name, NameInterner, NodeKind, Span};

/// Index into the tree's node arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Invalid node ID (sentinel value).
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Create from a raw arena index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Hash for NodeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// One allocated node: its construct kind plus its original buffer span.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena-allocated syntax tree.
///
/// The tree also owns the string interner, so [`Name`]s resolved through
/// one tree are never mixed with another tree's.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    interner: NameInterner,
    level: LanguageLevel,
}

impl Tree {
    /// Create an empty tree at the given language level.
    pub fn new(level: LanguageLevel) -> Self {
        Tree {
            nodes: Vec::new(),
            interner: NameInterner::new(),
            level,
        }
    }

    /// The language level this tree was built against.
    #[inline]
    pub fn level(&self) -> LanguageLevel {
        self.level
    }

    /// Allocate a node.
    ///
    /// Use [`Span::DUMMY`] for synthesized nodes; the rewriter treats any
    /// node with a dummy span as new material to be formatted rather than
    /// located in the buffer.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(NodeData { kind, span });
        id
    }

    /// Borrow a node's data.
    ///
    /// # Panics
    /// Panics if `id` did not come from this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Borrow a node's kind.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// A node's original buffer span.
    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    /// Whether the node was synthesized rather than parsed.
    #[inline]
    pub fn is_synthesized(&self, id: NodeId) -> bool {
        self.span(id).is_dummy()
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the ID points into this tree.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Intern a string.
    pub fn intern(&mut self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Resolve an interned name.
    #[inline]
    pub fn text(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    /// Allocate a synthesized `SimpleName` node.
    pub fn simple_name(&mut self, identifier: &str) -> NodeId {
        let identifier = self.intern(identifier);
        self.alloc(NodeKind::SimpleName { identifier }, Span::DUMMY)
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = NodeData;

    #[inline]
    fn index(&self, id: NodeId) -> &NodeData {
        self.node(id)
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::NodeId;
    crate::static_assert_size!(NodeId, 4);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::NodeKind;

    #[test]
    fn test_alloc_and_read_back() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = tree.simple_name("x");
        let stmt = tree.alloc(
            NodeKind::BreakStatement { label: Some(name) },
            Span::new(4, 12),
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.span(stmt), Span::new(4, 12));
        assert!(tree.is_synthesized(name));
        assert!(!tree.is_synthesized(stmt));
        let &NodeKind::BreakStatement { label: Some(label) } = tree.kind(stmt) else {
            panic!("expected labeled break");
        };
        assert_eq!(label, name);
    }

    #[test]
    fn test_interning_through_tree() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a = tree.intern("value");
        let b = tree.intern("value");
        assert_eq!(a, b);
        assert_eq!(tree.text(a), "value");
    }

    #[test]
    fn test_node_id_sentinel() {
        assert!(!NodeId::INVALID.is_valid());
        assert!(!NodeId::default().is_valid());
        assert!(NodeId::from_raw(0).is_valid());
        assert_eq!(format!("{:?}", NodeId::INVALID), "NodeId::INVALID");
        assert_eq!(format!("{:?}", NodeId::from_raw(3)), "NodeId(3)");
    }

    #[test]
    fn test_contains() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let id = tree.simple_name("a");
        assert!(tree.contains(id));
        assert!(!tree.contains(NodeId::from_raw(99)));
    }
}
