//! Placeholder nodes.
//!
//! A placeholder is a tree node that stands in for text rather than for
//! parsed structure: either a raw code string supplied by the caller, or
//! the target end of a copy/move. Placeholders participate in events like
//! any other node but are never descended into by the analyzer or the
//! formatter; their rendering is the stored text (resolved at apply time
//! for copies).

use graft_ir::NodeId;
use graft_text::CopyId;
use rustc_hash::FxHashMap;

/// What a placeholder node renders as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaceholderData {
    /// Verbatim caller-supplied source text, re-indented on insertion.
    Code(String),
    /// The target end of a registered copy or move.
    Copy(CopyId),
}

/// Side table mapping placeholder nodes to their data.
#[derive(Debug, Default)]
pub struct PlaceholderStore {
    map: FxHashMap<NodeId, PlaceholderData>,
}

impl PlaceholderStore {
    pub fn new() -> Self {
        PlaceholderStore::default()
    }

    pub fn insert(&mut self, node: NodeId, data: PlaceholderData) {
        self.map.insert(node, data);
    }

    pub fn get(&self, node: NodeId) -> Option<&PlaceholderData> {
        self.map.get(&node)
    }

    pub fn is_placeholder(&self, node: NodeId) -> bool {
        self.map.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_lookup() {
        let mut store = PlaceholderStore::new();
        let n = NodeId::from_raw(3);
        assert!(!store.is_placeholder(n));
        store.insert(n, PlaceholderData::Code("x + 1".to_owned()));
        assert!(store.is_placeholder(n));
        assert_eq!(
            store.get(n),
            Some(&PlaceholderData::Code("x + 1".to_owned()))
        );
        assert_eq!(store.get(NodeId::from_raw(4)), None);
    }
}
