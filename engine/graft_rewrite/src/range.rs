//! Extended source ranges.
//!
//! When a node is removed or replaced, the text region that goes with it is
//! not always exactly its parsed span: a caller may want a leading comment
//! or trailing line comment to travel with the node. The range used for
//! removal, replacement and copy capture comes from a [`RangeExtender`],
//! defaulting to the raw parsed span.

use graft_ir::{NodeId, Span, Tree};

/// Maps a node to the text range edits should treat as "the node".
///
/// Implementations must return a span that covers `tree.span(node)` and
/// does not overlap a sibling's extended span.
pub trait RangeExtender {
    fn extended_span(&self, tree: &Tree, node: NodeId) -> Span;
}

/// The default extender: a node owns exactly its parsed span.
#[derive(Copy, Clone, Debug, Default)]
pub struct RawRange;

impl RangeExtender for RawRange {
    fn extended_span(&self, tree: &Tree, node: NodeId) -> Span {
        tree.span(node)
    }
}

#[cfg(test)]
mod tests {
    use graft_ir::LanguageLevel;
    use pretty_assertions::assert_eq;

    use super::*;

    struct Widened(Vec<(NodeId, Span)>);

    impl RangeExtender for Widened {
        fn extended_span(&self, tree: &Tree, node: NodeId) -> Span {
            self.0
                .iter()
                .find(|(id, _)| *id == node)
                .map_or_else(|| tree.span(node), |&(_, span)| span)
        }
    }

    #[test]
    fn test_raw_range_is_parsed_span() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = tree.intern("x");
        let node = tree.alloc(
            graft_ir::NodeKind::SimpleName { identifier: name },
            Span::new(5, 6),
        );
        assert_eq!(RawRange.extended_span(&tree, node), Span::new(5, 6));
    }

    #[test]
    fn test_custom_extender_overrides_per_node() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = tree.intern("x");
        let a = tree.alloc(
            graft_ir::NodeKind::SimpleName { identifier: name },
            Span::new(5, 6),
        );
        let b = tree.alloc(
            graft_ir::NodeKind::SimpleName { identifier: name },
            Span::new(10, 11),
        );
        let extender = Widened(vec![(a, Span::new(5, 9))]);
        assert_eq!(extender.extended_span(&tree, a), Span::new(5, 9));
        assert_eq!(extender.extended_span(&tree, b), Span::new(10, 11));
    }
}
