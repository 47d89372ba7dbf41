//! The public rewrite facade.
//!
//! [`TreeRewrite`] owns the tree and records the target state as events
//! without touching the tree itself. Replacement subtrees are allocated
//! into the same arena (with dummy spans) through [`TreeRewrite::tree_mut`].
//! Calling [`TreeRewrite::rewrite`] runs the analyzer over every region
//! that changed and returns the finished edit tree; applying it to the
//! buffer is the caller's move, via [`EditStore::apply`].

use graft_ir::{NodeId, NodeKind, Property, PropertyRef, PropertyValue, Span, Tree};
use graft_text::{EditId, EditStore};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::analyzer::Analyzer;
use crate::error::RewriteError;
use crate::event::{GroupId, NodeRewriteEvent, RewriteEventStore, TrackedId};
use crate::flatten::Flattener;
use crate::format::{RewriteFormatter, RewriteOptions};
use crate::placeholder::{PlaceholderData, PlaceholderStore};
use crate::range::{RangeExtender, RawRange};

/// Everything one rewrite run produced.
///
/// `groups` maps each change-attribution handle to the edits it produced;
/// `tracked` maps tracked nodes to their bracketing range-marker edit, whose
/// final position [`graft_text::EditMap`] reports after application.
#[derive(Debug)]
pub struct RewriteResult {
    pub edits: EditStore,
    pub root: EditId,
    pub groups: FxHashMap<GroupId, Vec<EditId>>,
    pub tracked: FxHashMap<TrackedId, EditId>,
}

/// Records modifications against an immutable tree and turns them into
/// text edits.
///
/// All positional operations resolve against the ORIGINAL tree structure;
/// the tree is never mutated, so a node keeps its slot no matter how many
/// events pile up on it.
#[derive(Debug)]
pub struct TreeRewrite {
    tree: Tree,
    events: RewriteEventStore,
    placeholders: PlaceholderStore,
    next_group: u32,
    next_tracked: u32,
}

impl TreeRewrite {
    pub fn new(tree: Tree) -> Self {
        TreeRewrite {
            tree,
            events: RewriteEventStore::new(),
            placeholders: PlaceholderStore::new(),
            next_group: 0,
            next_tracked: 0,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable tree access for allocating replacement subtrees. New nodes
    /// must use [`Span::DUMMY`]; nodes with buffer spans are original
    /// structure and stay immutable.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn events(&self) -> &RewriteEventStore {
        &self.events
    }

    /// A fresh change-attribution handle.
    pub fn new_group(&mut self) -> GroupId {
        let group = GroupId::from_raw(self.next_group);
        self.next_group += 1;
        group
    }

    /// Record removal of `node` from its slot in the original tree.
    /// Returns false when no parent slot holds the node.
    pub fn remove(&mut self, node: NodeId, group: Option<GroupId>) -> bool {
        let Some((parent, property)) = self.owner_of(node) else {
            return false;
        };
        if self.is_list_property(parent, property) {
            return self
                .events
                .list_event_mut(&self.tree, parent, property)
                .remove(node, group);
        }
        let original = self.events.original_value(&self.tree, parent, property);
        self.events.set_node_event(
            parent,
            property,
            NodeRewriteEvent::new(original, None).with_group(group),
        );
        true
    }

    /// Record replacement of `node` with `new` in its original slot.
    pub fn replace(&mut self, node: NodeId, new: NodeId, group: Option<GroupId>) -> bool {
        let Some((parent, property)) = self.owner_of(node) else {
            return false;
        };
        if self.is_list_property(parent, property) {
            return self
                .events
                .list_event_mut(&self.tree, parent, property)
                .replace(node, new, group);
        }
        let original = self.events.original_value(&self.tree, parent, property);
        self.events.set_node_event(
            parent,
            property,
            NodeRewriteEvent::new(original, Some(PropertyValue::Child(new))).with_group(group),
        );
        true
    }

    /// Record a new value for one property of `node`. `None` removes the
    /// value (only meaningful for optional slots).
    pub fn set(
        &mut self,
        node: NodeId,
        property: Property,
        value: Option<PropertyValue>,
        group: Option<GroupId>,
    ) {
        let original = self.events.original_value(&self.tree, node, property);
        self.events
            .set_node_event(node, property, NodeRewriteEvent::new(original, value).with_group(group));
    }

    /// In-place editor for a child-list property.
    pub fn list_rewrite(&mut self, node: NodeId, property: Property) -> ListEditor<'_> {
        ListEditor {
            tree: &self.tree,
            events: &mut self.events,
            node,
            property,
        }
    }

    /// Report the node's final text position after application.
    pub fn track(&mut self, node: NodeId) -> TrackedId {
        if let Some(tracked) = self.events.tracked(node) {
            return tracked;
        }
        let tracked = TrackedId::from_raw(self.next_tracked);
        self.next_tracked += 1;
        self.events.set_tracked(node, tracked);
        tracked
    }

    /// A placeholder node rendering as the verbatim `code`, re-indented at
    /// its destination. `kind` contributes nothing textually; it gives list
    /// policies a construct to classify.
    pub fn create_string_placeholder(&mut self, code: &str, kind: NodeKind) -> NodeId {
        let node = self.tree.alloc(kind, Span::DUMMY);
        self.placeholders
            .insert(node, PlaceholderData::Code(code.to_owned()));
        node
    }

    /// A placeholder that splices a copy of `node`'s original text wherever
    /// it is inserted. The source text stays in place.
    pub fn create_copy_target(&mut self, node: NodeId) -> NodeId {
        self.create_target(node, false)
    }

    /// Like [`Self::create_copy_target`], but the source text is deleted.
    pub fn create_move_target(&mut self, node: NodeId) -> NodeId {
        self.create_target(node, true)
    }

    /// Copy target over the contiguous buffer range spanned by two sibling
    /// nodes, comments and whitespace between them included.
    pub fn create_range_copy_target(&mut self, first: NodeId, last: NodeId) -> NodeId {
        self.create_range_target(first, last, false)
    }

    /// Like [`Self::create_range_copy_target`], but the range is deleted.
    pub fn create_range_move_target(&mut self, first: NodeId, last: NodeId) -> NodeId {
        self.create_range_target(first, last, true)
    }

    fn create_target(&mut self, node: NodeId, is_move: bool) -> NodeId {
        let copy = self.events.create_copy_source(node, is_move);
        let kind = self.tree.kind(node).clone();
        let target = self.tree.alloc(kind, Span::DUMMY);
        self.placeholders.insert(target, PlaceholderData::Copy(copy));
        target
    }

    fn create_range_target(&mut self, first: NodeId, last: NodeId, is_move: bool) -> NodeId {
        let span = Span::new(self.tree.span(first).start, self.tree.span(last).end);
        let kind = self.tree.kind(first).clone();
        // the capture node carries the exact range; it is never visited
        let capture = self.tree.alloc(kind.clone(), span);
        self.events.mark_range_copy_placeholder(capture);
        let copy = self.events.create_copy_source(capture, is_move);
        let target = self.tree.alloc(kind, Span::DUMMY);
        self.placeholders.insert(target, PlaceholderData::Copy(copy));
        target
    }

    /// Run the analyzer with the default raw-span ranges and the built-in
    /// flattener formatter.
    pub fn rewrite(
        &self,
        source: &str,
        options: &RewriteOptions,
    ) -> Result<RewriteResult, RewriteError> {
        let formatter = Flattener::new(options);
        self.rewrite_with(source, options, &RawRange, &formatter)
    }

    /// Run the analyzer with a caller-supplied range policy and formatter.
    pub fn rewrite_with(
        &self,
        source: &str,
        options: &RewriteOptions,
        extender: &dyn RangeExtender,
        formatter: &dyn RewriteFormatter,
    ) -> Result<RewriteResult, RewriteError> {
        let roots = self.covering_roots();
        trace!(roots = roots.len(), "rewriting");
        let mut analyzer = Analyzer::new(
            &self.tree,
            &self.events,
            &self.placeholders,
            extender,
            formatter,
            options,
            source,
        );
        for root in roots {
            analyzer.visit(root)?;
        }
        let out = analyzer.finish();
        let root = out.edits.root();
        Ok(RewriteResult {
            edits: out.edits,
            root,
            groups: out.groups,
            tracked: out.tracked,
        })
    }

    /// Outermost original ancestors of every node the analyzer must see:
    /// nodes with changed properties, tracked nodes, and copy sources.
    /// Sorted by buffer position so sibling regions render in order.
    fn covering_roots(&self) -> Vec<NodeId> {
        let tree = &self.tree;
        let mut parent: Vec<Option<NodeId>> = vec![None; tree.len()];
        for raw in 0..tree.len() as u32 {
            let id = NodeId::from_raw(raw);
            if tree.is_synthesized(id) || self.placeholders.is_placeholder(id) {
                continue;
            }
            for child in tree.children(id) {
                parent[child.index()] = Some(id);
            }
        }
        let mut roots: Vec<NodeId> = Vec::new();
        for raw in 0..tree.len() as u32 {
            let id = NodeId::from_raw(raw);
            if tree.is_synthesized(id)
                || self.placeholders.is_placeholder(id)
                || self.events.is_range_copy_placeholder(id)
            {
                continue;
            }
            let interesting = self.events.has_changed_properties(id)
                || self.events.tracked(id).is_some()
                || !self.events.node_copy_sources(id).is_empty();
            if !interesting {
                continue;
            }
            let mut top = id;
            while let Some(up) = parent[top.index()] {
                top = up;
            }
            if !roots.contains(&top) {
                roots.push(top);
            }
        }
        roots.sort_by_key(|&id| (tree.span(id).start, id.raw()));
        roots
    }

    fn owner_of(&self, node: NodeId) -> Option<(NodeId, Property)> {
        let tree = &self.tree;
        for raw in 0..tree.len() as u32 {
            let id = NodeId::from_raw(raw);
            if tree.is_synthesized(id) {
                continue;
            }
            for &property in tree.kind(id).properties() {
                match tree.property(id, property) {
                    Some(PropertyRef::Child(Some(child))) if child == node => {
                        return Some((id, property));
                    }
                    Some(PropertyRef::List(children)) if children.contains(&node) => {
                        return Some((id, property));
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn is_list_property(&self, node: NodeId, property: Property) -> bool {
        matches!(
            self.tree.property(node, property),
            Some(PropertyRef::List(_))
        )
    }
}

/// Mutating view of one child-list property.
pub struct ListEditor<'r> {
    tree: &'r Tree,
    events: &'r mut RewriteEventStore,
    node: NodeId,
    property: Property,
}

impl ListEditor<'_> {
    /// Insert at `index`, counted over the list's current (post-edit)
    /// elements; `None` appends.
    pub fn insert(&mut self, node: NodeId, index: Option<usize>, group: Option<GroupId>) {
        self.events
            .list_event_mut(self.tree, self.node, self.property)
            .insert(node, index, group);
    }

    pub fn remove(&mut self, node: NodeId, group: Option<GroupId>) -> bool {
        self.events
            .list_event_mut(self.tree, self.node, self.property)
            .remove(node, group)
    }

    pub fn replace(&mut self, old: NodeId, new: NodeId, group: Option<GroupId>) -> bool {
        self.events
            .list_event_mut(self.tree, self.node, self.property)
            .replace(old, new, group)
    }

    /// Glue an inserted element to the element before it, so a tied
    /// insertion lands before the existing separator instead of after it.
    pub fn bind_to_previous(&mut self, node: NodeId) {
        self.events.set_insert_bound_to_previous(node);
    }
}

#[cfg(test)]
mod tests {
    use graft_ir::{LanguageLevel, ModifierFlags, Modifiers, PrimitiveKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn name_at(tree: &mut Tree, text: &str, span: Span) -> NodeId {
        let identifier = tree.intern(text);
        tree.alloc(NodeKind::SimpleName { identifier }, span)
    }

    /// `name();` with the given spans, returning (statement, call).
    fn call_statement(tree: &mut Tree, text: &str, start: u32) -> (NodeId, NodeId) {
        let name_end = start + text.len() as u32;
        let name = name_at(tree, text, Span::new(start, name_end));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name,
                arguments: vec![],
            },
            Span::new(start, name_end + 2),
        );
        let stmt = tree.alloc(
            NodeKind::ExpressionStatement { expression: call },
            Span::new(start, name_end + 3),
        );
        (stmt, call)
    }

    fn rewrite(tw: &TreeRewrite, source: &str) -> String {
        let Ok(result) = tw.rewrite(source, &RewriteOptions::default()) else {
            panic!("rewrite failed");
        };
        result.edits.apply(source)
    }

    #[test]
    fn test_no_events_is_identity() {
        let source = "foo();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        call_statement(&mut tree, "foo", 0);
        let tw = TreeRewrite::new(tree);
        let Ok(result) = tw.rewrite(source, &RewriteOptions::default()) else {
            panic!("rewrite failed");
        };
        assert!(!result.edits.has_changes());
        assert_eq!(result.edits.apply(source), source);
    }

    #[test]
    fn test_replace_resolves_owner_slot() {
        let source = "foo();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (_, call) = call_statement(&mut tree, "foo", 0);
        let Some(name) = tree.property(call, Property::Name).and_then(|r| r.child()) else {
            panic!("expected callee");
        };
        let mut tw = TreeRewrite::new(tree);
        let replacement = tw.tree_mut().simple_name("bar");
        assert!(tw.replace(name, replacement, None));
        assert_eq!(rewrite(&tw, source), "bar();");
    }

    #[test]
    fn test_list_insert_between_kept_elements() {
        let source = "f(a, b);";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a = name_at(&mut tree, "a", Span::new(2, 3));
        let b = name_at(&mut tree, "b", Span::new(5, 6));
        let f = name_at(&mut tree, "f", Span::new(0, 1));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: f,
                arguments: vec![a, b],
            },
            Span::new(0, 7),
        );
        tree.alloc(NodeKind::ExpressionStatement { expression: call }, Span::new(0, 8));
        let mut tw = TreeRewrite::new(tree);
        let x = tw.tree_mut().simple_name("x");
        tw.list_rewrite(call, Property::Arguments).insert(x, Some(1), None);
        assert_eq!(rewrite(&tw, source), "f(a, x, b);");
    }

    #[test]
    fn test_removal_keeps_unowned_comment() {
        let source = "{\n    a(); // gone\n    b();\n}";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (a_stmt, _) = call_statement(&mut tree, "a", 6);
        let (b_stmt, _) = call_statement(&mut tree, "b", 23);
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt, b_stmt],
            },
            Span::new(0, source.len() as u32),
        );
        let mut tw = TreeRewrite::new(tree);
        assert!(tw.list_rewrite(block, Property::Statements).remove(a_stmt, None));
        // the comment belongs to neither neighbour and stays on its line
        assert_eq!(rewrite(&tw, source), "{\n    // gone\n    b();\n}");
    }

    #[test]
    fn test_incomplete_source_block_edit_succeeds() {
        // a statement fragment parsed into a block node without braces
        let source = "a(); b();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (a_stmt, _) = call_statement(&mut tree, "a", 0);
        let (b_stmt, _) = call_statement(&mut tree, "b", 5);
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt, b_stmt],
            },
            Span::new(0, source.len() as u32),
        );
        let mut tw = TreeRewrite::new(tree);
        assert!(tw.list_rewrite(block, Property::Statements).remove(a_stmt, None));
        assert_eq!(rewrite(&tw, source), "b();");
    }

    #[test]
    fn test_extended_range_takes_trailing_comment() {
        struct WithComment {
            node: NodeId,
            span: Span,
        }

        impl RangeExtender for WithComment {
            fn extended_span(&self, tree: &Tree, node: NodeId) -> Span {
                if node == self.node {
                    self.span
                } else {
                    tree.span(node)
                }
            }
        }

        let source = "{\n    a(); // gone\n    b();\n}";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (a_stmt, _) = call_statement(&mut tree, "a", 6);
        let (b_stmt, _) = call_statement(&mut tree, "b", 23);
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt, b_stmt],
            },
            Span::new(0, source.len() as u32),
        );
        let mut tw = TreeRewrite::new(tree);
        tw.list_rewrite(block, Property::Statements).remove(a_stmt, None);
        let extender = WithComment {
            node: a_stmt,
            span: Span::new(6, 18),
        };
        let options = RewriteOptions::default();
        let formatter = Flattener::new(&options);
        let Ok(result) = tw.rewrite_with(source, &options, &extender, &formatter) else {
            panic!("rewrite failed");
        };
        assert_eq!(result.edits.apply(source), "{\n    b();\n}");
    }

    #[test]
    fn test_one_copy_source_two_targets() {
        let source = "{\n    a();\n}";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (a_stmt, _) = call_statement(&mut tree, "a", 6);
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt],
            },
            Span::new(0, 12),
        );
        let mut tw = TreeRewrite::new(tree);
        let first = tw.create_copy_target(a_stmt);
        let second = tw.create_copy_target(a_stmt);
        let mut list = tw.list_rewrite(block, Property::Statements);
        list.insert(first, None, None);
        list.insert(second, None, None);
        assert_eq!(rewrite(&tw, source), "{\n    a();\n    a();\n    a();\n}");
    }

    #[test]
    fn test_field_type_and_fragment_growth() {
        let source = "int x;";
        let mut tree = Tree::new(LanguageLevel::Jls2);
        let x = name_at(&mut tree, "x", Span::new(4, 5));
        let fragment = tree.alloc(
            NodeKind::VariableDeclarationFragment {
                name: x,
                extra_dimensions: 0,
                initializer: None,
            },
            Span::new(4, 5),
        );
        let int_type = tree.alloc(NodeKind::PrimitiveType { kind: PrimitiveKind::Int }, Span::new(0, 3));
        let field = tree.alloc(
            NodeKind::FieldDeclaration {
                javadoc: None,
                modifiers: Modifiers::Flags(ModifierFlags::empty()),
                field_type: int_type,
                fragments: vec![fragment],
            },
            Span::new(0, 6),
        );
        let mut tw = TreeRewrite::new(tree);
        let string_name = tw.tree_mut().simple_name("String");
        let string_type = tw
            .tree_mut()
            .alloc(NodeKind::SimpleType { name: string_name }, Span::DUMMY);
        assert!(tw.replace(int_type, string_type, None));
        let y = tw.tree_mut().simple_name("y");
        let y_fragment = tw.tree_mut().alloc(
            NodeKind::VariableDeclarationFragment {
                name: y,
                extra_dimensions: 0,
                initializer: None,
            },
            Span::DUMMY,
        );
        tw.list_rewrite(field, Property::Fragments).insert(y_fragment, None, None);
        assert_eq!(rewrite(&tw, source), "String x, y;");
    }

    #[test]
    fn test_tracked_node_reports_final_span() {
        let source = "foo();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let (stmt, call) = call_statement(&mut tree, "foo", 0);
        let Some(name) = tree.property(call, Property::Name).and_then(|r| r.child()) else {
            panic!("expected callee");
        };
        let mut tw = TreeRewrite::new(tree);
        let replacement = tw.tree_mut().simple_name("longer");
        tw.replace(name, replacement, None);
        let tracked = tw.track(stmt);
        let Ok(result) = tw.rewrite(source, &RewriteOptions::default()) else {
            panic!("rewrite failed");
        };
        let (out, map) = result.edits.apply_with_mapping(source);
        assert_eq!(out, "longer();");
        let Some(&edit) = result.tracked.get(&tracked) else {
            panic!("tracked edit missing");
        };
        assert_eq!(map.span(edit), Some(Span::new(0, 9)));
    }

    #[test]
    fn test_grouped_edits_are_attributed() {
        let source = "f(a, b);";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a = name_at(&mut tree, "a", Span::new(2, 3));
        let b = name_at(&mut tree, "b", Span::new(5, 6));
        let f = name_at(&mut tree, "f", Span::new(0, 1));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: f,
                arguments: vec![a, b],
            },
            Span::new(0, 7),
        );
        let mut tw = TreeRewrite::new(tree);
        let group = tw.new_group();
        let x = tw.tree_mut().simple_name("x");
        tw.list_rewrite(call, Property::Arguments).insert(x, Some(1), Some(group));
        let Ok(result) = tw.rewrite(source, &RewriteOptions::default()) else {
            panic!("rewrite failed");
        };
        let Some(edits) = result.groups.get(&group) else {
            panic!("group missing");
        };
        assert!(!edits.is_empty());
        assert_eq!(result.edits.apply(source), "f(a, x, b);");
    }
}
