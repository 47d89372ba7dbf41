//! Recorded differences between the original tree and its target state.
//!
//! The store is pure data: one event per (node, property) pair that has any
//! change, absence meaning the original text is kept verbatim. The analyzer
//! reads events; the [`TreeRewrite`](crate::TreeRewrite) facade records
//! them.

use graft_ir::{NodeId, Property, PropertyValue, Tree};
use graft_text::CopyId;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Change-attribution handle, grouping the edits of one logical change.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct GroupId(u32);

impl GroupId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        GroupId(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

/// Handle for a tracked node whose final position is reported after apply.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TrackedId(u32);

impl TrackedId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        TrackedId(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for TrackedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackedId({})", self.0)
    }
}

/// What happened to one property slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Unchanged,
    Inserted,
    Removed,
    Replaced,
}

/// Delta for a single-valued property, or for one slot of a list.
///
/// The kind is never stored; it falls out of which sides are present and
/// whether they compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRewriteEvent {
    pub original: Option<PropertyValue>,
    pub new: Option<PropertyValue>,
    pub group: Option<GroupId>,
}

impl NodeRewriteEvent {
    pub fn new(original: Option<PropertyValue>, new: Option<PropertyValue>) -> Self {
        NodeRewriteEvent {
            original,
            new,
            group: None,
        }
    }

    pub fn with_group(mut self, group: Option<GroupId>) -> Self {
        self.group = group;
        self
    }

    pub fn change_kind(&self) -> ChangeKind {
        match (&self.original, &self.new) {
            (None, None) => ChangeKind::Unchanged,
            (None, Some(_)) => ChangeKind::Inserted,
            (Some(_), None) => ChangeKind::Removed,
            (Some(a), Some(b)) if a == b => ChangeKind::Unchanged,
            (Some(_), Some(_)) => ChangeKind::Replaced,
        }
    }

    /// Original child node, for child-valued slots.
    pub fn original_node(&self) -> Option<NodeId> {
        match self.original {
            Some(PropertyValue::Child(id)) => Some(id),
            _ => None,
        }
    }

    /// New child node, for child-valued slots.
    pub fn new_node(&self) -> Option<NodeId> {
        match self.new {
            Some(PropertyValue::Child(id)) => Some(id),
            _ => None,
        }
    }
}

/// Delta for a child-list property: one slot event per element of the
/// synthesized union of original and inserted elements, in final target
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRewriteEvent {
    pub slots: Vec<NodeRewriteEvent>,
}

impl ListRewriteEvent {
    /// Seed a list event from the original elements, all unchanged.
    pub fn from_original(children: &[NodeId]) -> Self {
        ListRewriteEvent {
            slots: children
                .iter()
                .map(|&child| {
                    NodeRewriteEvent::new(
                        Some(PropertyValue::Child(child)),
                        Some(PropertyValue::Child(child)),
                    )
                })
                .collect(),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.change_kind() != ChangeKind::Unchanged)
    }

    /// Insert a new element at `index` counted over non-removed slots;
    /// `None` appends.
    pub fn insert(&mut self, node: NodeId, index: Option<usize>, group: Option<GroupId>) {
        let event = NodeRewriteEvent::new(None, Some(PropertyValue::Child(node))).with_group(group);
        if let Some(target) = index {
            let mut live = 0usize;
            for i in 0..self.slots.len() {
                if self.slots[i].change_kind() != ChangeKind::Removed {
                    if live == target {
                        self.slots.insert(i, event);
                        return;
                    }
                    live += 1;
                }
            }
        }
        self.slots.push(event);
    }

    /// Mark the slot whose current value is `node` as removed.
    pub fn remove(&mut self, node: NodeId, group: Option<GroupId>) -> bool {
        for i in 0..self.slots.len() {
            let slot = &self.slots[i];
            if slot.new_node() == Some(node) && slot.change_kind() != ChangeKind::Removed {
                if slot.original.is_none() {
                    // Inserted then removed: the slot cancels out entirely.
                    self.slots.remove(i);
                } else {
                    self.slots[i].new = None;
                    self.slots[i].group = group.or(self.slots[i].group);
                }
                return true;
            }
        }
        false
    }

    /// Replace the slot whose current value is `old` with `new`.
    pub fn replace(&mut self, old: NodeId, new: NodeId, group: Option<GroupId>) -> bool {
        for slot in &mut self.slots {
            if slot.new_node() == Some(old) && slot.change_kind() != ChangeKind::Removed {
                slot.new = Some(PropertyValue::Child(new));
                slot.group = group.or(slot.group);
                return true;
            }
        }
        false
    }

    /// The target-state element list.
    pub fn new_nodes(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .filter_map(NodeRewriteEvent::new_node)
            .collect()
    }
}

/// Borrowed view of the event recorded for one (node, property) pair.
#[derive(Copy, Clone, Debug)]
pub enum PropertyEvent<'s> {
    Node(&'s NodeRewriteEvent),
    List(&'s ListRewriteEvent),
}

/// A subtree registered for duplication (copy) or relocation (move).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CopySourceInfo {
    pub node: NodeId,
    pub is_move: bool,
}

/// All recorded deltas for one rewrite.
#[derive(Debug, Default)]
pub struct RewriteEventStore {
    node_events: FxHashMap<(NodeId, Property), NodeRewriteEvent>,
    list_events: FxHashMap<(NodeId, Property), ListRewriteEvent>,
    by_node: FxHashMap<NodeId, SmallVec<[Property; 4]>>,
    copy_sources: Vec<CopySourceInfo>,
    node_copies: FxHashMap<NodeId, SmallVec<[CopyId; 2]>>,
    insert_bound_to_previous: FxHashSet<NodeId>,
    tracked: FxHashMap<NodeId, TrackedId>,
    range_copy_placeholders: FxHashSet<NodeId>,
}

impl RewriteEventStore {
    pub fn new() -> Self {
        RewriteEventStore::default()
    }

    pub fn get_event(&self, node: NodeId, property: Property) -> Option<PropertyEvent<'_>> {
        let key = (node, property);
        if let Some(event) = self.list_events.get(&key) {
            return Some(PropertyEvent::List(event));
        }
        self.node_events.get(&key).map(PropertyEvent::Node)
    }

    pub fn node_event(&self, node: NodeId, property: Property) -> Option<&NodeRewriteEvent> {
        self.node_events.get(&(node, property))
    }

    /// Single-valued events recorded for `node`, in recording order.
    pub fn node_events_of(&self, node: NodeId) -> impl Iterator<Item = &NodeRewriteEvent> + '_ {
        self.by_node
            .get(&node)
            .into_iter()
            .flat_map(|props| props.iter())
            .filter_map(move |&property| self.node_events.get(&(node, property)))
    }

    pub fn list_event(&self, node: NodeId, property: Property) -> Option<&ListRewriteEvent> {
        self.list_events.get(&(node, property))
    }

    /// Absence of an event reads as unchanged.
    pub fn change_kind(&self, node: NodeId, property: Property) -> ChangeKind {
        match self.get_event(node, property) {
            Some(PropertyEvent::Node(event)) => event.change_kind(),
            Some(PropertyEvent::List(event)) => {
                if event.is_changed() {
                    ChangeKind::Replaced
                } else {
                    ChangeKind::Unchanged
                }
            }
            None => ChangeKind::Unchanged,
        }
    }

    /// The top-level skip gate: does any property of `node` change?
    pub fn has_changed_properties(&self, node: NodeId) -> bool {
        self.by_node.get(&node).is_some_and(|props| {
            props
                .iter()
                .any(|&p| self.change_kind(node, p) != ChangeKind::Unchanged)
        })
    }

    /// The value a property will have after the rewrite: the event's new
    /// side, or the tree's current value when unchanged.
    pub fn new_value(&self, tree: &Tree, node: NodeId, property: Property) -> Option<PropertyValue> {
        match self.get_event(node, property) {
            Some(PropertyEvent::Node(event)) => event.new.clone(),
            Some(PropertyEvent::List(event)) => Some(PropertyValue::List(event.new_nodes())),
            None => tree.property(node, property).and_then(|r| r.to_value()),
        }
    }

    /// The value the property had originally.
    pub fn original_value(
        &self,
        tree: &Tree,
        node: NodeId,
        property: Property,
    ) -> Option<PropertyValue> {
        match self.get_event(node, property) {
            Some(PropertyEvent::Node(event)) => event.original.clone(),
            Some(PropertyEvent::List(_)) | None => {
                tree.property(node, property).and_then(|r| r.to_value())
            }
        }
    }

    pub fn set_node_event(&mut self, node: NodeId, property: Property, event: NodeRewriteEvent) {
        let key = (node, property);
        self.list_events.remove(&key);
        self.note_property(node, property);
        self.node_events.insert(key, event);
    }

    pub fn set_list_event(&mut self, node: NodeId, property: Property, event: ListRewriteEvent) {
        let key = (node, property);
        self.node_events.remove(&key);
        self.note_property(node, property);
        self.list_events.insert(key, event);
    }

    fn note_property(&mut self, node: NodeId, property: Property) {
        let props = self.by_node.entry(node).or_default();
        if !props.contains(&property) {
            props.push(property);
        }
    }

    /// Fetch-or-seed the mutable list event for in-place list editing.
    pub fn list_event_mut(
        &mut self,
        tree: &Tree,
        node: NodeId,
        property: Property,
    ) -> &mut ListRewriteEvent {
        let key = (node, property);
        if !self.list_events.contains_key(&key) {
            let original = tree
                .property(node, property)
                .and_then(|r| r.list().map(<[NodeId]>::to_vec))
                .unwrap_or_default();
            self.set_list_event(node, property, ListRewriteEvent::from_original(&original));
        }
        self.list_events.entry(key).or_default()
    }

    pub fn create_copy_source(&mut self, node: NodeId, is_move: bool) -> CopyId {
        let copy = CopyId::from_raw(self.copy_sources.len() as u32);
        self.copy_sources.push(CopySourceInfo { node, is_move });
        self.node_copies.entry(node).or_default().push(copy);
        copy
    }

    pub fn copy_source(&self, copy: CopyId) -> Option<CopySourceInfo> {
        self.copy_sources.get(copy.raw() as usize).copied()
    }

    pub fn node_copy_sources(&self, node: NodeId) -> &[CopyId] {
        self.node_copies.get(&node).map_or(&[], SmallVec::as_slice)
    }

    pub fn set_insert_bound_to_previous(&mut self, node: NodeId) {
        self.insert_bound_to_previous.insert(node);
    }

    pub fn is_insert_bound_to_previous(&self, node: NodeId) -> bool {
        self.insert_bound_to_previous.contains(&node)
    }

    pub fn set_tracked(&mut self, node: NodeId, tracked: TrackedId) {
        self.tracked.insert(node, tracked);
    }

    pub fn tracked(&self, node: NodeId) -> Option<TrackedId> {
        self.tracked.get(&node).copied()
    }

    pub fn mark_range_copy_placeholder(&mut self, node: NodeId) {
        self.range_copy_placeholders.insert(node);
    }

    pub fn is_range_copy_placeholder(&self, node: NodeId) -> bool {
        self.range_copy_placeholders.contains(&node)
    }
}

#[cfg(test)]
mod tests {
    use graft_ir::{LanguageLevel, NodeKind, Span, Tree};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_change_kind_is_computed() {
        let a = PropertyValue::Number(1);
        let b = PropertyValue::Number(2);
        let cases = [
            (None, None, ChangeKind::Unchanged),
            (None, Some(a.clone()), ChangeKind::Inserted),
            (Some(a.clone()), None, ChangeKind::Removed),
            (Some(a.clone()), Some(a.clone()), ChangeKind::Unchanged),
            (Some(a), Some(b), ChangeKind::Replaced),
        ];
        for (original, new, expected) in cases {
            assert_eq!(NodeRewriteEvent::new(original, new).change_kind(), expected);
        }
    }

    #[test]
    fn test_new_value_falls_back_to_tree() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let label = tree.simple_name("out");
        let stmt = tree.alloc(
            NodeKind::BreakStatement { label: Some(label) },
            Span::new(0, 10),
        );
        let store = RewriteEventStore::new();
        assert_eq!(
            store.new_value(&tree, stmt, Property::Label),
            Some(PropertyValue::Child(label))
        );
        // Absent optional child reads as no value on both sides.
        let bare = tree.alloc(NodeKind::BreakStatement { label: None }, Span::new(0, 6));
        assert_eq!(store.new_value(&tree, bare, Property::Label), None);
        assert_eq!(store.original_value(&tree, bare, Property::Label), None);
    }

    #[test]
    fn test_list_insert_index_counts_live_slots() {
        let n = NodeId::from_raw;
        let mut event = ListRewriteEvent::from_original(&[n(0), n(1), n(2)]);
        event.remove(n(1), None);
        // Live list is [0, 2]; inserting at 1 lands between them.
        event.insert(n(9), Some(1), None);
        assert_eq!(event.new_nodes(), vec![n(0), n(9), n(2)]);
        let kinds: Vec<ChangeKind> = event
            .slots
            .iter()
            .map(NodeRewriteEvent::change_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Unchanged,
                ChangeKind::Removed,
                ChangeKind::Inserted,
                ChangeKind::Unchanged,
            ]
        );
    }

    #[test]
    fn test_inserted_then_removed_cancels() {
        let n = NodeId::from_raw;
        let mut event = ListRewriteEvent::from_original(&[n(0)]);
        event.insert(n(5), None, None);
        assert!(event.is_changed());
        event.remove(n(5), None);
        assert!(!event.is_changed());
        assert_eq!(event.slots.len(), 1);
    }

    #[test]
    fn test_has_changed_properties_gate() {
        let n = NodeId::from_raw(4);
        let mut store = RewriteEventStore::new();
        assert!(!store.has_changed_properties(n));
        store.set_node_event(
            n,
            Property::Expression,
            NodeRewriteEvent::new(
                Some(PropertyValue::Child(NodeId::from_raw(1))),
                Some(PropertyValue::Child(NodeId::from_raw(1))),
            ),
        );
        assert!(!store.has_changed_properties(n));
        store.set_node_event(
            n,
            Property::Expression,
            NodeRewriteEvent::new(Some(PropertyValue::Child(NodeId::from_raw(1))), None),
        );
        assert!(store.has_changed_properties(n));
    }

    #[test]
    fn test_copy_sources_accumulate_per_node() {
        let n = NodeId::from_raw(7);
        let mut store = RewriteEventStore::new();
        let a = store.create_copy_source(n, false);
        let b = store.create_copy_source(n, true);
        assert_eq!(store.node_copy_sources(n), &[a, b]);
        assert_eq!(
            store.copy_source(b),
            Some(CopySourceInfo {
                node: n,
                is_move: true
            })
        );
        assert_eq!(store.copy_source(CopyId::from_raw(9)), None);
    }
}
