//! The edit tree.
//!
//! Edits live in one arena ([`EditStore`]) and form a tree under a root
//! group. Every edit records the span of ORIGINAL text it replaces or marks;
//! an insertion has an empty span at its insertion offset. Children always
//! lie inside their parent's span and are appended while a traversal scope
//! is open, never reordered afterwards (application sorts for itself).

use graft_ir::Span;

/// Index of an edit in its [`EditStore`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EditId(u32);

impl EditId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        EditId(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for EditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EditId({})", self.0)
    }
}

/// Identity shared by a copy/move source edit and its target edits.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CopyId(u32);

impl CopyId {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        CopyId(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for CopyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CopyId({})", self.0)
    }
}

/// Re-indent transform attached to a copy/move target.
///
/// The captured text keeps its first line untouched; every following line
/// has `source_indent_units` of leading whitespace stripped (measured with
/// the given widths) and `dest_indent` prepended in its place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reindent {
    pub source_indent_units: u32,
    pub dest_indent: String,
    pub tab_width: u32,
    pub indent_width: u32,
}

/// One node of the edit tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Pure container. The root is a group, and change groups nest edits
    /// under further groups.
    Group,
    /// Insert `text` at the (empty) span's offset.
    Insert { text: String },
    /// Delete the spanned text.
    Delete,
    /// Replace the spanned text with `text`.
    Replace { text: String },
    /// No textual effect; marks a range whose final position is reported
    /// by [`EditMap`](crate::EditMap). Zero-length markers between inserts
    /// at one offset bracket tracked regions of freshly inserted text.
    RangeMarker,
    /// Captures the spanned text (with nested edits applied) for targets
    /// sharing the [`CopyId`]. The original text stays in place.
    CopySource { copy: CopyId },
    /// Like [`EditKind::CopySource`], but the original text is removed.
    MoveSource { copy: CopyId },
    /// Splice the captured text of `copy` at this (empty) span's offset.
    CopyTarget {
        copy: CopyId,
        reindent: Option<Reindent>,
    },
    /// Splice the captured text of `copy`; the source region is deleted.
    MoveTarget {
        copy: CopyId,
        reindent: Option<Reindent>,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct EditData {
    pub(crate) kind: EditKind,
    pub(crate) span: Span,
    pub(crate) children: Vec<EditId>,
}

/// Arena of edits plus the root group.
#[derive(Clone, Debug, Default)]
pub struct EditStore {
    edits: Vec<EditData>,
}

impl EditStore {
    /// Create a store holding only the empty root group.
    pub fn new() -> Self {
        EditStore {
            edits: vec![EditData {
                kind: EditKind::Group,
                span: Span::new(0, 0),
                children: Vec::new(),
            }],
        }
    }

    /// The root group.
    #[inline]
    pub fn root(&self) -> EditId {
        EditId(0)
    }

    /// Append a new edit as the last child of `parent`.
    pub fn alloc(&mut self, parent: EditId, kind: EditKind, span: Span) -> EditId {
        let id = self.alloc_detached(kind, span);
        self.attach(parent, id);
        id
    }

    /// Create an edit without a parent. Detached edits are invisible to
    /// application until [`EditStore::attach`] links them in, except for
    /// copy/move sources, whose text is captured either way.
    pub fn alloc_detached(&mut self, kind: EditKind, span: Span) -> EditId {
        let id = EditId(self.edits.len() as u32);
        self.edits.push(EditData {
            kind,
            span,
            children: Vec::new(),
        });
        id
    }

    /// Link `child` as the last child of `parent`.
    pub fn attach(&mut self, parent: EditId, child: EditId) {
        self.edits[parent.index()].children.push(child);
    }

    #[inline]
    pub fn kind(&self, id: EditId) -> &EditKind {
        &self.edits[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: EditId) -> Span {
        self.edits[id.index()].span
    }

    #[inline]
    pub fn children(&self, id: EditId) -> &[EditId] {
        &self.edits[id.index()].children
    }

    /// Number of edits, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edits.len() <= 1
    }

    /// Whether applying would change anything. A tree of only groups and
    /// range markers leaves the text byte-identical.
    pub fn has_changes(&self) -> bool {
        self.edits
            .iter()
            .any(|e| !matches!(e.kind, EditKind::Group | EditKind::RangeMarker))
    }

    /// All edit ids in allocation order, root included.
    pub fn ids(&self) -> impl Iterator<Item = EditId> + '_ {
        (0..self.edits.len() as u32).map(EditId)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_store_shape() {
        let mut store = EditStore::new();
        assert!(store.is_empty());
        assert!(!store.has_changes());

        let root = store.root();
        let group = store.alloc(root, EditKind::Group, Span::new(0, 10));
        let del = store.alloc(group, EditKind::Delete, Span::new(2, 4));
        assert_eq!(store.children(root), &[group]);
        assert_eq!(store.children(group), &[del]);
        assert_eq!(store.span(del), Span::new(2, 4));
        assert!(store.has_changes());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_markers_are_not_changes() {
        let mut store = EditStore::new();
        let root = store.root();
        store.alloc(root, EditKind::RangeMarker, Span::new(0, 5));
        assert!(!store.has_changes());
    }
}
