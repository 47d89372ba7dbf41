//! Edit application.
//!
//! Application replays the tree against the original buffer in one pass:
//! children are taken in document order, untouched gaps are copied through
//! verbatim, and each edit contributes its own text. Copy/move sources are
//! captured on first demand, with their nested edits applied, then spliced
//! (optionally re-indented) at every target.

use graft_ir::Span;
use rustc_hash::FxHashMap;

use crate::edit::{CopyId, EditId, EditKind, EditStore};
use crate::indent::change_indent;

/// Where each edit ended up in the rewritten text.
///
/// Recorded for every edit on the document side: a range marker maps to the
/// final span of the text it wrapped, an insert to its inserted text, a
/// delete to an empty span at the deletion point. Edits inside a moved
/// region have no document-side position and are absent.
#[derive(Clone, Debug, Default)]
pub struct EditMap {
    spans: FxHashMap<EditId, Span>,
}

impl EditMap {
    /// Final span of an edit, if it was rendered.
    pub fn span(&self, id: EditId) -> Option<Span> {
        self.spans.get(&id).copied()
    }

    fn record(&mut self, id: EditId, start: u32, end: u32) {
        self.spans.insert(id, Span::new(start, end));
    }
}

enum Capture {
    InProgress,
    Done(String),
}

struct Applier<'a> {
    store: &'a EditStore,
    source: &'a str,
    sources: FxHashMap<CopyId, EditId>,
    captured: FxHashMap<CopyId, Capture>,
    map: EditMap,
}

#[inline]
fn segment<'s>(src: &'s str, start: u32, end: u32) -> &'s str {
    src.get(start as usize..end as usize).unwrap_or("")
}

impl<'a> Applier<'a> {
    fn new(store: &'a EditStore, source: &'a str) -> Self {
        let mut sources = FxHashMap::default();
        for id in store.ids() {
            match *store.kind(id) {
                EditKind::CopySource { copy } | EditKind::MoveSource { copy } => {
                    sources.insert(copy, id);
                }
                _ => {}
            }
        }
        Applier {
            store,
            source,
            sources,
            captured: FxHashMap::default(),
            map: EditMap::default(),
        }
    }

    fn run(&mut self, record: bool) -> String {
        let store = self.store;
        let full = Span::new(0, self.source.len() as u32);
        let mut out = String::with_capacity(self.source.len());
        self.replay(full, store.children(store.root()), &mut out, record);
        out
    }

    /// Emit `span`'s text with `children` applied, in document order.
    fn replay(&mut self, span: Span, children: &[EditId], out: &mut String, record: bool) {
        let mut ordered = children.to_vec();
        ordered.sort_by_key(|&child| self.store.span(child).start);
        let mut cursor = span.start;
        for child in ordered {
            let child_span = self.store.span(child);
            let gap_end = child_span.start.clamp(cursor, span.end);
            out.push_str(segment(self.source, cursor, gap_end));
            cursor = gap_end;
            self.render(child, out, record);
            cursor = cursor.max(child_span.end.min(span.end));
        }
        out.push_str(segment(self.source, cursor, span.end));
    }

    fn render(&mut self, id: EditId, out: &mut String, record: bool) {
        let store = self.store;
        let start_pos = out.len() as u32;
        match store.kind(id) {
            EditKind::Group | EditKind::RangeMarker | EditKind::CopySource { .. } => {
                self.replay(store.span(id), store.children(id), out, record);
            }
            EditKind::Delete | EditKind::MoveSource { .. } => {}
            EditKind::Insert { text } | EditKind::Replace { text } => {
                out.push_str(text);
            }
            EditKind::CopyTarget { copy, reindent } | EditKind::MoveTarget { copy, reindent } => {
                let text = self.captured_text(*copy);
                match reindent {
                    Some(r) => out.push_str(&change_indent(
                        &text,
                        r.source_indent_units,
                        r.tab_width,
                        r.indent_width,
                        &r.dest_indent,
                    )),
                    None => out.push_str(&text),
                }
            }
        }
        if record {
            self.map.record(id, start_pos, out.len() as u32);
        }
    }

    /// Captured text for a copy id: the source span with its nested edits
    /// applied. Missing sources and capture cycles yield empty text rather
    /// than looping.
    fn captured_text(&mut self, copy: CopyId) -> String {
        match self.captured.get(&copy) {
            Some(Capture::Done(text)) => return text.clone(),
            Some(Capture::InProgress) => return String::new(),
            None => {}
        }
        self.captured.insert(copy, Capture::InProgress);
        let store = self.store;
        let text = match self.sources.get(&copy).copied() {
            Some(src) => {
                let mut buf = String::new();
                self.replay(store.span(src), store.children(src), &mut buf, false);
                buf
            }
            None => String::new(),
        };
        self.captured.insert(copy, Capture::Done(text.clone()));
        text
    }
}

impl EditStore {
    /// Apply the whole tree to `source`.
    pub fn apply(&self, source: &str) -> String {
        Applier::new(self, source).run(false)
    }

    /// Apply and report where every edit landed.
    pub fn apply_with_mapping(&self, source: &str) -> (String, EditMap) {
        let mut applier = Applier::new(self, source);
        let out = applier.run(true);
        (out, applier.map)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::edit::Reindent;

    #[test]
    fn test_empty_tree_is_identity() {
        let store = EditStore::new();
        assert_eq!(store.apply("public class A {}"), "public class A {}");
    }

    #[test]
    fn test_basic_composition() {
        let src = "int x = 1;";
        let mut store = EditStore::new();
        let root = store.root();
        store.alloc(
            root,
            EditKind::Replace {
                text: "long".to_string(),
            },
            Span::new(0, 3),
        );
        store.alloc(root, EditKind::Delete, Span::new(7, 9));
        store.alloc(
            root,
            EditKind::Insert {
                text: "42".to_string(),
            },
            Span::new(9, 9),
        );
        assert_eq!(store.apply(src), "long x =42;");
    }

    #[test]
    fn test_inserts_at_same_offset_keep_order() {
        let mut store = EditStore::new();
        let root = store.root();
        for text in ["a", "b", "c"] {
            store.alloc(
                root,
                EditKind::Insert {
                    text: text.to_string(),
                },
                Span::new(1, 1),
            );
        }
        assert_eq!(store.apply("xy"), "xabcy");
    }

    #[test]
    fn test_nested_group_and_marker_mapping() {
        let src = "aa bb cc";
        let mut store = EditStore::new();
        let root = store.root();
        store.alloc(
            root,
            EditKind::Insert {
                text: "zz ".to_string(),
            },
            Span::new(0, 0),
        );
        let marker = store.alloc(root, EditKind::RangeMarker, Span::new(3, 5));
        store.alloc(
            marker,
            EditKind::Replace {
                text: "BB".to_string(),
            },
            Span::new(3, 5),
        );
        let (out, map) = store.apply_with_mapping(src);
        assert_eq!(out, "zz aa BB cc");
        assert_eq!(map.span(marker), Some(Span::new(6, 8)));
    }

    #[test]
    fn test_copy_keeps_source_and_applies_nested_edits() {
        let src = "x(); y();";
        let mut store = EditStore::new();
        let root = store.root();
        let copy = CopyId::from_raw(0);
        let source = store.alloc(root, EditKind::CopySource { copy }, Span::new(0, 4));
        store.alloc(
            source,
            EditKind::Replace {
                text: "z".to_string(),
            },
            Span::new(0, 1),
        );
        store.alloc(
            root,
            EditKind::CopyTarget {
                copy,
                reindent: None,
            },
            Span::new(9, 9),
        );
        assert_eq!(store.apply(src), "z(); y();z();");
    }

    #[test]
    fn test_move_deletes_source() {
        let src = "a(); b();";
        let mut store = EditStore::new();
        let root = store.root();
        let copy = CopyId::from_raw(0);
        store.alloc(root, EditKind::MoveSource { copy }, Span::new(0, 5));
        store.alloc(
            root,
            EditKind::MoveTarget {
                copy,
                reindent: None,
            },
            Span::new(9, 9),
        );
        assert_eq!(store.apply(src), "b();a(); ");
    }

    #[test]
    fn test_one_source_two_targets_with_independent_indents() {
        let src = "if (a) {\n    b();\n}\n";
        let mut store = EditStore::new();
        let root = store.root();
        let copy = CopyId::from_raw(7);
        store.alloc(root, EditKind::CopySource { copy }, Span::new(0, 19));
        let reindent = |dest: &str| {
            Some(Reindent {
                source_indent_units: 0,
                dest_indent: dest.to_string(),
                tab_width: 4,
                indent_width: 4,
            })
        };
        store.alloc(
            root,
            EditKind::CopyTarget {
                copy,
                reindent: reindent("    "),
            },
            Span::new(20, 20),
        );
        store.alloc(
            root,
            EditKind::CopyTarget {
                copy,
                reindent: reindent("\t\t"),
            },
            Span::new(20, 20),
        );
        let out = store.apply(src);
        assert_eq!(
            out,
            "if (a) {\n    b();\n}\nif (a) {\n        b();\n    }if (a) {\n\t\t    b();\n\t\t}"
        );
    }

    #[test]
    fn test_zero_length_markers_bracket_inserted_text() {
        // Tracking inside freshly inserted text: the tracked region is
        // bracketed by two empty markers between the insert segments.
        let mut store = EditStore::new();
        let root = store.root();
        let at = Span::new(4, 4);
        store.alloc(
            root,
            EditKind::Insert {
                text: "int ".to_string(),
            },
            at,
        );
        let open = store.alloc(root, EditKind::RangeMarker, at);
        store.alloc(
            root,
            EditKind::Insert {
                text: "x".to_string(),
            },
            at,
        );
        let close = store.alloc(root, EditKind::RangeMarker, at);
        store.alloc(
            root,
            EditKind::Insert {
                text: " = 0;".to_string(),
            },
            at,
        );
        let (out, map) = store.apply_with_mapping("ab  cd");
        assert_eq!(out, "ab  int x = 0;cd");
        let (Some(open_span), Some(close_span)) = (map.span(open), map.span(close)) else {
            panic!("markers not mapped");
        };
        assert_eq!((open_span.start, close_span.end), (8, 9));
    }

    #[test]
    fn test_missing_copy_source_yields_empty_splice() {
        let mut store = EditStore::new();
        let root = store.root();
        store.alloc(
            root,
            EditKind::CopyTarget {
                copy: CopyId::from_raw(3),
                reindent: None,
            },
            Span::new(0, 0),
        );
        assert_eq!(store.apply("ok"), "ok");
    }

    proptest! {
        /// Disjoint single-level replaces compose independently of the
        /// order they were recorded in.
        #[test]
        fn prop_disjoint_replaces_compose(
            seed in proptest::collection::vec(1u32..5, 1..6),
        ) {
            let src = "0123456789abcdefghij";
            // Carve disjoint spans from the seed lengths.
            let mut spans = Vec::new();
            let mut pos = 0u32;
            for len in seed {
                if pos + len + 1 > src.len() as u32 {
                    break;
                }
                spans.push(Span::new(pos, pos + len));
                pos += len + 1;
            }
            let mut forward = EditStore::new();
            let mut backward = EditStore::new();
            for (i, &span) in spans.iter().enumerate() {
                let text = format!("<{i}>");
                let root = forward.root();
                forward.alloc(root, EditKind::Replace { text }, span);
            }
            for (i, &span) in spans.iter().enumerate().rev() {
                let text = format!("<{i}>");
                let root = backward.root();
                backward.alloc(root, EditKind::Replace { text }, span);
            }
            prop_assert_eq!(forward.apply(src), backward.apply(src));
        }

        /// Inserts only: output length grows by exactly the inserted text.
        #[test]
        fn prop_insert_length(offsets in proptest::collection::vec(0u32..10, 0..8)) {
            let src = "0123456789";
            let mut store = EditStore::new();
            let mut added = 0;
            for &offset in &offsets {
                let root = store.root();
                store.alloc(
                    root,
                    EditKind::Insert { text: "xy".to_string() },
                    Span::new(offset, offset),
                );
                added += 2;
            }
            prop_assert_eq!(store.apply(src).len(), src.len() + added);
        }
    }
}
