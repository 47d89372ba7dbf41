//! The rewrite analyzer.
//!
//! One pass over the original tree turns the recorded events into an edit
//! tree over the original buffer. Untouched subtrees contribute nothing;
//! where a property changed, the matching construct handler stitches
//! removals of old text together with freshly formatted insertions, using
//! the token scanner to locate the punctuation the tree does not store.
//! Nothing is applied here: the caller replays the finished
//! [`EditStore`] against the buffer once, at the end.

use graft_ir::{
    ModifierFlags, NodeId, NodeKind, Property, PropertyRef, PropertyValue, Span, Tree,
};
use graft_scan::{ScanError, Token, TokenKind, TokenScanner};
use graft_text::{change_indent, CopyId, EditId, EditKind, EditStore, LineIndex, Reindent};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::comment::LineCommentEndOffsets;
use crate::error::RewriteError;
use crate::event::{ChangeKind, GroupId, ListRewriteEvent, NodeRewriteEvent, RewriteEventStore, TrackedId};
use crate::flatten::FLAG_ORDER;
use crate::format::{BodyContext, FormatContext, MarkerData, NodeMarker, RewriteFormatter, RewriteOptions};
use crate::list::{rewrite_slots, ConstSeparator, ListPolicy, ListSlots, ParagraphPolicy, SwitchPolicy};
use crate::placeholder::{PlaceholderData, PlaceholderStore};
use crate::range::RangeExtender;
use crate::stack::ensure_sufficient_stack;

fn is_modifier_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Public
            | TokenKind::Protected
            | TokenKind::Private
            | TokenKind::Static
            | TokenKind::Final
            | TokenKind::Abstract
            | TokenKind::Native
            | TokenKind::Synchronized
            | TokenKind::Transient
            | TokenKind::Volatile
            | TokenKind::Strictfp
    )
}

/// Everything the analyzer produced for one rewrite run.
pub(crate) struct AnalyzerOutput {
    pub(crate) edits: EditStore,
    pub(crate) groups: FxHashMap<GroupId, Vec<EditId>>,
    pub(crate) tracked: FxHashMap<TrackedId, EditId>,
}

/// Event-driven traversal that emits the edit tree.
///
/// Geometry helpers (`node_start`, `indent_at`, `line_of`, ...) answer from
/// the immutable source and line index and take `&self`; everything that
/// probes the token scanner or allocates edits takes `&mut self`.
pub(crate) struct Analyzer<'e> {
    tree: &'e Tree,
    events: &'e RewriteEventStore,
    placeholders: &'e PlaceholderStore,
    extender: &'e dyn RangeExtender,
    formatter: &'e dyn RewriteFormatter,
    options: &'e RewriteOptions,
    source: &'e str,
    scanner: TokenScanner<'e>,
    lines: LineIndex,
    line_comment_ends: LineCommentEndOffsets,
    edits: EditStore,
    /// Enclosing edit for anything allocated next; strict LIFO.
    scope: Vec<EditId>,
    /// At most one source edit per copy id, possibly created detached by a
    /// target that rendered before the source node was visited.
    copy_edits: FxHashMap<CopyId, EditId>,
    groups: FxHashMap<GroupId, Vec<EditId>>,
    tracked_edits: FxHashMap<TrackedId, EditId>,
}

impl<'e> Analyzer<'e> {
    pub(crate) fn new(
        tree: &'e Tree,
        events: &'e RewriteEventStore,
        placeholders: &'e PlaceholderStore,
        extender: &'e dyn RangeExtender,
        formatter: &'e dyn RewriteFormatter,
        options: &'e RewriteOptions,
        source: &'e str,
    ) -> Self {
        let edits = EditStore::new();
        let root = edits.root();
        Analyzer {
            tree,
            events,
            placeholders,
            extender,
            formatter,
            options,
            source,
            scanner: TokenScanner::new(source),
            lines: LineIndex::new(source),
            line_comment_ends: LineCommentEndOffsets::new(source),
            edits,
            scope: vec![root],
            copy_edits: FxHashMap::default(),
            groups: FxHashMap::default(),
            tracked_edits: FxHashMap::default(),
        }
    }

    pub(crate) fn finish(self) -> AnalyzerOutput {
        AnalyzerOutput {
            edits: self.edits,
            groups: self.groups,
            tracked: self.tracked_edits,
        }
    }

    // ---- geometry ----

    pub(crate) fn tree(&self) -> &'e Tree {
        self.tree
    }

    pub(crate) fn line_delimiter(&self) -> &'e str {
        self.formatter.line_delimiter()
    }

    pub(crate) fn indent_string(&self, units: u32) -> String {
        self.formatter.indent_string(units)
    }

    pub(crate) fn node_start(&self, node: NodeId) -> u32 {
        self.tree.span(node).start
    }

    pub(crate) fn node_end(&self, node: NodeId) -> u32 {
        self.tree.span(node).end
    }

    /// Source range a change to `node` owns: the raw span widened by the
    /// range extender, except for range-copy placeholders, whose span is
    /// the exact buffer range the caller asked to capture.
    pub(crate) fn extended(&self, node: NodeId) -> Span {
        let raw = self.tree.span(node);
        if raw.is_dummy() || self.events.is_range_copy_placeholder(node) {
            return raw;
        }
        self.extender.extended_span(self.tree, node)
    }

    pub(crate) fn end_of_node(&self, node: NodeId) -> u32 {
        self.extended(node).end
    }

    pub(crate) fn line_of(&self, offset: u32) -> u32 {
        self.lines.line_of(offset)
    }

    pub(crate) fn line_start(&self, line: u32) -> u32 {
        self.lines.line_start(line)
    }

    pub(crate) fn same_line(&self, a: u32, b: u32) -> bool {
        self.lines.same_line(a, b)
    }

    /// Indentation units of the line containing `offset`.
    pub(crate) fn indent_at(&self, offset: u32) -> u32 {
        let span = self.lines.line_span(self.line_of(offset), self.source);
        self.formatter.indent_units_of(&self.source[span.to_range()])
    }

    /// Whitespace-only lines directly below the line `node` ends on.
    pub(crate) fn blank_lines_after(&self, node: NodeId) -> u32 {
        let mut line = self.line_of(self.end_of_node(node)) + 1;
        let mut blanks = 0;
        while line < self.lines.line_count() {
            let span = self.lines.line_span(line, self.source);
            if !self.source[span.to_range()].trim().is_empty() {
                break;
            }
            blanks += 1;
            line += 1;
        }
        blanks
    }

    pub(crate) fn insert_bound_to_previous(&self, node: NodeId) -> bool {
        self.events.is_insert_bound_to_previous(node)
    }

    fn current_scope(&self) -> EditId {
        self.scope.last().copied().unwrap_or_else(|| self.edits.root())
    }

    fn unsupported(&self, node: NodeId, property: Property) -> RewriteError {
        RewriteError::UnsupportedModification {
            node,
            reason: format!("no textual rendition for a change to {property:?}"),
        }
    }

    // ---- edit primitives ----

    fn alloc_edit(&mut self, kind: EditKind, span: Span, group: Option<GroupId>) -> EditId {
        let parent = self.current_scope();
        let id = self.edits.alloc(parent, kind, span);
        if let Some(group) = group {
            self.groups.entry(group).or_default().push(id);
        }
        id
    }

    /// Text inserted exactly at the end of a `//` comment would land inside
    /// it; break the line first, once per comment.
    fn guard_line_comment(&mut self, offset: u32, group: Option<GroupId>) {
        if self.line_comment_ends.retire(offset) {
            let text = self.line_delimiter().to_owned();
            self.alloc_edit(EditKind::Insert { text }, Span::point(offset), group);
        }
    }

    pub(crate) fn do_text_insert_str(&mut self, offset: u32, text: &str, group: Option<GroupId>) {
        if text.is_empty() {
            return;
        }
        self.guard_line_comment(offset, group);
        self.alloc_edit(
            EditKind::Insert {
                text: text.to_owned(),
            },
            Span::point(offset),
            group,
        );
    }

    fn do_text_replace(&mut self, span: Span, text: &str, group: Option<GroupId>) {
        self.alloc_edit(
            EditKind::Replace {
                text: text.to_owned(),
            },
            span,
            group,
        );
    }

    pub(crate) fn do_text_remove(&mut self, span: Span, group: Option<GroupId>) {
        if span.start >= span.end {
            return;
        }
        self.alloc_edit(EditKind::Delete, span, group);
    }

    /// Delete `span` and visit `node` inside the deletion scope, so copy
    /// and move sources under removed text still capture.
    pub(crate) fn do_text_remove_and_visit(
        &mut self,
        span: Span,
        node: NodeId,
        group: Option<GroupId>,
    ) -> Result<(), RewriteError> {
        if span.start >= span.end {
            return self.visit(node);
        }
        let edit = self.alloc_edit(EditKind::Delete, span, group);
        self.scope.push(edit);
        let result = self.visit(node);
        self.scope.pop();
        result
    }

    /// Render the new state of `node` and insert it at `offset`, splicing
    /// tracked markers, copy targets and verbatim code along the way.
    pub(crate) fn do_text_insert_node(
        &mut self,
        offset: u32,
        node: NodeId,
        indent: u32,
        remove_leading_indent: bool,
        group: Option<GroupId>,
    ) -> Result<(), RewriteError> {
        let cx = FormatContext {
            tree: self.tree,
            events: self.events,
            placeholders: self.placeholders,
        };
        let formatted = self.formatter.format_node(cx, node, indent);
        let mut start = 0u32;
        if remove_leading_indent {
            start = formatted
                .text
                .bytes()
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count() as u32;
        }
        let end = formatted.text.len() as u32;
        self.splice_formatted(offset, &formatted.text, start, end, &formatted.markers, indent, group)
    }

    /// Emit the text region `[start, end)` of `text` at `offset`, honoring
    /// every marker that falls inside the region.
    #[expect(clippy::too_many_arguments, reason = "one call site per marker nesting level")]
    fn splice_formatted(
        &mut self,
        offset: u32,
        text: &str,
        start: u32,
        end: u32,
        markers: &[NodeMarker],
        indent: u32,
        group: Option<GroupId>,
    ) -> Result<(), RewriteError> {
        let mut cursor = start;
        let mut i = 0;
        while i < markers.len() {
            let marker = markers[i].clone();
            let marker_end = marker.offset + marker.len;
            if marker.offset < cursor || marker_end > end {
                i += 1;
                continue;
            }
            if marker.offset > cursor {
                self.do_text_insert_str(offset, &text[cursor as usize..marker.offset as usize], group);
            }
            match marker.data {
                MarkerData::Tracked(tracked) => {
                    // markers fully inside this region belong to it
                    let mut j = i + 1;
                    while j < markers.len()
                        && marker.len > 0
                        && markers[j].offset < marker_end
                        && markers[j].offset + markers[j].len <= marker_end
                    {
                        j += 1;
                    }
                    let edit = self.alloc_edit(EditKind::RangeMarker, Span::point(offset), group);
                    self.tracked_edits.insert(tracked, edit);
                    self.scope.push(edit);
                    let result = self.splice_formatted(
                        offset,
                        text,
                        marker.offset,
                        marker_end,
                        &markers[i + 1..j],
                        indent,
                        group,
                    );
                    self.scope.pop();
                    result?;
                    cursor = marker_end;
                    i = j;
                    continue;
                }
                MarkerData::CopyPlaceholder(placeholder) => {
                    self.splice_copy_target(offset, placeholder, indent, group)?;
                    cursor = marker_end;
                }
                MarkerData::StringPlaceholder(_) => {
                    let code = &text[marker.offset as usize..marker_end as usize];
                    let dest = self.indent_string(indent);
                    let reindented = change_indent(
                        code,
                        0,
                        self.options.tab_width,
                        self.options.indent_width,
                        &dest,
                    );
                    self.do_text_insert_str(offset, &reindented, group);
                    cursor = marker_end;
                }
            }
            i += 1;
        }
        if cursor < end {
            self.do_text_insert_str(offset, &text[cursor as usize..end as usize], group);
        }
        Ok(())
    }

    fn copy_span(&self, node: NodeId) -> Span {
        if self.events.is_range_copy_placeholder(node) {
            self.tree.span(node)
        } else {
            self.extended(node)
        }
    }

    /// Emit the target edit for a copy/move placeholder, creating the
    /// source edit on first demand.
    fn splice_copy_target(
        &mut self,
        offset: u32,
        placeholder: NodeId,
        indent: u32,
        group: Option<GroupId>,
    ) -> Result<(), RewriteError> {
        let placeholders = self.placeholders;
        let Some(PlaceholderData::Copy(copy)) = placeholders.get(placeholder) else {
            return Err(RewriteError::UnsupportedModification {
                node: placeholder,
                reason: "placeholder carries no copy source".to_owned(),
            });
        };
        let copy = *copy;
        let events = self.events;
        let Some(info) = events.copy_source(copy) else {
            return Err(RewriteError::UnsupportedModification {
                node: placeholder,
                reason: "copy source was never registered".to_owned(),
            });
        };
        let span = self.copy_span(info.node);
        if span.is_dummy() {
            return Err(RewriteError::UnsupportedModification {
                node: info.node,
                reason: "copy source has no location in the buffer".to_owned(),
            });
        }
        if !self.copy_edits.contains_key(&copy) {
            let kind = if info.is_move {
                EditKind::MoveSource { copy }
            } else {
                EditKind::CopySource { copy }
            };
            let edit = self.edits.alloc_detached(kind, span);
            self.copy_edits.insert(copy, edit);
        }
        self.guard_line_comment(offset, group);
        let line_span = self.lines.line_span(self.line_of(span.start), self.source);
        let source_units = self.formatter.indent_units_of(&self.source[line_span.to_range()]);
        let reindent = Some(Reindent {
            source_indent_units: source_units,
            dest_indent: self.indent_string(indent),
            tab_width: self.options.tab_width,
            indent_width: self.options.indent_width,
        });
        let kind = if info.is_move {
            EditKind::MoveTarget { copy, reindent }
        } else {
            EditKind::CopyTarget { copy, reindent }
        };
        self.alloc_edit(kind, Span::point(offset), group);
        if self.line_comment_ends.is_end_of_line_comment(span.end) {
            // the capture ends inside a `//` comment; keep the splice from
            // swallowing whatever follows it at the target
            let text = self.line_delimiter().to_owned();
            self.alloc_edit(EditKind::Insert { text }, Span::point(offset), group);
        }
        Ok(())
    }

    // ---- scanner probes ----

    /// End of the last comment token in `[from, to)`, or `from` if the gap
    /// holds none.
    pub(crate) fn comment_run_end(&mut self, from: u32, to: u32) -> u32 {
        let mut end = from;
        let mut pos = from;
        while pos < to {
            match self.scanner.read_next(pos, true) {
                Ok(token) if token.end() <= to => {
                    if token.kind.is_comment() {
                        end = token.end();
                    }
                    pos = token.end();
                }
                _ => break,
            }
        }
        end
    }

    /// Largest end `<= to` a deletion starting at `from` may reach without
    /// eating a comment owned by neither neighbour.
    pub(crate) fn safe_deletion_end(&mut self, from: u32, to: u32) -> u32 {
        match self.scanner.read_next(from, true) {
            Ok(token) if token.kind.is_comment() && token.start() < to => token.start(),
            _ => to,
        }
    }

    /// End of the next `kind` token at or after `from`, or `from` itself
    /// when the token is absent. Recovery-parsed source may lack the brace
    /// or keyword that well-formed source guarantees.
    fn token_end_or(&mut self, kind: TokenKind, from: u32) -> u32 {
        self.scanner.token_end_offset(kind, from).unwrap_or(from)
    }

    fn find_token_of(&mut self, kinds: &[TokenKind], offset: u32) -> Result<Token, ScanError> {
        let mut token = self.scanner.read_next(offset, false)?;
        while !kinds.contains(&token.kind) {
            token = self.scanner.read_from_current(false)?;
        }
        Ok(token)
    }

    // ---- traversal ----

    pub(crate) fn visit(&mut self, node: NodeId) -> Result<(), RewriteError> {
        ensure_sufficient_stack(|| self.visit_node(node))
    }

    fn visit_node(&mut self, node: NodeId) -> Result<(), RewriteError> {
        if self.placeholders.is_placeholder(node) {
            return Ok(());
        }
        let pushed = self.push_node_scopes(node);
        let result = if self.events.has_changed_properties(node) {
            self.rewrite_properties(node)
        } else {
            self.visit_children(node)
        };
        for _ in 0..pushed {
            self.scope.pop();
        }
        result
    }

    fn visit_children(&mut self, node: NodeId) -> Result<(), RewriteError> {
        for child in self.tree.children(node) {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Open the range-marker and copy-source scopes `node` owns. Returns
    /// how many scopes were pushed.
    fn push_node_scopes(&mut self, node: NodeId) -> usize {
        if self.tree.is_synthesized(node) {
            return 0;
        }
        let events = self.events;
        let mut pushed = 0;
        if let Some(tracked) = events.tracked(node) {
            let edit = self.alloc_edit(EditKind::RangeMarker, self.tree.span(node), None);
            self.tracked_edits.insert(tracked, edit);
            self.scope.push(edit);
            pushed += 1;
        }
        for &copy in events.node_copy_sources(node) {
            let edit = match self.copy_edits.get(&copy).copied() {
                Some(edit) => {
                    // a target rendered first and left the source detached
                    let parent = self.current_scope();
                    self.edits.attach(parent, edit);
                    edit
                }
                None => {
                    let Some(info) = events.copy_source(copy) else {
                        continue;
                    };
                    let span = self.copy_span(node);
                    let kind = if info.is_move {
                        EditKind::MoveSource { copy }
                    } else {
                        EditKind::CopySource { copy }
                    };
                    let edit = self.alloc_edit(kind, span, None);
                    self.copy_edits.insert(copy, edit);
                    edit
                }
            };
            self.scope.push(edit);
            pushed += 1;
        }
        pushed
    }
}

/// Property rewrite shapes shared by the construct handlers. Every helper
/// returns the buffer position the caller continues scanning from.
impl<'e> Analyzer<'e> {
    /// A child that must exist: only in-place replacement is meaningful.
    fn rewrite_required_node(&mut self, node: NodeId, property: Property) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        match events.node_event(node, property) {
            Some(event) if event.change_kind() == ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
            Some(event) if event.change_kind() != ChangeKind::Unchanged => {
                Err(self.unsupported(node, property))
            }
            other => {
                let child = other
                    .and_then(NodeRewriteEvent::original_node)
                    .or_else(|| tree.property(node, property).and_then(PropertyRef::child));
                let Some(child) = child else {
                    return Err(self.unsupported(node, property));
                };
                self.visit(child)?;
                Ok(self.end_of_node(child))
            }
        }
    }

    /// An optional child with fixed glue text around it. The glue is
    /// inserted with the child and assumed to sit between `offset` and the
    /// child's own text in the original, so removal spans from `offset`.
    fn rewrite_optional_node(
        &mut self,
        node: NodeId,
        property: Property,
        offset: u32,
        prefix: &str,
        suffix: &str,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, property) else {
            let child = tree.property(node, property).and_then(PropertyRef::child);
            let Some(child) = child else {
                return Ok(offset);
            };
            self.visit(child)?;
            return Ok(self.end_of_node(child));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(child) = event.original_node() else {
                    return Ok(offset);
                };
                self.visit(child)?;
                Ok(self.end_of_node(child))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(offset);
                };
                self.do_text_insert_str(offset, prefix, event.group);
                let indent = self.indent_at(offset);
                self.do_text_insert_node(offset, new, indent, true, event.group)?;
                self.do_text_insert_str(offset, suffix, event.group);
                Ok(offset)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(offset);
                };
                let mut end = self.end_of_node(original);
                if !suffix.is_empty() {
                    // the glue after the child goes with it
                    end = self.scanner.next_start_offset(end, true).unwrap_or(end).max(end);
                }
                self.do_text_remove_and_visit(Span::new(offset, end), original, event.group)?;
                Ok(end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
        }
    }

    /// An optional operand directly after a keyword (`return`, `throw`,
    /// `break`/`continue` labels). Keeps the single separating space alive:
    /// a replacement whose original abutted the keyword gains one.
    fn rewrite_keyword_operand(
        &mut self,
        node: NodeId,
        property: Property,
        keyword_end: u32,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, property) else {
            let child = tree.property(node, property).and_then(PropertyRef::child);
            let Some(child) = child else {
                return Ok(keyword_end);
            };
            self.visit(child)?;
            return Ok(self.end_of_node(child));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(child) = event.original_node() else {
                    return Ok(keyword_end);
                };
                self.visit(child)?;
                Ok(self.end_of_node(child))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(keyword_end);
                };
                self.do_text_insert_str(keyword_end, " ", event.group);
                let indent = self.indent_at(keyword_end);
                self.do_text_insert_node(keyword_end, new, indent, true, event.group)?;
                Ok(keyword_end)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(keyword_end);
                };
                let end = self.end_of_node(original);
                self.do_text_remove_and_visit(Span::new(keyword_end, end), original, event.group)?;
                Ok(end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                if span.start == keyword_end {
                    self.do_text_insert_str(span.start, " ", event.group);
                }
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
        }
    }

    /// Required type child followed directly by a name. A replacement
    /// whose original abutted the following token keeps the gap alive.
    fn rewrite_type_with_space(&mut self, node: NodeId, property: Property) -> Result<u32, RewriteError> {
        let events = self.events;
        if let Some(event) = events.node_event(node, property) {
            if event.change_kind() == ChangeKind::Replaced {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                let next = self.scanner.next_start_offset(span.end, true).unwrap_or(span.end);
                if next == span.end {
                    self.do_text_insert_str(span.end, " ", event.group);
                }
                return Ok(span.end);
            }
        }
        self.rewrite_required_node(node, property)
    }

    /// A qualifier expression with its trailing `.`, as in `a.this` or
    /// `expr.call()`. The dot comes and goes with the qualifier.
    fn rewrite_optional_qualifier(
        &mut self,
        node: NodeId,
        property: Property,
        offset: u32,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, property) else {
            let child = tree.property(node, property).and_then(PropertyRef::child);
            let Some(child) = child else {
                return Ok(offset);
            };
            self.visit(child)?;
            return Ok(self.end_of_node(child));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(child) = event.original_node() else {
                    return Ok(offset);
                };
                self.visit(child)?;
                Ok(self.end_of_node(child))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(offset);
                };
                let indent = self.indent_at(offset);
                self.do_text_insert_node(offset, new, indent, true, event.group)?;
                self.do_text_insert_str(offset, ".", event.group);
                Ok(offset)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(offset);
                };
                let span = self.extended(original);
                let dot_end = self.scanner.token_end_offset(TokenKind::Dot, span.end)?;
                self.do_text_remove_and_visit(Span::new(span.start, dot_end), original, event.group)?;
                Ok(dot_end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
        }
    }

    /// Statement-position body child whose glue depends on whether the new
    /// child renders brace-first. The prefix carries the `else` keyword for
    /// else contexts, so the keyword travels with the branch.
    fn rewrite_body_node(
        &mut self,
        node: NodeId,
        property: Property,
        offset: u32,
        indent: u32,
        context: BodyContext,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, property) else {
            let child = tree.property(node, property).and_then(PropertyRef::child);
            let Some(child) = child else {
                return Ok(offset);
            };
            self.visit(child)?;
            return Ok(self.end_of_node(child));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(child) = event.original_node() else {
                    return Ok(offset);
                };
                self.visit(child)?;
                Ok(self.end_of_node(child))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(offset);
                };
                let as_block = self.renders_brace_first(new, context);
                let (prefix, suffix) = self.formatter.body_affixes(context, as_block, indent);
                self.do_text_insert_str(offset, &prefix, event.group);
                let child_indent = if as_block { indent } else { indent + 1 };
                self.do_text_insert_node(offset, new, child_indent, true, event.group)?;
                self.do_text_insert_str(offset, &suffix, event.group);
                Ok(offset)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(offset);
                };
                let end = self.end_of_node(original);
                self.do_text_remove_and_visit(Span::new(offset, end), original, event.group)?;
                Ok(end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, property));
                };
                let end = self.end_of_node(original);
                let as_block = self.renders_brace_first(new, context);
                let (prefix, suffix) = self.formatter.body_affixes(context, as_block, indent);
                self.do_text_remove_and_visit(Span::new(offset, end), original, event.group)?;
                self.do_text_insert_str(offset, &prefix, event.group);
                let child_indent = if as_block { indent } else { indent + 1 };
                self.do_text_insert_node(offset, new, child_indent, true, event.group)?;
                self.do_text_insert_str(offset, &suffix, event.group);
                Ok(end)
            }
        }
    }

    fn renders_brace_first(&self, node: NodeId, context: BodyContext) -> bool {
        if self.placeholders.is_placeholder(node) {
            return true;
        }
        match self.tree.kind(node) {
            NodeKind::Block { .. } => true,
            // chained else-if glues onto the keyword like a block does
            NodeKind::IfStatement { .. } => matches!(
                context,
                BodyContext::ElseAfterBlock | BodyContext::ElseAfterStatement
            ),
            _ => false,
        }
    }

    /// Leading doc comment. Removal swallows the whitespace down to the
    /// declaration; insertion brings a line break at the owner's indent.
    fn rewrite_javadoc(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, Property::Javadoc) else {
            let child = tree.property(node, Property::Javadoc).and_then(PropertyRef::child);
            let Some(doc) = child else {
                return Ok(offset);
            };
            self.visit(doc)?;
            return Ok(self.node_end(doc));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(doc) = event.original_node() else {
                    return Ok(offset);
                };
                self.visit(doc)?;
                Ok(self.node_end(doc))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(offset);
                };
                let indent = self.indent_at(offset);
                self.do_text_insert_node(offset, new, indent, true, event.group)?;
                let glue = format!("{}{}", self.line_delimiter(), self.indent_string(indent));
                self.do_text_insert_str(offset, &glue, event.group);
                Ok(offset)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(offset);
                };
                let end = self.node_end(original);
                let next = self.scanner.next_start_offset(end, true).unwrap_or(end).max(end);
                let start = self.node_start(original);
                self.do_text_remove_and_visit(Span::new(start, next), original, event.group)?;
                Ok(end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, Property::Javadoc));
                };
                let span = tree.span(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(span.start);
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
        }
    }

    /// JLS2-style modifiers: a bitmask rendered as a keyword run. The whole
    /// run is rewritten when the mask changes.
    fn rewrite_modifiers(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let events = self.events;
        let Some(event) = events.node_event(node, Property::Modifiers) else {
            return Ok(offset);
        };
        if event.change_kind() == ChangeKind::Unchanged {
            return Ok(offset);
        }
        let new_flags = event
            .new
            .as_ref()
            .and_then(PropertyValue::as_flags)
            .unwrap_or_else(ModifierFlags::empty);
        let mut end = offset;
        loop {
            match self.scanner.read_next(end, false) {
                Ok(token) if is_modifier_token(token.kind) => end = token.end(),
                _ => break,
            }
        }
        let mut text = String::new();
        for &flag in FLAG_ORDER {
            if !new_flags.contains(flag) {
                continue;
            }
            if let Some(keyword) = flag.keyword_text() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(keyword);
            }
        }
        if end == offset {
            if !text.is_empty() {
                text.push(' ');
                self.do_text_insert_str(offset, &text, event.group);
            }
        } else if text.is_empty() {
            // the space after the last keyword goes too
            let next = self.scanner.next_start_offset(end, true).unwrap_or(end).max(end);
            self.do_text_remove(Span::new(offset, next), event.group);
        } else {
            self.do_text_replace(Span::new(offset, end), &text, event.group);
        }
        Ok(end)
    }

    /// JLS3-style modifiers: annotations and keywords as a node list,
    /// space-separated, with a trailing space when created from nothing.
    fn rewrite_modifiers2(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let events = self.events;
        let Some(event) = events.list_event(node, Property::ModifierList) else {
            return self.visit_list_children(node, Property::ModifierList, offset);
        };
        if !event.is_changed() {
            return self.visit_list_children(node, Property::ModifierList, offset);
        }
        let originally_empty = !event.slots.iter().any(|s| s.original_node().is_some());
        let pos = rewrite_slots(
            self,
            ListSlots {
                slots: &event.slots,
                start_pos: offset,
            },
            "",
            &ConstSeparator(" "),
        )?;
        if originally_empty && !event.new_nodes().is_empty() {
            let group = event.slots.iter().find_map(|s| s.group);
            self.do_text_insert_str(offset, " ", group);
        }
        Ok(pos.max(offset))
    }

    /// Whichever modifier representation the node carries.
    fn rewrite_any_modifiers(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let tree = self.tree;
        if tree.property(node, Property::ModifierList).is_some() {
            self.rewrite_modifiers2(node, offset)
        } else if tree.property(node, Property::Modifiers).is_some() {
            self.rewrite_modifiers(node, offset)
        } else {
            Ok(offset)
        }
    }

    /// Changed child list behind `property`, or plain recursion when the
    /// list is untouched.
    fn rewrite_list(
        &mut self,
        node: NodeId,
        property: Property,
        start_pos: u32,
        lead: &str,
        policy: &dyn ListPolicy,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        match events.list_event(node, property) {
            Some(event) if event.is_changed() => rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos,
                },
                lead,
                policy,
            ),
            _ => self.visit_list_children(node, property, start_pos),
        }
    }

    fn visit_list_children(
        &mut self,
        node: NodeId,
        property: Property,
        offset: u32,
    ) -> Result<u32, RewriteError> {
        let tree = self.tree;
        let mut pos = offset;
        if let Some(list) = tree.property(node, property).and_then(PropertyRef::list) {
            for &child in list {
                self.visit(child)?;
                pos = self.end_of_node(child);
            }
        }
        Ok(pos)
    }

    /// A list introduced by a keyword (`throws`, `implements`, bounds after
    /// `extends`). Creation from nothing inserts `lead`; removing every
    /// element pulls the keyword out with the first removal.
    fn rewrite_keyworded_list(
        &mut self,
        node: NodeId,
        property: Property,
        pos: u32,
        intro: TokenKind,
        lead: &str,
        policy: &dyn ListPolicy,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let event = events.list_event(node, property);
        if !event.is_some_and(ListRewriteEvent::is_changed) {
            let originals = tree.property(node, property).and_then(PropertyRef::list).unwrap_or(&[]);
            if originals.is_empty() {
                return Ok(pos);
            }
            for &child in originals {
                self.visit(child)?;
            }
            return Ok(self.end_of_node(originals[originals.len() - 1]));
        }
        let Some(event) = event else {
            return Ok(pos);
        };
        let had_original = event.slots.iter().any(|s| s.original_node().is_some());
        let start_pos = if had_original {
            if event.new_nodes().is_empty() {
                // the walk pulls back to start_pos, taking the keyword too
                self.scanner.token_start_offset(intro, pos)?
            } else {
                self.scanner.token_end_offset(intro, pos)?
            }
        } else {
            pos
        };
        let out = rewrite_slots(
            self,
            ListSlots {
                slots: &event.slots,
                start_pos,
            },
            lead,
            policy,
        )?;
        Ok(out.max(pos))
    }

    /// Type parameters or arguments in angle brackets that appear and
    /// disappear with their content.
    fn rewrite_optional_type_parameters(
        &mut self,
        node: NodeId,
        property: Property,
        pos: u32,
        space_after: bool,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let event = events.list_event(node, property);
        if !event.is_some_and(ListRewriteEvent::is_changed) {
            let originals = tree.property(node, property).and_then(PropertyRef::list).unwrap_or(&[]);
            if originals.is_empty() {
                return Ok(pos);
            }
            for &child in originals {
                self.visit(child)?;
            }
            let last_end = self.end_of_node(originals[originals.len() - 1]);
            return Ok(self.scanner.token_end_offset(TokenKind::Greater, last_end)?);
        }
        let Some(event) = event else {
            return Ok(pos);
        };
        let had_original = event.slots.iter().any(|s| s.original_node().is_some());
        let now_empty = event.new_nodes().is_empty();
        let group = event.slots.iter().find_map(|s| s.group);
        let policy = ConstSeparator(", ");
        if !had_original {
            rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos: pos,
                },
                "<",
                &policy,
            )?;
            self.do_text_insert_str(pos, if space_after { "> " } else { ">" }, group);
            Ok(pos)
        } else if now_empty {
            let less_start = self.scanner.token_start_offset(TokenKind::Less, pos)?;
            let last = event.slots.iter().rev().find_map(NodeRewriteEvent::original_node);
            let last_end = last.map_or(less_start, |n| self.end_of_node(n));
            let greater_end = self.scanner.token_end_offset(TokenKind::Greater, last_end)?;
            let end = if space_after {
                self.scanner
                    .next_start_offset(greater_end, true)
                    .unwrap_or(greater_end)
                    .max(greater_end)
            } else {
                greater_end
            };
            self.remove_region_and_visit(Span::new(less_start, end), &event.slots, group)?;
            Ok(end)
        } else {
            let less_end = self.scanner.token_end_offset(TokenKind::Less, pos)?;
            let out = rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos: less_end,
                },
                "",
                &policy,
            )?;
            Ok(self.scanner.token_end_offset(TokenKind::Greater, out.max(less_end))?)
        }
    }

    /// A parenthesized list whose parens come and go with the elements
    /// (enum constant arguments, try resources).
    fn rewrite_optional_paren_list(
        &mut self,
        node: NodeId,
        property: Property,
        pos: u32,
        space_before: bool,
        separator: &str,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let event = events.list_event(node, property);
        if !event.is_some_and(ListRewriteEvent::is_changed) {
            let originals = tree.property(node, property).and_then(PropertyRef::list).unwrap_or(&[]);
            if originals.is_empty() {
                return Ok(pos);
            }
            for &child in originals {
                self.visit(child)?;
            }
            let last_end = self.end_of_node(originals[originals.len() - 1]);
            return Ok(self.scanner.token_end_offset(TokenKind::RParen, last_end)?);
        }
        let Some(event) = event else {
            return Ok(pos);
        };
        let had_original = event.slots.iter().any(|s| s.original_node().is_some());
        let now_empty = event.new_nodes().is_empty();
        let group = event.slots.iter().find_map(|s| s.group);
        let policy = ConstSeparator(separator);
        if !had_original {
            let lead = if space_before { " (" } else { "(" };
            rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos: pos,
                },
                lead,
                &policy,
            )?;
            self.do_text_insert_str(pos, ")", group);
            Ok(pos)
        } else if now_empty {
            let lparen_start = self.scanner.token_start_offset(TokenKind::LParen, pos)?;
            let last = event.slots.iter().rev().find_map(NodeRewriteEvent::original_node);
            let last_end = last.map_or(lparen_start, |n| self.end_of_node(n));
            let rparen_end = self.scanner.token_end_offset(TokenKind::RParen, last_end)?;
            self.remove_region_and_visit(Span::new(lparen_start, rparen_end), &event.slots, group)?;
            Ok(rparen_end)
        } else {
            let lparen_end = self.scanner.token_end_offset(TokenKind::LParen, pos)?;
            let out = rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos: lparen_end,
                },
                "",
                &policy,
            )?;
            Ok(self.scanner.token_end_offset(TokenKind::RParen, out.max(lparen_end))?)
        }
    }

    /// Delete a whole bracketed region while still visiting the removed
    /// elements inside the deletion scope.
    fn remove_region_and_visit(
        &mut self,
        span: Span,
        slots: &[NodeRewriteEvent],
        group: Option<GroupId>,
    ) -> Result<(), RewriteError> {
        let edit = self.alloc_edit(EditKind::Delete, span, group);
        self.scope.push(edit);
        let mut result = Ok(());
        for slot in slots {
            if let Some(original) = slot.original_node() {
                result = self.visit(original);
                if result.is_err() {
                    break;
                }
            }
        }
        self.scope.pop();
        result
    }

    /// Method body slot: block, or `;` for abstract/native methods. The
    /// two forms convert into each other.
    fn rewrite_method_body(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, Property::Body) else {
            let child = tree.property(node, Property::Body).and_then(PropertyRef::child);
            let Some(body) = child else {
                return Ok(offset);
            };
            self.visit(body)?;
            return Ok(self.end_of_node(body));
        };
        match event.change_kind() {
            ChangeKind::Unchanged => {
                let Some(body) = event.original_node() else {
                    return Ok(offset);
                };
                self.visit(body)?;
                Ok(self.end_of_node(body))
            }
            ChangeKind::Inserted => {
                let Some(new) = event.new_node() else {
                    return Ok(offset);
                };
                let semi_start = self.scanner.token_start_offset(TokenKind::Semicolon, offset)?;
                let semi_end = self.scanner.token_end_offset(TokenKind::Semicolon, offset)?;
                self.do_text_remove(Span::new(semi_start, semi_end), event.group);
                self.do_text_insert_str(semi_start, " ", event.group);
                let indent = self.indent_at(self.node_start(node));
                self.do_text_insert_node(semi_start, new, indent, true, event.group)?;
                Ok(semi_end)
            }
            ChangeKind::Removed => {
                let Some(original) = event.original_node() else {
                    return Ok(offset);
                };
                let end = self.end_of_node(original);
                self.do_text_remove_and_visit(Span::new(offset, end), original, event.group)?;
                self.do_text_insert_str(offset, ";", event.group);
                Ok(end)
            }
            ChangeKind::Replaced => {
                let (Some(original), Some(new)) = (event.original_node(), event.new_node()) else {
                    return Err(self.unsupported(node, Property::Body));
                };
                let span = self.extended(original);
                self.do_text_remove_and_visit(span, original, event.group)?;
                let indent = self.indent_at(self.node_start(node));
                self.do_text_insert_node(span.start, new, indent, true, event.group)?;
                Ok(span.end)
            }
        }
    }

    /// Return type slot of a method declaration; its presence tracks the
    /// constructor flag, so conversion inserts or removes type plus space.
    fn rewrite_return_type(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        self.rewrite_optional_node(node, Property::ReturnType, offset, "", " ")
    }

    /// Trailing `[]` count after a declarator name or array element type.
    fn rewrite_dimensions(
        &mut self,
        node: NodeId,
        property: Property,
        offset: u32,
    ) -> Result<u32, RewriteError> {
        let events = self.events;
        let Some(event) = events.node_event(node, property) else {
            return Ok(offset);
        };
        if event.change_kind() == ChangeKind::Unchanged {
            return Ok(offset);
        }
        let old_count = event.original.as_ref().and_then(PropertyValue::as_number).unwrap_or(0);
        let new_count = event.new.as_ref().and_then(PropertyValue::as_number).unwrap_or(0);
        let mut ends = Vec::new();
        let mut pos = offset;
        for _ in 0..old_count {
            pos = self.scanner.token_end_offset(TokenKind::RBracket, pos)?;
            ends.push(pos);
        }
        if new_count > old_count {
            let text = "[]".repeat((new_count - old_count) as usize);
            self.do_text_insert_str(pos, &text, event.group);
        } else if new_count < old_count {
            let start = if new_count == 0 {
                offset
            } else {
                ends[new_count as usize - 1]
            };
            self.do_text_remove(Span::new(start, pos), event.group);
        }
        Ok(pos)
    }

    /// Replace the next operator token after `offset` with the event's new
    /// operator. No event or an unchanged one leaves the buffer alone.
    fn rewrite_operation(&mut self, node: NodeId, offset: u32) -> Result<u32, RewriteError> {
        let events = self.events;
        let Some(event) = events.node_event(node, Property::Operator) else {
            return Ok(offset);
        };
        if event.change_kind() == ChangeKind::Unchanged {
            return Ok(offset);
        }
        let Some(op) = event.new.as_ref().and_then(PropertyValue::as_operator) else {
            return Err(self.unsupported(node, Property::Operator));
        };
        let token = self.scanner.read_next(offset, false)?;
        self.do_text_replace(token.span, op.as_symbol(), event.group);
        Ok(token.end())
    }

    /// Scalar leaf payloads: identifier text, literal tokens, a modifier
    /// keyword, a primitive type name. The node's whole span is replaced.
    fn rewrite_token_property(&mut self, node: NodeId, property: Property) -> Result<(), RewriteError> {
        let events = self.events;
        let tree = self.tree;
        let Some(event) = events.node_event(node, property) else {
            return Ok(());
        };
        if event.change_kind() == ChangeKind::Unchanged {
            return Ok(());
        }
        let text: &str = match &event.new {
            Some(PropertyValue::Text(name)) => tree.text(*name),
            Some(PropertyValue::Keyword(keyword)) => keyword.as_str(),
            Some(PropertyValue::Primitive(kind)) => kind.as_str(),
            Some(PropertyValue::Flag(value)) => {
                if *value {
                    "true"
                } else {
                    "false"
                }
            }
            _ => return Err(self.unsupported(node, property)),
        };
        let text = text.to_owned();
        self.do_text_replace(tree.span(node), &text, event.group);
        Ok(())
    }

    /// Paragraph policy for a brace-enclosed member list.
    fn member_policy(&self, initial_indent: u32) -> ParagraphPolicy {
        ParagraphPolicy {
            initial_indent,
            blank_lines: None,
            fallback_blank_lines: self.options.blank_lines_between_members,
        }
    }

    /// Paragraph policy for statements: consecutive lines, no blanks.
    fn statement_policy(&self, initial_indent: u32) -> ParagraphPolicy {
        ParagraphPolicy {
            initial_indent,
            blank_lines: Some(0),
            fallback_blank_lines: 0,
        }
    }

    /// `delimiter + indent` lead for a paragraph list created from nothing.
    fn paragraph_lead(&self, indent: u32) -> String {
        format!("{}{}", self.line_delimiter(), self.indent_string(indent))
    }
}

/// One handler per construct: walk the properties in source order, keeping
/// a cursor into the original buffer so scanner probes start close to the
/// text they look for.
impl<'e> Analyzer<'e> {
    fn rewrite_properties(&mut self, node: NodeId) -> Result<(), RewriteError> {
        use Property as P;
        use TokenKind as T;

        let tree = self.tree;
        trace!(node = node.raw(), kind = tree.kind(node).kind_name(), "rewriting node");
        let start = self.node_start(node);
        match tree.kind(node) {
            NodeKind::CompilationUnit { .. } => {
                let delim = self.line_delimiter().to_owned();
                let pos = self.rewrite_optional_node(node, P::Package, start, "", &delim)?;
                let import_policy = self.statement_policy(0);
                let pos = self.rewrite_list(node, P::Imports, pos, &delim, &import_policy)?;
                let type_policy = self.member_policy(0);
                self.rewrite_list(node, P::Types, pos, &delim, &type_policy)?;
            }
            NodeKind::PackageDeclaration { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                self.rewrite_list(node, P::Annotations, pos, "", &ConstSeparator(" "))?;
                self.rewrite_required_node(node, P::Name)?;
            }
            NodeKind::ImportDeclaration { .. } => {
                let import_end = self.scanner.token_end_offset(T::Import, start)?;
                let events = self.events;
                if let Some(event) = events.node_event(node, P::StaticFlag) {
                    if event.change_kind() != ChangeKind::Unchanged {
                        let is_static =
                            event.new.as_ref().and_then(PropertyValue::as_flag).unwrap_or(false);
                        if is_static {
                            self.do_text_insert_str(import_end, " static", event.group);
                        } else {
                            let static_end = self.scanner.token_end_offset(T::Static, import_end)?;
                            self.do_text_remove(Span::new(import_end, static_end), event.group);
                        }
                    }
                }
                let name_end = self.rewrite_required_node(node, P::Name)?;
                if let Some(event) = events.node_event(node, P::OnDemand) {
                    if event.change_kind() != ChangeKind::Unchanged {
                        let on_demand =
                            event.new.as_ref().and_then(PropertyValue::as_flag).unwrap_or(false);
                        if on_demand {
                            self.do_text_insert_str(name_end, ".*", event.group);
                        } else {
                            let star_end = self.scanner.token_end_offset(T::Star, name_end)?;
                            self.do_text_remove(Span::new(name_end, star_end), event.group);
                        }
                    }
                }
            }
            NodeKind::TypeDeclaration { .. } => {
                let events = self.events;
                let pos = self.rewrite_javadoc(node, start)?;
                let mut pos = self.rewrite_any_modifiers(node, pos)?;
                let is_interface = events
                    .new_value(tree, node, P::InterfaceFlag)
                    .and_then(|v| v.as_flag())
                    .unwrap_or(false);
                let was_interface = events
                    .original_value(tree, node, P::InterfaceFlag)
                    .and_then(|v| v.as_flag())
                    .unwrap_or(false);
                if let Some(event) = events.node_event(node, P::InterfaceFlag) {
                    if event.change_kind() != ChangeKind::Unchanged {
                        let token = self.find_token_of(&[T::Class, T::Interface], pos)?;
                        let text = if is_interface { "interface" } else { "class" };
                        self.do_text_replace(token.span, text, event.group);
                        pos = token.end();
                    }
                }
                let pos = self.rewrite_required_node(node, P::Name)?.max(pos);
                let pos = self.rewrite_optional_type_parameters(node, P::TypeParameters, pos, false)?;
                let pos = self.rewrite_optional_node(node, P::Superclass, pos, " extends ", "")?;
                let originals = tree
                    .property(node, P::SuperInterfaces)
                    .and_then(PropertyRef::list)
                    .unwrap_or(&[]);
                if was_interface != is_interface && !originals.is_empty() {
                    // keep the heritage keyword in step with the new kind
                    let old_kw = if was_interface { T::Extends } else { T::Implements };
                    let group = events.node_event(node, P::InterfaceFlag).and_then(|e| e.group);
                    let token = self.scanner.read_to_token(old_kw, pos)?;
                    let text = if is_interface { "extends" } else { "implements" };
                    self.do_text_replace(token.span, text, group);
                }
                let intro = if was_interface { T::Extends } else { T::Implements };
                let lead = if is_interface { " extends " } else { " implements " };
                let pos = self.rewrite_keyworded_list(
                    node,
                    P::SuperInterfaces,
                    pos,
                    intro,
                    lead,
                    &ConstSeparator(", "),
                )?;
                let lbrace_end = self.token_end_or(T::LBrace, pos);
                let indent = self.indent_at(start) + 1;
                let body_lead = self.paragraph_lead(indent);
                let body_policy = self.member_policy(indent);
                self.rewrite_list(node, P::BodyDeclarations, lbrace_end, &body_lead, &body_policy)?;
            }
            NodeKind::EnumDeclaration { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                self.rewrite_any_modifiers(node, pos)?;
                let name_end = self.rewrite_required_node(node, P::Name)?;
                let pos = self.rewrite_keyworded_list(
                    node,
                    P::SuperInterfaces,
                    name_end,
                    T::Implements,
                    " implements ",
                    &ConstSeparator(", "),
                )?;
                let lbrace_end = self.token_end_or(T::LBrace, pos.max(name_end));
                let indent = self.indent_at(start) + 1;
                let constant_lead = self.paragraph_lead(indent);
                let pos = self.rewrite_list(
                    node,
                    P::EnumConstants,
                    lbrace_end,
                    &constant_lead,
                    &ConstSeparator(", "),
                )?;
                self.rewrite_enum_body(node, pos.max(lbrace_end), indent)?;
            }
            NodeKind::EnumConstantDeclaration { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                self.rewrite_any_modifiers(node, pos)?;
                let name_end = self.rewrite_required_node(node, P::Name)?;
                self.rewrite_optional_paren_list(node, P::Arguments, name_end, false, ", ")?;
            }
            NodeKind::FieldDeclaration { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                self.rewrite_any_modifiers(node, pos)?;
                let type_end = self.rewrite_type_with_space(node, P::Type)?;
                self.rewrite_list(node, P::Fragments, type_end, " ", &ConstSeparator(", "))?;
            }
            NodeKind::MethodDeclaration { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                let pos = self.rewrite_any_modifiers(node, pos)?;
                let pos = self.rewrite_optional_type_parameters(node, P::TypeParameters, pos, true)?;
                self.rewrite_return_type(node, pos)?;
                let name_end = self.rewrite_required_node(node, P::Name)?;
                let lparen_end = self.scanner.token_end_offset(T::LParen, name_end)?;
                let after = self.rewrite_list(node, P::Parameters, lparen_end, "", &ConstSeparator(", "))?;
                let rparen_end = self.scanner.token_end_offset(T::RParen, after.max(lparen_end))?;
                let pos = self.rewrite_dimensions(node, P::ExtraDimensions, rparen_end)?;
                let pos = self.rewrite_keyworded_list(
                    node,
                    P::Thrown,
                    pos.max(rparen_end),
                    T::Throws,
                    " throws ",
                    &ConstSeparator(", "),
                )?;
                self.rewrite_method_body(node, pos)?;
            }
            NodeKind::Initializer { .. } => {
                let pos = self.rewrite_javadoc(node, start)?;
                self.rewrite_any_modifiers(node, pos)?;
                self.rewrite_required_node(node, P::Body)?;
            }
            NodeKind::SingleVariableDeclaration { .. } => {
                self.rewrite_any_modifiers(node, start)?;
                let type_end = self.rewrite_type_with_space(node, P::Type)?;
                let events = self.events;
                if let Some(event) = events.node_event(node, P::VarargsFlag) {
                    if event.change_kind() != ChangeKind::Unchanged {
                        let varargs =
                            event.new.as_ref().and_then(PropertyValue::as_flag).unwrap_or(false);
                        if varargs {
                            self.do_text_insert_str(type_end, "...", event.group);
                        } else {
                            let ellipsis_end =
                                self.scanner.token_end_offset(T::Ellipsis, type_end)?;
                            self.do_text_remove(Span::new(type_end, ellipsis_end), event.group);
                        }
                    }
                }
                let name_end = self.rewrite_required_node(node, P::Name)?;
                let pos = self.rewrite_dimensions(node, P::ExtraDimensions, name_end)?;
                self.rewrite_optional_node(node, P::Initializer, pos.max(name_end), " = ", "")?;
            }
            NodeKind::VariableDeclarationFragment { .. } => {
                let name_end = self.rewrite_required_node(node, P::Name)?;
                let pos = self.rewrite_dimensions(node, P::ExtraDimensions, name_end)?;
                self.rewrite_optional_node(node, P::Initializer, pos.max(name_end), " = ", "")?;
            }
            NodeKind::VariableDeclarationStatement { .. }
            | NodeKind::VariableDeclarationExpression { .. } => {
                self.rewrite_any_modifiers(node, start)?;
                let type_end = self.rewrite_type_with_space(node, P::Type)?;
                self.rewrite_list(node, P::Fragments, type_end, " ", &ConstSeparator(", "))?;
            }
            NodeKind::Javadoc { .. } => {
                self.rewrite_token_property(node, P::CommentText)?;
            }
            NodeKind::Modifier { .. } => {
                self.rewrite_token_property(node, P::Keyword)?;
            }
            NodeKind::MarkerAnnotation { .. } => {
                self.rewrite_required_node(node, P::TypeName)?;
            }
            NodeKind::SingleMemberAnnotation { .. } => {
                self.rewrite_required_node(node, P::TypeName)?;
                self.rewrite_required_node(node, P::Value)?;
            }
            NodeKind::NormalAnnotation { .. } => {
                let tn_end = self.rewrite_required_node(node, P::TypeName)?;
                let lparen_end = self.scanner.token_end_offset(T::LParen, tn_end)?;
                self.rewrite_list(node, P::Values, lparen_end, "", &ConstSeparator(", "))?;
            }
            NodeKind::MemberValuePair { .. } => {
                self.rewrite_required_node(node, P::Name)?;
                self.rewrite_required_node(node, P::Value)?;
            }
            NodeKind::Block { .. } => {
                let lbrace_end = self.token_end_or(T::LBrace, start);
                let indent = self.indent_at(start) + 1;
                let lead = self.paragraph_lead(indent);
                let policy = self.statement_policy(indent);
                self.rewrite_list(node, P::Statements, lbrace_end, &lead, &policy)?;
            }
            NodeKind::ExpressionStatement { .. } => {
                self.rewrite_required_node(node, P::Expression)?;
            }
            NodeKind::ReturnStatement { .. } => {
                let keyword_end = self.scanner.token_end_offset(T::Return, start)?;
                self.rewrite_keyword_operand(node, P::Expression, keyword_end)?;
            }
            NodeKind::ThrowStatement { .. } => {
                let keyword_end = self.scanner.token_end_offset(T::Throw, start)?;
                self.rewrite_keyword_operand(node, P::Expression, keyword_end)?;
            }
            NodeKind::AssertStatement { .. } => {
                let keyword_end = self.scanner.token_end_offset(T::Assert, start)?;
                let pos = self.rewrite_keyword_operand(node, P::Expression, keyword_end)?;
                self.rewrite_optional_node(node, P::Message, pos, " : ", "")?;
            }
            NodeKind::IfStatement { .. } => {
                let events = self.events;
                let cond_end = self.rewrite_required_node(node, P::Expression)?;
                let rparen_end = self.scanner.token_end_offset(T::RParen, cond_end)?;
                let indent = self.indent_at(start);
                let has_else = events.new_value(tree, node, P::ElseStatement).is_some();
                let then_context = if has_else {
                    BodyContext::IfWithElse
                } else {
                    BodyContext::IfNoElse
                };
                let pos =
                    self.rewrite_body_node(node, P::ThenStatement, rparen_end, indent, then_context)?;
                let then_is_block = events
                    .new_value(tree, node, P::ThenStatement)
                    .and_then(|v| v.as_child())
                    .is_some_and(|t| self.renders_brace_first(t, BodyContext::IfNoElse));
                let else_context = if then_is_block {
                    BodyContext::ElseAfterBlock
                } else {
                    BodyContext::ElseAfterStatement
                };
                self.rewrite_body_node(node, P::ElseStatement, pos, indent, else_context)?;
            }
            NodeKind::WhileStatement { .. } => {
                let cond_end = self.rewrite_required_node(node, P::Expression)?;
                let rparen_end = self.scanner.token_end_offset(T::RParen, cond_end)?;
                let indent = self.indent_at(start);
                self.rewrite_body_node(node, P::Body, rparen_end, indent, BodyContext::LoopBody)?;
            }
            NodeKind::DoStatement { .. } => {
                let do_end = self.scanner.token_end_offset(T::Do, start)?;
                let indent = self.indent_at(start);
                self.rewrite_body_node(node, P::Body, do_end, indent, BodyContext::DoBody)?;
                self.rewrite_required_node(node, P::Expression)?;
            }
            NodeKind::ForStatement { .. } => {
                let lparen_end = self.scanner.token_end_offset(T::LParen, start)?;
                let pos =
                    self.rewrite_list(node, P::Initializers, lparen_end, "", &ConstSeparator(", "))?;
                let semi1 = self.scanner.token_end_offset(T::Semicolon, pos.max(lparen_end))?;
                let pos = self.rewrite_optional_node(node, P::Expression, semi1, " ", "")?;
                let semi2 = self.scanner.token_end_offset(T::Semicolon, pos.max(semi1))?;
                let pos = self.rewrite_list(node, P::Updaters, semi2, " ", &ConstSeparator(", "))?;
                let rparen_end = self.scanner.token_end_offset(T::RParen, pos.max(semi2))?;
                let indent = self.indent_at(start);
                self.rewrite_body_node(node, P::Body, rparen_end, indent, BodyContext::LoopBody)?;
            }
            NodeKind::EnhancedForStatement { .. } => {
                self.rewrite_required_node(node, P::Parameter)?;
                let expr_end = self.rewrite_required_node(node, P::Expression)?;
                let rparen_end = self.scanner.token_end_offset(T::RParen, expr_end)?;
                let indent = self.indent_at(start);
                self.rewrite_body_node(node, P::Body, rparen_end, indent, BodyContext::LoopBody)?;
            }
            NodeKind::SwitchStatement { .. } => {
                let expr_end = self.rewrite_required_node(node, P::Expression)?;
                let lbrace_end = self.token_end_or(T::LBrace, expr_end);
                let indent = self.indent_at(start) + 1;
                let lead = self.paragraph_lead(indent);
                let policy = SwitchPolicy {
                    initial_indent: indent,
                    indent_statements: self.options.indent_switch_cases,
                };
                self.rewrite_list(node, P::Statements, lbrace_end, &lead, &policy)?;
            }
            NodeKind::SwitchCase { .. } => {
                let events = self.events;
                match events.node_event(node, P::Expression) {
                    Some(event) if event.change_kind() == ChangeKind::Inserted => {
                        // default label becomes a case label
                        let Some(new) = event.new_node() else {
                            return Ok(());
                        };
                        let token = self.scanner.read_to_token(T::Default, start)?;
                        self.do_text_replace(token.span, "case ", event.group);
                        let indent = self.indent_at(start);
                        self.do_text_insert_node(token.end(), new, indent, true, event.group)?;
                    }
                    Some(event) if event.change_kind() == ChangeKind::Removed => {
                        let Some(original) = event.original_node() else {
                            return Ok(());
                        };
                        let case_start = self.scanner.token_start_offset(T::Case, start)?;
                        let end = self.end_of_node(original);
                        self.do_text_remove_and_visit(
                            Span::new(case_start, end),
                            original,
                            event.group,
                        )?;
                        self.do_text_insert_str(case_start, "default", event.group);
                    }
                    _ => {
                        self.rewrite_keyword_operand(node, P::Expression, start)?;
                    }
                }
            }
            NodeKind::BreakStatement { .. } => {
                let keyword_end = self.scanner.token_end_offset(T::Break, start)?;
                self.rewrite_keyword_operand(node, P::Label, keyword_end)?;
            }
            NodeKind::ContinueStatement { .. } => {
                let keyword_end = self.scanner.token_end_offset(T::Continue, start)?;
                self.rewrite_keyword_operand(node, P::Label, keyword_end)?;
            }
            NodeKind::LabeledStatement { .. } => {
                self.rewrite_required_node(node, P::Label)?;
                self.rewrite_required_node(node, P::Body)?;
            }
            NodeKind::SynchronizedStatement { .. } => {
                self.rewrite_required_node(node, P::Expression)?;
                self.rewrite_required_node(node, P::Body)?;
            }
            NodeKind::TryStatement { .. } => {
                let try_end = self.token_end_or(T::Try, start);
                self.rewrite_optional_paren_list(node, P::Resources, try_end, true, "; ")?;
                let body_end = self.rewrite_required_node(node, P::Body)?;
                let pos = self.rewrite_list(node, P::CatchClauses, body_end, " ", &ConstSeparator(" "))?;
                self.rewrite_optional_node(node, P::Finally, pos.max(body_end), " finally ", "")?;
            }
            NodeKind::CatchClause { .. } => {
                self.rewrite_required_node(node, P::Exception)?;
                self.rewrite_required_node(node, P::Body)?;
            }
            NodeKind::SimpleName { .. } => {
                self.rewrite_token_property(node, P::Identifier)?;
            }
            NodeKind::QualifiedName { .. } => {
                self.rewrite_required_node(node, P::Qualifier)?;
                self.rewrite_required_node(node, P::Name)?;
            }
            NodeKind::NumberLiteral { .. } => {
                self.rewrite_token_property(node, P::Token)?;
            }
            NodeKind::StringLiteral { .. } | NodeKind::CharacterLiteral { .. } => {
                self.rewrite_token_property(node, P::EscapedValue)?;
            }
            NodeKind::BooleanLiteral { .. } => {
                self.rewrite_token_property(node, P::BooleanValue)?;
            }
            NodeKind::ThisExpression { .. } => {
                self.rewrite_optional_qualifier(node, P::Qualifier, start)?;
            }
            NodeKind::Assignment { .. } => {
                let left_end = self.rewrite_required_node(node, P::LeftHandSide)?;
                self.rewrite_operation(node, left_end)?;
                self.rewrite_required_node(node, P::RightHandSide)?;
            }
            NodeKind::InfixExpression { .. } => {
                self.rewrite_infix(node)?;
            }
            NodeKind::PrefixExpression { .. } => {
                self.rewrite_operation(node, start)?;
                self.rewrite_required_node(node, P::Operand)?;
            }
            NodeKind::PostfixExpression { .. } => {
                let operand_end = self.rewrite_required_node(node, P::Operand)?;
                self.rewrite_operation(node, operand_end)?;
            }
            NodeKind::MethodInvocation { .. } => {
                self.rewrite_optional_qualifier(node, P::Expression, start)?;
                let name_end = self.rewrite_required_node(node, P::Name)?;
                let lparen_end = self.scanner.token_end_offset(T::LParen, name_end)?;
                self.rewrite_list(node, P::Arguments, lparen_end, "", &ConstSeparator(", "))?;
            }
            NodeKind::ClassInstanceCreation { .. } => {
                self.rewrite_optional_qualifier(node, P::Expression, start)?;
                let type_end = self.rewrite_required_node(node, P::Type)?;
                let lparen_end = self.scanner.token_end_offset(T::LParen, type_end)?;
                self.rewrite_list(node, P::Arguments, lparen_end, "", &ConstSeparator(", "))?;
            }
            NodeKind::FieldAccess { .. } => {
                self.rewrite_required_node(node, P::Expression)?;
                self.rewrite_required_node(node, P::Name)?;
            }
            NodeKind::ArrayAccess { .. } => {
                self.rewrite_required_node(node, P::Array)?;
                self.rewrite_required_node(node, P::Index)?;
            }
            NodeKind::ArrayCreation { .. } => {
                let type_end = self.rewrite_required_node(node, P::Type)?;
                self.rewrite_array_dimensions(node)?;
                self.rewrite_optional_node(node, P::Initializer, type_end, " ", "")?;
            }
            NodeKind::ArrayInitializer { .. } => {
                let lbrace_end = self.token_end_or(T::LBrace, start);
                self.rewrite_list(node, P::Expressions, lbrace_end, "", &ConstSeparator(", "))?;
            }
            NodeKind::ParenthesizedExpression { .. } => {
                self.rewrite_required_node(node, P::Expression)?;
            }
            NodeKind::ConditionalExpression { .. } => {
                self.rewrite_required_node(node, P::Expression)?;
                self.rewrite_required_node(node, P::ThenExpression)?;
                self.rewrite_required_node(node, P::ElseExpression)?;
            }
            NodeKind::CastExpression { .. } => {
                self.rewrite_required_node(node, P::Type)?;
                self.rewrite_required_node(node, P::Expression)?;
            }
            NodeKind::InstanceofExpression { .. } => {
                self.rewrite_required_node(node, P::LeftOperand)?;
                self.rewrite_required_node(node, P::RightOperand)?;
            }
            NodeKind::PrimitiveType { .. } => {
                self.rewrite_token_property(node, P::PrimitiveTypeCode)?;
            }
            NodeKind::SimpleType { .. } => {
                self.rewrite_required_node(node, P::Name)?;
            }
            NodeKind::ArrayType { .. } => {
                let elem_end = self.rewrite_required_node(node, P::ElementType)?;
                self.rewrite_dimensions(node, P::DimensionCount, elem_end)?;
            }
            NodeKind::ParameterizedType { .. } => {
                let base_end = self.rewrite_required_node(node, P::Type)?;
                let less_end = self.scanner.token_end_offset(T::Less, base_end)?;
                self.rewrite_list(node, P::TypeArguments, less_end, "", &ConstSeparator(", "))?;
            }
            NodeKind::TypeParameter { .. } => {
                let name_end = self.rewrite_required_node(node, P::Name)?;
                self.rewrite_keyworded_list(
                    node,
                    P::TypeBounds,
                    name_end,
                    T::Extends,
                    " extends ",
                    &ConstSeparator(" & "),
                )?;
            }
            _ => {
                self.visit_children(node)?;
            }
        }
        Ok(())
    }

    /// Member declarations after the enum constants, with the separating
    /// `;` synthesized when members appear for the first time.
    fn rewrite_enum_body(&mut self, node: NodeId, pos: u32, indent: u32) -> Result<(), RewriteError> {
        let events = self.events;
        let Some(event) = events.list_event(node, Property::BodyDeclarations) else {
            self.visit_list_children(node, Property::BodyDeclarations, pos)?;
            return Ok(());
        };
        if !event.is_changed() {
            self.visit_list_children(node, Property::BodyDeclarations, pos)?;
            return Ok(());
        }
        let had_original = event.slots.iter().any(|s| s.original_node().is_some());
        let policy = self.member_policy(indent);
        if had_original {
            let start_pos = self.scanner.token_end_offset(TokenKind::Semicolon, pos).unwrap_or(pos);
            rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos,
                },
                "",
                &policy,
            )?;
        } else {
            let lead = format!(";{}", self.paragraph_lead(indent));
            rewrite_slots(
                self,
                ListSlots {
                    slots: &event.slots,
                    start_pos: pos,
                },
                &lead,
                &policy,
            )?;
        }
        Ok(())
    }

    /// Infix chains: a changed operator is propagated to the tokens before
    /// each untouched extended operand; a changed operand list renders its
    /// separators from the new operator instead.
    fn rewrite_infix(&mut self, node: NodeId) -> Result<(), RewriteError> {
        use Property as P;

        let events = self.events;
        let tree = self.tree;
        let left_end = self.rewrite_required_node(node, P::LeftOperand)?;
        let op_event = events.node_event(node, P::Operator);
        let op_changed = op_event.is_some_and(|e| e.change_kind() != ChangeKind::Unchanged);
        let symbol = events
            .new_value(tree, node, P::Operator)
            .and_then(|v| v.as_operator())
            .map_or("", |op| op.as_symbol());
        if op_changed {
            self.rewrite_operation(node, left_end)?;
        }
        let right_end = self.rewrite_required_node(node, P::RightOperand)?;
        let ext_changed = events
            .list_event(node, P::ExtendedOperands)
            .is_some_and(ListRewriteEvent::is_changed);
        if op_changed && !ext_changed {
            let group = op_event.and_then(|e| e.group);
            let operands = tree
                .property(node, P::ExtendedOperands)
                .and_then(PropertyRef::list)
                .unwrap_or(&[]);
            let mut pos = right_end;
            for &operand in operands {
                let token = self.scanner.read_next(pos, false)?;
                self.do_text_replace(token.span, symbol, group);
                self.visit(operand)?;
                pos = self.end_of_node(operand);
            }
        } else {
            let separator = format!(" {symbol} ");
            self.rewrite_list(
                node,
                P::ExtendedOperands,
                right_end,
                &separator,
                &ConstSeparator(&separator),
            )?;
        }
        Ok(())
    }

    /// Array creation dimension expressions rewrite in place only; the
    /// bracket structure itself is not reshaped.
    fn rewrite_array_dimensions(&mut self, node: NodeId) -> Result<(), RewriteError> {
        let events = self.events;
        let Some(event) = events.list_event(node, Property::Dimensions) else {
            self.visit_list_children(node, Property::Dimensions, 0)?;
            return Ok(());
        };
        if !event.is_changed() {
            self.visit_list_children(node, Property::Dimensions, 0)?;
            return Ok(());
        }
        for slot in &event.slots {
            match slot.change_kind() {
                ChangeKind::Unchanged => {
                    if let Some(original) = slot.original_node() {
                        self.visit(original)?;
                    }
                }
                ChangeKind::Replaced => {
                    let (Some(original), Some(new)) = (slot.original_node(), slot.new_node()) else {
                        return Err(self.unsupported(node, Property::Dimensions));
                    };
                    let span = self.extended(original);
                    self.do_text_remove_and_visit(span, original, slot.group)?;
                    let indent = self.indent_at(span.start);
                    self.do_text_insert_node(span.start, new, indent, true, slot.group)?;
                }
                ChangeKind::Inserted | ChangeKind::Removed => {
                    return Err(self.unsupported(node, Property::Dimensions));
                }
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use graft_ir::{LanguageLevel, Modifiers};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::flatten::Flattener;
    use crate::range::RawRange;

    fn run(source: &str, tree: &Tree, events: &RewriteEventStore, root: NodeId) -> String {
        let placeholders = PlaceholderStore::new();
        let options = RewriteOptions::default();
        let formatter = Flattener::new(&options);
        let extender = RawRange;
        let mut analyzer =
            Analyzer::new(tree, events, &placeholders, &extender, &formatter, &options, source);
        let Ok(()) = analyzer.visit(root) else {
            panic!("rewrite failed");
        };
        analyzer.finish().edits.apply(source)
    }

    fn name_at(tree: &mut Tree, text: &str, span: Span) -> NodeId {
        let identifier = tree.intern(text);
        tree.alloc(NodeKind::SimpleName { identifier }, span)
    }

    #[test]
    fn test_untouched_tree_is_identity() {
        let source = "foo();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = name_at(&mut tree, "foo", Span::new(0, 3));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name,
                arguments: vec![],
            },
            Span::new(0, 5),
        );
        let stmt = tree.alloc(NodeKind::ExpressionStatement { expression: call }, Span::new(0, 6));
        let events = RewriteEventStore::new();
        assert_eq!(run(source, &tree, &events, stmt), source);
    }

    #[test]
    fn test_replace_invocation_name() {
        let source = "foo();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = name_at(&mut tree, "foo", Span::new(0, 3));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name,
                arguments: vec![],
            },
            Span::new(0, 5),
        );
        let stmt = tree.alloc(NodeKind::ExpressionStatement { expression: call }, Span::new(0, 6));
        let replacement = tree.simple_name("bar");
        let mut events = RewriteEventStore::new();
        events.set_node_event(
            call,
            Property::Name,
            NodeRewriteEvent::new(
                Some(PropertyValue::Child(name)),
                Some(PropertyValue::Child(replacement)),
            ),
        );
        assert_eq!(run(source, &tree, &events, stmt), "bar();");
    }

    #[test]
    fn test_insert_argument_between_existing() {
        let source = "f(a, b);";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a = name_at(&mut tree, "a", Span::new(2, 3));
        let b = name_at(&mut tree, "b", Span::new(5, 6));
        let name = name_at(&mut tree, "f", Span::new(0, 1));
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name,
                arguments: vec![a, b],
            },
            Span::new(0, 7),
        );
        let stmt = tree.alloc(NodeKind::ExpressionStatement { expression: call }, Span::new(0, 8));
        let x = tree.simple_name("x");
        let mut events = RewriteEventStore::new();
        events
            .list_event_mut(&tree, call, Property::Arguments)
            .insert(x, Some(1), None);
        assert_eq!(run(source, &tree, &events, stmt), "f(a, x, b);");
    }

    #[test]
    fn test_remove_statement_keeps_block_layout() {
        let source = "{\n    a();\n    b();\n}";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a_name = name_at(&mut tree, "a", Span::new(6, 7));
        let a_call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: a_name,
                arguments: vec![],
            },
            Span::new(6, 9),
        );
        let a_stmt =
            tree.alloc(NodeKind::ExpressionStatement { expression: a_call }, Span::new(6, 10));
        let b_name = name_at(&mut tree, "b", Span::new(15, 16));
        let b_call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: b_name,
                arguments: vec![],
            },
            Span::new(15, 18),
        );
        let b_stmt =
            tree.alloc(NodeKind::ExpressionStatement { expression: b_call }, Span::new(15, 19));
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt, b_stmt],
            },
            Span::new(0, 21),
        );
        let mut events = RewriteEventStore::new();
        events
            .list_event_mut(&tree, block, Property::Statements)
            .remove(a_stmt, None);
        assert_eq!(run(source, &tree, &events, block), "{\n    b();\n}");
    }

    #[test]
    fn test_braceless_block_removal_anchors_at_start() {
        // recovery-parsed fragment: a block node with no surrounding braces
        let source = "a(); b();";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a_name = name_at(&mut tree, "a", Span::new(0, 1));
        let a_call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: a_name,
                arguments: vec![],
            },
            Span::new(0, 3),
        );
        let a_stmt =
            tree.alloc(NodeKind::ExpressionStatement { expression: a_call }, Span::new(0, 4));
        let b_name = name_at(&mut tree, "b", Span::new(5, 6));
        let b_call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: b_name,
                arguments: vec![],
            },
            Span::new(5, 8),
        );
        let b_stmt =
            tree.alloc(NodeKind::ExpressionStatement { expression: b_call }, Span::new(5, 9));
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a_stmt, b_stmt],
            },
            Span::new(0, 9),
        );
        let mut events = RewriteEventStore::new();
        events
            .list_event_mut(&tree, block, Property::Statements)
            .remove(a_stmt, None);
        assert_eq!(run(source, &tree, &events, block), "b();");
    }

    #[test]
    fn test_flag_modifiers_rewrite_whole_run() {
        let source = "private int x;";
        let mut tree = Tree::new(LanguageLevel::Jls2);
        let name = name_at(&mut tree, "x", Span::new(12, 13));
        let fragment = tree.alloc(
            NodeKind::VariableDeclarationFragment {
                name,
                extra_dimensions: 0,
                initializer: None,
            },
            Span::new(12, 13),
        );
        let int_type = tree.alloc(
            NodeKind::PrimitiveType {
                kind: graft_ir::PrimitiveKind::Int,
            },
            Span::new(8, 11),
        );
        let field = tree.alloc(
            NodeKind::FieldDeclaration {
                javadoc: None,
                modifiers: Modifiers::Flags(ModifierFlags::PRIVATE),
                field_type: int_type,
                fragments: vec![fragment],
            },
            Span::new(0, 14),
        );
        let mut events = RewriteEventStore::new();
        events.set_node_event(
            field,
            Property::Modifiers,
            NodeRewriteEvent::new(
                Some(PropertyValue::Flags(ModifierFlags::PRIVATE)),
                Some(PropertyValue::Flags(ModifierFlags::PUBLIC | ModifierFlags::STATIC)),
            ),
        );
        assert_eq!(run(source, &tree, &events, field), "public static int x;");
    }

    #[test]
    fn test_return_gains_expression_with_space() {
        let source = "return;";
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let ret = tree.alloc(NodeKind::ReturnStatement { expression: None }, Span::new(0, 7));
        let x = tree.simple_name("x");
        let mut events = RewriteEventStore::new();
        events.set_node_event(
            ret,
            Property::Expression,
            NodeRewriteEvent::new(None, Some(PropertyValue::Child(x))),
        );
        assert_eq!(run(source, &tree, &events, ret), "return x;");
    }
}
