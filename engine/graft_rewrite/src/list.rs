//! List reconciliation.
//!
//! A changed child list is rendered by walking its slots in order,
//! stitching retained source regions together with freshly formatted text.
//! The walk keeps a cursor into the original buffer plus the state of the
//! separator between the previous slot and the cursor. Spacing decisions
//! (separator text, indentation of inserted elements, whether a separator
//! may be deleted alongside its element) live behind [`ListPolicy`] so
//! comma lists, paragraph lists and switch bodies share one walk.

use graft_ir::{NodeId, NodeKind, Span};

use crate::analyzer::Analyzer;
use crate::error::RewriteError;
use crate::event::{ChangeKind, GroupId, NodeRewriteEvent};

/// A changed child list: the recorded slots plus the buffer offset the
/// list starts at, right after any introducing token.
#[derive(Clone, Copy)]
pub(crate) struct ListSlots<'s> {
    pub(crate) slots: &'s [NodeRewriteEvent],
    pub(crate) start_pos: u32,
}

impl ListSlots<'_> {
    fn kind(&self, index: usize) -> ChangeKind {
        self.slots[index].change_kind()
    }

    fn original(&self, index: usize) -> Option<NodeId> {
        self.slots[index].original_node()
    }

    /// The node standing for a slot: the original if present, otherwise
    /// the replacement.
    fn node(&self, index: usize) -> Option<NodeId> {
        self.slots[index]
            .original_node()
            .or_else(|| self.slots[index].new_node())
    }
}

/// Spacing decisions for one list shape.
///
/// `index` arguments follow the walk: `separator(.., i)` is the text that
/// goes between slot `i` and slot `i + 1`.
pub(crate) trait ListPolicy {
    /// Separator text inserted after slot `index`.
    fn separator(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> String;

    /// Indentation units for freshly formatted text at slot `index`.
    fn node_indent(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> u32;

    /// Whether the separator following a removed slot is deleted with it.
    /// `offset` is the buffer position the removal starts at.
    fn must_remove_separator(
        &self,
        _an: &Analyzer<'_>,
        _list: &ListSlots<'_>,
        _index: usize,
        _offset: u32,
    ) -> bool {
        true
    }

    /// Hook run before a replaced slot is rewritten in place.
    fn update_indent(
        &self,
        _an: &mut Analyzer<'_>,
        _prev_kind: ChangeKind,
        _offset: u32,
        _list: &ListSlots<'_>,
        _index: usize,
        _group: Option<GroupId>,
    ) {
    }
}

/// Separator state between the cursor and the slot about to be emitted.
#[derive(PartialEq, Eq, Clone, Copy)]
enum SeparatorState {
    /// Nothing usable at the cursor: the next insertion brings its own.
    None,
    /// Freshly inserted text ends at the cursor.
    New,
    /// Original text precedes the cursor and its separator is in place.
    Existing,
}

/// Walk the slots and emit edits. Returns the buffer position the caller
/// continues at; for an untouched tail this is the extended start of the
/// first slot the walk never moved past.
pub(crate) fn rewrite_slots(
    an: &mut Analyzer<'_>,
    list: ListSlots<'_>,
    lead: &str,
    policy: &dyn ListPolicy,
) -> Result<u32, RewriteError> {
    let total = list.slots.len();
    if total == 0 {
        return Ok(list.start_pos);
    }

    let mut curr_pos = None;
    let mut last_non_insert = None;
    let mut last_non_delete = None;
    for (i, slot) in list.slots.iter().enumerate() {
        let kind = slot.change_kind();
        if kind != ChangeKind::Inserted {
            last_non_insert = Some(i);
            if curr_pos.is_none() {
                curr_pos = slot.original_node().map(|node| an.extended(node).start);
            }
        }
        if kind != ChangeKind::Removed {
            last_non_delete = Some(i);
        }
    }

    let mut curr_pos = match curr_pos {
        Some(pos) => pos,
        None => {
            // the list is being created from nothing; the lead text
            // carries the introducing keyword
            if !lead.is_empty() {
                an.do_text_insert_str(list.start_pos, lead, list.slots[0].group);
            }
            list.start_pos
        }
    };
    if last_non_delete.is_none() {
        // everything goes: pull back so the introducing keyword goes too
        curr_pos = list.start_pos;
    }

    let mut prev_end = curr_pos;
    let mut prev_kind = ChangeKind::Unchanged;
    let mut state = SeparatorState::New;

    for i in 0..total {
        let event = &list.slots[i];
        let kind = event.change_kind();
        let group = event.group;
        match kind {
            ChangeKind::Inserted => {
                let Some(node) = event.new_node() else {
                    continue;
                };
                if state == SeparatorState::None {
                    // element after the last existing element, but not first
                    let text = policy.separator(an, &list, i - 1);
                    an.do_text_insert_str(curr_pos, &text, group);
                    state = SeparatorState::New;
                }
                if state == SeparatorState::New || !an.insert_bound_to_previous(node) {
                    if state == SeparatorState::Existing {
                        policy.update_indent(an, prev_kind, curr_pos, &list, i, group);
                    }
                    let indent = policy.node_indent(an, &list, i);
                    an.do_text_insert_node(curr_pos, node, indent, true, group)?;
                    state = SeparatorState::New;
                    if last_non_delete != Some(i) {
                        if list.kind(i + 1) == ChangeKind::Inserted {
                            state = SeparatorState::None;
                        } else {
                            let text = policy.separator(an, &list, i);
                            an.do_text_insert_str(curr_pos, &text, group);
                        }
                    }
                } else {
                    // bound to the previous element: slide in before the
                    // existing separator
                    let text = policy.separator(an, &list, i - 1);
                    an.do_text_insert_str(prev_end, &text, group);
                    let indent = policy.node_indent(an, &list, i);
                    an.do_text_insert_node(prev_end, node, indent, true, group)?;
                }
            }
            ChangeKind::Removed => {
                let Some(node) = event.original_node() else {
                    continue;
                };
                let curr_end = an.end_of_node(node);
                // comments between the previous element and this one that the
                // extended range does not claim stay in the buffer
                let ext_start = an.extended(node).start;
                let guarded = an.comment_run_end(prev_end, ext_start);
                if curr_pos < guarded {
                    curr_pos = ext_start;
                }
                prev_end = guarded;
                if last_non_delete.is_none_or(|last| i > last) && state == SeparatorState::Existing
                {
                    // trailing removal: the separator in front goes instead
                    an.do_text_remove(Span::new(prev_end, curr_pos), group);
                    an.do_text_remove_and_visit(Span::new(curr_pos, curr_end), node, group)?;
                    curr_pos = curr_end;
                    prev_end = curr_end;
                } else {
                    if last_non_delete.is_some_and(|last| i < last) {
                        policy.update_indent(an, prev_kind, curr_pos, &list, i, group);
                    }
                    let end = start_of_next(an, &list, i + 1, curr_end);
                    an.do_text_remove_and_visit(Span::new(curr_pos, curr_end), node, group)?;
                    if policy.must_remove_separator(an, &list, i, curr_pos) {
                        let sep_end = an.safe_deletion_end(curr_end, end);
                        an.do_text_remove(Span::new(curr_end, sep_end), group);
                    }
                    curr_pos = end;
                    prev_end = curr_end;
                    state = SeparatorState::New;
                }
            }
            ChangeKind::Replaced | ChangeKind::Unchanged => {
                if kind == ChangeKind::Replaced {
                    let Some(node) = event.original_node() else {
                        continue;
                    };
                    let curr_end = an.end_of_node(node);
                    policy.update_indent(an, prev_kind, curr_pos, &list, i, group);
                    let ext_start = an.extended(node).start;
                    if curr_pos < an.comment_run_end(prev_end, ext_start) {
                        curr_pos = ext_start;
                    }
                    an.do_text_remove_and_visit(Span::new(curr_pos, curr_end), node, group)?;
                    if let Some(new_node) = event.new_node() {
                        let indent = policy.node_indent(an, &list, i);
                        an.do_text_insert_node(curr_pos, new_node, indent, true, group)?;
                    }
                    prev_end = curr_end;
                } else if let Some(node) = event.original_node() {
                    an.visit(node)?;
                }
                if last_non_insert == Some(i) {
                    // last slot, or only inserts follow
                    state = SeparatorState::None;
                    if kind == ChangeKind::Unchanged {
                        if let Some(node) = event.original_node() {
                            prev_end = an.end_of_node(node);
                        }
                    }
                    curr_pos = prev_end;
                } else if list.kind(i + 1) != ChangeKind::Unchanged {
                    if kind == ChangeKind::Unchanged {
                        if let Some(node) = event.original_node() {
                            prev_end = an.end_of_node(node);
                        }
                    }
                    curr_pos = start_of_next(an, &list, i + 1, prev_end);
                    state = SeparatorState::Existing;
                }
            }
        }
        prev_kind = kind;
    }
    Ok(curr_pos)
}

/// Extended start of the first slot at or after `from` that exists in the
/// original buffer.
fn start_of_next(an: &Analyzer<'_>, list: &ListSlots<'_>, from: usize, default: u32) -> u32 {
    for slot in &list.slots[from.min(list.slots.len())..] {
        if slot.change_kind() != ChangeKind::Inserted {
            if let Some(node) = slot.original_node() {
                return an.extended(node).start;
            }
        }
    }
    default
}

/// Indentation of the original element at `index`, else of the nearest
/// preceding original, else the list's own baseline.
fn default_node_indent(
    an: &Analyzer<'_>,
    list: &ListSlots<'_>,
    index: usize,
    initial: Option<u32>,
) -> u32 {
    let upper = index.min(list.slots.len() - 1);
    for i in (0..=upper).rev() {
        if let Some(node) = list.original(i) {
            return an.indent_at(an.node_start(node));
        }
    }
    match initial {
        Some(units) => units,
        None => an.indent_at(list.start_pos),
    }
}

/// Nearest slot before `index` that is not removed, provided it still has
/// original text in the buffer.
fn previous_kept_original(list: &ListSlots<'_>, index: usize) -> Option<NodeId> {
    for i in (0..index).rev() {
        match list.kind(i) {
            ChangeKind::Removed => {}
            ChangeKind::Unchanged | ChangeKind::Replaced => return list.original(i),
            ChangeKind::Inserted => return None,
        }
    }
    None
}

/// The separator after a removed paragraph element normally goes with it.
/// It survives when the previous kept element shares the removed
/// element's line while the following element starts a new one: deleting
/// it would splice the two lines together.
fn paragraph_separator_goes(
    an: &Analyzer<'_>,
    list: &ListSlots<'_>,
    index: usize,
    offset: u32,
) -> bool {
    let mut prev = index;
    while prev > 0 && list.kind(prev - 1) == ChangeKind::Removed {
        prev -= 1;
    }
    if prev == 0 {
        return true;
    }
    let prev_kind = list.kind(prev - 1);
    if !matches!(prev_kind, ChangeKind::Unchanged | ChangeKind::Replaced) {
        return true;
    }
    let Some(prev_node) = list.original(prev - 1) else {
        return true;
    };
    let line = an.line_of(offset);
    if an.line_of(an.node_end(prev_node)) != line || index + 1 >= list.slots.len() {
        return true;
    }
    let next_kind = list.kind(index + 1);
    if next_kind == ChangeKind::Unchanged || prev_kind == ChangeKind::Replaced {
        let Some(next_node) = list.original(index + 1) else {
            return true;
        };
        return an.line_of(an.node_start(next_node)) == line;
    }
    false
}

/// Blank lines to put between slots `index` and `index + 1`, learned from
/// the nearest original pair with the same construct kinds. `fallback`
/// applies when the buffer offers no pair to imitate.
fn learned_blank_lines(an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize, fallback: u32) -> u32 {
    let tree = an.tree();
    let (Some(curr), Some(next)) = (list.node(index), list.node(index + 1)) else {
        return fallback;
    };
    let curr_kind = tree.kind(curr);
    let next_kind = tree.kind(next);

    let mut last: Option<NodeId> = None;
    let mut second_last: Option<NodeId> = None;
    for i in 0..list.slots.len() {
        let Some(elem) = list.original(i) else {
            continue;
        };
        if let Some(prev) = last {
            if tree.kind(elem).same_construct(next_kind)
                && tree.kind(prev).same_construct(curr_kind)
            {
                return an.blank_lines_after(prev);
            }
            second_last = Some(prev);
        }
        last = Some(elem);
    }
    if curr_kind.is_field_declaration() && next_kind.is_field_declaration() {
        return 0;
    }
    if let Some(node) = second_last {
        return an.blank_lines_after(node);
    }
    fallback
}

fn paragraph_separator(an: &Analyzer<'_>, blank_lines: u32, indent: u32) -> String {
    let mut out = String::new();
    for _ in 0..=blank_lines {
        out.push_str(an.line_delimiter());
    }
    out.push_str(&an.indent_string(indent));
    out
}

/// Single-line lists: one constant separator, indentation taken from the
/// nearest original element.
pub(crate) struct ConstSeparator<'a>(pub(crate) &'a str);

impl ListPolicy for ConstSeparator<'_> {
    fn separator(&self, _an: &Analyzer<'_>, _list: &ListSlots<'_>, _index: usize) -> String {
        self.0.to_owned()
    }

    fn node_indent(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> u32 {
        default_node_indent(an, list, index, None)
    }
}

/// Line-separated members: statements in blocks, declarations in type
/// bodies and compilation units.
pub(crate) struct ParagraphPolicy {
    pub(crate) initial_indent: u32,
    /// Fixed blank-line count, or `None` to imitate the neighbours.
    pub(crate) blank_lines: Option<u32>,
    /// Blank lines when imitation finds no precedent.
    pub(crate) fallback_blank_lines: u32,
}

impl ListPolicy for ParagraphPolicy {
    fn separator(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> String {
        let blanks = self
            .blank_lines
            .unwrap_or_else(|| learned_blank_lines(an, list, index, self.fallback_blank_lines));
        paragraph_separator(an, blanks, self.node_indent(an, list, index + 1))
    }

    fn node_indent(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> u32 {
        default_node_indent(an, list, index, Some(self.initial_indent))
    }

    fn must_remove_separator(
        &self,
        an: &Analyzer<'_>,
        list: &ListSlots<'_>,
        index: usize,
        offset: u32,
    ) -> bool {
        paragraph_separator_goes(an, list, index, offset)
    }
}

/// Switch bodies: case labels at the base indent, other statements one
/// level deeper when the options ask for it; replaced statements are
/// re-indented to match.
pub(crate) struct SwitchPolicy {
    pub(crate) initial_indent: u32,
    pub(crate) indent_statements: bool,
}

impl SwitchPolicy {
    fn slot_indent(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> u32 {
        let mut indent = self.initial_indent;
        if self.indent_statements {
            let node = match list.kind(index) {
                ChangeKind::Inserted | ChangeKind::Replaced => list.slots[index].new_node(),
                _ => list.original(index),
            };
            if let Some(node) = node {
                if !matches!(an.tree().kind(node), NodeKind::SwitchCase { .. }) {
                    indent += 1;
                }
            }
        }
        indent
    }
}

impl ListPolicy for SwitchPolicy {
    fn separator(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> String {
        // indent for the next element that stays, not a removed one
        let mut next = index + 1;
        while next < list.slots.len() && list.kind(next) == ChangeKind::Removed {
            next += 1;
        }
        if next == list.slots.len() {
            next = index + 1;
        }
        paragraph_separator(an, 0, self.node_indent(an, list, next))
    }

    fn node_indent(&self, an: &Analyzer<'_>, list: &ListSlots<'_>, index: usize) -> u32 {
        self.slot_indent(an, list, index)
    }

    fn must_remove_separator(
        &self,
        an: &Analyzer<'_>,
        list: &ListSlots<'_>,
        index: usize,
        offset: u32,
    ) -> bool {
        paragraph_separator_goes(an, list, index, offset)
    }

    fn update_indent(
        &self,
        an: &mut Analyzer<'_>,
        prev_kind: ChangeKind,
        offset: u32,
        list: &ListSlots<'_>,
        index: usize,
        group: Option<GroupId>,
    ) {
        if !matches!(prev_kind, ChangeKind::Unchanged | ChangeKind::Replaced) {
            return;
        }
        // leave the line alone if the previous kept element shares it
        if let Some(prev) = previous_kept_original(list, index) {
            if an.same_line(an.node_end(prev), offset) {
                return;
            }
        }
        let mut target = index;
        while target < list.slots.len() && list.kind(target) == ChangeKind::Removed {
            target += 1;
        }
        if target == list.slots.len() {
            return;
        }
        let original_indent = an.indent_at(offset);
        let new_indent = self.slot_indent(an, list, target);
        if original_indent != new_indent {
            let line_start = an.line_start(an.line_of(offset));
            an.do_text_remove(Span::new(line_start, offset), group);
            let text = an.indent_string(new_indent);
            an.do_text_insert_str(line_start, &text, group);
        }
    }
}
