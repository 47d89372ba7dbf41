//! Formatting configuration and the formatter adapter.
//!
//! The rewriter does not format source itself. New and replacement subtrees
//! are rendered by a [`RewriteFormatter`], which returns text plus markers
//! locating the splice points (placeholders, tracked nodes) inside that
//! text. The default implementation is the event-aware flattener in
//! [`flatten`](crate::flatten).

use graft_ir::{NodeId, Tree};
use graft_text::{create_indent, indent_units};

use crate::event::{RewriteEventStore, TrackedId};
use crate::placeholder::PlaceholderStore;

/// Formatting configuration for one rewrite invocation.
#[derive(Clone, Debug)]
pub struct RewriteOptions {
    pub tab_width: u32,
    pub indent_width: u32,
    pub use_tabs: bool,
    /// Indent statements one extra level past their `case` labels.
    pub indent_switch_cases: bool,
    /// Blank lines between type members when no local precedent exists.
    pub blank_lines_between_members: u32,
    pub line_delimiter: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            tab_width: 4,
            indent_width: 4,
            use_tabs: false,
            indent_switch_cases: true,
            blank_lines_between_members: 1,
            line_delimiter: "\n".to_owned(),
        }
    }
}

/// Payload of a [`NodeMarker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerData {
    /// The region renders a tracked node.
    Tracked(TrackedId),
    /// Zero-length position where a copy/move target edit must be spliced.
    CopyPlaceholder(NodeId),
    /// The region holds caller-supplied literal code, re-indented in place.
    StringPlaceholder(NodeId),
}

/// A region of freshly formatted text with a splice payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMarker {
    pub offset: u32,
    pub len: u32,
    pub data: MarkerData,
}

/// Formatter output for one subtree.
#[derive(Clone, Debug, Default)]
pub struct FormattedText {
    pub text: String,
    pub markers: Vec<NodeMarker>,
}

/// Read-only state a formatter renders against.
///
/// Formatting always renders the NEW state: wherever the event store
/// records a change below `node`, the new value wins over the tree's
/// stored one, so nested edits land inside inserted text.
#[derive(Copy, Clone)]
pub struct FormatContext<'a> {
    pub tree: &'a Tree,
    pub events: &'a RewriteEventStore,
    pub placeholders: &'a PlaceholderStore,
}

/// Body positions whose glue text depends on the shape of the new child.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyContext {
    /// `if` then-branch that has (or keeps) an `else` after it.
    IfWithElse,
    /// `if` then-branch with no `else`.
    IfNoElse,
    /// `else` branch when the then-branch ends with `}`.
    ElseAfterBlock,
    /// `else` branch when the then-branch is a bare statement.
    ElseAfterStatement,
    /// Body of a `while`, `for`, or enhanced `for` loop.
    LoopBody,
    /// Body of a `do` loop. The suffix glues the trailing `while`.
    DoBody,
}

/// Renders subtrees for insertion and answers style queries.
pub trait RewriteFormatter {
    /// Render the new state of `node`, indented `indent` units.
    fn format_node(&self, cx: FormatContext<'_>, node: NodeId, indent: u32) -> FormattedText;

    fn line_delimiter(&self) -> &str;
    fn tab_width(&self) -> u32;
    fn indent_width(&self) -> u32;
    fn use_tabs(&self) -> bool;

    /// Indentation string for `units` levels in this formatter's style.
    fn indent_string(&self, units: u32) -> String {
        create_indent(
            units,
            self.use_tabs(),
            self.tab_width(),
            self.indent_width(),
        )
    }

    /// Indent units of `line`'s leading whitespace.
    fn indent_units_of(&self, line: &str) -> u32 {
        indent_units(line, self.tab_width(), self.indent_width())
    }

    /// Glue text `(prefix, suffix)` around a rewritten body child.
    ///
    /// `as_block` is true when the child renders brace-first: a block, or a
    /// chained `if` in else position. The prefix carries the `else` keyword
    /// for the else contexts, so inserting or removing the whole branch
    /// also inserts or removes the keyword.
    fn body_affixes(&self, context: BodyContext, as_block: bool, indent: u32) -> (String, String) {
        let nl = self.line_delimiter();
        match (context, as_block) {
            (BodyContext::IfWithElse, true) => (" ".to_owned(), " ".to_owned()),
            (BodyContext::IfWithElse, false) => (
                format!("{nl}{}", self.indent_string(indent + 1)),
                format!("{nl}{}", self.indent_string(indent)),
            ),
            (BodyContext::IfNoElse, true) => (" ".to_owned(), String::new()),
            (BodyContext::IfNoElse, false) => (
                format!("{nl}{}", self.indent_string(indent + 1)),
                String::new(),
            ),
            (BodyContext::ElseAfterBlock, true) => (" else ".to_owned(), String::new()),
            (BodyContext::ElseAfterBlock, false) => (
                format!(" else{nl}{}", self.indent_string(indent + 1)),
                String::new(),
            ),
            (BodyContext::ElseAfterStatement, true) => (
                format!("{nl}{}else ", self.indent_string(indent)),
                String::new(),
            ),
            (BodyContext::ElseAfterStatement, false) => (
                format!(
                    "{nl}{}else{nl}{}",
                    self.indent_string(indent),
                    self.indent_string(indent + 1)
                ),
                String::new(),
            ),
            (BodyContext::LoopBody, true) => (" ".to_owned(), String::new()),
            (BodyContext::LoopBody, false) => (
                format!("{nl}{}", self.indent_string(indent + 1)),
                String::new(),
            ),
            (BodyContext::DoBody, true) => (" ".to_owned(), " ".to_owned()),
            (BodyContext::DoBody, false) => (
                format!("{nl}{}", self.indent_string(indent + 1)),
                format!("{nl}{}", self.indent_string(indent)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct StyleOnly;

    impl RewriteFormatter for StyleOnly {
        fn format_node(&self, _cx: FormatContext<'_>, _node: NodeId, _indent: u32) -> FormattedText {
            FormattedText::default()
        }

        fn line_delimiter(&self) -> &str {
            "\n"
        }

        fn tab_width(&self) -> u32 {
            4
        }

        fn indent_width(&self) -> u32 {
            4
        }

        fn use_tabs(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_indent_helpers() {
        let f = StyleOnly;
        assert_eq!(f.indent_string(2), "        ");
        assert_eq!(f.indent_units_of("        x();"), 2);
        assert_eq!(f.indent_units_of("x();"), 0);
    }

    #[test]
    fn test_body_affixes() {
        let f = StyleOnly;
        let cases = [
            (BodyContext::IfWithElse, true, " ", " "),
            (BodyContext::IfWithElse, false, "\n        ", "\n    "),
            (BodyContext::IfNoElse, true, " ", ""),
            (BodyContext::IfNoElse, false, "\n        ", ""),
            (BodyContext::ElseAfterBlock, true, " else ", ""),
            (BodyContext::ElseAfterBlock, false, " else\n        ", ""),
            (BodyContext::ElseAfterStatement, true, "\n    else ", ""),
            (
                BodyContext::ElseAfterStatement,
                false,
                "\n    else\n        ",
                "",
            ),
            (BodyContext::LoopBody, true, " ", ""),
            (BodyContext::LoopBody, false, "\n        ", ""),
            (BodyContext::DoBody, true, " ", " "),
            (BodyContext::DoBody, false, "\n        ", "\n    "),
        ];
        for (context, as_block, prefix, suffix) in cases {
            assert_eq!(
                f.body_affixes(context, as_block, 1),
                (prefix.to_owned(), suffix.to_owned()),
                "{context:?} as_block={as_block}"
            );
        }
    }

    #[test]
    fn test_default_options() {
        let options = RewriteOptions::default();
        assert_eq!(options.tab_width, 4);
        assert_eq!(options.line_delimiter, "\n");
        assert!(options.indent_switch_cases);
    }
}
