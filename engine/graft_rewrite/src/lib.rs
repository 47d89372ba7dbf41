//! # Graft Rewrite - AST-Diff-Driven Source Rewriting
//!
//! Record changes against an immutable Java syntax tree, then turn them
//! into a minimal tree of text edits over the original buffer. Untouched
//! text keeps its bytes: whitespace, comments and formatting survive
//! everywhere no event reaches.
//!
//! The flow is three stages:
//! 1. [`TreeRewrite`] owns the tree and records events (replace a child,
//!    edit a list, register a copy/move, track a node).
//! 2. `rewrite()` runs the analyzer: one pass over the changed regions
//!    emitting inserts, deletes and copy/move splices, with new text
//!    rendered by a [`RewriteFormatter`] (default: the event-aware
//!    [`Flattener`]).
//! 3. [`graft_text::EditStore::apply`] replays the edit tree against the
//!    buffer once, at the end.

mod analyzer;
mod comment;
mod error;
mod event;
mod flatten;
mod format;
mod list;
mod placeholder;
mod range;
mod rewrite;
mod stack;

pub use comment::LineCommentEndOffsets;
pub use error::RewriteError;
pub use event::{
    ChangeKind, CopySourceInfo, GroupId, ListRewriteEvent, NodeRewriteEvent, PropertyEvent,
    RewriteEventStore, TrackedId,
};
pub use flatten::Flattener;
pub use format::{
    BodyContext, FormatContext, FormattedText, MarkerData, NodeMarker, RewriteFormatter,
    RewriteOptions,
};
pub use placeholder::{PlaceholderData, PlaceholderStore};
pub use range::{RangeExtender, RawRange};
pub use rewrite::{ListEditor, RewriteResult, TreeRewrite};
