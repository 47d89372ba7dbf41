//! # Graft Text - Edit Trees and Application
//!
//! The rewrite engine does not mutate source text as it goes. It records a
//! tree of [`EditKind`] nodes against the ORIGINAL buffer, and the buffer is
//! only touched once, at the end, by [`EditStore::apply`]. Edits nest: a
//! copied region carries its inner rewrites with it, a tracked range carries
//! the edits recorded while its node was being visited.
//!
//! The crate also owns the two text-geometry helpers the engine leans on:
//! a newline index ([`LineIndex`]) and indentation measurement/rewriting
//! ([`indent`]).

mod apply;
mod edit;
mod indent;
mod line;

pub use apply::EditMap;
pub use edit::{CopyId, EditId, EditKind, EditStore, Reindent};
pub use indent::{change_indent, create_indent, extract_indent, indent_units};
pub use line::LineIndex;
