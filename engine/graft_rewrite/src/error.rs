//! Rewrite failure taxonomy.
//!
//! Scanner misses inside the analyzer mean the buffer no longer matches the
//! tree the events were recorded against; that is fatal for the whole
//! rewrite. The few places that tolerate incomplete source (brace lookahead
//! on recovery-parsed input) handle the [`graft_scan::ScanError`] locally
//! and never let it reach this type.

use graft_ir::NodeId;
use graft_scan::ScanError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The source text does not match the syntax tree.
    #[error("source text does not match the syntax tree: {0}")]
    StructuralMismatch(#[from] ScanError),

    /// An event was recorded that has no textual rendition.
    #[error("unsupported modification on node {node:?}: {reason}")]
    UnsupportedModification { node: NodeId, reason: String },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display() {
        let err = RewriteError::from(ScanError::UnexpectedEof { offset: 12 });
        assert_eq!(
            err.to_string(),
            "source text does not match the syntax tree: unexpected end of buffer at offset 12"
        );
    }
}
