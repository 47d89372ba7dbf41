//! Scan failures.

use crate::TokenKind;

/// Failure while scanning the source buffer.
///
/// All variants are recoverable at this layer. The rewriting engine
/// promotes them to a fatal mismatch error only when a probe that must
/// succeed on a well-formed buffer comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Searched past the end of the region without seeing the token.
    #[error("token {kind:?} not found after offset {from}")]
    TokenNotFound { kind: TokenKind, from: u32 },

    /// Ran out of buffer while a token was still expected.
    #[error("unexpected end of buffer at offset {offset}")]
    UnexpectedEof { offset: u32 },

    /// Unterminated literal or comment, or a byte no token starts with.
    #[error("unrecognized or unterminated token at offset {offset}")]
    Lexical { offset: u32 },
}
