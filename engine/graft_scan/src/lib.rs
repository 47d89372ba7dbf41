//! Graft Scan - Java Token Scanning
//!
//! A hand-written lexer over the original source buffer plus the
//! [`TokenScanner`] query layer the rewriting engine probes boundaries
//! with. The scanner never builds a token list up front; every query
//! re-lexes forward from the offset it is given, which matches the
//! engine's sparse access pattern.
//!
//! Failures at this layer are recoverable [`ScanError`]s; the caller
//! decides whether a miss means "fall back to the anchor offset" or
//! "the buffer no longer matches the tree".

mod error;
mod lexer;
mod scanner;
mod token;

pub use error::ScanError;
pub use lexer::Lexer;
pub use scanner::TokenScanner;
pub use token::{Token, TokenKind};
