//! Token-boundary probes over original source text.
//!
//! The rewriter never holds a token list. Whenever it needs a boundary
//! (the end of a keyword, the start of a separator, the last token before
//! a closing paren) it asks the scanner, which re-lexes forward from a
//! known offset. Sources are small enough that re-lexing beats keeping a
//! parallel token index in sync with edits.

use graft_ir::Span;

use crate::{Lexer, ScanError, Token, TokenKind};

/// Forward-only token probe.
///
/// All `read_*` methods reposition the lexer; the most recently read token
/// stays available through [`TokenScanner::current`].
#[derive(Clone, Debug)]
pub struct TokenScanner<'src> {
    lexer: Lexer<'src>,
    current: Option<Token>,
}

impl<'src> TokenScanner<'src> {
    pub fn new(src: &'src str) -> Self {
        TokenScanner {
            lexer: Lexer::new(src),
            current: None,
        }
    }

    /// The underlying source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// The most recently read token, if any.
    #[inline]
    pub fn current(&self) -> Option<Token> {
        self.current
    }

    /// Read the first token at or after `offset`.
    ///
    /// With `include_comments` unset, comment tokens are skipped. Returns
    /// [`ScanError::UnexpectedEof`] when only whitespace (and skipped
    /// comments) remain.
    pub fn read_next(&mut self, offset: u32, include_comments: bool) -> Result<Token, ScanError> {
        self.lexer.set_position(offset);
        self.read_from_current(include_comments)
    }

    /// Read the next token after the current lexer position.
    pub fn read_from_current(&mut self, include_comments: bool) -> Result<Token, ScanError> {
        loop {
            match self.lexer.next_token()? {
                Some(token) if token.kind.is_comment() && !include_comments => {}
                Some(token) => {
                    self.current = Some(token);
                    return Ok(token);
                }
                None => {
                    return Err(ScanError::UnexpectedEof {
                        offset: self.lexer.position(),
                    })
                }
            }
        }
    }

    /// Read forward from `offset` until a token of `kind` is found,
    /// skipping comments. Returns [`ScanError::TokenNotFound`] if the
    /// source runs out first.
    ///
    /// Searching for [`TokenKind::Greater`] matches the leading `>` of any
    /// shift or shift-assign token and reports it as a one-byte `Greater`,
    /// so `List<List<String>>` closes cleanly one bracket at a time. The
    /// lexer is left positioned after that single byte.
    pub fn read_to_token(&mut self, kind: TokenKind, offset: u32) -> Result<Token, ScanError> {
        self.lexer.set_position(offset);
        loop {
            let token = match self.read_from_current(false) {
                Ok(token) => token,
                Err(ScanError::UnexpectedEof { .. }) => {
                    return Err(ScanError::TokenNotFound { kind, from: offset })
                }
                Err(e) => return Err(e),
            };
            if token.kind == kind {
                return Ok(token);
            }
            if kind == TokenKind::Greater && token.kind.starts_with_greater() {
                let single = Token {
                    kind: TokenKind::Greater,
                    span: Span::new(token.start(), token.start() + 1),
                };
                self.lexer.set_position(single.end());
                self.current = Some(single);
                return Ok(single);
            }
        }
    }

    /// Start offset of the first token at or after `offset`.
    pub fn next_start_offset(
        &mut self,
        offset: u32,
        include_comments: bool,
    ) -> Result<u32, ScanError> {
        Ok(self.read_next(offset, include_comments)?.start())
    }

    /// End offset of the first token at or after `offset`.
    pub fn next_end_offset(
        &mut self,
        offset: u32,
        include_comments: bool,
    ) -> Result<u32, ScanError> {
        Ok(self.read_next(offset, include_comments)?.end())
    }

    /// Start offset of the first `kind` token at or after `offset`.
    pub fn token_start_offset(&mut self, kind: TokenKind, offset: u32) -> Result<u32, ScanError> {
        Ok(self.read_to_token(kind, offset)?.start())
    }

    /// End offset of the first `kind` token at or after `offset`.
    pub fn token_end_offset(&mut self, kind: TokenKind, offset: u32) -> Result<u32, ScanError> {
        Ok(self.read_to_token(kind, offset)?.end())
    }

    /// End offset of the token immediately before the first `kind` token at
    /// or after `offset`. If the `kind` token comes first, `offset` itself
    /// is returned.
    pub fn previous_token_end_offset(
        &mut self,
        kind: TokenKind,
        offset: u32,
    ) -> Result<u32, ScanError> {
        self.lexer.set_position(offset);
        let mut end = offset;
        loop {
            let token = match self.read_from_current(false) {
                Ok(token) => token,
                Err(ScanError::UnexpectedEof { .. }) => {
                    return Err(ScanError::TokenNotFound { kind, from: offset })
                }
                Err(e) => return Err(e),
            };
            if token.kind == kind
                || (kind == TokenKind::Greater && token.kind.starts_with_greater())
            {
                return Ok(end);
            }
            end = token.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_read_next_skips_comments() {
        let mut scanner = TokenScanner::new("/* lead */ class Foo {}");
        let Ok(token) = scanner.read_next(0, false) else {
            panic!("expected a token");
        };
        assert_eq!((token.kind, token.start()), (TokenKind::Class, 11));

        let Ok(token) = scanner.read_next(0, true) else {
            panic!("expected a token");
        };
        assert_eq!((token.kind, token.start()), (TokenKind::BlockComment, 0));
    }

    #[test]
    fn test_token_offsets() {
        let src = "public class Foo { }";
        let mut scanner = TokenScanner::new(src);
        assert_eq!(scanner.token_start_offset(TokenKind::Class, 0), Ok(7));
        assert_eq!(scanner.token_end_offset(TokenKind::Class, 0), Ok(12));
        assert_eq!(scanner.token_start_offset(TokenKind::LBrace, 0), Ok(17));
        assert_eq!(scanner.next_start_offset(12, false), Ok(13));
    }

    #[test]
    fn test_token_not_found() {
        let mut scanner = TokenScanner::new("int x");
        assert_eq!(
            scanner.token_start_offset(TokenKind::Semicolon, 0),
            Err(ScanError::TokenNotFound {
                kind: TokenKind::Semicolon,
                from: 0,
            })
        );
    }

    #[test]
    fn test_eof() {
        let mut scanner = TokenScanner::new("x  ");
        let Ok(token) = scanner.read_next(0, false) else {
            panic!("expected a token");
        };
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(
            scanner.read_from_current(false),
            Err(ScanError::UnexpectedEof { offset: 3 })
        );
    }

    #[test]
    fn test_nested_generics_close_one_bracket_at_a_time() {
        let src = "List<List<String>> x;";
        let mut scanner = TokenScanner::new(src);
        // The `>>` at offset 16 resolves as two single closers.
        let first = scanner.token_end_offset(TokenKind::Greater, 10);
        assert_eq!(first, Ok(17));
        let second = scanner.token_end_offset(TokenKind::Greater, 17);
        assert_eq!(second, Ok(18));
        // After the synthesized closer the scanner resumes normally.
        assert_eq!(scanner.next_start_offset(18, false), Ok(19));
    }

    #[test]
    fn test_previous_token_end_offset() {
        let src = "f(a, b)";
        let mut scanner = TokenScanner::new(src);
        assert_eq!(
            scanner.previous_token_end_offset(TokenKind::RParen, 2),
            Ok(6)
        );
        // Searched token first: the probe offset comes straight back.
        assert_eq!(
            scanner.previous_token_end_offset(TokenKind::RParen, 6),
            Ok(6)
        );
    }
}
