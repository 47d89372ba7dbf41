//! Hand-written Java lexer.
//!
//! Produces one token per call, scanning forward from an arbitrary byte
//! offset. Whitespace is skipped silently; comments are real tokens so
//! the boundary probes can see them. The main dispatch matches on the
//! leading byte and delegates to a focused method per token family.

use graft_ir::Span;
use memchr::memchr;

use crate::{ScanError, Token, TokenKind};

/// Byte-level lexer over the original source.
///
/// The lexer is deliberately lenient about literal contents (it tracks
/// spans, never values), but strict about termination: an unterminated
/// string, character literal or block comment is a [`ScanError::Lexical`].
#[derive(Clone, Debug)]
pub struct Lexer<'src> {
    src: &'src str,
    pos: u32,
}

impl<'src> Lexer<'src> {
    /// Create a lexer positioned at offset 0.
    pub fn new(src: &'src str) -> Self {
        Lexer { src, pos: 0 }
    }

    /// The underlying source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.src
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Reposition the lexer. The offset must be a token boundary in
    /// well-formed source; repositioning into the middle of a token
    /// yields whatever tokens the remaining bytes spell.
    #[inline]
    pub fn set_position(&mut self, offset: u32) {
        self.pos = offset;
    }

    #[inline]
    fn byte_at(&self, pos: u32) -> u8 {
        self.src.as_bytes().get(pos as usize).copied().unwrap_or(0)
    }

    #[inline]
    fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    fn peek2(&self) -> u8 {
        self.byte_at(self.pos + 2)
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos as usize >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        // byte_at() yields 0 past the end, which never matches.
        while matches!(self.current(), b' ' | b'\t' | b'\r' | b'\n' | b'\x0c') {
            self.advance();
        }
    }

    /// Scan the next token, or `None` at end of buffer.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        self.skip_whitespace();
        if self.is_eof() {
            return Ok(None);
        }
        let start = self.pos;
        let kind = match self.current() {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | 0x80.. => self.identifier(start),
            b'0'..=b'9' => self.number(),
            b'"' => self.string_literal(start)?,
            b'\'' => self.char_literal(start)?,
            b'/' => self.slash(start)?,
            b'=' => self.pair(TokenKind::Assign, b'=', TokenKind::EqualsEquals),
            b'+' => self.plus_like(TokenKind::Plus, TokenKind::PlusPlus, TokenKind::PlusAssign),
            b'-' => self.plus_like(TokenKind::Minus, TokenKind::MinusMinus, TokenKind::MinusAssign),
            b'*' => self.pair(TokenKind::Star, b'=', TokenKind::StarAssign),
            b'%' => self.pair(TokenKind::Percent, b'=', TokenKind::PercentAssign),
            b'&' => self.amp_like(TokenKind::Amp, TokenKind::AndAnd, TokenKind::AmpAssign),
            b'|' => self.amp_like(TokenKind::Bar, TokenKind::OrOr, TokenKind::BarAssign),
            b'^' => self.pair(TokenKind::Caret, b'=', TokenKind::CaretAssign),
            b'!' => self.pair(TokenKind::Bang, b'=', TokenKind::NotEquals),
            b'<' => self.less(),
            b'>' => self.greater(),
            b'.' => self.dot(),
            b'~' => self.single(TokenKind::Tilde),
            b'?' => self.single(TokenKind::Question),
            b':' => self.single(TokenKind::Colon),
            b';' => self.single(TokenKind::Semicolon),
            b',' => self.single(TokenKind::Comma),
            b'@' => self.single(TokenKind::At),
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            _ => return Err(ScanError::Lexical { offset: start }),
        };
        Ok(Some(Token {
            kind,
            span: Span::new(start, self.pos),
        }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// `X` or `X=`-shaped pair.
    fn pair(&mut self, plain: TokenKind, second: u8, fused: TokenKind) -> TokenKind {
        self.advance();
        if self.current() == second {
            self.advance();
            fused
        } else {
            plain
        }
    }

    /// `+` family: plain, doubled, or `=`-fused.
    fn plus_like(&mut self, plain: TokenKind, doubled: TokenKind, assign: TokenKind) -> TokenKind {
        let first = self.current();
        self.advance();
        if self.current() == first {
            self.advance();
            doubled
        } else if self.current() == b'=' {
            self.advance();
            assign
        } else {
            plain
        }
    }

    /// `&`/`|` family: plain, doubled, or `=`-fused.
    fn amp_like(&mut self, plain: TokenKind, doubled: TokenKind, assign: TokenKind) -> TokenKind {
        self.plus_like(plain, doubled, assign)
    }

    fn less(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::LeftShiftAssign
                } else {
                    TokenKind::LeftShift
                }
            }
            b'=' => {
                self.advance();
                TokenKind::LessEquals
            }
            _ => TokenKind::Less,
        }
    }

    fn greater(&mut self) -> TokenKind {
        self.advance();
        if self.current() != b'>' {
            if self.current() == b'=' {
                self.advance();
                return TokenKind::GreaterEquals;
            }
            return TokenKind::Greater;
        }
        self.advance();
        if self.current() == b'>' {
            self.advance();
            if self.current() == b'=' {
                self.advance();
                TokenKind::UnsignedRightShiftAssign
            } else {
                TokenKind::UnsignedRightShift
            }
        } else if self.current() == b'=' {
            self.advance();
            TokenKind::RightShiftAssign
        } else {
            TokenKind::RightShift
        }
    }

    fn dot(&mut self) -> TokenKind {
        if self.peek().is_ascii_digit() {
            return self.number();
        }
        self.advance();
        if self.current() == b'.' && self.peek() == b'.' {
            self.advance_n(2);
            TokenKind::Ellipsis
        } else {
            TokenKind::Dot
        }
    }

    fn identifier(&mut self, start: u32) -> TokenKind {
        while matches!(
            self.current(),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$' | 0x80..
        ) {
            self.advance();
        }
        let word = &self.src[start as usize..self.pos as usize];
        TokenKind::from_keyword(word).unwrap_or(TokenKind::Identifier)
    }

    /// Numeric literal: integers, floats, hex/binary forms, underscores,
    /// exponents and suffixes. The lexer only needs the extent, so it eats
    /// the maximal plausible literal and leaves validation to a compiler.
    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        let hex = self.current() == b'0' && matches!(self.peek(), b'x' | b'X');
        loop {
            let b = self.current();
            let prev = if self.pos == start {
                0
            } else {
                self.byte_at(self.pos - 1)
            };
            // `e`/`E` is a hex digit, so only `p`/`P` marks a hex exponent;
            // otherwise `0x1E-5` would swallow the subtraction.
            let after_exponent = if hex {
                matches!(prev, b'p' | b'P')
            } else {
                matches!(prev, b'e' | b'E')
            };
            let is_exponent_sign = matches!(b, b'+' | b'-') && after_exponent;
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || is_exponent_sign {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::NumberLiteral
    }

    fn string_literal(&mut self, start: u32) -> Result<TokenKind, ScanError> {
        self.advance(); // opening quote
        loop {
            match self.current() {
                b'"' => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral);
                }
                b'\\' => self.advance_n(2),
                b'\n' | b'\r' => return Err(ScanError::Lexical { offset: start }),
                _ if self.is_eof() => return Err(ScanError::Lexical { offset: start }),
                _ => self.advance(),
            }
        }
    }

    fn char_literal(&mut self, start: u32) -> Result<TokenKind, ScanError> {
        self.advance(); // opening quote
        loop {
            match self.current() {
                b'\'' => {
                    self.advance();
                    return Ok(TokenKind::CharLiteral);
                }
                b'\\' => self.advance_n(2),
                b'\n' | b'\r' => return Err(ScanError::Lexical { offset: start }),
                _ if self.is_eof() => return Err(ScanError::Lexical { offset: start }),
                _ => self.advance(),
            }
        }
    }

    fn slash(&mut self, start: u32) -> Result<TokenKind, ScanError> {
        self.advance();
        match self.current() {
            b'/' => {
                // Line comment runs to (not including) the line end.
                let rest = &self.src.as_bytes()[self.pos as usize..];
                match memchr(b'\n', rest) {
                    Some(mut offset) => {
                        if offset > 0 && rest[offset - 1] == b'\r' {
                            offset -= 1;
                        }
                        self.advance_n(offset as u32);
                    }
                    None => self.pos = self.src.len() as u32,
                }
                Ok(TokenKind::LineComment)
            }
            b'*' => {
                let doc = self.peek() == b'*' && self.peek2() != b'/';
                self.advance();
                loop {
                    let rest = &self.src.as_bytes()[self.pos as usize..];
                    match memchr(b'*', rest) {
                        Some(offset) => {
                            self.advance_n(offset as u32 + 1);
                            if self.current() == b'/' {
                                self.advance();
                                return Ok(if doc {
                                    TokenKind::DocComment
                                } else {
                                    TokenKind::BlockComment
                                });
                            }
                        }
                        None => return Err(ScanError::Lexical { offset: start }),
                    }
                }
            }
            b'=' => {
                self.advance();
                Ok(TokenKind::SlashAssign)
            }
            _ => Ok(TokenKind::Slash),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn lex_all(src: &str) -> Vec<(TokenKind, u32, u32)> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(Some(token)) => out.push((token.kind, token.start(), token.end())),
                Ok(None) => return out,
                Err(e) => panic!("lex failure: {e}"),
            }
        }
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex_all(src).into_iter().map(|(k, _, _)| k).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("if (x) return y;"),
            vec![
                TokenKind::If,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Return,
                TokenKind::Identifier,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_spans_are_tight() {
        let tokens = lex_all("ab  cd");
        assert_eq!(tokens, vec![
            (TokenKind::Identifier, 0, 2),
            (TokenKind::Identifier, 4, 6),
        ]);
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("a >>>= b >>> c >> d >= e > f"),
            vec![
                TokenKind::Identifier,
                TokenKind::UnsignedRightShiftAssign,
                TokenKind::Identifier,
                TokenKind::UnsignedRightShift,
                TokenKind::Identifier,
                TokenKind::RightShift,
                TokenKind::Identifier,
                TokenKind::GreaterEquals,
                TokenKind::Identifier,
                TokenKind::Greater,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(
            kinds("i++ + ++j"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::PlusPlus,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_ellipsis_and_dot() {
        assert_eq!(
            kinds("f(int... args).x"),
            vec![
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Int,
                TokenKind::Ellipsis,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("0x1F 1_000 3.14f 1e-5 .5d 42L"),
            vec![TokenKind::NumberLiteral; 6]
        );
        // `E` is a hex digit here, not an exponent marker.
        assert_eq!(
            kinds("0x1E-5"),
            vec![
                TokenKind::NumberLiteral,
                TokenKind::Minus,
                TokenKind::NumberLiteral,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds(r#""a\"b" 'c' '\''"#),
            vec![
                TokenKind::StringLiteral,
                TokenKind::CharLiteral,
                TokenKind::CharLiteral,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a // line\nb /* block */ c /** doc */ d /**/ e"),
            vec![
                TokenKind::Identifier,
                TokenKind::LineComment,
                TokenKind::Identifier,
                TokenKind::BlockComment,
                TokenKind::Identifier,
                TokenKind::DocComment,
                TokenKind::Identifier,
                TokenKind::BlockComment,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_line_comment_excludes_line_end() {
        let tokens = lex_all("x // tail\r\ny");
        assert_eq!(tokens[1], (TokenKind::LineComment, 2, 9));
        assert_eq!(tokens[2], (TokenKind::Identifier, 11, 12));
    }

    #[test]
    fn test_unterminated_forms() {
        let mut lexer = Lexer::new("\"abc");
        assert_eq!(
            lexer.next_token(),
            Err(ScanError::Lexical { offset: 0 })
        );
        let mut lexer = Lexer::new("/* never closed");
        assert_eq!(
            lexer.next_token(),
            Err(ScanError::Lexical { offset: 0 })
        );
    }

    #[test]
    fn test_reposition() {
        let mut lexer = Lexer::new("alpha beta");
        lexer.set_position(6);
        let Ok(Some(token)) = lexer.next_token() else {
            panic!("expected a token");
        };
        assert_eq!((token.kind, token.start(), token.end()), (TokenKind::Identifier, 6, 10));
    }

    proptest! {
        /// The lexer always terminates and spans always advance, for any
        /// input that survives lexing.
        #[test]
        fn prop_spans_monotonic(src in "[ -~\\n\\t]{0,120}") {
            let mut lexer = Lexer::new(&src);
            let mut last_end = 0u32;
            for _ in 0..1000 {
                match lexer.next_token() {
                    Ok(Some(token)) => {
                        prop_assert!(token.start() >= last_end);
                        prop_assert!(token.end() > token.start());
                        last_end = token.end();
                    }
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
        }

        /// Every token's span slices cleanly out of the source.
        #[test]
        fn prop_spans_sliceable(src in "[a-zA-Z0-9+=<>(){};,. \\n]{0,120}") {
            let mut lexer = Lexer::new(&src);
            while let Ok(Some(token)) = lexer.next_token() {
                let _ = &src[token.span.to_range()];
            }
        }
    }
}
