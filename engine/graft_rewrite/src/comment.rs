//! Line comment boundaries.

use graft_scan::{Lexer, TokenKind};

/// Sorted end offsets of every `//` comment in the buffer.
///
/// Inserting text exactly at such an offset would glue it onto the end of
/// the comment line. The analyzer checks here before every text insert and
/// emits a line delimiter ahead of the new text, then retires the offset so
/// the delimiter is synthesized at most once per comment.
#[derive(Debug, Default)]
pub struct LineCommentEndOffsets {
    offsets: Vec<u32>,
}

impl LineCommentEndOffsets {
    /// Collect line comment ends with one full lexer pass.
    ///
    /// Stops quietly at the first malformed token; offsets gathered before
    /// it are still usable.
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let mut offsets = Vec::new();
        while let Ok(Some(token)) = lexer.next_token() {
            if token.kind == TokenKind::LineComment {
                offsets.push(token.end());
            }
        }
        LineCommentEndOffsets { offsets }
    }

    pub fn is_end_of_line_comment(&self, offset: u32) -> bool {
        self.offsets.binary_search(&offset).is_ok()
    }

    /// Drop `offset` from the table; returns whether it was present.
    pub fn retire(&mut self, offset: u32) -> bool {
        match self.offsets.binary_search(&offset) {
            Ok(i) => {
                self.offsets.remove(i);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_line_comment_ends() {
        let table = LineCommentEndOffsets::new("a(); // one\nb(); // two\n");
        assert!(table.is_end_of_line_comment(11));
        assert!(table.is_end_of_line_comment(23));
        assert!(!table.is_end_of_line_comment(10));
        assert!(!table.is_end_of_line_comment(12));
    }

    #[test]
    fn test_block_comments_do_not_register() {
        let table = LineCommentEndOffsets::new("/* x */ y // z");
        assert!(!table.is_end_of_line_comment(7));
        assert!(table.is_end_of_line_comment(14));
    }

    #[test]
    fn test_retire_is_one_shot() {
        let mut table = LineCommentEndOffsets::new("x // c\n");
        assert!(table.retire(6));
        assert!(!table.retire(6));
        assert!(!table.is_end_of_line_comment(6));
    }
}
