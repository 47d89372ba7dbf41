//! Newline index over a source buffer.

use graft_ir::Span;
use memchr::memchr_iter;

/// Line-start offsets of a text, built once per rewrite.
///
/// Lines are delimited by `\n`; a `\r\n` pair counts as one delimiter with
/// the line ending before the `\r`.
#[derive(Clone, Debug)]
pub struct LineIndex {
    starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr_iter(b'\n', text.as_bytes()).map(|pos| pos as u32 + 1));
        LineIndex {
            starts,
            len: text.len() as u32,
        }
    }

    /// Number of lines. A trailing newline opens a final empty line.
    #[inline]
    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }

    /// Zero-based line containing `offset`. Offsets past the end fall on
    /// the last line.
    pub fn line_of(&self, offset: u32) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(line) => line as u32,
            Err(next) => next as u32 - 1,
        }
    }

    /// Start offset of a line; the buffer end for lines past the last.
    pub fn line_start(&self, line: u32) -> u32 {
        self.starts.get(line as usize).copied().unwrap_or(self.len)
    }

    /// The line's span excluding its delimiter.
    pub fn line_span(&self, line: u32, text: &str) -> Span {
        let start = self.line_start(line);
        let mut end = self.line_start(line + 1);
        let bytes = text.as_bytes();
        if end > start && bytes.get(end as usize - 1) == Some(&b'\n') {
            end -= 1;
            if end > start && bytes.get(end as usize - 1) == Some(&b'\r') {
                end -= 1;
            }
        }
        Span::new(start, end)
    }

    /// Whether two offsets sit on the same line.
    #[inline]
    pub fn same_line(&self, a: u32, b: u32) -> bool {
        self.line_of(a) == self.line_of(b)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_line_lookup() {
        let text = "ab\ncd\r\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(8), 2);
        assert_eq!(index.line_of(99), 2);
        assert_eq!(index.line_start(1), 3);
        assert_eq!(index.line_start(2), 7);
        assert!(index.same_line(3, 5));
        assert!(!index.same_line(2, 3));
    }

    #[test]
    fn test_line_span_excludes_delimiter() {
        let text = "ab\ncd\r\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_span(0, text), Span::new(0, 2));
        assert_eq!(index.line_span(1, text), Span::new(3, 5));
        assert_eq!(index.line_span(2, text), Span::new(7, 9));
    }

    #[test]
    fn test_empty_text() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_start(0), 0);
    }
}
