//! Source spans used for rendering
//!
//! A [`SourceSpan`] is a [`Position`] resolved against a concrete file: it
//! carries the file name and a copy of every source line it covers so a
//! diagnostic can be rendered long after the lexer and parser are gone.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::parser::ast::Position;

/// A region of one source file, together with the text of the lines it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: Arc<str>,
    pub first_line: usize,
    pub last_line: usize,
    pub first_col: usize,
    pub last_col: usize,
    lines: FxHashMap<usize, String>,
}

impl SourceSpan {
    /// Resolve `pos` against the 1-based `source_lines` of `file`.
    ///
    /// Lines outside the file (e.g. the synthetic end-of-file position one
    /// past the last line) resolve to empty text.
    pub fn resolve(file: Arc<str>, pos: Position, source_lines: &[String]) -> Self {
        let first_line = pos.first_line.max(1);
        let last_line = pos.last_line.max(first_line);
        let lines = (first_line..=last_line)
            .map(|n| {
                let text = source_lines.get(n - 1).cloned().unwrap_or_default();
                (n, text)
            })
            .collect();

        SourceSpan {
            file,
            first_line,
            last_line,
            first_col: pos.first_col,
            last_col: pos.last_col.max(pos.first_col),
            lines,
        }
    }

    /// Text of line `number`, or `""` if the span does not cover it.
    pub fn line(&self, number: usize) -> &str {
        self.lines.get(&number).map(String::as_str).unwrap_or("")
    }

    /// Number of source lines covered by the span.
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_resolve_copies_covered_lines() {
        let src = lines("a: i32;\nb: i32;\nc: i32;");
        let span = SourceSpan::resolve(Arc::from("m.fux"), Position::new(2, 3, 1, 7), &src);

        assert_eq!(span.line(2), "b: i32;");
        assert_eq!(span.line(3), "c: i32;");
        assert_eq!(span.line(1), "");
        assert_eq!(span.line_count(), 2);
    }

    #[test]
    fn test_resolve_past_end_of_file() {
        let src = lines("x");
        let span = SourceSpan::resolve(Arc::from("m.fux"), Position::line(2, 1, 2), &src);
        assert_eq!(span.line(2), "");
        assert_eq!(span.first_col, 1);
        assert_eq!(span.last_col, 2);
    }
}
