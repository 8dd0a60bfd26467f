//! Textual rendering of diagnostics
//!
//! Layout of a rendered diagnostic (gutter width `P` = digits of the largest
//! cited line number + 3):
//!
//! ```text
//! [error][E5]: Illegal Number Format: Expected at least one Digit in Hexadecimal Number
//!   >>> main.fux:1:6
//! 1   |	x := 0x;
//!     |	     -  Expected at least one digit after '0x'
//!     |	       |
//!     |	       Expected at least one digit (0-9, a-f, A-F) here
//! ```
//!
//! Structural elements are wrapped in SGR escape sequences (`\x1b[<n>m`)
//! when colour is enabled; the layout is identical without colour.

use std::fmt;

use super::span::SourceSpan;
use super::{Diagnostic, Flag, Subject};

/// Spans longer than this many lines are elided to first line, `...`, last line.
const MAX_VERBATIM_LINES: usize = 6;

/// Width added to the line-number digits to form the gutter.
const GUTTER_PREFIX: usize = 3;

/// SGR parameters used by the renderer.
#[derive(Debug, Clone, Copy)]
enum Sgr {
    Reset = 0,
    Bold = 1,
    Red = 31,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Default = 39,
    Gray = 90,
}

/// Borrowing view that renders one diagnostic through `Display`.
pub(crate) struct Rendered<'a> {
    diagnostic: &'a Diagnostic,
    padding: usize,
    color: bool,
}

impl<'a> Rendered<'a> {
    pub(crate) fn new(diagnostic: &'a Diagnostic, color: bool) -> Self {
        let reference_last = diagnostic
            .reference
            .as_ref()
            .map_or(0, |r| r.span.last_line);
        let widest = diagnostic.subject.span.last_line.max(reference_last);

        Rendered {
            diagnostic,
            padding: widest.to_string().len() + GUTTER_PREFIX,
            color,
        }
    }

    fn sgr(&self, f: &mut fmt::Formatter<'_>, code: Sgr) -> fmt::Result {
        if self.color {
            write!(f, "\x1b[{}m", code as u8)
        } else {
            Ok(())
        }
    }

    /// Gutter filler: `padding - sub` spaces.
    fn pad(&self, f: &mut fmt::Formatter<'_>, sub: usize) -> fmt::Result {
        for _ in 0..self.padding.saturating_sub(sub) {
            f.write_str(" ")?;
        }
        Ok(())
    }

    fn spaces(f: &mut fmt::Formatter<'_>, count: usize) -> fmt::Result {
        write!(f, "{:count$}", "", count = count)
    }

    fn head(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diag = self.diagnostic;

        self.sgr(f, Sgr::Bold)?;
        if diag.has_flag(Flag::Warning) {
            self.sgr(f, Sgr::Magenta)?;
            f.write_str("[warning]")?;
        } else {
            self.sgr(f, Sgr::Red)?;
            f.write_str("[error]")?;
        }
        self.sgr(f, Sgr::Default)?;
        f.write_str("[")?;
        if diag.has_flag(Flag::Aggressive) {
            f.write_str("A")?;
        }
        write!(f, "E{}]: {}", diag.kind.code(), diag.kind)?;
        if !diag.title.is_empty() {
            write!(f, ": {}", diag.title)?;
        }
        f.write_str("\n")?;
        self.sgr(f, Sgr::Reset)
    }

    fn subject(&self, f: &mut fmt::Formatter<'_>, subject: &Subject) -> fmt::Result {
        let span = &subject.span;

        self.position(f, span)?;
        if span.first_line == span.last_line {
            self.line(f, span.first_line, span.line(span.first_line))?;
            self.underline(f, span.first_col, span.last_col, subject.pointer)?;
            self.info(f, &subject.info, false)?;
            self.arrow(f, subject)
        } else if span.line_count() > MAX_VERBATIM_LINES {
            self.line(f, span.first_line, span.line(span.first_line))?;
            self.triple_dot(f)?;
            self.line(f, span.last_line, span.line(span.last_line))?;
            self.info(f, &subject.info, true)
        } else {
            for number in span.first_line..=span.last_line {
                self.line(f, number, span.line(number))?;
            }
            self.info(f, &subject.info, true)
        }
    }

    fn position(&self, f: &mut fmt::Formatter<'_>, span: &SourceSpan) -> fmt::Result {
        self.pad(f, 2)?;
        self.sgr(f, Sgr::Blue)?;
        self.sgr(f, Sgr::Bold)?;
        f.write_str(">>> ")?;
        self.sgr(f, Sgr::Reset)?;
        writeln!(f, "{}:{}:{}", span.file, span.first_line, span.first_col)
    }

    fn line(&self, f: &mut fmt::Formatter<'_>, number: usize, text: &str) -> fmt::Result {
        let number = number.to_string();

        self.sgr(f, Sgr::Blue)?;
        self.sgr(f, Sgr::Bold)?;
        f.write_str(&number)?;
        self.pad(f, number.len())?;
        f.write_str("|\t")?;
        self.sgr(f, Sgr::Reset)?;
        self.sgr(f, Sgr::Gray)?;
        writeln!(f, "{}", text)?;
        self.sgr(f, Sgr::Default)
    }

    fn triple_dot(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sgr(f, Sgr::Blue)?;
        f.write_str("...")?;
        self.pad(f, 3)?;
        f.write_str("|\t")?;
        self.sgr(f, Sgr::Gray)?;
        f.write_str("...\n")?;
        self.sgr(f, Sgr::Default)
    }

    /// Underline columns `start..=end`; a non-zero `pointer` column gets a
    /// caret with blank neighbours, the rest of the range is drawn as `-`.
    fn underline(
        &self,
        f: &mut fmt::Formatter<'_>,
        start: usize,
        end: usize,
        pointer: usize,
    ) -> fmt::Result {
        let start = start.max(1);

        self.pad(f, 0)?;
        self.sgr(f, Sgr::Bold)?;
        self.sgr(f, Sgr::Red)?;
        f.write_str("|\t")?;
        Self::spaces(f, start - 1)?;

        for col in start..=end {
            if pointer == 0 {
                f.write_str("^")?;
            } else if col + 1 == pointer || col == pointer + 1 {
                f.write_str(" ")?;
            } else if col == pointer {
                self.sgr(f, Sgr::Red)?;
                f.write_str("^")?;
            } else {
                self.sgr(f, Sgr::Blue)?;
                f.write_str("-")?;
            }
        }

        self.sgr(f, Sgr::Reset)?;
        f.write_str(" ")
    }

    fn info(&self, f: &mut fmt::Formatter<'_>, info: &str, wrap: bool) -> fmt::Result {
        if info.is_empty() {
            return f.write_str("\n");
        }

        self.sgr(f, Sgr::Bold)?;
        self.sgr(f, Sgr::Red)?;
        if wrap {
            self.pad(f, 0)?;
            f.write_str(" \\___ ")?;
        }
        writeln!(f, "{}", info)?;
        self.sgr(f, Sgr::Reset)
    }

    fn arrow(&self, f: &mut fmt::Formatter<'_>, subject: &Subject) -> fmt::Result {
        if subject.pointer == 0 {
            return Ok(());
        }

        let indent = subject.pointer - 1;
        self.pad(f, 0)?;
        self.sgr(f, Sgr::Red)?;
        self.sgr(f, Sgr::Bold)?;
        f.write_str("|\t")?;
        Self::spaces(f, indent)?;
        f.write_str("|\n")?;
        self.pad(f, 0)?;
        f.write_str("|\t")?;
        Self::spaces(f, indent)?;
        writeln!(f, "{}", subject.pointer_text)?;
        self.sgr(f, Sgr::Reset)
    }

    fn notes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sgr(f, Sgr::Yellow)?;
        self.sgr(f, Sgr::Bold)?;
        for note in &self.diagnostic.notes {
            self.pad(f, 0)?;
            writeln!(f, "|\t{}", note)?;
        }
        self.sgr(f, Sgr::Reset)
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.head(f)?;
        self.subject(f, &self.diagnostic.subject)?;
        if self.diagnostic.has_flag(Flag::HasReference) {
            if let Some(reference) = &self.diagnostic.reference {
                self.subject(f, reference)?;
            }
        }
        self.notes(f)
    }
}
