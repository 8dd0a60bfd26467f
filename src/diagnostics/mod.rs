//! Diagnostic engine
//!
//! The lexer and parser never abort on malformed input. Every problem is
//! described with a [`DiagnosticBuilder`] and handed to the file's
//! [`DiagnosticEngine`], which resolves the cited positions into
//! [`SourceSpan`]s and keeps the resulting [`Diagnostic`]s until the caller
//! prints or collects them.
//!
//! - [`kind`]: error taxonomy and flags
//! - [`span`]: source spans carrying the text of the cited lines
//! - `render`: the textual layout (see [`Diagnostic::render`])
//!
//! # Lifecycle
//!
//! A diagnostic starts unreported. [`Diagnostic::report`] renders it once and
//! marks it [`Flag::Reported`]; further calls write nothing.

pub mod kind;
mod render;
pub mod span;

use std::io::{self, Write};
use std::sync::Arc;

pub use kind::{ErrorKind, Flag};
pub use span::SourceSpan;

use crate::parser::ast::Position;
use render::Rendered;

/// One cited location of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub span: SourceSpan,
    /// Message printed next to (single line) or below (multi line) the excerpt.
    pub info: String,
    /// 1-based column of the caret, `0` when there is none.
    pub pointer: usize,
    pub pointer_text: String,
}

/// A structured, source-anchored parse error or warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub title: String,
    pub subject: Subject,
    pub reference: Option<Subject>,
    pub notes: Vec<String>,
    flags: Vec<Flag>,
}

impl Diagnostic {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    fn set_flag(&mut self, flag: Flag) {
        if !self.has_flag(flag) {
            self.flags.push(flag);
        }
    }

    pub fn is_warning(&self) -> bool {
        self.has_flag(Flag::Warning)
    }

    pub fn is_aggressive(&self) -> bool {
        self.has_flag(Flag::Aggressive)
    }

    pub fn is_reported(&self) -> bool {
        self.has_flag(Flag::Reported)
    }

    /// File the subject span belongs to.
    pub fn file(&self) -> &str {
        &self.subject.span.file
    }

    /// Render without touching the `Reported` flag.
    pub fn render(&self, color: bool) -> String {
        Rendered::new(self, color).to_string()
    }

    /// Render into `out` unless this diagnostic was already reported.
    ///
    /// Returns whether anything was written.
    pub fn report<W: Write + ?Sized>(&mut self, out: &mut W, color: bool) -> io::Result<bool> {
        if self.is_reported() {
            return Ok(false);
        }
        self.set_flag(Flag::Reported);

        out.write_all(self.render(color).as_bytes())?;
        Ok(true)
    }
}

#[derive(Debug, Clone)]
struct PendingSubject {
    pos: Position,
    info: String,
    pointer: usize,
    pointer_text: String,
}

impl PendingSubject {
    fn new(pos: Position, info: String) -> Self {
        PendingSubject {
            pos,
            info,
            pointer: 0,
            pointer_text: String::new(),
        }
    }
}

/// Description of a diagnostic before its positions are resolved.
///
/// ```text
/// DiagnosticBuilder::new(ErrorKind::MissingParen, "Code Block was never closed", eof, "Expected '}' here")
///     .reference(open_brace, "Opening paren found here")
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    kind: ErrorKind,
    title: String,
    subject: PendingSubject,
    reference: Option<PendingSubject>,
    notes: Vec<String>,
    warning: bool,
    aggressive: bool,
}

impl DiagnosticBuilder {
    pub fn new(
        kind: ErrorKind,
        title: impl Into<String>,
        subject: Position,
        info: impl Into<String>,
    ) -> Self {
        DiagnosticBuilder {
            kind,
            title: title.into(),
            subject: PendingSubject::new(subject, info.into()),
            reference: None,
            notes: Vec::new(),
            warning: false,
            aggressive: false,
        }
    }

    /// Place a caret at `col` of the subject with an explanation below it.
    pub fn pointer(mut self, col: usize, text: impl Into<String>) -> Self {
        self.subject.pointer = col;
        self.subject.pointer_text = text.into();
        self
    }

    /// Cite a second location explaining the first.
    pub fn reference(mut self, pos: Position, info: impl Into<String>) -> Self {
        self.reference = Some(PendingSubject::new(pos, info.into()));
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn warning(mut self) -> Self {
        self.warning = true;
        self
    }

    pub fn aggressive(mut self) -> Self {
        self.aggressive = true;
        self
    }
}

/// Which diagnostics a caller wants printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFilter {
    pub warnings: bool,
    pub aggressive: bool,
}

impl ReportFilter {
    pub fn allows(&self, diagnostic: &Diagnostic) -> bool {
        (self.warnings || !diagnostic.is_warning())
            && (self.aggressive || !diagnostic.is_aggressive())
    }
}

impl Default for ReportFilter {
    fn default() -> Self {
        ReportFilter {
            warnings: true,
            aggressive: true,
        }
    }
}

/// Per-file collection of diagnostics.
///
/// Owns the file name and its source lines so that every emitted diagnostic
/// can carry the excerpt it cites.
#[derive(Debug)]
pub struct DiagnosticEngine {
    file: Arc<str>,
    lines: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new(file: &str, source: &str) -> Self {
        DiagnosticEngine {
            file: Arc::from(file),
            lines: source.lines().map(str::to_string).collect(),
            diagnostics: Vec::new(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Resolve a position of this file into a span.
    pub fn span(&self, pos: Position) -> SourceSpan {
        SourceSpan::resolve(Arc::clone(&self.file), pos, &self.lines)
    }

    fn resolve(&self, pending: PendingSubject) -> Subject {
        Subject {
            span: self.span(pending.pos),
            info: pending.info,
            pointer: pending.pointer,
            pointer_text: pending.pointer_text,
        }
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, builder: DiagnosticBuilder) {
        let DiagnosticBuilder {
            kind,
            title,
            subject,
            reference,
            notes,
            warning,
            aggressive,
        } = builder;

        let mut flags = Vec::new();
        if warning {
            flags.push(Flag::Warning);
        }
        if aggressive {
            flags.push(Flag::Aggressive);
        }
        if reference.is_some() {
            flags.push(Flag::HasReference);
        }

        tracing::debug!(
            file = %self.file,
            line = subject.pos.first_line,
            col = subject.pos.first_col,
            kind = %kind,
            warning,
            "{}",
            title
        );

        let diagnostic = Diagnostic {
            kind,
            title,
            subject: self.resolve(subject),
            reference: reference.map(|r| self.resolve(r)),
            notes,
            flags,
        };
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Whether the file failed: any diagnostic that is not a warning.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_warning()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Report every diagnostic the filter allows; returns how many were written.
    pub fn report_all<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        filter: ReportFilter,
        color: bool,
    ) -> io::Result<usize> {
        let mut written = 0;
        for diagnostic in self.diagnostics.iter_mut() {
            if filter.allows(diagnostic) && diagnostic.report(out, color)? {
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(src: &str) -> DiagnosticEngine {
        DiagnosticEngine::new("main.fux", src)
    }

    #[test]
    fn test_emit_resolves_spans_and_flags() {
        let mut diagnostics = engine("x: i32;\n{\n");
        diagnostics.emit(
            DiagnosticBuilder::new(
                ErrorKind::MissingParen,
                "Code Block was never closed",
                Position::line(3, 1, 1),
                "Expected a closing paren here",
            )
            .reference(Position::line(2, 1, 1), "Opening paren found here"),
        );

        let diag = diagnostics.iter().next().expect("one diagnostic");
        assert_eq!(diag.kind, ErrorKind::MissingParen);
        assert!(diag.has_flag(Flag::HasReference));
        assert!(!diag.is_warning());
        let reference = diag.reference.as_ref().expect("reference span");
        assert_eq!(reference.span.line(2), "{");
        assert_eq!(diag.file(), "main.fux");
    }

    #[test]
    fn test_report_is_idempotent() {
        let mut diagnostics = engine("x := 1");
        diagnostics.emit(DiagnosticBuilder::new(
            ErrorKind::Generic,
            "Something",
            Position::line(1, 1, 1),
            "",
        ));

        let mut out = Vec::new();
        let diag = &mut diagnostics.diagnostics[0];
        assert!(diag.report(&mut out, false).unwrap());
        let first_len = out.len();
        assert!(first_len > 0);

        assert!(!diag.report(&mut out, false).unwrap());
        assert_eq!(out.len(), first_len);
        assert!(diag.is_reported());
    }

    #[test]
    fn test_plain_single_line_layout() {
        let mut diagnostics = engine("x := 0x;");
        diagnostics.emit(
            DiagnosticBuilder::new(
                ErrorKind::IllegalNumberFormat,
                "Expected at least one Digit in Hexadecimal Number",
                Position::line(1, 6, 7),
                "Expected at least one digit after '0x'",
            )
            .pointer(8, "Expected at least one digit (0-9, a-f, A-F) here"),
        );

        let rendered = diagnostics.iter().next().unwrap().render(false);
        let expected = concat!(
            "[error][E5]: Illegal Number Format: Expected at least one Digit in Hexadecimal Number\n",
            "  >>> main.fux:1:6\n",
            "1   |\tx := 0x;\n",
            "    |\t     -  Expected at least one digit after '0x'\n",
            "    |\t       |\n",
            "    |\t       Expected at least one digit (0-9, a-f, A-F) here\n",
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_colored_head_line() {
        let mut diagnostics = engine("x");
        diagnostics.emit(
            DiagnosticBuilder::new(ErrorKind::IllegalType, "", Position::line(1, 1, 1), "")
                .warning()
                .aggressive(),
        );

        let rendered = diagnostics.iter().next().unwrap().render(true);
        assert!(rendered.starts_with("\x1b[1m\x1b[35m[warning]\x1b[39m[AE9]: Illegal Type\n\x1b[0m"));
    }

    #[test]
    fn test_long_span_is_elided() {
        let src = (1..=10).map(|n| format!("line{}", n)).collect::<Vec<_>>().join("\n");
        let mut diagnostics = engine(&src);
        diagnostics.emit(DiagnosticBuilder::new(
            ErrorKind::Generic,
            "",
            Position::new(1, 10, 1, 6),
            "whole file",
        ));

        let rendered = diagnostics.iter().next().unwrap().render(false);
        assert!(rendered.contains("1    |\tline1\n"));
        assert!(rendered.contains("...  |\t...\n"));
        assert!(rendered.contains("10   |\tline10\n"));
        assert!(!rendered.contains("line5"));
        assert!(rendered.contains(" \\___ whole file\n"));
    }

    #[test]
    fn test_short_multi_line_span_printed_verbatim() {
        let mut diagnostics = engine("a\nb\nc");
        diagnostics.emit(DiagnosticBuilder::new(
            ErrorKind::Generic,
            "",
            Position::new(1, 3, 1, 1),
            "",
        ));

        let rendered = diagnostics.iter().next().unwrap().render(false);
        assert!(rendered.contains("1   |\ta\n2   |\tb\n3   |\tc\n"));
        assert!(!rendered.contains("..."));
    }

    #[test]
    fn test_notes_and_counts() {
        let mut diagnostics = engine("1...x");
        diagnostics.emit(
            DiagnosticBuilder::new(
                ErrorKind::IllegalOperands,
                "Incomplete Range Expression",
                Position::line(1, 1, 5),
                "",
            )
            .note("Help: both ends of a range expression have to be constants."),
        );
        diagnostics.emit(
            DiagnosticBuilder::new(ErrorKind::IllegalType, "", Position::line(1, 1, 1), "")
                .warning(),
        );

        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(diagnostics.has_errors());

        let rendered = diagnostics.iter().next().unwrap().render(false);
        assert!(rendered.ends_with(
            "    |\tHelp: both ends of a range expression have to be constants.\n"
        ));
    }

    #[test]
    fn test_report_all_honours_filter() {
        let mut diagnostics = engine("x");
        diagnostics.emit(
            DiagnosticBuilder::new(ErrorKind::IllegalType, "", Position::line(1, 1, 1), "")
                .warning(),
        );
        diagnostics.emit(
            DiagnosticBuilder::new(ErrorKind::UnexpectedEof, "", Position::line(1, 1, 1), "")
                .aggressive(),
        );

        let mut out = Vec::new();
        let filter = ReportFilter {
            warnings: false,
            aggressive: false,
        };
        assert_eq!(diagnostics.report_all(&mut out, filter, false).unwrap(), 0);
        assert!(out.is_empty());

        assert_eq!(
            diagnostics
                .report_all(&mut out, ReportFilter::default(), false)
                .unwrap(),
            2
        );
        assert_eq!(
            diagnostics
                .report_all(&mut out, ReportFilter::default(), false)
                .unwrap(),
            0
        );
    }
}
