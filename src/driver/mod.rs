//! Per-file compilation pipeline
//!
//! ```text
//! SourceFile → Lexer → tokens → Parser → Root
//!                 \________________/
//!                  DiagnosticEngine
//! ```
//!
//! Every file gets its own [`DiagnosticEngine`], lexer and parser. Several
//! files are compiled concurrently, one scoped thread per file, and the
//! results are handed back by value in input order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticEngine, ReportFilter};
use crate::parser::ast::Root;
use crate::parser::{Lexer, Parser, Token};

/// Failures outside the source text itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A named piece of Fux source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceFile {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let text = fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceFile::new(path.display().to_string(), text))
    }
}

/// Settings resolved from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Keep the token stream in [`Compiled::tokens`].
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub color: bool,
    pub filter: ReportFilter,
}

/// Result of running one file through the front end.
#[derive(Debug)]
pub struct Compiled {
    pub file: String,
    pub tokens: Option<Vec<Token>>,
    pub root: Root,
    pub diagnostics: DiagnosticEngine,
}

impl Compiled {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Lex and parse a single source.
pub fn compile_source(source: &SourceFile, options: &Options) -> Compiled {
    let started = Instant::now();
    let mut diagnostics = DiagnosticEngine::new(&source.name, &source.text);

    let tokens = Lexer::new(&source.text, &mut diagnostics).lex();
    let kept = options.dump_tokens.then(|| tokens.clone());
    let root = Parser::new(tokens, &mut diagnostics).parse();

    tracing::debug!(
        file = %source.name,
        elapsed_us = started.elapsed().as_micros() as u64,
        diagnostics = diagnostics.len(),
        "compiled file"
    );

    Compiled {
        file: source.name.clone(),
        tokens: kept,
        root,
        diagnostics,
    }
}

pub fn compile_file(path: &Path, options: &Options) -> Result<Compiled, DriverError> {
    let source = SourceFile::load(path)?;
    Ok(compile_source(&source, options))
}

/// Compile every path on its own thread; results keep the order of `paths`.
pub fn compile_files(paths: &[PathBuf], options: &Options) -> Vec<Result<Compiled, DriverError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| (path, scope.spawn(move || compile_file(path, options))))
            .collect();

        handles
            .into_iter()
            .map(|(path, handle)| match handle.join() {
                Ok(result) => result,
                // a panicking worker is resumed on the calling thread
                Err(panic) => {
                    tracing::error!(file = %path.display(), "compiler thread panicked");
                    std::panic::resume_unwind(panic)
                }
            })
            .collect()
    })
}

/// All diagnostics of `units`, stable-sorted by file and first line.
pub fn merge_diagnostics(units: impl IntoIterator<Item = Compiled>) -> Vec<Diagnostic> {
    let mut merged: Vec<Diagnostic> = units
        .into_iter()
        .flat_map(|unit| unit.diagnostics.into_diagnostics())
        .collect();
    merged.sort_by(|a, b| {
        (a.file(), a.subject.span.first_line).cmp(&(b.file(), b.subject.span.first_line))
    });
    merged
}
