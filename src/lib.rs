//! # Introduction
//!
//! `fuxc` is the front end of the compiler for Fux, a C-like language with
//! value (`:`) and reference (`->`) declarations. It turns source text into a
//! typed AST and reports malformed input as source-anchored diagnostics.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → Root
//!             \______________/
//!             DiagnosticEngine → rendered excerpts
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST; never aborts,
//!    every problem is reported and recovered from locally.
//! 2. [`diagnostics`]: collects [`diagnostics::Diagnostic`]s per file and
//!    renders them with underlined source excerpts.
//! 3. [`driver`]: runs the pipeline for one or many files and merges the
//!    diagnostics; used by the `fuxc` binary.
//!
//! ## Example
//!
//! ```
//! use fuxc::diagnostics::DiagnosticEngine;
//! use fuxc::parser::{Lexer, Parser};
//!
//! let source = "main(): i32 { return 0; }";
//! let mut diagnostics = DiagnosticEngine::new("main.fux", source);
//! let tokens = Lexer::new(source, &mut diagnostics).lex();
//! let root = Parser::new(tokens, &mut diagnostics).parse();
//!
//! assert_eq!(root.body.len(), 1);
//! assert!(!diagnostics.has_errors());
//! ```

pub mod diagnostics;
pub mod driver;
pub mod parser;
