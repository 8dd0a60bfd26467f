//! Fux source code parser
//!
//! This module transforms Fux source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), extended by `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`printer`]: indented outline of a tree
//!
//! # Language
//!
//! - Declarations: `name: type = value;` (value) and `name -> type;` (reference),
//!   functions `name(params): type { ... }` and prototypes ending in `;`
//! - Types: `void bool i8 u8 c8 i16 u16 c16 i32 u32 f32 i64 u64 f64 str var`,
//!   custom type names, pointers `*`, arrays `[]` / `[n]`, access modifiers
//! - Statements: `if/else`, `for`, `for (x in xs)`, `while`, `do-while`, blocks,
//!   inbuilt calls (`return`, `puts`, `exit`, ...)
//! - Expressions: a 20-level precedence ladder including swap `<>`, pipes
//!   `<<`/`>>`, bit shifts `<|`/`|>`, bitwise xor `><`, ranges `a..b`
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies. Errors go to a
//! [`DiagnosticEngine`](crate::diagnostics::DiagnosticEngine) passed in by the caller.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod printer;
mod statements;
pub mod token;

pub use expressions::unescape;
pub use lexer::Lexer;
pub use parse::Parser;
pub use token::{Token, TokenKind};
