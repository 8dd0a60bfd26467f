//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! cursor helpers, error reporting with local recovery, and the main parse
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: function declarations, variable declarations and types
//! - `statements`: the statement ladder (loops, blocks, if/else, inbuilt calls)
//! - `expressions`: the operator-precedence ladder down to primary expressions
//!
//! # Error handling
//!
//! Parsing never aborts. Problems are reported to the [`DiagnosticEngine`],
//! the cursor is moved to a synchronisation token (usually `;`) and the
//! failed construct yields `None`. `None` statements are dropped.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::diagnostics::{DiagnosticBuilder, DiagnosticEngine, ErrorKind};
use crate::parser::ast::*;
use crate::parser::token::{Token, TokenKind};

/// Function whose body is currently being parsed.
///
/// Declarations without an initialiser inside the body are moved here and
/// end up in the `locals` of the resulting [`Stmt::Function`].
#[derive(Debug, Default)]
pub struct FunctionScope {
    locals: Vec<VariableDecl>,
}

impl FunctionScope {
    pub fn new() -> Self {
        FunctionScope::default()
    }

    /// Hoist a declaration. Redeclarations are kept in source order.
    pub fn declare(&mut self, decl: VariableDecl) {
        self.locals.push(decl);
    }

    pub fn into_locals(self) -> Vec<VariableDecl> {
        self.locals
    }
}

/// Recursive descent parser for Fux
pub struct Parser<'d> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) diagnostics: &'d mut DiagnosticEngine,
}

impl<'d> Parser<'d> {
    /// `tokens` should come from the lexer; a missing end-of-file token is added.
    pub fn new(mut tokens: Vec<Token>, diagnostics: &'d mut DiagnosticEngine) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::EndOfFile) {
            let (line, col) = tokens.last().map_or((1, 1), |t| (t.line, t.end + 1));
            tokens.push(Token::new(
                TokenKind::EndOfFile,
                TokenKind::EndOfFile.lexeme(),
                line,
                col,
                col + 1,
            ));
        }

        Parser {
            tokens,
            position: 0,
            diagnostics,
        }
    }

    /// Parse the entire file
    pub fn parse(mut self) -> Root {
        let mut root = Root::new();

        while !self.is_at_end() {
            let before = self.position;
            match self.parse_stmt(None, true) {
                Some(stmt) => root.body.push(stmt),
                // stray `}` at the top level
                None if self.position == before => {
                    self.advance();
                }
                None => {}
            }
        }

        tracing::debug!(
            file = %self.diagnostics.file(),
            statements = root.body.len(),
            "parsed source"
        );
        root
    }

    // ===== Helper methods =====

    /// Consume the current token if it has the given kind
    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume and return the current token; stays on end-of-file.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    pub(crate) fn peek(&self) -> &Token {
        self.peek_ahead(0)
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    /// Span from `start` up to the last consumed token.
    pub(crate) fn span_from(&self, start: Position) -> Position {
        start.to(self.previous().position())
    }

    /// Discard tokens until `sync` (not consumed) or end of file
    pub(crate) fn recover(&mut self, sync: TokenKind) {
        while !self.check(sync) && !self.is_at_end() {
            self.advance();
        }
    }

    /// Consume one token, reporting `err` if it is not of `kind`.
    ///
    /// On mismatch the offending token is the subject and the parser
    /// recovers to the next `;`.
    pub(crate) fn eat(&mut self, kind: TokenKind, err: ErrorKind) -> bool {
        let token = self.advance();
        if token.kind == kind {
            return true;
        }

        let expected = if kind.lexeme().is_empty() {
            kind.name().to_string()
        } else {
            format!("{} '{}'", kind.name(), kind.lexeme())
        };
        self.report(
            DiagnosticBuilder::new(
                err,
                format!("Got Unexpected Token {} '{}'", token.kind.name(), token.text),
                token.position(),
                "",
            )
            .pointer(token.start, format!("Expected {} here instead", expected)),
        );
        self.recover(TokenKind::Semicolon);
        false
    }

    pub(crate) fn report(&mut self, builder: DiagnosticBuilder) {
        self.diagnostics.emit(builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parse(src: &str) -> (Root, DiagnosticEngine) {
        let mut diagnostics = DiagnosticEngine::new("test.fux", src);
        let tokens = Lexer::new(src, &mut diagnostics).lex();
        let root = Parser::new(tokens, &mut diagnostics).parse();
        (root, diagnostics)
    }

    #[test]
    fn test_parse_simple_function() {
        let (root, diagnostics) = parse("main(argc: i64, argv: str[]): i64 { return 0; }");

        assert!(diagnostics.is_empty());
        assert_eq!(root.body.len(), 1);
        match &root.body[0] {
            Stmt::Function {
                symbol,
                args,
                ty,
                body,
                ..
            } => {
                assert_eq!(symbol, "main");
                assert_eq!(args.len(), 2);
                assert_eq!(ty.kind, TypeKind::I64);
                assert!(args[1].ty.is_array);
                assert!(matches!(**body, Stmt::CodeBlock { ref body, .. } if body.len() == 1));
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_missing_eof_token_is_added() {
        let mut diagnostics = DiagnosticEngine::new("test.fux", "");
        let root = Parser::new(Vec::new(), &mut diagnostics).parse();
        assert!(root.body.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_eat_reports_and_recovers() {
        let (root, diagnostics) = parse("x := 1 2 3; y := 4;");

        assert_eq!(diagnostics.len(), 1);
        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, ErrorKind::UnexpectedToken);
        assert_eq!(diag.title, "Got Unexpected Token NUMBER '2'");
        assert_eq!(diag.subject.pointer, 8);
        assert_eq!(diag.subject.pointer_text, "Expected SEMICOLON ';' here instead");

        // `x := 1` survives, recovery stops at `;` which becomes a no-op
        assert_eq!(root.body.len(), 3);
        assert!(matches!(root.body[1], Stmt::NoOp { .. }));
        assert!(matches!(&root.body[2], Stmt::VariableDecl(decl) if decl.symbol == "y"));
    }

    #[test]
    fn test_function_scope_keeps_declaration_order() {
        let mut scope = FunctionScope::new();
        let decl = |symbol: &str, kind| VariableDecl {
            symbol: symbol.to_string(),
            ty: FuxType::new(kind, 0),
            value: None,
            pos: Position::default(),
        };
        scope.declare(decl("a", TypeKind::I32));
        scope.declare(decl("a", TypeKind::U8));

        let kinds: Vec<TypeKind> = scope.into_locals().iter().map(|d| d.ty.kind).collect();
        assert_eq!(kinds, vec![TypeKind::I32, TypeKind::U8]);
    }
}
