//! Declaration parsing implementation
//!
//! - Function declarations and prototypes: `name(params): type body` / `name(params): type;`
//! - Variable declarations: `name: type = value;`, `name -> type;`
//! - Types: modifiers, pointer depth, base type, array suffix
//!
//! # Grammar
//!
//! ```text
//! function  ::= IDENT "(" [ variable ("," variable)* ] ")" type ( ";" | statement )
//! variable  ::= IDENT type [ ("=" | "===") expr ]
//! type      ::= (":" | "->") modifier* "*"* [ base ] [ "[]" | "[" expr "]" ]
//! base      ::= builtin type keyword | IDENT
//! cast_type ::= "*"* builtin type keyword [ "[]" ]
//! ```
//!
//! A `:` declares a value (pointer depth counts the stars), `->` declares a
//! reference; stars after `->` are ignored with a warning. Without a base type
//! the declaration is automatically typed.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::{DiagnosticBuilder, ErrorKind};
use crate::parser::ast::*;
use crate::parser::parse::{FunctionScope, Parser};
use crate::parser::token::TokenKind;

impl Parser<'_> {
    /// Parse a function declaration, or fall through the statement ladder.
    ///
    /// `name(` is ambiguous with a call; the parameter list is skipped and
    /// only a following `:` or `->` makes it a declaration.
    pub(crate) fn parse_function_decl(
        &mut self,
        scope: Option<&mut FunctionScope>,
    ) -> Option<Stmt> {
        if !self.check(TokenKind::Identifier) || self.peek_ahead(1).kind != TokenKind::LParen {
            return self.parse_for_loop(scope);
        }

        let start = self.position;
        let symbol = self.advance();
        let open = self.advance();

        let mut depth = 1usize;
        while depth > 0 {
            match self.peek().kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::EndOfFile => {
                    let last = self.previous().position();
                    self.report(
                        DiagnosticBuilder::new(
                            ErrorKind::MissingParen,
                            "Expected Closing Paren after Parameter List",
                            last,
                            "Expected closing paren here",
                        )
                        .reference(open.position(), "Opening paren found here"),
                    );
                    self.recover(TokenKind::Semicolon);
                    return None;
                }
                _ => {}
            }
            self.advance();
        }

        if !self.check(TokenKind::Colon) && !self.check(TokenKind::Pointer) {
            tracing::trace!(symbol = %symbol.text, "not a declaration, reparsing as expression");
            self.position = start;
            // expression, not a call: `call() << arg` must stay one expression
            return self.parse_expr().map(Stmt::Expr);
        }
        self.position = start + 2;

        let mut args = Vec::new();
        loop {
            if self.check(TokenKind::RParen) {
                break;
            }
            if let Some(arg) = self.parse_parameter() {
                args.push(arg);
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.eat(TokenKind::RParen, ErrorKind::MissingParen);

        let ty = self.parse_type();

        if self.check(TokenKind::Semicolon) {
            return Some(Stmt::Prototype {
                pos: self.span_from(symbol.position()),
                ty,
                symbol: symbol.text,
                args,
            });
        }

        let mut scope = FunctionScope::new();
        let body = match self.parse_stmt(Some(&mut scope), true) {
            Some(body) => body,
            None => Stmt::NoOp {
                pos: self.previous().position(),
            },
        };

        Some(Stmt::Function {
            pos: self.span_from(symbol.position()),
            ty,
            symbol: symbol.text,
            args,
            locals: scope.into_locals(),
            body: Box::new(body),
        })
    }

    /// A parameter: a variable declaration, never hoisted.
    fn parse_parameter(&mut self) -> Option<VariableDecl> {
        if self.is_variable_decl() {
            return self.parse_variable_decl();
        }

        let token = self.peek().clone();
        self.report(
            DiagnosticBuilder::new(
                ErrorKind::UnexpectedToken,
                "Unexpected Token in Parameter List",
                token.position(),
                format!("Unexpected token {} '{}'", token.kind.name(), token.text),
            )
            .pointer(token.start, "Expected a parameter declaration (name: type) here"),
        );

        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        None
    }

    pub(crate) fn is_variable_decl(&self) -> bool {
        self.check(TokenKind::Identifier)
            && matches!(
                self.peek_ahead(1).kind,
                TokenKind::Colon | TokenKind::Pointer
            )
    }

    /// Variable declaration statement; pure declarations inside a function
    /// are hoisted into `scope` and leave a no-op behind.
    pub(crate) fn parse_variable_decl_stmt(
        &mut self,
        scope: Option<&mut FunctionScope>,
    ) -> Option<Stmt> {
        if !self.is_variable_decl() {
            return self.parse_expr().map(Stmt::Expr);
        }

        let decl = self.parse_variable_decl()?;
        match scope {
            Some(scope) if decl.value.is_none() => {
                let pos = decl.pos;
                scope.declare(decl);
                Some(Stmt::NoOp { pos })
            }
            _ => Some(Stmt::VariableDecl(decl)),
        }
    }

    /// `name (':' | '->') ... [= value]`; the cursor rests on `name`.
    pub(crate) fn parse_variable_decl(&mut self) -> Option<VariableDecl> {
        let symbol = self.advance();
        let mut ty = self.parse_type();

        let value = if self.match_token(TokenKind::TripleEquals) {
            ty.push_access(Access::Constant);
            Some(self.parse_expr()?)
        } else if self.match_token(TokenKind::Equals) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Some(VariableDecl {
            pos: self.span_from(symbol.position()),
            symbol: symbol.text,
            ty,
            value,
        })
    }

    /// Type of a declaration or function, starting at its `:` or `->`.
    pub(crate) fn parse_type(&mut self) -> FuxType {
        let denotion = self.advance();
        let mut depth = match denotion.kind {
            TokenKind::Colon => 0,
            TokenKind::Pointer => REFERENCE_DEPTH,
            _ => {
                self.report(DiagnosticBuilder::new(
                    ErrorKind::UnexpectedToken,
                    "Unexpected Token while parsing a Type",
                    denotion.position(),
                    "Expected a COLON ':' or POINTER '->' here",
                ));
                return FuxType::default();
            }
        };

        let mut access = vec![Access::Public];
        while let Some(modifier) = self.peek().kind.modifier() {
            self.advance();
            access.push(modifier);
        }

        let mut ignored_stars = false;
        while self.match_token(TokenKind::Asterisk) {
            if depth == REFERENCE_DEPTH {
                ignored_stars = true;
            } else {
                depth += 1;
            }
        }
        if ignored_stars {
            let star = self.previous().position();
            self.report(
                DiagnosticBuilder::new(
                    ErrorKind::IllegalType,
                    "Pointer-Depth on Reference Type",
                    star,
                    "Given pointer-depth will be ignored and a reference passed instead",
                )
                .reference(denotion.position(), "The reference got denoted here")
                .warning(),
            );
        }

        let token = self.peek().clone();
        let ty = if let Some(kind) = token.kind.type_kind() {
            self.advance();
            FuxType::new(kind, depth)
        } else if token.is(TokenKind::Identifier) {
            self.advance();
            FuxType::new(TypeKind::Custom, depth).with_name(token.text)
        } else {
            if depth > 0 {
                let star = self.previous().position();
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::IllegalType,
                        "Pointer-Depth on Automatic Type",
                        star,
                        "Given pointer-depth will be ignored",
                    )
                    .warning(),
                );
            }
            return FuxType::new(TypeKind::Auto, depth.min(0)).with_access(access);
        };
        let ty = ty.with_access(access);

        if self.match_token(TokenKind::ArrayBracket) {
            ty.with_array(None)
        } else if self.match_token(TokenKind::LBracket) {
            let size = self.parse_expr();
            self.eat(TokenKind::RBracket, ErrorKind::MissingParen);
            ty.with_array(size)
        } else {
            ty
        }
    }

    /// Type inside a cast: stars, a builtin type keyword, optionally `[]`.
    ///
    /// Returns `None` without consuming the base if there is no builtin type.
    pub(crate) fn parse_cast_type(&mut self) -> Option<FuxType> {
        let mut depth = 0;
        while self.match_token(TokenKind::Asterisk) {
            depth += 1;
        }

        let kind = self.peek().kind.type_kind()?;
        self.advance();
        let ty = FuxType::new(kind, depth);

        if self.match_token(TokenKind::ArrayBracket) {
            Some(ty.with_array(None))
        } else {
            Some(ty)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::{DiagnosticEngine, ErrorKind};
    use crate::parser::ast::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;

    fn parse(src: &str) -> (Root, DiagnosticEngine) {
        let mut diagnostics = DiagnosticEngine::new("test.fux", src);
        let tokens = Lexer::new(src, &mut diagnostics).lex();
        let root = Parser::new(tokens, &mut diagnostics).parse();
        (root, diagnostics)
    }

    fn decl(stmt: &Stmt) -> &VariableDecl {
        match stmt {
            Stmt::VariableDecl(decl) => decl,
            other => panic!("Expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_value_and_reference_types() {
        let (root, diagnostics) = parse("x -> i32; y: ***i32; z: const u8[4];");
        assert!(diagnostics.is_empty());

        assert_eq!(decl(&root.body[0]).ty.pointer_depth, REFERENCE_DEPTH);
        assert_eq!(decl(&root.body[1]).ty.pointer_depth, 3);

        let z = &decl(&root.body[2]).ty;
        assert_eq!(z.kind, TypeKind::U8);
        assert_eq!(z.access, vec![Access::Public, Access::Constant]);
        assert!(z.is_array);
        assert!(z.array_size.is_some());
    }

    #[test]
    fn test_stars_on_reference_warn() {
        let (root, diagnostics) = parse("x ->* i32;");

        assert_eq!(decl(&root.body[0]).ty.pointer_depth, REFERENCE_DEPTH);
        assert_eq!(diagnostics.len(), 1);
        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, ErrorKind::IllegalType);
        assert!(diag.is_warning());
        let reference = diag.reference.as_ref().expect("reference span");
        assert_eq!(reference.span.first_col, 3);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_automatic_type() {
        let (root, diagnostics) = parse("x := 5; y: * = x;");
        let x = decl(&root.body[0]);
        assert_eq!(x.ty.kind, TypeKind::Auto);
        assert!(x.value.is_some());

        assert_eq!(decl(&root.body[1]).ty.pointer_depth, 0);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_triple_equals_adds_constant() {
        let (root, _) = parse("pi: f64 === 3.14;");
        let pi = decl(&root.body[0]);
        assert!(pi.ty.access.contains(&Access::Constant));
        assert!(matches!(
            pi.value,
            Some(Expr::Number { value: NumberValue::F64(_), .. })
        ));
    }

    #[test]
    fn test_custom_type() {
        let (root, _) = parse("p: *Point;");
        let p = decl(&root.body[0]);
        assert_eq!(p.ty.kind, TypeKind::Custom);
        assert_eq!(p.ty.name, "Point");
        assert_eq!(p.ty.pointer_depth, 1);
    }

    #[test]
    fn test_prototype_and_call() {
        let (root, diagnostics) = parse("add(a: i32, b: i32): i32;\nadd(1, 2);");
        assert!(diagnostics.is_empty());

        match &root.body[0] {
            Stmt::Prototype { symbol, args, .. } => {
                assert_eq!(symbol, "add");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected prototype, got {:?}", other),
        }
        assert!(matches!(root.body[1], Stmt::Expr(Expr::Call { .. })));
    }

    #[test]
    fn test_pure_declarations_are_hoisted() {
        let (root, diagnostics) = parse("f(): void { a: i32; b: u8 = 1; { c: i8; } }");
        assert!(diagnostics.is_empty());

        match &root.body[0] {
            Stmt::Function { locals, body, .. } => {
                let names: Vec<&str> = locals.iter().map(|l| l.symbol.as_str()).collect();
                assert_eq!(names, vec!["a", "c"]);
                match &**body {
                    Stmt::CodeBlock { body, .. } => {
                        assert!(matches!(body[0], Stmt::NoOp { .. }));
                        assert!(matches!(body[1], Stmt::VariableDecl(_)));
                    }
                    other => panic!("Expected code block, got {:?}", other),
                }
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_parameter_list() {
        let (root, diagnostics) = parse("f(a: i32");
        assert!(root.body.is_empty());
        assert_eq!(diagnostics.len(), 1);

        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, ErrorKind::MissingParen);
        let reference = diag.reference.as_ref().expect("reference span");
        assert_eq!((reference.span.first_col, reference.span.last_col), (2, 2));
    }
}
