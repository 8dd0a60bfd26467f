//! Statement parsing implementation
//!
//! Statements are tried in a fixed order, each parser falling through to the
//! next one when its leading token does not match:
//!
//! ```text
//! statement ::= ";"
//!             | function_decl          (declarations.rs)
//!             | for_loop | while_loop | do_while_loop
//!             | block | if_else | inbuilt_call
//!             | variable_decl          (declarations.rs)
//!             | expression
//! ```
//!
//! Every statement except blocks, functions, if/else and loops must be
//! followed by a `;`.
//!
//! The function whose body is being parsed is passed down explicitly as
//! `Option<&mut FunctionScope>` so declarations can be hoisted into it.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::{DiagnosticBuilder, ErrorKind};
use crate::parser::ast::*;
use crate::parser::parse::{FunctionScope, Parser};
use crate::parser::token::TokenKind;

impl Parser<'_> {
    /// Parse a statement
    pub(crate) fn parse_stmt(
        &mut self,
        scope: Option<&mut FunctionScope>,
        expect_semicolon: bool,
    ) -> Option<Stmt> {
        // `while (...);` and `for (;;)`
        if self.check(TokenKind::Semicolon) {
            let pos = self.peek().position();
            if expect_semicolon {
                self.advance();
            }
            return Some(Stmt::NoOp { pos });
        }

        let stmt = self.parse_function_decl(scope)?;
        if expect_semicolon && !stmt.is_self_terminating() {
            self.eat(TokenKind::Semicolon, ErrorKind::UnexpectedToken);
        }
        Some(stmt)
    }

    /// Body of a loop or branch; a failed statement becomes a no-op.
    fn parse_body(&mut self, scope: Option<&mut FunctionScope>) -> Box<Stmt> {
        let stmt = match self.parse_stmt(scope, true) {
            Some(stmt) => stmt,
            None => Stmt::NoOp {
                pos: self.previous().position(),
            },
        };
        Box::new(stmt)
    }

    /// `for (init; cond; iter) body` or `for (x in expr) body`
    pub(crate) fn parse_for_loop(&mut self, scope: Option<&mut FunctionScope>) -> Option<Stmt> {
        if !self.check(TokenKind::KeyFor) {
            return self.parse_while_loop(scope);
        }
        let start = self.advance().position();

        self.eat(TokenKind::LParen, ErrorKind::UnexpectedToken);

        // the loop variable belongs to the loop, it is never hoisted
        let init = self.parse_stmt(None, false).map(Box::new);
        let mut cond = None;
        let mut iter = None;

        let for_each = self.match_token(TokenKind::KeyIn);
        if for_each {
            iter = self.parse_expr();
        } else {
            self.eat(TokenKind::Semicolon, ErrorKind::UnexpectedToken);
            if !self.match_token(TokenKind::Semicolon) {
                cond = self.parse_expr();
                self.eat(TokenKind::Semicolon, ErrorKind::UnexpectedToken);
            }
            if !self.check(TokenKind::RParen) {
                iter = self.parse_expr();
            }
        }
        self.eat(TokenKind::RParen, ErrorKind::MissingParen);

        let body = self.parse_body(scope);
        Some(Stmt::ForLoop {
            init,
            cond,
            iter,
            body,
            for_each,
            pos: self.span_from(start),
        })
    }

    /// `while (cond) body` or `do body while (cond)`
    pub(crate) fn parse_while_loop(&mut self, scope: Option<&mut FunctionScope>) -> Option<Stmt> {
        let (cond, body, post_condition, start) = if self.check(TokenKind::KeyDo) {
            let start = self.advance().position();
            let body = self.parse_body(scope);
            self.eat(TokenKind::KeyWhile, ErrorKind::UnexpectedToken);
            let cond = self.parse_condition();
            (cond, body, true, start)
        } else if self.check(TokenKind::KeyWhile) {
            let start = self.advance().position();
            let cond = self.parse_condition();
            let body = self.parse_body(scope);
            (cond, body, false, start)
        } else {
            return self.parse_block(scope);
        };

        Some(Stmt::WhileLoop {
            cond: cond?,
            body,
            post_condition,
            pos: self.span_from(start),
        })
    }

    /// `( expr )` of a loop or branch
    fn parse_condition(&mut self) -> Option<Expr> {
        self.eat(TokenKind::LParen, ErrorKind::UnexpectedToken);
        let cond = self.parse_expr();
        self.eat(TokenKind::RParen, ErrorKind::MissingParen);
        cond
    }

    /// `{ statement* }`
    ///
    /// An unterminated block is reported once, citing its `{`, and keeps the
    /// statements parsed so far.
    pub(crate) fn parse_block(&mut self, mut scope: Option<&mut FunctionScope>) -> Option<Stmt> {
        if !self.check(TokenKind::LBrace) {
            return self.parse_if_else(scope);
        }
        let opening = self.advance();

        let mut body = Vec::new();
        loop {
            if self.match_token(TokenKind::RBrace) {
                break;
            }
            if self.is_at_end() {
                let last = self.previous().position();
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::MissingParen,
                        "Code Block was never closed",
                        last,
                        "Expected a closing paren (RBRACE '}') here",
                    )
                    .reference(opening.position(), "Opening paren found here (LBRACE '{')"),
                );
                break;
            }
            if let Some(stmt) = self.parse_stmt(scope.as_deref_mut(), true) {
                body.push(stmt);
            }
        }

        Some(Stmt::CodeBlock {
            body,
            pos: self.span_from(opening.position()),
        })
    }

    /// `if (cond) body [else body]`
    pub(crate) fn parse_if_else(&mut self, mut scope: Option<&mut FunctionScope>) -> Option<Stmt> {
        if !self.check(TokenKind::KeyIf) {
            return self.parse_inbuilt_call(scope);
        }
        let start = self.advance().position();

        let cond = self.parse_condition();
        let then_body = self.parse_body(scope.as_deref_mut());
        let else_body = if self.match_token(TokenKind::KeyElse) {
            Some(self.parse_body(scope))
        } else {
            None
        };

        Some(Stmt::IfElse {
            cond: cond?,
            then_body,
            else_body,
            pos: self.span_from(start),
        })
    }

    /// `return`, `puts`, ... followed by a possibly empty expression list
    pub(crate) fn parse_inbuilt_call(&mut self, scope: Option<&mut FunctionScope>) -> Option<Stmt> {
        let Some(callee) = self.peek().kind.inbuilt() else {
            return self.parse_variable_decl_stmt(scope);
        };
        let start = self.advance().position();

        let args = if self.check(TokenKind::Semicolon) {
            Vec::new()
        } else {
            self.parse_expr_list(TokenKind::Semicolon)
        };

        Some(Stmt::InbuiltCall {
            callee,
            args,
            pos: self.span_from(start),
        })
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

    #[test]
    fn test_parse_if_else() {
        let (root, diagnostics) = parse("if (x > 0) puts 1; else { puts 0; }");
        assert!(diagnostics.is_empty());
        assert_eq!(root.body.len(), 1);

        match &root.body[0] {
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
                ..
            } => {
                assert!(matches!(cond, Expr::Binary { op: BinOp::Gt, .. }));
                assert!(matches!(
                    **then_body,
                    Stmt::InbuiltCall { callee: Inbuilt::Puts, .. }
                ));
                assert!(matches!(else_body.as_deref(), Some(Stmt::CodeBlock { .. })));
            }
            _ => panic!("Expected if/else"),
        }
    }

    #[test]
    fn test_parse_loops() {
        let (root, diagnostics) = parse(
            "for (i := 0; i < 10; i++) puts i;\n\
             for (x in xs) { }\n\
             for (;;) break;\n\
             while (true) ;\n\
             do { x++; } while (x < 3)",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
        assert_eq!(root.body.len(), 5);

        match &root.body[0] {
            Stmt::ForLoop {
                init,
                cond,
                iter,
                for_each,
                ..
            } => {
                assert!(!for_each);
                assert!(matches!(init.as_deref(), Some(Stmt::VariableDecl(_))));
                assert!(cond.is_some());
                assert!(matches!(iter, Some(Expr::Unary { op: UnOp::PostInc, .. })));
            }
            _ => panic!("Expected for loop"),
        }
        assert!(matches!(root.body[1], Stmt::ForLoop { for_each: true, .. }));
        assert!(matches!(
            root.body[2],
            Stmt::ForLoop {
                cond: None,
                iter: None,
                ..
            }
        ));
        assert!(matches!(
            root.body[3],
            Stmt::WhileLoop {
                post_condition: false,
                ..
            }
        ));
        assert!(matches!(
            root.body[4],
            Stmt::WhileLoop {
                post_condition: true,
                ..
            }
        ));
    }

    #[test]
    fn test_inbuilt_calls() {
        let (root, diagnostics) = parse("return; puts \"a\", 'b', 3; exit 1,;");
        assert!(diagnostics.is_empty());

        let arities: Vec<usize> = root
            .body
            .iter()
            .map(|stmt| match stmt {
                Stmt::InbuiltCall { args, .. } => args.len(),
                other => panic!("Expected inbuilt call, got {:?}", other),
            })
            .collect();
        assert_eq!(arities, vec![0, 3, 1]);
    }

    #[test]
    fn test_unclosed_block_reported_once() {
        let (root, diagnostics) = parse("{\n  x := 1;\n");

        assert_eq!(diagnostics.len(), 1);
        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, ErrorKind::MissingParen);
        let reference = diag.reference.as_ref().expect("reference span");
        assert_eq!((reference.span.first_line, reference.span.first_col), (1, 1));

        match &root.body[..] {
            [Stmt::CodeBlock { body, .. }] => assert_eq!(body.len(), 1),
            other => panic!("Expected one code block, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_semicolon() {
        let (root, diagnostics) = parse("x := 1\ny := 2;");
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.kind),
            Some(ErrorKind::UnexpectedToken)
        );
        assert_eq!(root.body.len(), 2);
    }
}
