//! Indented outline of a parsed tree, used by `fuxc --ast`
//!
//! One node per line, children indented by two spaces, each line ending in
//! the node's `line:col`.

use std::fmt::Write;

use super::ast::*;

/// Render `root` as an outline.
pub fn print_ast(root: &Root) -> String {
    let mut printer = AstPrinter::default();
    for stmt in &root.body {
        printer.stmt(stmt);
    }
    printer.out
}

#[derive(Default)]
struct AstPrinter {
    out: String,
    indent: usize,
}

impl AstPrinter {
    fn line(&mut self, pos: Position, text: impl std::fmt::Display) {
        // writing into a String cannot fail
        let _ = writeln!(self.out, "{:indent$}{} @{}", "", text, pos, indent = self.indent * 2);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn labelled(&mut self, label: &str, pos: Position, f: impl FnOnce(&mut Self)) {
        self.line(pos, label);
        self.nested(f);
    }

    fn decl(&mut self, what: &str, decl: &VariableDecl) {
        self.line(decl.pos, format_args!("{} {}: {}", what, decl.symbol, decl.ty));
        if let Some(value) = &decl.value {
            self.nested(|p| p.expr(value));
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::VariableDecl(decl) => self.decl("Var", decl),
            Stmt::InbuiltCall { callee, args, pos } => {
                self.line(*pos, format_args!("Inbuilt {}", callee.name()));
                self.nested(|p| args.iter().for_each(|arg| p.expr(arg)));
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
                pos,
            } => {
                self.line(*pos, "If");
                self.nested(|p| {
                    p.expr(cond);
                    p.labelled("Then", then_body.pos(), |p| p.stmt(then_body));
                    if let Some(else_body) = else_body {
                        p.labelled("Else", else_body.pos(), |p| p.stmt(else_body));
                    }
                });
            }
            Stmt::CodeBlock { body, pos } => {
                self.line(*pos, "Block");
                self.nested(|p| body.iter().for_each(|stmt| p.stmt(stmt)));
            }
            Stmt::WhileLoop {
                cond,
                body,
                post_condition,
                pos,
            } => {
                self.line(*pos, if *post_condition { "DoWhile" } else { "While" });
                self.nested(|p| {
                    p.expr(cond);
                    p.stmt(body);
                });
            }
            Stmt::ForLoop {
                init,
                cond,
                iter,
                body,
                for_each,
                pos,
            } => {
                self.line(*pos, if *for_each { "ForEach" } else { "For" });
                self.nested(|p| {
                    if let Some(init) = init {
                        p.stmt(init);
                    }
                    if let Some(cond) = cond {
                        p.expr(cond);
                    }
                    if let Some(iter) = iter {
                        p.expr(iter);
                    }
                    p.stmt(body);
                });
            }
            Stmt::Prototype {
                ty,
                symbol,
                args,
                pos,
            } => {
                self.line(*pos, format_args!("Prototype {}: {}", symbol, ty));
                self.nested(|p| args.iter().for_each(|arg| p.decl("Param", arg)));
            }
            Stmt::Function {
                ty,
                symbol,
                args,
                locals,
                body,
                pos,
            } => {
                self.line(*pos, format_args!("Function {}: {}", symbol, ty));
                self.nested(|p| {
                    args.iter().for_each(|arg| p.decl("Param", arg));
                    locals.iter().for_each(|local| p.decl("Local", local));
                    p.stmt(body);
                });
            }
            Stmt::NoOp { pos } => self.line(*pos, "NoOp"),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Null { pos } => self.line(*pos, "Null"),
            Expr::Bool { value, pos } => self.line(*pos, format_args!("Bool {}", value)),
            Expr::Number { value, pos } => self.line(*pos, format_args!("Number {}", value)),
            Expr::Char { value, pos } => self.line(*pos, format_args!("Char {:?}", value)),
            Expr::String { value, pos } => self.line(*pos, format_args!("String {:?}", value)),
            Expr::Array { elements, pos } => {
                self.line(*pos, format_args!("Array [{}]", elements.len()));
                self.nested(|p| elements.iter().for_each(|e| p.expr(e)));
            }
            Expr::Variable { name, pos } => self.line(*pos, format_args!("Variable {}", name)),
            Expr::Member { base, member, pos } => {
                self.line(*pos, "Member");
                self.nested(|p| {
                    p.expr(base);
                    p.expr(member);
                });
            }
            Expr::Call {
                callee,
                args,
                is_async,
                pos,
            } => {
                self.line(*pos, if *is_async { "AsyncCall" } else { "Call" });
                self.nested(|p| {
                    p.expr(callee);
                    args.iter().for_each(|arg| p.expr(arg));
                });
            }
            Expr::Range { begin, end, pos } => {
                self.line(*pos, "Range");
                self.nested(|p| {
                    p.expr(begin);
                    if let Some(end) = end {
                        p.expr(end);
                    }
                });
            }
            Expr::Unary { op, operand, pos } => {
                let fixity = match op {
                    UnOp::PostInc | UnOp::PostDec => "Postfix",
                    _ => "Unary",
                };
                self.line(*pos, format_args!("{} {}", fixity, op.symbol()));
                self.nested(|p| p.expr(operand));
            }
            Expr::Binary { op, lhs, rhs, pos } => {
                self.line(*pos, format_args!("Binary {}", op.symbol()));
                self.nested(|p| {
                    p.expr(lhs);
                    if let Some(rhs) = rhs {
                        p.expr(rhs);
                    }
                });
            }
            Expr::TypeCast { ty, expr, pos } => {
                self.line(*pos, format_args!("Cast {}", ty));
                self.nested(|p| p.expr(expr));
            }
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                pos,
            } => {
                self.line(*pos, "Ternary");
                self.nested(|p| {
                    p.expr(cond);
                    p.expr(then_expr);
                    p.expr(else_expr);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::print_ast;
    use crate::diagnostics::DiagnosticEngine;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;

    fn outline(src: &str) -> String {
        let mut diagnostics = DiagnosticEngine::new("test.fux", src);
        let tokens = Lexer::new(src, &mut diagnostics).lex();
        print_ast(&Parser::new(tokens, &mut diagnostics).parse())
    }

    #[test]
    fn test_print_expression() {
        assert_eq!(
            outline("a = 1 + 2;"),
            "Binary = @1:1\n  Variable a @1:1\n  Binary + @1:5\n    Number 1u8 @1:5\n    Number 2u8 @1:9\n"
        );
    }

    #[test]
    fn test_print_function_with_locals() {
        let out = outline("main(): i32 {\n  x: i32;\n  return x;\n}");
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Function main: i32"));
        assert!(lines.contains(&"  Local x: i32 (public) @2:3"));
        assert!(lines.iter().any(|l| l.trim_start().starts_with("Inbuilt return")));
    }
}
