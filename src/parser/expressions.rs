//! Expression parsing implementation
//!
//! One method per precedence level, loosest first:
//!
//! | level          | operators                                          | assoc |
//! |----------------|----------------------------------------------------|-------|
//! | assignment     | `= += -= *= /= %= ^= \|= &= <\|= \|>= <> ===`       | right |
//! | pipe           | `<< >>`                                            | left  |
//! | ternary        | `? :`                                              | left  |
//! | logical or/and | `\|\|`, `&&`                                       | left  |
//! | bitwise        | `\|`, `><`, `&`                                    | left  |
//! | equality       | `== !=`                                            | left  |
//! | relational     | `< > <= >=`                                        | left  |
//! | shift          | `<\| \|>`                                          | left  |
//! | additive       | `+ -`                                              | left  |
//! | multiplicative | `* / %`                                            | left  |
//! | power          | `^`                                                | left  |
//! | prefix         | `&`, `*`, `(type)`, `! ~ ?`, `+ -`, `++ --`        |       |
//! | postfix        | `[]`, `[i]`, calls, `++ --`                        |       |
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::{DiagnosticBuilder, ErrorKind};
use crate::parser::ast::*;
use crate::parser::parse::Parser;
use crate::parser::token::{Token, TokenKind};

impl Parser<'_> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    /// Comma separated expressions; a trailing comma before `end` is allowed.
    pub(crate) fn parse_expr_list(&mut self, end: TokenKind) -> Vec<Expr> {
        let mut list = Vec::new();
        loop {
            if let Some(expr) = self.parse_expr() {
                list.push(expr);
            }
            if !self.match_token(TokenKind::Comma) || self.check(end) {
                break;
            }
        }
        list
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Option<Expr> {
        let dest = self.parse_pipe()?;

        if !self.peek().kind.is_assignment() {
            return Some(dest);
        }
        let op = match self.advance().kind {
            TokenKind::TripleEquals => BinOp::ConstAssign,
            TokenKind::PlusEquals => BinOp::AddAssign,
            TokenKind::MinusEquals => BinOp::SubAssign,
            TokenKind::AsteriskEquals => BinOp::MulAssign,
            TokenKind::SlashEquals => BinOp::DivAssign,
            TokenKind::PercentEquals => BinOp::ModAssign,
            TokenKind::CaretEquals => BinOp::PowAssign,
            TokenKind::OrEquals => BinOp::OrAssign,
            TokenKind::AndEquals => BinOp::AndAssign,
            TokenKind::LshEquals => BinOp::ShlAssign,
            TokenKind::RshEquals => BinOp::ShrAssign,
            TokenKind::Swap => BinOp::Swap,
            _ => BinOp::Assign,
        };

        let value = self.parse_assignment()?;
        Some(Expr::binary(op, dest, value))
    }

    /// Left-associative level: `next (op next)*`
    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> Option<Expr>,
        op_for: fn(TokenKind) -> Option<BinOp>,
    ) -> Option<Expr> {
        let mut lhs = next(self)?;

        while let Some(op) = op_for(self.peek().kind) {
            self.advance();
            let rhs = next(self)?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Some(lhs)
    }

    /// Parse pipes (`<<`, `>>`)
    fn parse_pipe(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_ternary, |kind| match kind {
            TokenKind::LShift => Some(BinOp::PipeLeft),
            TokenKind::RShift => Some(BinOp::PipeRight),
            _ => None,
        })
    }

    /// Parse ternary: cond ? then : else
    fn parse_ternary(&mut self) -> Option<Expr> {
        let mut cond = self.parse_logical_or()?;

        while self.match_token(TokenKind::Question) {
            let then_expr = self.parse_logical_or()?;
            if !self.eat(TokenKind::Colon, ErrorKind::UnexpectedToken) {
                return None;
            }
            let else_expr = self.parse_logical_or()?;

            let pos = cond.pos().to(else_expr.pos());
            cond = Expr::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                pos,
            };
        }

        Some(cond)
    }

    fn parse_logical_or(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_logical_and, |kind| {
            (kind == TokenKind::Or).then_some(BinOp::LogicalOr)
        })
    }

    fn parse_logical_and(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_bitwise_or, |kind| {
            (kind == TokenKind::And).then_some(BinOp::LogicalAnd)
        })
    }

    fn parse_bitwise_or(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_bitwise_xor, |kind| {
            (kind == TokenKind::BitOr).then_some(BinOp::BitOr)
        })
    }

    fn parse_bitwise_xor(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_bitwise_and, |kind| {
            (kind == TokenKind::BitXor).then_some(BinOp::BitXor)
        })
    }

    fn parse_bitwise_and(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_equality, |kind| {
            (kind == TokenKind::BitAnd).then_some(BinOp::BitAnd)
        })
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_relational, |kind| match kind {
            TokenKind::EqualsEquals => Some(BinOp::Eq),
            TokenKind::NotEquals => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_bitwise_shift, |kind| match kind {
            TokenKind::LessThan => Some(BinOp::Lt),
            TokenKind::GreaterThan => Some(BinOp::Gt),
            TokenKind::LtEquals => Some(BinOp::Le),
            TokenKind::GtEquals => Some(BinOp::Ge),
            _ => None,
        })
    }

    fn parse_bitwise_shift(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_additive, |kind| match kind {
            TokenKind::BitLShift => Some(BinOp::BitShl),
            TokenKind::BitRShift => Some(BinOp::BitShr),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_power, |kind| match kind {
            TokenKind::Asterisk => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    fn parse_power(&mut self) -> Option<Expr> {
        self.parse_left_assoc(Self::parse_address, |kind| {
            (kind == TokenKind::Caret).then_some(BinOp::Pow)
        })
    }

    // ===== Prefix operators =====

    /// Parse address-of: &x
    fn parse_address(&mut self) -> Option<Expr> {
        if !self.check(TokenKind::BitAnd) {
            return self.parse_dereference();
        }
        let pos = self.advance().position();
        let operand = self.parse_address()?;
        Some(Expr::unary(UnOp::Addr, operand, pos))
    }

    /// Parse dereference: *x
    fn parse_dereference(&mut self) -> Option<Expr> {
        if !self.check(TokenKind::Asterisk) {
            return self.parse_type_cast();
        }
        let pos = self.advance().position();
        let operand = self.parse_dereference()?;
        Some(Expr::unary(UnOp::Deref, operand, pos))
    }

    /// Parse a cast `(type) expr`, or rewind and parse a unary expression
    fn parse_type_cast(&mut self) -> Option<Expr> {
        if !self.check(TokenKind::LParen) {
            return self.parse_logical_unary();
        }

        let start = self.position;
        let open = self.advance().position();
        match self.parse_cast_type() {
            Some(ty) if self.check(TokenKind::RParen) => {
                self.advance();
                let expr = self.parse_type_cast()?;
                let pos = open.to(expr.pos());
                Some(Expr::TypeCast {
                    ty,
                    expr: Box::new(expr),
                    pos,
                })
            }
            _ => {
                tracing::trace!(line = open.first_line, "not a cast, rewinding");
                self.position = start;
                self.parse_logical_unary()
            }
        }
    }

    /// Parse `!x`, `~x` and `?x`
    fn parse_logical_unary(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::Exclamation => UnOp::LogicalNot,
            TokenKind::BitNot => UnOp::BitNot,
            TokenKind::Question => UnOp::Exists,
            _ => return self.parse_sign(),
        };
        let pos = self.advance().position();
        let operand = self.parse_logical_unary()?;
        Some(Expr::unary(op, operand, pos))
    }

    /// Parse `+x` and `-x`
    fn parse_sign(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Minus => UnOp::Minus,
            _ => return self.parse_pre_inc_dec(),
        };
        let pos = self.advance().position();
        let operand = self.parse_sign()?;
        Some(Expr::unary(op, operand, pos))
    }

    /// Parse `++x` and `--x`
    fn parse_pre_inc_dec(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::PlusPlus => UnOp::PreInc,
            TokenKind::MinusMinus => UnOp::PreDec,
            _ => return self.parse_index(),
        };
        let pos = self.advance().position();
        let operand = self.parse_pre_inc_dec()?;
        Some(Expr::unary(op, operand, pos))
    }

    // ===== Postfix operators =====

    /// Parse subscripts: `a[i]`, `a[]`, chained
    fn parse_index(&mut self) -> Option<Expr> {
        let mut expr = self.parse_call()?;

        loop {
            if self.match_token(TokenKind::ArrayBracket) {
                let pos = expr.pos().to(self.previous().position());
                expr = Expr::Binary {
                    op: BinOp::Index,
                    lhs: Box::new(expr),
                    rhs: None,
                    pos,
                };
            } else if self.match_token(TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.eat(TokenKind::RBracket, ErrorKind::MissingParen);
                let pos = expr.pos().to(self.previous().position());
                expr = Expr::Binary {
                    op: BinOp::Index,
                    lhs: Box::new(expr),
                    rhs: Some(Box::new(index)),
                    pos,
                };
            } else {
                break;
            }
        }

        Some(expr)
    }

    /// Parse `[async] callee(args)` where callee is `name` or `a.b.name`
    fn parse_call(&mut self) -> Option<Expr> {
        let mut ahead = usize::from(self.check(TokenKind::KeyAsync));
        if self.peek_ahead(ahead).kind != TokenKind::Identifier {
            return self.parse_post_inc_dec();
        }
        ahead += 1;
        while self.peek_ahead(ahead).kind == TokenKind::Dot
            && self.peek_ahead(ahead + 1).kind == TokenKind::Identifier
        {
            ahead += 2;
        }
        if self.peek_ahead(ahead).kind != TokenKind::LParen {
            return self.parse_post_inc_dec();
        }

        let start = self.peek().position();
        let is_async = self.match_token(TokenKind::KeyAsync);
        let callee = self.parse_primary()?;
        self.eat(TokenKind::LParen, ErrorKind::UnexpectedToken);

        let args = if self.check(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expr_list(TokenKind::RParen)
        };
        self.eat(TokenKind::RParen, ErrorKind::MissingParen);

        Some(Expr::Call {
            callee: Box::new(callee),
            args,
            is_async,
            pos: self.span_from(start),
        })
    }

    /// Parse `x++` and `x--`
    fn parse_post_inc_dec(&mut self) -> Option<Expr> {
        let expr = self.parse_primary()?;

        let op = match self.peek().kind {
            TokenKind::PlusPlus => UnOp::PostInc,
            TokenKind::MinusMinus => UnOp::PostDec,
            _ => return Some(expr),
        };
        let pos = self.advance().position();
        Some(Expr::unary(op, expr, pos))
    }

    // ===== Primary expressions =====

    /// Parse primary expression (literals, identifiers, parenthesized exprs, arrays)
    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.advance();
        let pos = token.position();

        // type keywords used as names, e.g. in `i32 << x`
        if token.kind.type_kind().is_some() {
            return Some(Expr::Variable {
                name: token.text,
                pos,
            });
        }

        match token.kind {
            TokenKind::Number
            | TokenKind::Hexadecimal
            | TokenKind::Octal
            | TokenKind::Binary => self.parse_range(token),
            TokenKind::Float => self.parse_float(&token),
            TokenKind::Char => Some(Expr::Char {
                value: unescape(&token.text).chars().next().unwrap_or('\0'),
                pos,
            }),
            TokenKind::String => Some(Expr::String {
                value: unescape(&token.text),
                pos,
            }),
            TokenKind::KeyTrue => Some(Expr::Bool { value: true, pos }),
            TokenKind::KeyFalse => Some(Expr::Bool { value: false, pos }),
            TokenKind::KeyNull => Some(Expr::Null { pos }),
            TokenKind::Identifier => {
                let variable = Expr::Variable {
                    name: token.text,
                    pos,
                };
                if !self.match_token(TokenKind::Dot) {
                    return Some(variable);
                }

                let member = self.parse_primary()?;
                let pos = pos.to(member.pos());
                Some(Expr::Member {
                    base: Box::new(variable),
                    member: Box::new(member),
                    pos,
                })
            }
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.eat(TokenKind::RParen, ErrorKind::MissingParen);
                Some(expr)
            }
            TokenKind::LBrace => {
                let elements = if self.check(TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list(TokenKind::RBrace)
                };
                self.eat(TokenKind::RBrace, ErrorKind::MissingParen);
                Some(Expr::Array {
                    elements,
                    pos: self.span_from(pos),
                })
            }
            TokenKind::EndOfFile => {
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::UnexpectedEof,
                        "Unexpected EOF while parsing Primary Expression",
                        pos,
                        "Expected a primary expression here",
                    )
                    .aggressive(),
                );
                None
            }
            _ => {
                self.report(DiagnosticBuilder::new(
                    ErrorKind::UnexpectedToken,
                    "Unexpected Token while parsing Primary Expression",
                    pos,
                    format!("Unexpected token {} '{}'", token.kind.name(), token.text),
                ));
                // terminators stay for the enclosing statement or block
                if matches!(token.kind, TokenKind::Semicolon | TokenKind::RBrace) {
                    self.position -= 1;
                    return None;
                }
                // one retry on the following token
                if starts_primary(self.peek().kind) {
                    return self.parse_primary();
                }
                self.recover(TokenKind::Semicolon);
                None
            }
        }
    }

    /// Integer literal, extended to a range by a following `...` or `..`
    fn parse_range(&mut self, begin_token: Token) -> Option<Expr> {
        let begin = self.parse_number(&begin_token);
        if !self.check(TokenKind::TripleDot) && !self.check(TokenKind::DoubleDot) {
            return begin;
        }
        let operator = self.advance();

        let end = if self.peek().kind.is_integer() {
            let end_token = self.advance();
            self.parse_number(&end_token)
        } else {
            let end_token = self.peek().clone();
            self.report(
                DiagnosticBuilder::new(
                    ErrorKind::IllegalOperands,
                    "Incomplete Range Expression",
                    begin_token.position().to(end_token.position()),
                    format!("Range expression indicated by '{}' operator.", operator.text),
                )
                .pointer(end_token.start, "Would have expected an integer here.")
                .note("Help: The LHS and the RHS of a range expression have to be constants."),
            );
            None
        };

        let begin = begin?;
        Some(Expr::Range {
            pos: self.span_from(begin.pos()),
            begin: Box::new(begin),
            end: end.map(Box::new),
        })
    }

    /// Integer literal sized to the narrowest fitting width.
    ///
    /// Decimal literals with an exponent become `f64`.
    fn parse_number(&mut self, token: &Token) -> Option<Expr> {
        let pos = token.position();

        if token.kind == TokenKind::Number && token.text.contains(['e', 'E']) {
            return self.parse_float(token);
        }

        match token.numeric_value() {
            Some(value) => Some(Expr::Number {
                value: NumberValue::from_integer(value),
                pos,
            }),
            // no digits: reported by the lexer
            None if token.digits().is_empty() => None,
            None => {
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::IllegalNumberFormat,
                        "Integer Literal out of Range",
                        pos,
                        "Value does not fit into 64 bits",
                    )
                    .note(format!("Help: The largest integer literal is {}.", u64::MAX)),
                );
                None
            }
        }
    }

    /// Float literal, or a decimal integer with an exponent.
    ///
    /// Literals ending in a dangling exponent were reported by the lexer.
    fn parse_float(&mut self, token: &Token) -> Option<Expr> {
        let pos = token.position();
        match token.text.parse::<f64>() {
            Ok(value) => Some(Expr::Number {
                value: NumberValue::F64(value),
                pos,
            }),
            Err(_) if token.text.ends_with(['e', 'E', '+', '-']) => None,
            Err(_) => {
                self.report(DiagnosticBuilder::new(
                    ErrorKind::IllegalNumberFormat,
                    "Malformed Floating Point Number",
                    pos,
                    format!("'{}' is not a valid number", token.text),
                ));
                None
            }
        }
    }
}

fn starts_primary(kind: TokenKind) -> bool {
    kind.is_integer()
        || kind.type_kind().is_some()
        || matches!(
            kind,
            TokenKind::Float
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::KeyTrue
                | TokenKind::KeyFalse
                | TokenKind::KeyNull
                | TokenKind::Identifier
                | TokenKind::LParen
                | TokenKind::LBrace
        )
}

/// Resolve escape pairs kept raw by the lexer.
///
/// Unknown letters stand for themselves.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('v') => out.push('\x0B'),
            Some('f') => out.push('\x0C'),
            Some('b') => out.push('\x08'),
            Some('a') => out.push('\x07'),
            Some('e') => out.push('\x1B'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
