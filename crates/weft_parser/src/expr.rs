//! Pratt expression parser.
//!
//! | BP (L,R)  | Operators |
//! |-----------|-----------|
//! | (1,2)     | `or` |
//! | (3,4)     | `and` |
//! | prefix 5  | `not` |
//! | (7,8)     | `==` `!=` `<` `<=` `>` `>=` |
//! | (9,10)    | `\|` |
//! | (11,12)   | `^` |
//! | (13,14)   | `&` |
//! | (15,16)   | `<<` `>>` |
//! | (17,18)   | `+` `-` |
//! | (19,20)   | `*` `/` `%` |
//! | prefix 21 | `-` `~` |
//!
//! Postfix `.field`, `[index]`, `[lo:hi]` and `(args)` bind tighter than everything.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ParseError;
use crate::parser::Parser;
use crate::token::TokenKind;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge => (7, 8),
        BinaryOp::BitOr => (9, 10),
        BinaryOp::BitXor => (11, 12),
        BinaryOp::BitAnd => (13, 14),
        BinaryOp::Shl | BinaryOp::Shr => (15, 16),
        BinaryOp::Add | BinaryOp::Sub => (17, 18),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (19, 20),
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Parses one expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    /// Parses `expr (, expr)*`, producing a tuple when there is more than one.
    pub(crate) fn parse_expr_list(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_expr()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        let span = items[0].span().to(self.prev_span());
        Ok(Expr::Tuple { items, span })
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        while let Some(op) = binary_op(self.current()) {
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(r_bp)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let (op, bp) = match self.current() {
            TokenKind::Not => (UnaryOp::Not, 5),
            TokenKind::Minus => (UnaryOp::Neg, 21),
            TokenKind::Tilde => (UnaryOp::Invert, 21),
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_expr_bp(bp)?;
        let span = start.to(operand.span());
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current() {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_ident()?;
                    let span = expr.span().to(self.prev_span());
                    expr = Expr::Attr {
                        base: Box::new(expr),
                        field,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.parse_subscript(expr)?;
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.at(TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen)?;
                    let span = expr.span().to(end);
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parses the inside of `[..]` after the opening bracket.
    fn parse_subscript(&mut self, base: Expr) -> Result<Expr, ParseError> {
        let lo = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        if self.eat(TokenKind::Colon) {
            let hi = if self.at(TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            let end = self.expect(TokenKind::RBracket)?;
            let span = base.span().to(end);
            return Ok(Expr::Slice {
                base: Box::new(base),
                lo: lo.map(Box::new),
                hi,
                span,
            });
        }
        let index = lo.ok_or_else(|| self.expected("index"))?;
        let end = self.expect(TokenKind::RBracket)?;
        let span = base.span().to(end);
        Ok(Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        match self.current() {
            TokenKind::Ident => {
                let name = self.expect_ident()?;
                Ok(Expr::Name { name, span })
            }
            TokenKind::Int => {
                let value = parse_int(self.current_text())
                    .ok_or_else(|| ParseError::new("integer literal is too large", span))?;
                self.advance();
                Ok(Expr::Int { value, span })
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Str(span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr_list()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.expected("expression")),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}
