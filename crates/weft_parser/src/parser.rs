//! Statement parser and entry points.

use crate::ast::{AssignOp, Body, Expr, Stmt};
use crate::chain::{build_chain, NameChain};
use crate::error::ParseError;
use crate::lexer::lex;
use crate::token::{Token, TokenKind};
use weft_common::{Ident, Interner};
use weft_source::{FileId, Span};

/// Parses a whole body.
pub fn parse_body(source: &str, file: FileId, interner: &Interner) -> Result<Body, ParseError> {
    let tokens = lex(source, file)?;
    let mut parser = Parser::new(tokens, source, interner);
    let stmts = parser.parse_stmts(TokenKind::Eof)?;
    Ok(Body { stmts })
}

/// Parses a standalone reference such as `s.x[2].y`, as used in constraint text.
pub fn parse_chain(text: &str, file: FileId, interner: &Interner) -> Result<NameChain, ParseError> {
    let tokens = lex(text, file)?;
    let mut parser = Parser::new(tokens, text, interner);
    let expr = parser.parse_expr()?;
    while parser.eat(TokenKind::Newline) {}
    if !parser.at(TokenKind::Eof) {
        return Err(parser.expected("end of reference"));
    }
    let this = interner.get_or_intern("s");
    let mut ignored = Vec::new();
    build_chain(&expr, this, &mut ignored)?
        .ok_or_else(|| ParseError::new("expected a reference rooted at `s`", expr.span()))
}

/// Recursive-descent parser over a token stream.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    pub(crate) interner: &'src Interner,
}

impl<'src> Parser<'src> {
    /// Creates a parser over tokens lexed from `source`.
    pub fn new(tokens: Vec<Token>, source: &'src str, interner: &'src Interner) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
        }
    }

    pub(crate) fn current(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn current_text(&self) -> &'src str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn advance(&mut self) {
        if !self.at(TokenKind::Eof) {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Span, ParseError> {
        let span = self.current_span();
        if self.eat(kind) {
            Ok(span)
        } else {
            Err(self.expected(&kind.to_string()))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.expected("identifier"));
        }
        let ident = self.interner.get_or_intern(self.current_text());
        self.advance();
        Ok(ident)
    }

    pub(crate) fn expected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {what}, found {}", self.current()),
            self.current_span(),
        )
    }

    fn at_separator(&self) -> bool {
        matches!(self.current(), TokenKind::Newline | TokenKind::Semi)
    }

    /// Skips line breaks when the next real token is `kind`.
    fn eat_across_lines(&mut self, kind: TokenKind) -> bool {
        let mut look = self.pos;
        while self.tokens[look].kind == TokenKind::Newline {
            look += 1;
        }
        if self.tokens[look].kind == kind {
            self.pos = look + 1;
            true
        } else {
            false
        }
    }

    fn parse_stmts(&mut self, end: TokenKind) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            while self.at_separator() {
                self.advance();
            }
            if self.at(end) || self.at(TokenKind::Eof) {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
            if !self.at_separator() && !self.at(end) {
                return Err(self.expected("line break or `;`"));
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmts(TokenKind::RBrace)?;
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        match self.current() {
            TokenKind::If => {
                self.advance();
                let mut branches = Vec::new();
                let cond = self.parse_expr()?;
                branches.push((cond, self.parse_block()?));
                let mut orelse = Vec::new();
                loop {
                    if self.eat_across_lines(TokenKind::Elif) {
                        let cond = self.parse_expr()?;
                        branches.push((cond, self.parse_block()?));
                    } else if self.eat_across_lines(TokenKind::Else) {
                        orelse = self.parse_block()?;
                        break;
                    } else {
                        break;
                    }
                }
                Ok(Stmt::If {
                    branches,
                    orelse,
                    span: start.to(self.prev_span()),
                })
            }
            TokenKind::For => {
                self.advance();
                let var = self.expect_ident()?;
                self.expect(TokenKind::In)?;
                let iter = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::For {
                    var,
                    iter,
                    body,
                    span: start.to(self.prev_span()),
                })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.at_separator()
                    || self.at(TokenKind::RBrace)
                    || self.at(TokenKind::Eof)
                {
                    None
                } else {
                    Some(self.parse_expr_list()?)
                };
                Ok(Stmt::Return {
                    value,
                    span: start.to(self.prev_span()),
                })
            }
            TokenKind::Pass => {
                self.advance();
                Ok(Stmt::Pass(start))
            }
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let lhs = self.parse_expr_list()?;
        let op = match self.current() {
            TokenKind::Assign => AssignOp::Plain,
            TokenKind::AtAssign => AssignOp::Comb,
            TokenKind::ShlAssign => AssignOp::Seq,
            TokenKind::OpAssign => AssignOp::Augmented,
            _ => return Ok(Stmt::Expr(lhs)),
        };
        self.advance();
        let targets = match lhs {
            Expr::Tuple { items, .. } => items,
            single => vec![single],
        };
        for target in &targets {
            if !matches!(
                target,
                Expr::Name { .. } | Expr::Attr { .. } | Expr::Index { .. } | Expr::Slice { .. }
            ) {
                return Err(ParseError::new("cannot assign to this expression", target.span()));
            }
        }
        let value = self.parse_expr_list()?;
        let span = targets[0].span().to(value.span());
        Ok(Stmt::Assign {
            targets,
            op,
            value,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn parse(src: &str) -> (Body, Interner) {
        let interner = Interner::new();
        let body = parse_body(src, FileId::from_raw(0), &interner).unwrap();
        (body, interner)
    }

    fn parse_err(src: &str) -> ParseError {
        parse_body(src, FileId::from_raw(0), &Interner::new()).unwrap_err()
    }

    #[test]
    fn empty_body() {
        assert!(parse("").0.stmts.is_empty());
        assert!(parse("\n\n; \n").0.stmts.is_empty());
    }

    #[test]
    fn simple_assignment() {
        let (body, interner) = parse("s.b = s.a");
        let Stmt::Assign { targets, op, value, .. } = &body.stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Plain);
        assert_eq!(targets.len(), 1);
        match value {
            Expr::Attr { field, .. } => assert_eq!(interner.resolve(*field), "a"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tuple_targets_and_separators() {
        let (body, _) = parse("s.a, s.b = s.c, 1; s.d @= 2\ns.e <<= 3");
        assert_eq!(body.stmts.len(), 3);
        let Stmt::Assign { targets, .. } = &body.stmts[0] else {
            panic!()
        };
        assert_eq!(targets.len(), 2);
        assert!(matches!(body.stmts[2], Stmt::Assign { op: AssignOp::Seq, .. }));
    }

    #[test]
    fn if_elif_else_across_lines() {
        let src = "if s.sel == 0 {\n  s.out = s.a\n}\nelif s.sel == 1 { s.out = s.b }\nelse {\n  s.out = 0\n}";
        let (body, _) = parse(src);
        assert_eq!(body.stmts.len(), 1);
        let Stmt::If { branches, orelse, .. } = &body.stmts[0] else {
            panic!()
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(orelse.len(), 1);
        assert!(matches!(branches[0].0, Expr::Binary { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn for_loop_and_return() {
        let (body, _) = parse("for i in range(4) {\n s.x[i] = s.y[i]\n}\nreturn s.z, 1");
        assert!(matches!(body.stmts[0], Stmt::For { .. }));
        assert!(matches!(
            body.stmts[1],
            Stmt::Return { value: Some(Expr::Tuple { .. }), .. }
        ));
        let (body, _) = parse("if s.a { return }");
        let Stmt::If { branches, .. } = &body.stmts[0] else {
            panic!()
        };
        assert!(matches!(branches[0].1[0], Stmt::Return { value: None, .. }));
    }

    #[test]
    fn missing_separator_is_an_error() {
        let err = parse_err("s.a = 1 s.b = 2");
        assert!(err.message.contains("line break"), "{}", err.message);
    }

    #[test]
    fn non_assignable_target() {
        let err = parse_err("f(s.a) = 1");
        assert_eq!(err.message, "cannot assign to this expression");
        assert_eq!((err.span.start, err.span.end), (0, 6));
    }

    #[test]
    fn unclosed_block() {
        let err = parse_err("if s.a {\n s.b = 1\n");
        assert!(err.message.starts_with("expected `}`"), "{}", err.message);
    }

    #[test]
    fn chain_text() {
        let interner = Interner::new();
        let chain = parse_chain("s.x[2].y", FileId::DUMMY, &interner).unwrap();
        assert_eq!(chain.display(&interner), "s.x[2].y");
        assert!(parse_chain("x.y", FileId::DUMMY, &interner).is_err());
        assert!(parse_chain("s.a s.b", FileId::DUMMY, &interner).is_err());
    }
}
