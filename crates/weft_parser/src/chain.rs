//! Name-chain extraction.
//!
//! A name chain is the syntactic shape of a reference such as
//! `s.x[i][2].y[0:4]`: a list of fields, each with the subscripts applied to it.
//! Chains are a pure function of the body text; turning them into live objects
//! is the resolver's job.

use crate::ast::{Body, Expr, Stmt};
use crate::error::ParseError;
use std::fmt::Write;
use weft_common::{Ident, Interner};
use weft_source::Span;

/// One subscript of a chain segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexDesc {
    /// Integer literal.
    Int(i64),
    /// A bare name; resolves to a constant of that name, or to every element
    /// when no such constant exists.
    Named(Ident),
    /// Every element.
    Wildcard,
    /// Literal range `[lo:hi]`. Only ever the last subscript of a chain.
    Slice {
        /// Lower bound.
        lo: i64,
        /// Upper bound.
        hi: i64,
    },
}

/// A field and the subscripts applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainSegment {
    /// Field name.
    pub field: Ident,
    /// Subscripts in source order.
    pub indices: Vec<IndexDesc>,
}

/// A reference rooted at `s`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameChain {
    /// Segments after `s`, outermost first.
    pub segments: Vec<ChainSegment>,
}

impl NameChain {
    /// Renders the chain as source-like text, wildcards as `[*]`.
    pub fn display(&self, interner: &Interner) -> String {
        let mut out = String::from("s");
        for seg in &self.segments {
            let _ = write!(out, ".{}", interner.resolve(seg.field));
            for idx in &seg.indices {
                let _ = match idx {
                    IndexDesc::Int(i) => write!(out, "[{i}]"),
                    IndexDesc::Named(n) => write!(out, "[{}]", interner.resolve(*n)),
                    IndexDesc::Wildcard => write!(out, "[*]"),
                    IndexDesc::Slice { lo, hi } => write!(out, "[{lo}:{hi}]"),
                };
            }
        }
        out
    }
}

/// A chain and where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRef {
    /// The chain.
    pub chain: NameChain,
    /// The reference in the body.
    pub span: Span,
}

/// A call through a bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRef {
    /// Callee name.
    pub name: Ident,
    /// The call expression.
    pub span: Span,
}

/// Everything a body reads, writes and calls, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Chains in load position.
    pub reads: Vec<ChainRef>,
    /// Chains in store position.
    pub writes: Vec<ChainRef>,
    /// Bare-name calls.
    pub calls: Vec<CallRef>,
}

/// Extracts reads, writes and calls from a parsed body.
///
/// Fails if a slice is followed by further subscripts or fields.
pub fn extract(body: &Body, interner: &Interner) -> Result<Extracted, ParseError> {
    let mut ex = Extractor {
        this: interner.get_or_intern("s"),
        out: Extracted::default(),
    };
    for stmt in &body.stmts {
        ex.stmt(stmt)?;
    }
    Ok(ex.out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Load,
    Store,
}

struct Extractor {
    this: Ident,
    out: Extracted,
}

impl Extractor {
    fn stmt(&mut self, stmt: &Stmt) -> Result<(), ParseError> {
        match stmt {
            Stmt::Assign { targets, value, .. } => {
                self.expr(value, Ctx::Load)?;
                for target in targets {
                    self.expr(target, Ctx::Store)?;
                }
            }
            Stmt::If {
                branches, orelse, ..
            } => {
                for (cond, body) in branches {
                    self.expr(cond, Ctx::Load)?;
                    self.stmts(body)?;
                }
                self.stmts(orelse)?;
            }
            Stmt::For { iter, body, .. } => {
                self.expr(iter, Ctx::Load)?;
                self.stmts(body)?;
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.expr(value, Ctx::Load)?;
                }
            }
            Stmt::Expr(expr) => self.expr(expr, Ctx::Load)?,
            Stmt::Pass(_) => {}
        }
        Ok(())
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> Result<(), ParseError> {
        stmts.iter().try_for_each(|s| self.stmt(s))
    }

    fn expr(&mut self, expr: &Expr, ctx: Ctx) -> Result<(), ParseError> {
        match expr {
            Expr::Attr { .. } | Expr::Index { .. } | Expr::Slice { .. } => {
                let mut nested = Vec::new();
                if let Some(chain) = build_chain(expr, self.this, &mut nested)? {
                    let r = ChainRef {
                        chain,
                        span: expr.span(),
                    };
                    match ctx {
                        Ctx::Load => self.out.reads.push(r),
                        Ctx::Store => self.out.writes.push(r),
                    }
                }
                for sub in nested {
                    self.expr(sub, Ctx::Load)?;
                }
            }
            Expr::Call { func, args, span } => {
                match func.as_ref() {
                    Expr::Name { name, .. } => self.out.calls.push(CallRef {
                        name: *name,
                        span: *span,
                    }),
                    // Method call: only the receiver is data.
                    Expr::Attr { base, .. } => self.expr(base, Ctx::Load)?,
                    other => self.expr(other, Ctx::Load)?,
                }
                for arg in args {
                    self.expr(arg, Ctx::Load)?;
                }
            }
            Expr::Unary { operand, .. } => self.expr(operand, ctx)?,
            Expr::Binary { left, right, .. } => {
                self.expr(left, Ctx::Load)?;
                self.expr(right, Ctx::Load)?;
            }
            Expr::Tuple { items, .. } => {
                for item in items {
                    self.expr(item, ctx)?;
                }
            }
            Expr::Name { .. } | Expr::Int { .. } | Expr::Str(_) => {}
        }
        Ok(())
    }
}

/// Builds the chain for an attribute/index/slice expression.
///
/// Returns `None` when the expression is not rooted at `this`. Subexpressions
/// that still need visiting (non-literal subscripts, an unrooted base) are
/// pushed onto `nested`.
pub(crate) fn build_chain<'e>(
    expr: &'e Expr,
    this: Ident,
    nested: &mut Vec<&'e Expr>,
) -> Result<Option<NameChain>, ParseError> {
    let mut cur = expr;
    // Subscripts seen since the last field, innermost last.
    let mut pending = Vec::new();

    if let Expr::Slice { base, lo, hi, .. } = cur {
        match (lo.as_deref().and_then(Expr::as_int), hi.as_deref().and_then(Expr::as_int)) {
            (Some(lo), Some(hi)) => pending.push(IndexDesc::Slice { lo, hi }),
            // Non-literal bounds: the reference covers the whole object.
            _ => {
                nested.extend(lo.as_deref());
                nested.extend(hi.as_deref());
            }
        }
        cur = &**base;
    }

    let mut segments = Vec::new();
    loop {
        match cur {
            Expr::Index { base, index, .. } => {
                pending.push(index_desc(index, nested));
                cur = &**base;
            }
            Expr::Slice { span, .. } => {
                return Err(ParseError::new(
                    "a slice must be the last subscript of a reference",
                    *span,
                ));
            }
            Expr::Attr { base, field, .. } => {
                pending.reverse();
                segments.push(ChainSegment {
                    field: *field,
                    indices: std::mem::take(&mut pending),
                });
                cur = &**base;
            }
            Expr::Name { name, .. } if *name == this && pending.is_empty() => {
                segments.reverse();
                return Ok(Some(NameChain { segments }));
            }
            other => {
                nested.push(other);
                return Ok(None);
            }
        }
    }
}

fn index_desc<'e>(index: &'e Expr, nested: &mut Vec<&'e Expr>) -> IndexDesc {
    match index {
        Expr::Int { value, .. } => IndexDesc::Int(*value),
        Expr::Name { name, .. } => IndexDesc::Named(*name),
        other => {
            nested.push(other);
            IndexDesc::Wildcard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_body;
    use weft_source::FileId;

    struct Out {
        ex: Extracted,
        interner: Interner,
    }

    impl Out {
        fn texts(&self, refs: &[ChainRef]) -> Vec<String> {
            refs.iter().map(|r| r.chain.display(&self.interner)).collect()
        }

        fn reads(&self) -> Vec<String> {
            self.texts(&self.ex.reads)
        }

        fn writes(&self) -> Vec<String> {
            self.texts(&self.ex.writes)
        }

        fn calls(&self) -> Vec<&str> {
            self.ex
                .calls
                .iter()
                .map(|c| self.interner.resolve(c.name))
                .collect()
        }
    }

    fn run(src: &str) -> Out {
        let interner = Interner::new();
        let body = parse_body(src, FileId::from_raw(0), &interner).unwrap();
        let ex = extract(&body, &interner).unwrap();
        Out { ex, interner }
    }

    fn run_err(src: &str) -> ParseError {
        let interner = Interner::new();
        let body = parse_body(src, FileId::from_raw(0), &interner).unwrap();
        extract(&body, &interner).unwrap_err()
    }

    #[test]
    fn load_and_store_positions() {
        let out = run("s.b = s.a");
        assert_eq!(out.reads(), vec!["s.a"]);
        assert_eq!(out.writes(), vec!["s.b"]);
        assert!(out.calls().is_empty());
    }

    #[test]
    fn index_kinds() {
        let out = run("s.x[1][NUM][i + 1].y = s.z[s.sel]");
        assert_eq!(out.writes(), vec!["s.x[1][NUM][*].y"]);
        assert_eq!(out.reads(), vec!["s.z[*]", "s.sel"]);
    }

    #[test]
    fn trailing_literal_slice() {
        let out = run("s.v[0:4] = s.w[2:6]");
        assert_eq!(out.writes(), vec!["s.v[0:4]"]);
        assert_eq!(out.reads(), vec!["s.w[2:6]"]);
    }

    #[test]
    fn non_literal_slice_covers_whole_object() {
        let out = run("s.v[s.lo:4] = 0");
        assert_eq!(out.writes(), vec!["s.v"]);
        assert_eq!(out.reads(), vec!["s.lo"]);
    }

    #[test]
    fn slice_must_be_last() {
        let err = run_err("s.a = s.v[0:4][1]");
        assert!(err.message.contains("last subscript"));
        assert_eq!((err.span.start, err.span.end), (6, 14));
        assert!(run_err("s.a = s.v[0:4].x").message.contains("last subscript"));
        assert!(run_err("s.v[0:2][0:1] = 1").message.contains("last subscript"));
    }

    #[test]
    fn only_self_rooted_chains_are_recorded() {
        let out = run("tmp = x.y[s.i]\nz = s[0]");
        assert_eq!(out.reads(), vec!["s.i"]);
        assert!(out.writes().is_empty());
    }

    #[test]
    fn bare_calls_only() {
        let out = run("s.out = f(s.a) + s.q.peek(s.b) + g()");
        assert_eq!(out.calls(), vec!["f", "g"]);
        assert_eq!(out.reads(), vec!["s.a", "s.q", "s.b"]);
        assert_eq!(out.writes(), vec!["s.out"]);
    }

    #[test]
    fn strings_are_ignored() {
        let out = run("assert_ok(s.a, 'bad value in s.a')");
        assert_eq!(out.reads(), vec!["s.a"]);
        assert_eq!(out.calls(), vec!["assert_ok"]);
    }

    #[test]
    fn nested_statements() {
        let src = "if s.en {\n for i in range(s.n) {\n  s.o[i] = s.d[i]\n }\n} else {\n return h(s.z)\n}";
        let out = run(src);
        assert_eq!(out.reads(), vec!["s.en", "s.n", "s.d[i]", "s.z"]);
        assert_eq!(out.writes(), vec!["s.o[i]"]);
        assert_eq!(out.calls(), vec!["range", "h"]);
    }

    #[test]
    fn call_result_chain_is_visited() {
        let out = run("t = make(s.a).field");
        assert_eq!(out.reads(), vec!["s.a"]);
        assert_eq!(out.calls(), vec!["make"]);
    }

    #[test]
    fn spans_point_at_reference() {
        let out = run("s.b = s.a[3]");
        let r = &out.ex.reads[0];
        assert_eq!((r.span.start, r.span.end), (6, 12));
    }
}
