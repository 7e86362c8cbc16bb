//! Syntax tree of a block body.

use weft_common::Ident;
use weft_source::Span;

/// A parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-level statements.
    pub stmts: Vec<Stmt>,
}

/// Assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Plain,
    /// `@=`
    Comb,
    /// `<<=`
    Seq,
    /// `+=` and friends.
    Augmented,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `targets op value`
    Assign {
        /// Store positions, one per comma-separated target.
        targets: Vec<Expr>,
        /// Operator.
        op: AssignOp,
        /// Assigned value.
        value: Expr,
        /// Whole statement.
        span: Span,
    },
    /// `if c { } elif c { } else { }`
    If {
        /// Condition/body pairs, `if` first then each `elif`.
        branches: Vec<(Expr, Vec<Stmt>)>,
        /// `else` body, empty when absent.
        orelse: Vec<Stmt>,
        /// Whole statement.
        span: Span,
    },
    /// `for var in iter { }`
    For {
        /// Loop variable.
        var: Ident,
        /// Iterated expression.
        iter: Expr,
        /// Loop body.
        body: Vec<Stmt>,
        /// Whole statement.
        span: Span,
    },
    /// `return` with an optional value.
    Return {
        /// Returned value.
        value: Option<Expr>,
        /// Whole statement.
        span: Span,
    },
    /// `pass`
    Pass(Span),
    /// An expression evaluated for its effect.
    Expr(Expr),
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `~`
    Invert,
    /// `not`
    Not,
}

/// Infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `or`
    Or,
    /// `and`
    And,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare name.
    Name {
        /// The name.
        name: Ident,
        /// Location.
        span: Span,
    },
    /// An integer literal.
    Int {
        /// Value.
        value: i64,
        /// Location.
        span: Span,
    },
    /// A string literal; its text is never inspected.
    Str(Span),
    /// `base.field`
    Attr {
        /// Object.
        base: Box<Expr>,
        /// Field name.
        field: Ident,
        /// Whole expression.
        span: Span,
    },
    /// `base[index]`
    Index {
        /// Indexed object.
        base: Box<Expr>,
        /// Index.
        index: Box<Expr>,
        /// Whole expression.
        span: Span,
    },
    /// `base[lo:hi]`, either bound optional.
    Slice {
        /// Sliced object.
        base: Box<Expr>,
        /// Lower bound.
        lo: Option<Box<Expr>>,
        /// Upper bound.
        hi: Option<Box<Expr>>,
        /// Whole expression.
        span: Span,
    },
    /// `func(args)`
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Whole expression.
        span: Span,
    },
    /// Prefix operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
        /// Whole expression.
        span: Span,
    },
    /// Infix operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Whole expression.
        span: Span,
    },
    /// `a, b` on the right of an assignment or in a `return`.
    Tuple {
        /// Items.
        items: Vec<Expr>,
        /// Whole expression.
        span: Span,
    },
}

impl Expr {
    /// Location of the whole expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Str(span) => *span,
            Expr::Name { span, .. }
            | Expr::Int { span, .. }
            | Expr::Attr { span, .. }
            | Expr::Index { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Call { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Tuple { span, .. } => *span,
        }
    }

    /// Value of an integer literal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expr::Int { value, .. } => Some(*value),
            _ => None,
        }
    }
}
