use std::collections::BTreeSet;
use std::rc::Rc;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ─── Definitions and patterns ────────────────────────────────────────────────

/// `name = expr` inside a `let` block or the prelude.
#[derive(Debug, Clone)]
pub struct Def {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Left-hand side of a lambda: `x` or `[x, [y, z]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(String, Span),
    List(Vec<Pattern>, Span),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Ident(_, s) | Pattern::List(_, s) => *s,
        }
    }

    pub fn bound_names(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Ident(name, _) => out.push(name.clone()),
            Pattern::List(items, _) => items.iter().for_each(|p| p.bound_names(out)),
        }
    }
}

/// `pattern -> body`. Shared by every closure created from it.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub param: Pattern,
    pub body: Expr,
    pub span: Span,
}

impl Lambda {
    /// Names referenced by the body that are not bound by the parameter
    /// or by an inner binding form. Sorted, so printing is deterministic.
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut bound = Vec::new();
        self.param.bound_names(&mut bound);
        let mut out = BTreeSet::new();
        self.body.collect_free(&mut bound, &mut out);
        out
    }
}

// ─── Expressions ─────────────────────────────────────────────────────────────

/// Any syntax node that can anchor a diagnostic.
pub type Phrase = Expr;

#[derive(Debug, Clone)]
pub enum Expr {
    Num(f64, Span),
    Bool(bool, Span),
    Null(Span),
    StringLit(String, Span),
    Ident(String, Span),

    /// `[a, b, c]`
    List(Vec<Expr>, Span),

    /// `{name: expr, ...}`
    Record(Vec<(String, Expr)>, Span),

    /// `a + b`, `a == b`, etc.
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `-x`, `!x`
    UnOp {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// `if (cond) a else b`
    If {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        span: Span,
    },

    /// `let a = 1; b = a + 1; in body`. Definitions are sequential.
    Let {
        defs: Vec<Def>,
        body: Rc<Expr>,
        span: Span,
    },

    /// `x -> body`
    Lambda(Rc<Lambda>),

    /// `f(a)` passes `a`; `f(a, b)` passes `[a, b]`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },

    /// `expr[index]`
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },

    /// `expr.field`
    Field {
        expr: Box<Expr>,
        field: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Num(_, s)          => *s,
            Expr::Bool(_, s)         => *s,
            Expr::Null(s)            => *s,
            Expr::StringLit(_, s)    => *s,
            Expr::Ident(_, s)        => *s,
            Expr::List(_, s)         => *s,
            Expr::Record(_, s)       => *s,
            Expr::BinOp { span, .. } => *span,
            Expr::UnOp { span, .. }  => *span,
            Expr::If { span, .. }    => *span,
            Expr::Let { span, .. }   => *span,
            Expr::Lambda(l)          => l.span,
            Expr::Call { span, .. }  => *span,
            Expr::Index { span, .. } => *span,
            Expr::Field { span, .. } => *span,
        }
    }

    fn collect_free(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match self {
            Expr::Num(..) | Expr::Bool(..) | Expr::Null(_) | Expr::StringLit(..) => {}
            Expr::Ident(name, _) => {
                if !bound.iter().any(|b| b == name) {
                    out.insert(name.clone());
                }
            }
            Expr::List(items, _) => items.iter().for_each(|e| e.collect_free(bound, out)),
            Expr::Record(fields, _) => fields.iter().for_each(|(_, e)| e.collect_free(bound, out)),
            Expr::BinOp { left, right, .. } => {
                left.collect_free(bound, out);
                right.collect_free(bound, out);
            }
            Expr::UnOp { operand, .. } => operand.collect_free(bound, out),
            Expr::If { condition, then_expr, else_expr, .. } => {
                condition.collect_free(bound, out);
                then_expr.collect_free(bound, out);
                else_expr.collect_free(bound, out);
            }
            Expr::Let { defs, body, .. } => {
                let mark = bound.len();
                for def in defs {
                    def.value.collect_free(bound, out);
                    bound.push(def.name.clone());
                }
                body.collect_free(bound, out);
                bound.truncate(mark);
            }
            Expr::Lambda(lambda) => {
                let mark = bound.len();
                lambda.param.bound_names(bound);
                lambda.body.collect_free(bound, out);
                bound.truncate(mark);
            }
            Expr::Call { callee, args, .. } => {
                callee.collect_free(bound, out);
                args.iter().for_each(|e| e.collect_free(bound, out));
            }
            Expr::Index { expr, index, .. } => {
                expr.collect_free(bound, out);
                index.collect_free(bound, out);
            }
            Expr::Field { expr, .. } => expr.collect_free(bound, out),
        }
    }
}

/// The phrase a program's result comes from: `let ... in body` is peeled
/// down to `body`, recursively. Used as the diagnostic anchor of a program.
pub fn nub(phrase: &Rc<Expr>) -> Rc<Expr> {
    let mut current = phrase.clone();
    loop {
        let next = match current.as_ref() {
            Expr::Let { body, .. } => body.clone(),
            _ => return current,
        };
        current = next;
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div, Pow,
    Eq, NotEq,
    Lt, LtEq, Gt, GtEq,
    And, Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add  => "+",  BinOp::Sub   => "-",
            BinOp::Mul  => "*",  BinOp::Div   => "/",  BinOp::Pow => "^",
            BinOp::Eq   => "==", BinOp::NotEq => "!=",
            BinOp::Lt   => "<",  BinOp::LtEq  => "<=",
            BinOp::Gt   => ">",  BinOp::GtEq  => ">=",
            BinOp::And  => "&&", BinOp::Or    => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
