use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::runtime::context::Context;
use crate::runtime::env::Env;
use crate::runtime::list::List;
use crate::runtime::record::Record;
use crate::syntax::ast::Lambda;
use crate::syntax::printer::{format_num, write_expr, write_pattern, write_string_lit};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    List(List),
    Record(Record),
    Function(Rc<Closure>),
    /// A function exported by a namespace provider, called by name.
    Builtin(&'static str),
}

/// A lambda together with the environment it was evaluated in.
#[derive(Debug)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Rc<Env>,
    /// Set when the closure is bound by a definition; used in call frames.
    pub name: Option<Rc<str>>,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null        => "null",
            Value::Bool(_)     => "bool",
            Value::Num(_)      => "num",
            Value::Str(_)      => "string",
            Value::List(_)     => "list",
            Value::Record(_)   => "record",
            Value::Function(_) => "function",
            Value::Builtin(_)  => "function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn to_num(&self, cx: &dyn Context) -> Result<f64, Error> {
        self.as_num().ok_or_else(|| {
            cx.error(ErrorCode::E002, format!("expected a number, got {}", self.kind_name()))
        })
    }

    pub fn to_bool(&self, cx: &dyn Context) -> Result<bool, Error> {
        self.as_bool().ok_or_else(|| {
            cx.error(ErrorCode::E002, format!("expected a bool, got {}", self.kind_name()))
        })
    }

    pub fn to_list(&self, cx: &dyn Context) -> Result<&List, Error> {
        self.as_list().ok_or_else(|| {
            cx.error(ErrorCode::E002, format!("expected a list, got {}", self.kind_name()))
        })
    }

    /// Language-level `==`. Values of different kinds are unequal; functions
    /// have no equality and comparing one is an error.
    pub fn equal(&self, other: &Value, cx: &dyn Context) -> Result<bool, Error> {
        match (self, other) {
            (a, b) if a.is_callable() || b.is_callable() => Err(cx.error(
                ErrorCode::E009,
                format!("cannot compare {} with {}", a.kind_name(), b.kind_name()),
            )),
            (Value::Null, Value::Null) => Ok(true),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Num(a), Value::Num(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::List(a), Value::List(b)) => a.equal(b, cx),
            (Value::Record(a), Value::Record(b)) => a.equal(b, cx),
            _ => Ok(false),
        }
    }
}

/// Host-side equality for tests and caches: structural on data, identity on
/// functions. Unlike `equal` it never fails.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.as_slice() == b.as_slice(),
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Num(n) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.into()) }
}

impl From<List> for Value {
    fn from(l: List) -> Self { Value::List(l) }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self { Value::Record(r) }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Values print as source text that evaluates back to an equivalent value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => f.write_str(&format_num(*n)),
            Value::Str(s) => write_string_lit(f, s),
            Value::List(l) => write!(f, "{l}"),
            Value::Record(r) => write!(f, "{r}"),
            Value::Function(c) => write!(f, "{c}"),
            Value::Builtin(name) => f.write_str(name),
        }
    }
}

impl Value {
    /// Collect the names the printed form of this value leaves free. They
    /// only resolve correctly where no binding shadows the builtin.
    fn builtin_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            Value::List(items) => items.iter().for_each(|v| v.builtin_refs(out)),
            Value::Record(r) => r.iter().for_each(|(_, v)| v.builtin_refs(out)),
            Value::Function(c) => c.builtin_refs(out),
            Value::Builtin(name) => {
                out.insert(name.to_string());
            }
            _ => {}
        }
    }
}

impl Closure {
    /// Captured variables that need to be spelled out for the lambda to
    /// mean the same thing elsewhere. Names that resolve to builtins are
    /// left to resolve again.
    pub fn captures(&self) -> Vec<(String, Value)> {
        self.lambda
            .free_vars()
            .into_iter()
            .filter_map(|name| {
                let value = self.env.lookup(&name)?;
                match value {
                    Value::Builtin(b) if *b == name => None,
                    v => Some((name, v.clone())),
                }
            })
            .collect()
    }

    fn write_lambda(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pattern(f, &self.lambda.param)?;
        f.write_str(" -> ")?;
        write_expr(f, &self.lambda.body, 0)
    }

    fn builtin_refs(&self, out: &mut BTreeSet<String>) {
        for name in self.lambda.free_vars() {
            match self.env.lookup(&name) {
                Some(Value::Builtin(b)) if *b == name => {
                    out.insert(name);
                }
                Some(v) => v.builtin_refs(out),
                None => {
                    out.insert(name);
                }
            }
        }
    }
}

/// An order in which `captures` can be bound by a sequential `let` without
/// any binding shadowing a builtin that a later value relies on. `None`
/// when the dependencies form a cycle.
fn binding_order(captures: &[(String, Value)]) -> Option<Vec<usize>> {
    let needs: Vec<BTreeSet<String>> = captures
        .iter()
        .map(|(_, v)| {
            let mut refs = BTreeSet::new();
            v.builtin_refs(&mut refs);
            refs
        })
        .collect();

    let mut placed = vec![false; captures.len()];
    let mut order = Vec::with_capacity(captures.len());
    while order.len() < captures.len() {
        let next = (0..captures.len()).find(|&j| {
            !placed[j]
                && (0..captures.len()).all(|i| placed[i] || i == j || !needs[i].contains(&captures[j].0))
        })?;
        placed[next] = true;
        order.push(next);
    }
    Some(order)
}

/// `x -> body`, or `let a = ...; in x -> body` when the body refers to
/// variables from the enclosing scope. If no binding order is safe, the
/// captures are passed in parallel: `([a, b] -> x -> body)(..., ...)`.
impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let captures = self.captures();
        if captures.is_empty() {
            return self.write_lambda(f);
        }
        match binding_order(&captures) {
            Some(order) => {
                f.write_str("let ")?;
                for i in order {
                    let (name, value) = &captures[i];
                    write!(f, "{name} = {value}; ")?;
                }
                f.write_str("in ")?;
                self.write_lambda(f)
            }
            None => {
                let names: Vec<&str> = captures.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "([{}] -> ", names.join(", "))?;
                self.write_lambda(f)?;
                f.write_str(")(")?;
                for (i, (_, value)) in captures.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
