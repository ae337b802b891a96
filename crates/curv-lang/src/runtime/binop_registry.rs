//! Operator registry: maps (BinOp, lhs kind, rhs kind) to an implementation.
//!
//! Arithmetic broadcasts over lists: `list op num`, `num op list` and
//! `list op list` (equal lengths) are registered once and recurse through
//! the registry for each element, so nested lists broadcast too.
//! `==`, `!=`, `&&` and `||` are not here; the interpreter handles them.

use std::collections::HashMap;

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtIndex, Context};
use crate::runtime::list::{List, ListBuilder};
use crate::runtime::value::Value;
use crate::syntax::ast::BinOp;

pub type BinopFn = fn(&BinopRegistry, BinOp, Value, Value, &dyn Context) -> Result<Value, Error>;

pub struct BinopRegistry {
    ops: HashMap<(BinOp, &'static str, &'static str), BinopFn>,
}

impl BinopRegistry {
    pub fn new() -> Self {
        Self { ops: HashMap::new() }
    }

    pub fn register(&mut self, op: BinOp, lhs: &'static str, rhs: &'static str, f: BinopFn) {
        self.ops.insert((op, lhs, rhs), f);
    }

    /// Evaluate `l op r`, or a type-mismatch error if no handler is
    /// registered for this combination of kinds.
    pub fn eval(&self, op: BinOp, l: Value, r: Value, cx: &dyn Context) -> Result<Value, Error> {
        match self.ops.get(&(op, l.kind_name(), r.kind_name())) {
            Some(f) => f(self, op, l, r, cx),
            None => Err(cx.error(
                ErrorCode::E002,
                format!("cannot apply `{}` to {} and {}", op.symbol(), l.kind_name(), r.kind_name()),
            )),
        }
    }
}

impl Default for BinopRegistry {
    fn default() -> Self {
        let mut r = Self::new();
        register_num(&mut r);
        register_broadcast(&mut r);
        register_str(&mut r);
        r
    }
}

// ─── num ──────────────────────────────────────────────────────────────────────

fn nums(l: Value, r: Value) -> (f64, f64) {
    match (l, r) {
        (Value::Num(a), Value::Num(b)) => (a, b),
        _ => unreachable!("registered for (num, num)"),
    }
}

fn register_num(r: &mut BinopRegistry) {
    use BinOp::*;
    // IEEE semantics throughout: 1/0 is inf, 0/0 is NaN
    r.register(Add, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Num(a + b)) });
    r.register(Sub, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Num(a - b)) });
    r.register(Mul, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Num(a * b)) });
    r.register(Div, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Num(a / b)) });
    r.register(Pow, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Num(a.powf(b))) });

    r.register(Lt,   "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Bool(a <  b)) });
    r.register(LtEq, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Bool(a <= b)) });
    r.register(Gt,   "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Bool(a >  b)) });
    r.register(GtEq, "num", "num", |_, _, l, r, _| { let (a, b) = nums(l, r); Ok(Value::Bool(a >= b)) });
}

// ─── list broadcasting ────────────────────────────────────────────────────────

const ARITHMETIC: [BinOp; 5] = [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Pow];

fn register_broadcast(r: &mut BinopRegistry) {
    for op in ARITHMETIC {
        r.register(op, "list", "list", broadcast_list_list);
        r.register(op, "list", "num", broadcast_list_scalar);
        r.register(op, "num", "list", broadcast_scalar_list);
    }
}

fn broadcast_list_list(reg: &BinopRegistry, op: BinOp, l: Value, r: Value, cx: &dyn Context) -> Result<Value, Error> {
    let (Value::List(a), Value::List(b)) = (l, r) else { unreachable!("registered for (list, list)") };
    a.assert_length(b.len(), cx)?;
    let mut out = ListBuilder::with_capacity(a.len());
    for (index, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        out.push(reg.eval(op, x.clone(), y.clone(), &AtIndex { parent: cx, index })?);
    }
    Ok(Value::List(out.finish()))
}

fn broadcast_list_scalar(reg: &BinopRegistry, op: BinOp, l: Value, r: Value, cx: &dyn Context) -> Result<Value, Error> {
    let Value::List(a) = l else { unreachable!("registered for (list, num)") };
    map_list(&a, cx, |x, cx| reg.eval(op, x.clone(), r.clone(), cx))
}

fn broadcast_scalar_list(reg: &BinopRegistry, op: BinOp, l: Value, r: Value, cx: &dyn Context) -> Result<Value, Error> {
    let Value::List(b) = r else { unreachable!("registered for (num, list)") };
    map_list(&b, cx, |y, cx| reg.eval(op, l.clone(), y.clone(), cx))
}

/// Apply `f` to each element, refining the error context with the index.
pub fn map_list(
    list: &List,
    cx: &dyn Context,
    mut f: impl FnMut(&Value, &dyn Context) -> Result<Value, Error>,
) -> Result<Value, Error> {
    let mut out = ListBuilder::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        out.push(f(item, &AtIndex { parent: cx, index })?);
    }
    Ok(Value::List(out.finish()))
}

// ─── string ───────────────────────────────────────────────────────────────────

fn register_str(r: &mut BinopRegistry) {
    r.register(BinOp::Add, "string", "string", |_, _, l, r, _| {
        let (Value::Str(a), Value::Str(b)) = (l, r) else { unreachable!("registered for (string, string)") };
        Ok(Value::Str(format!("{a}{b}").into()))
    });
}
