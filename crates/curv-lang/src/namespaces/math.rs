//! Scalar math. One-argument functions broadcast over (nested) lists.

use crate::error::Error;
use crate::runtime::binop_registry::map_list;
use crate::runtime::context::Context;
use crate::runtime::value::Value;
use super::{as_num_pair, c, f, Export, NamespaceProvider};

pub fn math_exports() -> Vec<Export> {
    vec![
        f("sqrt"),
        f("abs"),
        f("floor"),
        f("ceil"),
        f("sin"),
        f("cos"),
        f("tan"),
        f("atan2"),
        f("pow"),

        c("pi"),
        c("tau"),
        c("inf"),
    ]
}

fn unary(name: &str) -> Option<fn(f64) -> f64> {
    let op: fn(f64) -> f64 = match name {
        "sqrt"  => f64::sqrt,
        "abs"   => f64::abs,
        "floor" => f64::floor,
        "ceil"  => f64::ceil,
        "sin"   => f64::sin,
        "cos"   => f64::cos,
        "tan"   => f64::tan,
        _ => return None,
    };
    Some(op)
}

fn broadcast(op: fn(f64) -> f64, arg: &Value, cx: &dyn Context) -> Result<Value, Error> {
    match arg {
        Value::List(items) => map_list(items, cx, |v, cx| broadcast(op, v, cx)),
        v => Ok(Value::Num(op(v.to_num(cx)?))),
    }
}

pub struct MathNamespace;

impl NamespaceProvider for MathNamespace {
    fn name(&self) -> &'static str { "math" }
    fn exports(&self) -> Vec<Export> { math_exports() }

    fn call(&self, name: &str, arg: &Value, cx: &dyn Context) -> Result<Option<Value>, Error> {
        if let Some(op) = unary(name) {
            return broadcast(op, arg, cx).map(Some);
        }
        let v = match name {
            "atan2" => {
                let (y, x) = as_num_pair(name, arg, cx)?;
                Value::Num(y.atan2(x))
            }
            "pow" => {
                let (a, b) = as_num_pair(name, arg, cx)?;
                Value::Num(a.powf(b))
            }
            _ => return Ok(None),
        };
        Ok(Some(v))
    }

    fn get_constant(&self, name: &str) -> Option<Value> {
        match name {
            "pi"  => Some(Value::Num(std::f64::consts::PI)),
            "tau" => Some(Value::Num(std::f64::consts::TAU)),
            "inf" => Some(Value::Num(f64::INFINITY)),
            _ => None,
        }
    }
}
