//! Reductions over lists.
//!
//! `min`, `max` and `sum` fold their list argument pairwise, and the pairwise
//! step broadcasts: `max([q, 0])` clamps every element of `q` at zero, while
//! `max(q)` is the largest element of `q`.

use crate::error::{Error, ErrorCode};
use crate::runtime::binop_registry::map_list;
use crate::runtime::context::{AtIndex, Context};
use crate::runtime::list::ListBuilder;
use crate::runtime::value::Value;
use super::{f, Export, NamespaceProvider};

pub fn list_exports() -> Vec<Export> {
    vec![
        f("count"),
        f("min"),
        f("max"),
        f("sum"),
        f("mag"),
        f("dot"),
    ]
}

fn pairwise(op: fn(f64, f64) -> f64, a: &Value, b: &Value, cx: &dyn Context) -> Result<Value, Error> {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => Ok(Value::Num(op(*x, *y))),
        (Value::List(xs), Value::Num(_)) => map_list(xs, cx, |x, cx| pairwise(op, x, b, cx)),
        (Value::Num(_), Value::List(ys)) => map_list(ys, cx, |y, cx| pairwise(op, a, y, cx)),
        (Value::List(xs), Value::List(ys)) => {
            xs.assert_length(ys.len(), cx)?;
            let mut out = ListBuilder::with_capacity(xs.len());
            for (index, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
                out.push(pairwise(op, x, y, &AtIndex { parent: cx, index })?);
            }
            Ok(Value::List(out.finish()))
        }
        _ => Err(cx.error(
            ErrorCode::E002,
            format!("expected numbers or lists, got {} and {}", a.kind_name(), b.kind_name()),
        )),
    }
}

fn fold(op: fn(f64, f64) -> f64, identity: f64, arg: &Value, cx: &dyn Context) -> Result<Value, Error> {
    let items = arg.to_list(cx)?;
    let mut acc = Value::Num(identity);
    for (index, item) in items.iter().enumerate() {
        acc = pairwise(op, &acc, item, &AtIndex { parent: cx, index })?;
    }
    Ok(acc)
}

fn num_vector(v: &Value, cx: &dyn Context) -> Result<Vec<f64>, Error> {
    v.to_list(cx)?
        .iter()
        .enumerate()
        .map(|(index, x)| x.to_num(&AtIndex { parent: cx, index }))
        .collect()
}

pub struct ListNamespace;

impl NamespaceProvider for ListNamespace {
    fn name(&self) -> &'static str { "list" }
    fn exports(&self) -> Vec<Export> { list_exports() }

    fn call(&self, name: &str, arg: &Value, cx: &dyn Context) -> Result<Option<Value>, Error> {
        let v = match name {
            "count" => match arg {
                Value::List(items) => Value::Num(items.len() as f64),
                Value::Str(s) => Value::Num(s.chars().count() as f64),
                other => return Err(cx.error(
                    ErrorCode::E002,
                    format!("`count` expects a list, got {}", other.kind_name()),
                )),
            },
            "min" => fold(f64::min, f64::INFINITY, arg, cx)?,
            "max" => fold(f64::max, f64::NEG_INFINITY, arg, cx)?,
            "sum" => fold(|a, b| a + b, 0.0, arg, cx)?,
            "mag" => {
                let v = num_vector(arg, cx)?;
                Value::Num(v.iter().map(|x| x * x).sum::<f64>().sqrt())
            }
            "dot" => {
                let pair = arg.to_list(cx)?;
                pair.assert_length(2, cx)?;
                let a = num_vector(&pair[0], &AtIndex { parent: cx, index: 0 })?;
                let b = num_vector(&pair[1], &AtIndex { parent: cx, index: 1 })?;
                if a.len() != b.len() {
                    return Err(cx.error(
                        ErrorCode::E003,
                        format!("`dot` operands have lengths {} and {}", a.len(), b.len()),
                    ));
                }
                Value::Num(a.iter().zip(&b).map(|(x, y)| x * y).sum())
            }
            _ => return Ok(None),
        };
        Ok(Some(v))
    }

    fn get_constant(&self, _name: &str) -> Option<Value> {
        None
    }
}
