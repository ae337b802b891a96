//! Tree-walking evaluator. Turns an expression and an environment into a
//! `Value`. Builtins are dispatched through the system's NamespaceRegistry
//! and arithmetic through its BinopRegistry; the evaluator itself holds no
//! function implementations.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::runtime::binop_registry::map_list;
use crate::runtime::context::{At, Context, Frame};
use crate::runtime::env::Env;
use crate::runtime::list::{List, ListBuilder};
use crate::runtime::record::Record;
use crate::runtime::value::{Closure, Value};
use crate::syntax::ast::{BinOp, Def, Expr, Pattern, Span, UnOp};
use crate::system::System;

pub struct Interpreter<'s> {
    system: &'s System,
    source: Rc<str>,
    frames: Vec<Frame<'s>>,
    /// Innermost call active when the first error was raised.
    fault: Option<Frame<'s>>,
}

impl<'s> Interpreter<'s> {
    pub fn new(system: &'s System, source: impl Into<Rc<str>>) -> Self {
        Self { system, source: source.into(), frames: Vec::new(), fault: None }
    }

    /// Frame in which the last failed evaluation raised its error, if the
    /// error happened inside a function call.
    pub fn fault(&self) -> Option<&Frame<'s>> { self.fault.as_ref() }

    // ─── Definitions ──────────────────────────────────────────────────────────

    /// Evaluate `defs` in order, each one seeing the ones before it.
    pub fn eval_defs(&mut self, defs: &[Def], env: &Rc<Env>) -> Result<Rc<Env>, Error> {
        let mut env = env.clone();
        for def in defs {
            let value = name_closure(self.eval(&def.value, &env)?, &def.name);
            env = Env::bind(&env, &def.name, value);
        }
        Ok(env)
    }

    // ─── Expression evaluator ─────────────────────────────────────────────────

    pub fn eval(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Value, Error> {
        match expr {
            Expr::Num(v, _)       => Ok(Value::Num(*v)),
            Expr::Bool(v, _)      => Ok(Value::Bool(*v)),
            Expr::Null(_)         => Ok(Value::Null),
            Expr::StringLit(s, _) => Ok(Value::Str(s.as_str().into())),

            Expr::Ident(name, span) => {
                if let Some(v) = env.lookup(name) {
                    return Ok(v.clone());
                }
                self.system.registry().lookup(name)
                    .ok_or_else(|| At(*span).error(ErrorCode::E001, format!("`{name}` is not defined")))
            }

            Expr::List(items, _) => {
                let mut out = ListBuilder::with_capacity(items.len());
                for item in items {
                    out.push(self.eval(item, env)?);
                }
                Ok(Value::List(out.finish()))
            }

            Expr::Record(fields, _) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, e) in fields {
                    values.push((name.as_str(), self.eval(e, env)?));
                }
                Ok(Value::Record(values.into_iter().collect::<Record>()))
            }

            Expr::BinOp { left, op: BinOp::And, right, span } => {
                if self.eval(left, env)?.to_bool(&At(*span))? {
                    Ok(Value::Bool(self.eval(right, env)?.to_bool(&At(*span))?))
                } else {
                    Ok(Value::Bool(false))
                }
            }

            Expr::BinOp { left, op: BinOp::Or, right, span } => {
                if self.eval(left, env)?.to_bool(&At(*span))? {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(self.eval(right, env)?.to_bool(&At(*span))?))
                }
            }

            Expr::BinOp { left, op, right, span } => {
                let l = self.eval(left, env)?;
                let r = self.eval(right, env)?;
                let cx = At(*span);
                match op {
                    BinOp::Eq    => Ok(Value::Bool(l.equal(&r, &cx)?)),
                    BinOp::NotEq => Ok(Value::Bool(!l.equal(&r, &cx)?)),
                    _ => self.system.binops().eval(*op, l, r, &cx),
                }
            }

            Expr::UnOp { op, operand, span } => {
                let v = self.eval(operand, env)?;
                let cx = At(*span);
                match op {
                    UnOp::Neg => negate(&v, &cx),
                    UnOp::Not => Ok(Value::Bool(!v.to_bool(&cx)?)),
                }
            }

            Expr::If { condition, then_expr, else_expr, span } => {
                match self.eval(condition, env)? {
                    Value::Bool(true)  => self.eval(then_expr, env),
                    Value::Bool(false) => self.eval(else_expr, env),
                    other => Err(At(*span).error(
                        ErrorCode::E002,
                        format!("`if` condition must be a bool, got {}", other.kind_name()),
                    )),
                }
            }

            Expr::Let { defs, body, .. } => {
                let inner = self.eval_defs(defs, env)?;
                self.eval(body, &inner)
            }

            Expr::Lambda(lambda) => Ok(Value::Function(Rc::new(Closure {
                lambda: lambda.clone(),
                env: env.clone(),
                name: None,
            }))),

            Expr::Call { callee, args, span } => {
                let f = self.eval(callee, env)?;
                let arg = match args.as_slice() {
                    [single] => self.eval(single, env)?,
                    many => {
                        let mut out = ListBuilder::with_capacity(many.len());
                        for a in many {
                            out.push(self.eval(a, env)?);
                        }
                        Value::List(out.finish())
                    }
                };
                self.call(&f, arg, *span)
            }

            Expr::Index { expr, index, span } => {
                let coll = self.eval(expr, env)?;
                let idx = self.eval(index, env)?;
                let cx = At(*span);
                let Value::List(items) = &coll else {
                    return Err(cx.error(ErrorCode::E002, format!("cannot index a {}", coll.kind_name())));
                };
                let i = idx.to_num(&cx)?;
                if i.fract() != 0.0 {
                    return Err(cx.error(ErrorCode::E002, format!("index {i} is not an integer")));
                }
                if i < 0.0 {
                    return Err(cx.error(ErrorCode::E004, format!("index {i} is out of range")));
                }
                items.at(i as usize, &cx).cloned()
            }

            Expr::Field { expr, field, span } => {
                let obj = self.eval(expr, env)?;
                let cx = At(*span);
                match &obj {
                    Value::Record(r) => r.at(field, &cx).cloned(),
                    other => Err(cx.error(
                        ErrorCode::E002,
                        format!("cannot select field `{field}` of a {}", other.kind_name()),
                    )),
                }
            }
        }
    }

    // ─── Calls ────────────────────────────────────────────────────────────────

    pub fn call(&mut self, f: &Value, arg: Value, span: Span) -> Result<Value, Error> {
        let cx = At(span);
        match f {
            Value::Builtin(name) => {
                log::trace!("call builtin `{name}`");
                self.system.registry().call_any(name, &arg, &cx)?
                    .ok_or_else(|| cx.error(ErrorCode::E005, format!("builtin `{name}` is not callable")))
            }
            Value::Function(closure) => self.call_closure(closure, arg, span),
            other => Err(cx.error(ErrorCode::E005, format!("a {} is not callable", other.kind_name()))),
        }
    }

    fn call_closure(&mut self, closure: &Rc<Closure>, arg: Value, span: Span) -> Result<Value, Error> {
        let max_depth = self.system.config().max_depth;
        if self.frames.len() >= max_depth {
            return Err(At(span).error(
                ErrorCode::E010,
                format!("call depth exceeds the limit of {max_depth}"),
            ));
        }

        let mut vars = HashMap::new();
        bind_pattern(&closure.lambda.param, arg, &mut vars)?;
        let env = Env::extend(&closure.env, vars);

        let callee: Rc<str> = closure.name.clone().unwrap_or_else(|| "<lambda>".into());
        self.frames.push(Frame::new(self.system, self.source.clone(), callee, span));
        let result = self.eval(&closure.lambda.body, &env);
        let frame = self.frames.pop();
        if result.is_err() && self.fault.is_none() {
            self.fault = frame;
        }
        result
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Give an anonymous closure the name it is being bound to.
fn name_closure(value: Value, name: &str) -> Value {
    match value {
        Value::Function(c) if c.name.is_none() => Value::Function(Rc::new(Closure {
            lambda: c.lambda.clone(),
            env: c.env.clone(),
            name: Some(name.into()),
        })),
        v => v,
    }
}

fn bind_pattern(pat: &Pattern, arg: Value, vars: &mut HashMap<String, Value>) -> Result<(), Error> {
    match pat {
        Pattern::Ident(name, _) => {
            vars.insert(name.clone(), arg);
            Ok(())
        }
        Pattern::List(items, span) => {
            let cx = At(*span);
            let list: List = arg.to_list(&cx)?.clone();
            list.assert_length(items.len(), &cx)?;
            for (p, v) in items.iter().zip(list.iter()) {
                bind_pattern(p, v.clone(), vars)?;
            }
            Ok(())
        }
    }
}

fn negate(v: &Value, cx: &dyn Context) -> Result<Value, Error> {
    match v {
        Value::Num(n) => Ok(Value::Num(-n)),
        Value::List(items) => map_list(items, cx, negate),
        other => Err(cx.error(ErrorCode::E002, format!("cannot negate a {}", other.kind_name()))),
    }
}
