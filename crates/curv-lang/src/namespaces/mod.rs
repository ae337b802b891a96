//! Builtin providers. Every name a program can use without defining it
//! comes from a provider registered here or from the prelude.

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtIndex, Context};
use crate::runtime::value::Value;

pub mod list;
pub mod math;

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind { Function, Constant }

#[derive(Debug, Clone, Copy)]
pub struct Export {
    pub name: &'static str,
    pub kind: ExportKind,
}

pub(crate) fn f(name: &'static str) -> Export {
    Export { name, kind: ExportKind::Function }
}

pub(crate) fn c(name: &'static str) -> Export {
    Export { name, kind: ExportKind::Constant }
}

// ─── Provider interface ───────────────────────────────────────────────────────

/// Builtin functions take exactly one argument, like every Curv function;
/// `f(a, b)` arrives as the list `[a, b]`.
pub trait NamespaceProvider {
    fn name(&self) -> &'static str;
    fn exports(&self) -> Vec<Export>;

    fn get_export(&self, name: &str) -> Option<Export> {
        self.exports().into_iter().find(|e| e.name == name)
    }

    /// `Ok(None)` if this provider does not implement `name`.
    fn call(&self, name: &str, arg: &Value, cx: &dyn Context) -> Result<Option<Value>, Error>;

    fn get_constant(&self, name: &str) -> Option<Value>;
}

// ─── Registry ─────────────────────────────────────────────────────────────────

pub struct NamespaceRegistry {
    providers: Vec<Box<dyn NamespaceProvider>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self { Self { providers: Vec::new() } }

    pub fn register(&mut self, p: Box<dyn NamespaceProvider>) { self.providers.push(p); }

    pub fn get(&self, name: &str) -> Option<&dyn NamespaceProvider> {
        self.providers.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }

    /// Value of a builtin name: a constant, or a callable handle to an
    /// exported function.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.get_constant(name) {
            return Some(v);
        }
        self.providers.iter().find_map(|p| {
            p.get_export(name)
                .filter(|e| e.kind == ExportKind::Function)
                .map(|e| Value::Builtin(e.name))
        })
    }

    pub fn call_any(&self, name: &str, arg: &Value, cx: &dyn Context) -> Result<Option<Value>, Error> {
        for p in &self.providers {
            if let Some(v) = p.call(name, arg, cx)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn get_constant(&self, name: &str) -> Option<Value> {
        self.providers.iter().find_map(|p| p.get_constant(name))
    }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(math::MathNamespace));
        r.register(Box::new(list::ListNamespace));
        r
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self { Self::standard() }
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

pub(crate) fn as_num(v: &Value, cx: &dyn Context) -> Result<f64, Error> {
    v.to_num(cx)
}

/// Unpack a two-element argument list `[a, b]` of numbers.
pub(crate) fn as_num_pair(name: &str, arg: &Value, cx: &dyn Context) -> Result<(f64, f64), Error> {
    let list = arg.to_list(cx)?;
    if list.len() != 2 {
        return Err(cx.error(
            ErrorCode::E003,
            format!("`{name}` expects 2 arguments, got {}", list.len()),
        ));
    }
    let a = as_num(&list[0], &AtIndex { parent: cx, index: 0 })?;
    let b = as_num(&list[1], &AtIndex { parent: cx, index: 1 })?;
    Ok((a, b))
}
