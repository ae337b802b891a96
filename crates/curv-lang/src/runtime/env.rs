use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

/// Lexical environment. Immutable once built; a scope is extended by
/// creating a child that points at its parent, so closures can hold on to
/// the exact environment they were created in.
#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, Value>,
    parent: Option<Rc<Env>>,
}

impl Env {
    pub fn root() -> Rc<Env> {
        Rc::new(Env::default())
    }

    pub fn extend(parent: &Rc<Env>, vars: HashMap<String, Value>) -> Rc<Env> {
        Rc::new(Env { vars, parent: Some(parent.clone()) })
    }

    pub fn bind(parent: &Rc<Env>, name: &str, value: Value) -> Rc<Env> {
        Self::extend(parent, HashMap::from([(name.to_string(), value)]))
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut env = self;
        loop {
            if let Some(v) = env.vars.get(name) {
                return Some(v);
            }
            env = env.parent.as_deref()?;
        }
    }
}
