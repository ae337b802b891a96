use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtField, Context};
use crate::runtime::value::Value;

/// Immutable record value. Fields are kept sorted by name so rendering and
/// comparison do not depend on the order they were written in.
#[derive(Debug, Clone, Default)]
pub struct Record(Rc<BTreeMap<Rc<str>, Value>>);

impl Record {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn at(&self, name: &str, cx: &dyn Context) -> Result<&Value, Error> {
        self.0
            .get(name)
            .ok_or_else(|| cx.error(ErrorCode::E008, format!("record has no field `{name}`")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn equal(&self, other: &Record, cx: &dyn Context) -> Result<bool, Error> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for ((ka, va), (kb, vb)) in self.0.iter().zip(other.0.iter()) {
            if ka != kb {
                return Ok(false);
            }
            if !va.equal(vb, &AtField { parent: cx, name: ka })? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<K: Into<Rc<str>>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(Rc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}
