//! Immutable, shared, fixed-length sequence of values.
//!
//! A `List` is built exactly once, either by `ListBuilder::finish` or by
//! filling a `UniqueList` and calling `share`, and never changes afterwards.
//! Length and elements live in a single `Rc<[Value]>` allocation.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtIndex, Context};
use crate::runtime::value::Value;

#[derive(Debug, Clone)]
pub struct List(Rc<[Value]>);

impl List {
    /// A list of `n` nulls that the caller owns exclusively and may assign
    /// into before publishing it with `share`.
    pub fn allocate(n: usize) -> UniqueList {
        UniqueList(vec![Value::Null; n].into_boxed_slice())
    }

    pub fn empty() -> Self {
        Self(Rc::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.0.get(i)
    }

    /// Element lookup for indices that come from user code.
    pub fn at(&self, i: usize, cx: &dyn Context) -> Result<&Value, Error> {
        self.0.get(i).ok_or_else(|| {
            cx.error(
                ErrorCode::E004,
                format!("index {i} is out of range for a list of length {}", self.len()),
            )
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn assert_length(&self, n: usize, cx: &dyn Context) -> Result<(), Error> {
        if self.len() == n {
            Ok(())
        } else {
            Err(cx.error(
                ErrorCode::E003,
                format!("list has length {}, expected length {n}", self.len()),
            ))
        }
    }

    /// Structural equality. Lists of different lengths are unequal; element
    /// comparison stops at the first mismatch. Incomparable elements are an
    /// error attributed to `cx` and the element index.
    pub fn equal(&self, other: &List, cx: &dyn Context) -> Result<bool, Error> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (index, (a, b)) in self.iter().zip(other.iter()).enumerate() {
            if !a.equal(b, &AtIndex { parent: cx, index })? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Index<usize> for List {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        Self(Rc::from(items))
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `[e0, e1, ...]`, each element in reparsable form.
impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

// ─── Uniquely owned list ──────────────────────────────────────────────────────

/// A freshly allocated list nobody else can see yet.
#[derive(Debug)]
pub struct UniqueList(Box<[Value]>);

impl UniqueList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn share(self) -> List {
        List(Rc::from(self.0))
    }
}

impl Index<usize> for UniqueList {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        &self.0[i]
    }
}

impl IndexMut<usize> for UniqueList {
    fn index_mut(&mut self, i: usize) -> &mut Value {
        &mut self.0[i]
    }
}

impl From<UniqueList> for List {
    fn from(list: UniqueList) -> Self {
        list.share()
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Growable staging buffer. `finish` consumes the builder, so a finished
/// builder cannot be appended to or finished twice.
#[derive(Debug, Default)]
pub struct ListBuilder {
    items: Vec<Value>,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { items: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, v: Value) {
        self.items.push(v);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> List {
        List::from(self.items)
    }
}

impl Extend<Value> for ListBuilder {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::At;
    use crate::syntax::ast::Span;

    fn nums(xs: &[f64]) -> List {
        xs.iter().map(|&x| Value::Num(x)).collect()
    }

    fn cx() -> At {
        At(Span::new(3, 7))
    }

    #[test]
    fn builder_preserves_order() {
        let mut b = ListBuilder::new();
        b.push(Value::Num(1.0));
        b.push(Value::Num(2.0));
        b.extend([Value::Num(3.0)]);
        assert_eq!(b.len(), 3);
        let list = b.finish();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], Value::Num(1.0));
        assert_eq!(list[2], Value::Num(3.0));
    }

    #[test]
    fn empty_builder_gives_empty_list() {
        let list = ListBuilder::new().finish();
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "[]");
    }

    #[test]
    fn allocate_fill_share() {
        let mut u = List::allocate(2);
        assert_eq!(u[1], Value::Null);
        u[0] = Value::Bool(true);
        u[1] = Value::Num(4.0);
        let list = u.share();
        assert_eq!(list.to_string(), "[true, 4]");
    }

    #[test]
    fn builder_length_and_order() {
        for n in 0..=5 {
            let mut b = ListBuilder::with_capacity(n);
            for i in 0..n {
                b.push(Value::Num(i as f64));
            }
            let list = b.finish();
            assert_eq!(list.len(), n);
            for (i, v) in list.iter().enumerate() {
                assert_eq!(v, &Value::Num(i as f64));
            }
        }
    }

    #[test]
    fn equality_is_reflexive_and_symmetric() {
        let a = nums(&[1.0, 2.0]);
        let same = a.clone();
        let copy = nums(&[1.0, 2.0]);
        let other = nums(&[1.0, 3.0]);
        assert!(a.equal(&same, &cx()).unwrap());
        assert!(a.equal(&copy, &cx()).unwrap());
        assert!(copy.equal(&a, &cx()).unwrap());
        assert!(!a.equal(&other, &cx()).unwrap());
        assert!(!other.equal(&a, &cx()).unwrap());
    }

    #[test]
    fn shared_storage_does_not_hide_incomparable_elements() {
        let a = List::from(vec![Value::Num(1.0), Value::Builtin("sqrt")]);
        let same = a.clone();
        let copy = List::from(vec![Value::Num(1.0), Value::Builtin("sqrt")]);
        assert_eq!(a.equal(&same, &cx()).unwrap_err().code, ErrorCode::E009);
        assert_eq!(a.equal(&copy, &cx()).unwrap_err().code, ErrorCode::E009);
    }

    #[test]
    fn assert_length_reports_location() {
        let list = nums(&[1.0, 2.0]);
        assert!(list.assert_length(2, &cx()).is_ok());
        let err = list.assert_length(3, &cx()).unwrap_err();
        assert_eq!(err.code, ErrorCode::E003);
        assert_eq!(err.span, Span::new(3, 7));
    }

    #[test]
    fn at_is_checked() {
        let list = nums(&[5.0]);
        assert_eq!(list.at(0, &cx()).unwrap(), &Value::Num(5.0));
        assert_eq!(list.at(1, &cx()).unwrap_err().code, ErrorCode::E004);
    }

    #[test]
    fn equality_is_structural() {
        let a = nums(&[1.0, 2.0, 3.0]);
        assert!(a.equal(&nums(&[1.0, 2.0, 3.0]), &cx()).unwrap());
        assert!(!a.equal(&nums(&[1.0, 2.0]), &cx()).unwrap());
        assert!(!a.equal(&nums(&[1.0, 9.0, 3.0]), &cx()).unwrap());
        assert!(ListBuilder::new().finish().equal(&List::empty(), &cx()).unwrap());
    }

    #[test]
    fn incomparable_element_names_its_index() {
        let f = Value::Builtin("sqrt");
        let a = List::from(vec![Value::Num(1.0), f.clone()]);
        let b = List::from(vec![Value::Num(1.0), f]);
        let err = a.equal(&b, &cx()).unwrap_err();
        assert_eq!(err.code, ErrorCode::E009);
        assert!(err.message.contains("index 1"), "{}", err.message);
    }

    #[test]
    fn mismatch_stops_before_incomparable_element() {
        let a = List::from(vec![Value::Num(1.0), Value::Builtin("sqrt")]);
        let b = List::from(vec![Value::Num(2.0), Value::Builtin("sqrt")]);
        assert!(!a.equal(&b, &cx()).unwrap());
    }

    #[test]
    fn nested_lists_render() {
        let inner = nums(&[-1.0, 0.5]);
        let outer = List::from(vec![Value::List(inner), Value::Str("a".into())]);
        assert_eq!(outer.to_string(), r#"[[-1, 0.5], "a"]"#);
    }
}
