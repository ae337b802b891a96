//! Shape recognition.
//!
//! A value is a shape when it carries the shape members: `dist`, `colour`,
//! `bbox`, and at least one of `is_2d` / `is_3d`. Recognition has three
//! outcomes. A value without those members is simply not a shape. A value
//! that has them but gets their types wrong is a malformed shape, which is
//! an error. Anything else is a shape, and its parts are extracted.

use std::collections::HashMap;

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtField, Context};
use crate::runtime::record::Record;
use crate::runtime::value::Value;
use crate::shape::bbox::BBox;

pub const DIST: &str = "dist";
pub const COLOUR: &str = "colour";
pub const BBOX: &str = "bbox";
pub const IS_2D: &str = "is_2d";
pub const IS_3D: &str = "is_3d";

/// Anything members can be looked up in by name.
pub trait MemberSource {
    fn member(&self, name: &str) -> Option<Value>;
}

impl MemberSource for Record {
    fn member(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Only records have members.
impl MemberSource for Value {
    fn member(&self, name: &str) -> Option<Value> {
        self.as_record().and_then(|r| r.member(name))
    }
}

impl MemberSource for HashMap<String, Value> {
    fn member(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// The members of a recognized shape, checked but not yet evaluated.
#[derive(Debug, Clone)]
pub struct ShapeParts {
    pub is_2d: bool,
    pub is_3d: bool,
    pub bbox: BBox,
    pub dist: Value,
    pub colour: Value,
}

#[derive(Debug)]
pub enum Recognized {
    NotAShape,
    Malformed(Error),
    Shape(ShapeParts),
}

impl Recognized {
    pub fn is_shape(&self) -> bool {
        matches!(self, Recognized::Shape(_))
    }

    pub fn into_result(self) -> Result<Option<ShapeParts>, Error> {
        match self {
            Recognized::NotAShape => Ok(None),
            Recognized::Malformed(e) => Err(e),
            Recognized::Shape(parts) => Ok(Some(parts)),
        }
    }
}

pub fn recognize_shape(src: &dyn MemberSource, cx: &dyn Context) -> Recognized {
    let (Some(dist), Some(colour), Some(bbox)) = (src.member(DIST), src.member(COLOUR), src.member(BBOX)) else {
        return Recognized::NotAShape;
    };
    let is_2d = src.member(IS_2D);
    let is_3d = src.member(IS_3D);
    if is_2d.is_none() && is_3d.is_none() {
        return Recognized::NotAShape;
    }
    match check_parts(dist, colour, bbox, is_2d, is_3d, cx) {
        Ok(parts) => Recognized::Shape(parts),
        Err(e) => Recognized::Malformed(e),
    }
}

fn check_parts(
    dist: Value,
    colour: Value,
    bbox: Value,
    is_2d: Option<Value>,
    is_3d: Option<Value>,
    cx: &dyn Context,
) -> Result<ShapeParts, Error> {
    let malformed = |name: &str, message: String| AtField { parent: cx, name }.error(ErrorCode::E007, message);

    for (name, f) in [(DIST, &dist), (COLOUR, &colour)] {
        if !f.is_callable() {
            return Err(malformed(name, format!("must be a function, got {}", f.kind_name())));
        }
    }

    let flag = |name: &str, v: Option<Value>| match v {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => Err(malformed(name, format!("must be a bool, got {}", other.kind_name()))),
    };
    let is_2d = flag(IS_2D, is_2d)?;
    let is_3d = flag(IS_3D, is_3d)?;
    if !is_2d && !is_3d {
        return Err(cx.error(ErrorCode::E007, "shape is neither 2D nor 3D".into()));
    }

    let bbox = BBox::from_value(&bbox, &AtField { parent: cx, name: BBOX })?;
    if is_3d && bbox.dim() != 3 {
        return Err(malformed(BBOX, format!("a 3D shape needs 3 coordinates per corner, got {}", bbox.dim())));
    }

    Ok(ShapeParts { is_2d, is_3d, bbox, dist, colour })
}
