use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCode};
use crate::runtime::context::{AtIndex, Context};
use crate::runtime::list::List;
use crate::runtime::value::Value;

/// Axis-aligned bounding box with 2 or 3 coordinates per corner.
/// Serialized as `[[min...], [max...]]`; infinite coordinates are written as
/// the strings `"inf"` and `"-inf"` since JSON has no literal for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "[Vec<Coord>; 2]", try_from = "[Vec<Coord>; 2]")]
pub struct BBox {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl BBox {
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Self {
        Self { min, max }
    }

    pub fn dim(&self) -> usize {
        self.min.len()
    }

    /// Read a bbox from its language form `[[x0, y0(, z0)], [x1, y1(, z1)]]`.
    pub fn from_value(v: &Value, cx: &dyn Context) -> Result<BBox, Error> {
        let corners = v.as_list().filter(|l| l.len() == 2).ok_or_else(|| {
            cx.error(ErrorCode::E007, format!("bbox must be a list of two corners, got {v}"))
        })?;
        let min = corner(&corners[0], &AtIndex { parent: cx, index: 0 })?;
        let max = corner(&corners[1], &AtIndex { parent: cx, index: 1 })?;
        if min.len() != max.len() {
            return Err(cx.error(
                ErrorCode::E007,
                format!("bbox corners have {} and {} coordinates", min.len(), max.len()),
            ));
        }
        Ok(BBox { min, max })
    }

    pub fn to_value(&self) -> Value {
        let corner = |c: &[f64]| Value::List(c.iter().map(|&x| Value::Num(x)).collect::<List>());
        Value::List(List::from(vec![corner(&self.min), corner(&self.max)]))
    }
}

fn corner(v: &Value, cx: &dyn Context) -> Result<Vec<f64>, Error> {
    let coords = v.as_list().filter(|l| l.len() == 2 || l.len() == 3).ok_or_else(|| {
        cx.error(ErrorCode::E007, format!("bbox corner must have 2 or 3 coordinates, got {v}"))
    })?;
    coords
        .iter()
        .map(|c| match c.as_num() {
            Some(x) if !x.is_nan() => Ok(x),
            _ => Err(cx.error(ErrorCode::E007, format!("bbox coordinate must be a number, got {c}"))),
        })
        .collect()
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<BBox> for [Vec<Coord>; 2] {
    fn from(b: BBox) -> Self {
        let wrap = |v: Vec<f64>| -> Vec<Coord> { v.into_iter().map(Coord).collect() };
        [wrap(b.min), wrap(b.max)]
    }
}

impl TryFrom<[Vec<Coord>; 2]> for BBox {
    type Error = String;

    fn try_from([min, max]: [Vec<Coord>; 2]) -> Result<Self, String> {
        if min.len() != max.len() || !(2..=3).contains(&min.len()) {
            return Err(format!(
                "bbox corners must both have 2 or 3 coordinates, got {} and {}",
                min.len(),
                max.len()
            ));
        }
        let unwrap = |v: Vec<Coord>| -> Vec<f64> { v.into_iter().map(|c| c.0).collect() };
        Ok(BBox { min: unwrap(min), max: unwrap(max) })
    }
}

// ─── JSON coordinate ──────────────────────────────────────────────────────────

/// A number that survives a JSON round trip even when infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord(pub f64);

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            x if x == f64::INFINITY => s.serialize_str("inf"),
            x if x == f64::NEG_INFINITY => s.serialize_str("-inf"),
            x => s.serialize_f64(x),
        }
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }

        match Raw::deserialize(d)? {
            Raw::Num(x) => Ok(Coord(x)),
            Raw::Text(s) => match s.as_str() {
                "inf" => Ok(Coord(f64::INFINITY)),
                "-inf" => Ok(Coord(f64::NEG_INFINITY)),
                other => Err(de::Error::custom(format!("expected a number, \"inf\" or \"-inf\", got {other:?}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_coordinates_are_strings() {
        let b = BBox::new(vec![f64::NEG_INFINITY, -1.0], vec![f64::INFINITY, 1.0]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"[["-inf",-1.0],["inf",1.0]]"#);
        let back: BBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn mismatched_corners_do_not_deserialize() {
        assert!(serde_json::from_str::<BBox>("[[0,0],[1,1,1]]").is_err());
        assert!(serde_json::from_str::<BBox>("[[0],[1]]").is_err());
        assert!(serde_json::from_str::<BBox>(r#"[["big",0],[1,1]]"#).is_err());
    }

    #[test]
    fn renders_as_curv_source() {
        let b = BBox::new(vec![-1.0, f64::NEG_INFINITY], vec![1.0, 2.5]);
        assert_eq!(b.to_string(), "[[-1, -inf], [1, 2.5]]");
    }
}
