use std::rc::Rc;

use crate::config::FragExport;
use crate::error::{Error, ErrorCode};
use crate::runtime::context::{At, Context};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::list::List;
use crate::runtime::value::Value;
use crate::shape::bbox::BBox;
use crate::shape::recognize::ShapeParts;
use crate::syntax::ast::Span;
use crate::system::System;

/// A recognized shape packaged for rendering: its geometry, its distance
/// and colour functions, and the export options it will be rendered with.
///
/// The CPU kernels `dist_at` and `colour_at` evaluate the shape at a point
/// `[x, y, z, t]`.
pub struct ViewedShape<'s> {
    system: &'s System,
    source: Rc<str>,
    span: Span,
    pub is_2d: bool,
    pub is_3d: bool,
    pub bbox: BBox,
    dist: Value,
    colour: Value,
    pub opts: FragExport,
}

impl<'s> ViewedShape<'s> {
    /// Both functions are probed at the origin, so a shape whose `dist`
    /// doesn't produce a number or whose `colour` doesn't produce `[r, g, b]`
    /// is rejected here rather than at render time.
    pub fn new(
        system: &'s System,
        source: Rc<str>,
        parts: ShapeParts,
        opts: &FragExport,
        span: Span,
    ) -> Result<Self, Error> {
        let shape = Self {
            system,
            source,
            span,
            is_2d: parts.is_2d,
            is_3d: parts.is_3d,
            bbox: parts.bbox,
            dist: parts.dist,
            colour: parts.colour,
            opts: opts.clone(),
        };
        shape.dist_at([0.0; 4])?;
        shape.colour_at([0.0; 4])?;
        Ok(shape)
    }

    pub fn dist(&self) -> &Value { &self.dist }

    pub fn colour(&self) -> &Value { &self.colour }

    fn apply(&self, f: &Value, p: [f64; 4]) -> Result<Value, Error> {
        let point: List = p.iter().map(|&x| Value::Num(x)).collect();
        Interpreter::new(self.system, self.source.clone()).call(f, Value::List(point), self.span)
    }

    pub fn dist_at(&self, p: [f64; 4]) -> Result<f64, Error> {
        match self.apply(&self.dist, p)? {
            Value::Num(d) => Ok(d),
            other => Err(At(self.span).error(
                ErrorCode::E007,
                format!("`dist` must return a number, got {other}"),
            )),
        }
    }

    pub fn colour_at(&self, p: [f64; 4]) -> Result<[f64; 3], Error> {
        let c = self.apply(&self.colour, p)?;
        let rgb = c.as_list().filter(|l| l.len() == 3).and_then(|l| {
            let mut rgb = [0.0; 3];
            for (slot, v) in rgb.iter_mut().zip(l.iter()) {
                *slot = v.as_num()?;
            }
            Some(rgb)
        });
        rgb.ok_or_else(|| At(self.span).error(
            ErrorCode::E007,
            format!("`colour` must return [r, g, b], got {c}"),
        ))
    }
}
