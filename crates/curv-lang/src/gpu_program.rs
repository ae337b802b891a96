//! GPU program assembly.
//!
//! A `GpuProgram` is what the renderer consumes: the recognized shape's
//! dimensionality and bounding box plus a `ViewedShape` to evaluate. It is
//! anchored to the phrase the shape came from, so anything that goes wrong
//! while rendering can be reported against the source.

use std::io::Write;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::FragExport;
use crate::error::{Error, ErrorCode, ExportError};
use crate::runtime::context::{At, Context, Frame, Location, ProgramContext};
use crate::runtime::value::Value;
use crate::shape::bbox::BBox;
use crate::shape::recognize::recognize_shape;
use crate::shape::viewed::ViewedShape;
use crate::syntax::ast::Phrase;
use crate::system::System;
use crate::Program;

/// Version of the JSON document written by `write_json`.
pub const JSON_VERSION: u32 = 1;

/// The document written by `write_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonShape {
    pub version: u32,
    pub is_2d: bool,
    pub is_3d: bool,
    pub bbox: BBox,
    pub config: FragExport,
}

/// The error for a program whose result is `value` when a shape was needed.
pub fn not_a_shape(nub: &Phrase, value: &Value) -> Error {
    At(nub.span()).error(
        ErrorCode::E006,
        format!("program result is not a shape: got a {}", value.kind_name()),
    )
}

pub struct GpuProgram<'s> {
    system: &'s System,
    source: Rc<str>,
    nub: Rc<Phrase>,
    is_2d: bool,
    is_3d: bool,
    bbox: Option<BBox>,
    vshape: Option<ViewedShape<'s>>,
}

impl<'s> GpuProgram<'s> {
    /// An empty program anchored at `nub`; call `recognize` to fill it.
    pub fn new(system: &'s System, source: impl Into<Rc<str>>, nub: Rc<Phrase>) -> Self {
        Self {
            system,
            source: source.into(),
            nub,
            is_2d: false,
            is_3d: false,
            bbox: None,
            vshape: None,
        }
    }

    /// Returns `Ok(false)` and leaves the program untouched if `value` is
    /// not a shape. A malformed shape is an error, and also leaves the
    /// program untouched.
    pub fn recognize(&mut self, value: &Value, opts: &FragExport) -> Result<bool, Error> {
        let span = self.nub.span();
        let Some(parts) = recognize_shape(value, &At(span)).into_result()? else {
            log::debug!("{}: {} is not a shape", self.source, value.kind_name());
            return Ok(false);
        };
        let vshape = ViewedShape::new(self.system, self.source.clone(), parts, opts, span)?;

        self.is_2d = vshape.is_2d;
        self.is_3d = vshape.is_3d;
        self.bbox = Some(vshape.bbox.clone());
        self.vshape = Some(vshape);
        log::debug!(
            "{}: recognized shape, 2d={} 3d={} bbox={}",
            self.source, self.is_2d, self.is_3d, self.bbox.as_ref().map(|b| b.to_string()).unwrap_or_default()
        );
        Ok(true)
    }

    /// `Ok(None)` if `value` is not a shape.
    pub fn from_value(
        system: &'s System,
        source: impl Into<Rc<str>>,
        nub: Rc<Phrase>,
        value: &Value,
        opts: &FragExport,
    ) -> Result<Option<Self>, Error> {
        let mut program = Self::new(system, source, nub);
        Ok(program.recognize(value, opts)?.then_some(program))
    }

    /// Evaluate `program` and recognize its result. Evaluation errors are
    /// returned unchanged; a result that is not a shape is reported at the
    /// program's nub.
    pub fn from_program(program: &Program<'s>, opts: &FragExport) -> Result<Self, Error> {
        let value = program.eval()?;
        let nub = program.nub();
        Self::from_value(program.system(), program.name(), nub.clone(), &value, opts)?
            .ok_or_else(|| not_a_shape(&nub, &value))
    }

    pub fn nub(&self) -> &Rc<Phrase> { &self.nub }

    pub fn is_2d(&self) -> bool { self.is_2d }

    pub fn is_3d(&self) -> bool { self.is_3d }

    pub fn is_shape(&self) -> bool { self.vshape.is_some() }

    pub fn bbox(&self) -> Option<&BBox> { self.bbox.as_ref() }

    pub fn vshape(&self) -> Option<&ViewedShape<'s>> { self.vshape.as_ref() }

    fn parts(&self) -> Result<(&BBox, &ViewedShape<'s>), ExportError> {
        match (&self.bbox, &self.vshape) {
            (Some(bbox), Some(vshape)) => Ok((bbox, vshape)),
            _ => Err(ExportError::NotAShape),
        }
    }

    // ─── Export ───────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<JsonShape, ExportError> {
        let (bbox, vshape) = self.parts()?;
        Ok(JsonShape {
            version: JSON_VERSION,
            is_2d: self.is_2d,
            is_3d: self.is_3d,
            bbox: bbox.clone(),
            config: vshape.opts.clone(),
        })
    }

    pub fn write_json<W: Write>(&self, mut sink: W) -> Result<(), ExportError> {
        let doc = self.to_json()?;
        serde_json::to_writer_pretty(&mut sink, &doc)?;
        writeln!(sink)?;
        log::debug!("{}: wrote JSON export", self.source);
        Ok(())
    }

    /// Write the shape as a Curv record literal that evaluates to an
    /// equivalent shape. Functions are written as their source, preceded
    /// by bindings for the variables they capture.
    pub fn write_curv<W: Write>(&self, mut sink: W) -> Result<(), ExportError> {
        let (bbox, vshape) = self.parts()?;
        writeln!(sink, "{{")?;
        writeln!(sink, "  is_2d: {},", self.is_2d)?;
        writeln!(sink, "  is_3d: {},", self.is_3d)?;
        writeln!(sink, "  bbox: {bbox},")?;
        writeln!(sink, "  dist: {},", vshape.dist())?;
        writeln!(sink, "  colour: {}", vshape.colour())?;
        writeln!(sink, "}}")?;
        log::debug!("{}: wrote Curv export", self.source);
        Ok(())
    }
}

impl ProgramContext for GpuProgram<'_> {
    fn location(&self) -> Location {
        Location { source: self.source.clone(), span: self.nub.span() }
    }

    fn system(&self) -> &System { self.system }

    fn file_frame(&self) -> Option<&Frame<'_>> { None }
}
