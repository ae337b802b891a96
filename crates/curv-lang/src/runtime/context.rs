//! Diagnostic contexts.
//!
//! A `Context` says *where* an error is raised: the phrase being evaluated,
//! optionally refined to a list element or record field. A `ProgramContext`
//! says *which program* is running: its anchor location, the shared
//! `System`, and the call frame (if any) the error belongs to.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::Span;
use crate::system::System;

// ─── Error contexts ───────────────────────────────────────────────────────────

pub trait Context {
    fn span(&self) -> Span;

    /// Prefix describing the position inside the phrase, e.g. `at index 2`.
    fn describe(&self) -> Option<String> {
        None
    }

    fn error(&self, code: ErrorCode, message: String) -> Error {
        let message = match self.describe() {
            Some(prefix) => format!("{prefix}: {message}"),
            None => message,
        };
        Error::new(code, self.span(), message)
    }
}

/// The phrase at `span`.
#[derive(Debug, Clone, Copy)]
pub struct At(pub Span);

impl Context for At {
    fn span(&self) -> Span { self.0 }
}

/// Element `index` of a list produced by the parent context.
pub struct AtIndex<'a> {
    pub parent: &'a dyn Context,
    pub index: usize,
}

impl Context for AtIndex<'_> {
    fn span(&self) -> Span { self.parent.span() }

    fn describe(&self) -> Option<String> {
        Some(match self.parent.describe() {
            Some(outer) => format!("{outer}, at index {}", self.index),
            None => format!("at index {}", self.index),
        })
    }
}

/// Field `name` of a record produced by the parent context.
pub struct AtField<'a> {
    pub parent: &'a dyn Context,
    pub name: &'a str,
}

impl Context for AtField<'_> {
    fn span(&self) -> Span { self.parent.span() }

    fn describe(&self) -> Option<String> {
        Some(match self.parent.describe() {
            Some(outer) => format!("{outer}, at field `{}`", self.name),
            None => format!("at field `{}`", self.name),
        })
    }
}

// ─── Program contexts ─────────────────────────────────────────────────────────

/// A position in a named source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: Rc<str>,
    pub span: Span,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.span)
    }
}

/// Shared interface of every diagnostic producer: a top-level program, a
/// GPU program, or a function call frame.
pub trait ProgramContext {
    fn location(&self) -> Location;
    fn system(&self) -> &System;
    /// `None` for a top-level program; the active frame for a call.
    fn file_frame(&self) -> Option<&Frame<'_>>;
}

/// One active function call in the evaluator.
#[derive(Clone)]
pub struct Frame<'s> {
    system: &'s System,
    source: Rc<str>,
    pub callee: Rc<str>,
    pub call_site: Span,
}

impl<'s> Frame<'s> {
    pub fn new(system: &'s System, source: Rc<str>, callee: Rc<str>, call_site: Span) -> Self {
        Self { system, source, callee, call_site }
    }
}

impl fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("source", &self.source)
            .field("callee", &self.callee)
            .field("call_site", &self.call_site)
            .finish()
    }
}

impl ProgramContext for Frame<'_> {
    fn location(&self) -> Location {
        Location { source: self.source.clone(), span: self.call_site }
    }

    fn system(&self) -> &System { self.system }

    fn file_frame(&self) -> Option<&Frame<'_>> { Some(self) }
}

/// User-facing rendering of `err` raised while running `cx`:
/// `source:line:col: [code] message`, plus the call it happened in.
pub fn describe(cx: &dyn ProgramContext, err: &Error) -> String {
    let at = Location { source: cx.location().source, span: err.span };
    let mut out = format!("{at}: [{}] {}", err.code, err.message);
    if let Some(frame) = cx.file_frame() {
        out.push_str(&format!("\n  in call to `{}` at {}", frame.callee, frame.location()));
    }
    out
}
