pub mod config;
pub mod error;
pub mod gpu_program;
pub mod namespaces;
pub mod runtime;
pub mod shape;
pub mod syntax;
pub mod system;

pub use config::{Config, FragExport};
pub use error::{ConfigError, Error, ErrorCode, ExportError};
pub use gpu_program::GpuProgram;
pub use runtime::context::{describe, Context, Frame, Location, ProgramContext};
pub use runtime::list::{List, ListBuilder, UniqueList};
pub use runtime::record::Record;
pub use runtime::value::Value;
pub use shape::{BBox, ViewedShape};
pub use syntax::token::{Token, TokenKind};
pub use system::System;

use std::rc::Rc;

use crate::runtime::interpreter::Interpreter;
use crate::syntax::ast::{nub, Phrase};

// ─── Program ──────────────────────────────────────────────────────────────────

/// A parsed program bound to the system it will run against.
pub struct Program<'s> {
    system: &'s System,
    name: Rc<str>,
    phrase: Rc<Phrase>,
}

/// Lex and parse `source`. `name` identifies the source in diagnostics.
pub fn compile<'s>(system: &'s System, name: &str, source: &str) -> Result<Program<'s>, Vec<Error>> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    let phrase = syntax::parser::Parser::new(tokens).parse()?;
    log::debug!("compiled {name}");
    Ok(Program { system, name: name.into(), phrase: Rc::new(phrase) })
}

impl<'s> Program<'s> {
    pub fn system(&self) -> &'s System { self.system }

    pub fn name(&self) -> &str { &self.name }

    pub fn phrase(&self) -> &Rc<Phrase> { &self.phrase }

    /// The phrase the program's result comes from, with enclosing
    /// `let ... in` blocks removed.
    pub fn nub(&self) -> Rc<Phrase> { nub(&self.phrase) }

    /// Evaluate in the prelude environment.
    pub fn eval(&self) -> Result<Value, Error> {
        Interpreter::new(self.system, self.name.clone()).eval(&self.phrase, self.system.prelude())
    }

    /// Evaluate, rendering a failure as a user-facing diagnostic that names
    /// the function call it happened in.
    pub fn run(&self) -> Result<Value, String> {
        let mut interp = Interpreter::new(self.system, self.name.clone());
        interp.eval(&self.phrase, self.system.prelude()).map_err(|err| match interp.fault() {
            Some(frame) => describe(frame, &err),
            None => describe(self, &err),
        })
    }
}

impl ProgramContext for Program<'_> {
    fn location(&self) -> Location {
        Location { source: self.name.clone(), span: self.nub().span() }
    }

    fn system(&self) -> &System { self.system }

    fn file_frame(&self) -> Option<&Frame<'_>> { None }
}
