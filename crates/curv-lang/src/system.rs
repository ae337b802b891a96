use std::rc::Rc;

use crate::config::Config;
use crate::error::{first_error, Error};
use crate::namespaces::NamespaceRegistry;
use crate::runtime::binop_registry::BinopRegistry;
use crate::runtime::env::Env;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::Value;
use crate::syntax::lexer::Lexer;
use crate::syntax::parser::Parser;

pub const PRELUDE_NAME: &str = "std.curv";
const PRELUDE: &str = include_str!("std.curv");

/// Process-wide state shared by every program compiled against it:
/// configuration, builtin providers, operators and the prelude.
pub struct System {
    config: Config,
    registry: NamespaceRegistry,
    binops: BinopRegistry,
    prelude: Rc<Env>,
}

impl System {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let mut system = Self {
            config,
            registry: NamespaceRegistry::standard(),
            binops: BinopRegistry::default(),
            prelude: Env::root(),
        };

        let tokens = Lexer::new(PRELUDE).tokenize().map_err(first_error)?;
        let defs = Parser::new(tokens).parse_defs().map_err(first_error)?;
        let prelude = Interpreter::new(&system, PRELUDE_NAME)
            .eval_defs(&defs, &Env::root())
            .map_err(|e| e.context(PRELUDE_NAME))?;
        system.prelude = prelude;

        log::debug!("prelude loaded: {} definitions", defs.len());
        Ok(system)
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn registry(&self) -> &NamespaceRegistry { &self.registry }

    pub fn binops(&self) -> &BinopRegistry { &self.binops }

    /// Environment every program is evaluated in.
    pub fn prelude(&self) -> &Rc<Env> { &self.prelude }

    /// Compile and evaluate a standalone expression.
    pub fn eval_str(&self, name: &str, source: &str) -> Result<Value, Error> {
        crate::compile(self, name, source).map_err(first_error)?.eval()
    }
}
