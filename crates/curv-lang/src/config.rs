//! Configuration: evaluator limits and the fragment export options.
//!
//! Both structs deserialize from JSON with every field optional, so a config
//! file only names what it changes. Export options can also be set one at a
//! time from the command line as `-O name=value`, where `value` is Curv source.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, ErrorCode};
use crate::runtime::value::Value;
use crate::syntax::ast::Span;
use crate::system::System;

/// Options that control how a shape is turned into a fragment shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FragExport {
    /// Spatial anti-aliasing: samples per pixel along each axis.
    pub aa: u32,
    /// Temporal anti-aliasing: samples per frame.
    pub taa: u32,
    /// Frame duration in seconds, used with `taa`.
    pub fdur: f64,
    /// Background colour.
    pub bg: [f64; 3],
}

impl Default for FragExport {
    fn default() -> Self {
        Self { aa: 1, taa: 1, fdur: 0.04, bg: [1.0, 1.0, 1.0] }
    }
}

impl FragExport {
    pub const OPTIONS: [&'static str; 4] = ["aa", "taa", "fdur", "bg"];

    pub fn validate(&self) -> Result<(), Error> {
        let at = Span::default();
        if self.aa < 1 {
            return Err(bad_value("aa", at, "must be at least 1"));
        }
        if self.taa < 1 {
            return Err(bad_value("taa", at, "must be at least 1"));
        }
        if !(self.fdur > 0.0 && self.fdur.is_finite()) {
            return Err(bad_value("fdur", at, "must be a positive number"));
        }
        if !self.bg.iter().all(|c| (0.0..=1.0).contains(c)) {
            return Err(bad_value("bg", at, "components must be between 0 and 1"));
        }
        Ok(())
    }

    /// Set option `name` from an evaluated value.
    pub fn set_option(&mut self, name: &str, value: &Value, span: Span) -> Result<(), Error> {
        match name {
            "aa" => self.aa = count_option(name, value, span)?,
            "taa" => self.taa = count_option(name, value, span)?,
            "fdur" => match value.as_num() {
                Some(n) if n > 0.0 && n.is_finite() => self.fdur = n,
                _ => return Err(bad_value(name, span, format!("expected a positive number, got {value}"))),
            },
            "bg" => self.bg = colour_option(name, value, span)?,
            _ => {
                return Err(Error::new(
                    ErrorCode::C001,
                    span,
                    format!("unknown option `{name}` (expected one of {})", Self::OPTIONS.join(", ")),
                ));
            }
        }
        Ok(())
    }

    /// Apply a command-line option of the form `name=value`.
    pub fn parse_option(&mut self, system: &System, arg: &str) -> Result<(), Error> {
        let Some((name, source)) = arg.split_once('=') else {
            return Err(Error::new(
                ErrorCode::C002,
                Span::default(),
                format!("option `{arg}` must have the form name=value"),
            ));
        };
        let name = name.trim();
        if !Self::OPTIONS.contains(&name) {
            return self.set_option(name, &Value::Null, Span::default());
        }
        let value = system
            .eval_str(&format!("-O {name}"), source)
            .map_err(|e| bad_value(name, e.span, e.message))?;
        log::debug!("option {name} = {value}");
        self.set_option(name, &value, Span::default())
    }
}

fn bad_value(name: &str, span: Span, why: impl std::fmt::Display) -> Error {
    Error::new(ErrorCode::C002, span, format!("invalid value for `{name}`: {why}"))
}

fn count_option(name: &str, value: &Value, span: Span) -> Result<u32, Error> {
    match value.as_num() {
        Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => Ok(n as u32),
        _ => Err(bad_value(name, span, format!("expected an integer >= 1, got {value}"))),
    }
}

fn colour_option(name: &str, value: &Value, span: Span) -> Result<[f64; 3], Error> {
    let err = || bad_value(name, span, format!("expected [r, g, b] with components in 0..1, got {value}"));
    let list = value.as_list().filter(|l| l.len() == 3).ok_or_else(err)?;
    let mut rgb = [0.0; 3];
    for (slot, v) in rgb.iter_mut().zip(list.iter()) {
        *slot = v.as_num().filter(|c| (0.0..=1.0).contains(c)).ok_or_else(err)?;
    }
    Ok(rgb)
}

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum function call depth before evaluation fails with E010.
    pub max_depth: usize,
    /// Default export options; `-O` options are applied on top.
    pub frag: FragExport,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 256, frag: FragExport::default() }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("loading config from {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_depth == 0 {
            return Err(Error::new(ErrorCode::C002, Span::default(), "`max_depth` must be at least 1"));
        }
        self.frag.validate()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
