use thiserror::Error;

use crate::syntax::ast::Span;

/// Error codes prefixed by phase: L = lexer, P = parser, E = evaluation,
/// C = configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence

    // Parser
    P001, // unexpected token
    P002, // missing expected token

    // Evaluation / recognition
    E001, // undefined name
    E002, // type mismatch
    E003, // list length mismatch
    E004, // index out of range
    E005, // not callable
    E006, // program result is not a shape
    E007, // malformed shape
    E008, // record has no such field
    E009, // values are not comparable
    E010, // recursion limit exceeded

    // Configuration
    C001, // unknown export option
    C002, // invalid export option value
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::E001 => "E001",
            Self::E002 => "E002",
            Self::E003 => "E003",
            Self::E004 => "E004",
            Self::E005 => "E005",
            Self::E006 => "E006",
            Self::E007 => "E007",
            Self::E008 => "E008",
            Self::E009 => "E009",
            Self::E010 => "E010",
            Self::C001 => "C001",
            Self::C002 => "C002",
        }
    }

    /// Front-end codes are reported before anything is evaluated.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::L001 | Self::L002 | Self::L003 | Self::P001 | Self::P002)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {span}: {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self { code, span, message: message.into() }
    }

    /// Prefix the message, keeping code and location. Errors raised while
    /// loading the prelude are prefixed with its file name.
    pub fn context(mut self, prefix: impl std::fmt::Display) -> Self {
        self.message = format!("{prefix}: {}", self.message);
        self
    }
}

/// The first of a batch of front-end errors.
pub fn first_error(errors: Vec<Error>) -> Error {
    errors
        .into_iter()
        .next()
        .unwrap_or_else(|| Error::new(ErrorCode::P001, Span::default(), "no diagnostics reported"))
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("program is not a shape; nothing to export")]
    NotAShape,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Option(#[from] Error),
}
