#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Num(f64),
    Bool(bool),
    Ident(String),
    StringLit(String),

    // Keywords
    Let,
    In,
    If,
    Else,
    Null,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Caret,      // ^
    Eq,         // =
    EqEq,       // ==
    BangEq,     // !=
    Bang,       // !
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    AndAnd,     // &&
    OrOr,       // ||
    Arrow,      // ->

    // Punctuation
    Colon,      // :
    Comma,      // ,
    Semicolon,  // ;
    Dot,        // .
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]

    Eof,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Num(_) | Self::Bool(_) | Self::StringLit(_) | Self::Null)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus | Self::Star | Self::Slash | Self::Caret)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::EqEq | Self::BangEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Let | Self::In | Self::If | Self::Else | Self::Null)
    }

    /// Human-readable spelling used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Num(n)       => format!("number `{n}`"),
            Self::Bool(b)      => format!("`{b}`"),
            Self::Ident(s)     => format!("identifier `{s}`"),
            Self::StringLit(_) => "string literal".into(),
            Self::Eof          => "end of input".into(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Let => "let", Self::In => "in", Self::If => "if",
            Self::Else => "else", Self::Null => "null",
            Self::Plus => "+", Self::Minus => "-", Self::Star => "*",
            Self::Slash => "/", Self::Caret => "^", Self::Eq => "=",
            Self::EqEq => "==", Self::BangEq => "!=", Self::Bang => "!",
            Self::Lt => "<", Self::LtEq => "<=", Self::Gt => ">", Self::GtEq => ">=",
            Self::AndAnd => "&&", Self::OrOr => "||", Self::Arrow => "->",
            Self::Colon => ":", Self::Comma => ",", Self::Semicolon => ";",
            Self::Dot => ".", Self::LParen => "(", Self::RParen => ")",
            Self::LBrace => "{", Self::RBrace => "}",
            Self::LBracket => "[", Self::RBracket => "]",
            Self::Num(_) | Self::Bool(_) | Self::Ident(_) | Self::StringLit(_) | Self::Eof => "",
        }
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "let"   => TokenKind::Let,
        "in"    => TokenKind::In,
        "if"    => TokenKind::If,
        "else"  => TokenKind::Else,
        "null"  => TokenKind::Null,
        "true"  => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        _       => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
