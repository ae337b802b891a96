use crate::error::{Error, ErrorCode};
use crate::syntax::ast::Span;
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<Error>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            match self.next_token() {
                Ok(Some(tok)) => tokens.push(tok),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() { Ok(tokens) } else { Err(errors) }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let line = self.line;
        let col = self.column;
        let ch = self.advance();

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'*' => TokenKind::Star,
            b'^' => TokenKind::Caret,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,

            b'-' => {
                if self.peek() == b'>' { self.advance(); TokenKind::Arrow }
                else { TokenKind::Minus }
            }
            b'/' => {
                if self.peek() == b'/' { self.skip_line(); return Ok(None); }
                else if self.peek() == b'*' { self.skip_block_comment(); return Ok(None); }
                else { TokenKind::Slash }
            }
            b'=' => {
                if self.peek() == b'=' { self.advance(); TokenKind::EqEq }
                else { TokenKind::Eq }
            }
            b'!' => {
                if self.peek() == b'=' { self.advance(); TokenKind::BangEq }
                else { TokenKind::Bang }
            }
            b'<' => {
                if self.peek() == b'=' { self.advance(); TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'=' { self.advance(); TokenKind::GtEq }
                else { TokenKind::Gt }
            }
            b'&' => {
                if self.peek() == b'&' { self.advance(); TokenKind::AndAnd }
                else {
                    return Err(Error::new(ErrorCode::L001, Span::new(line, col),
                        "expected `&&`, bare `&` is not valid"));
                }
            }
            b'|' => {
                if self.peek() == b'|' { self.advance(); TokenKind::OrOr }
                else {
                    return Err(Error::new(ErrorCode::L001, Span::new(line, col),
                        "expected `||`, bare `|` is not valid"));
                }
            }

            b'"' => TokenKind::StringLit(self.read_string(line, col)?),
            b'0'..=b'9' => TokenKind::Num(self.read_number(ch)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(ch)),

            other => {
                return Err(Error::new(ErrorCode::L001, Span::new(line, col),
                    format!("unexpected character `{}`", other as char)));
            }
        };

        Ok(Some(Token::new(kind, line, col)))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.source.len() { 0 } else { self.source[self.pos + 1] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // consume *
        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance(); // *
                self.advance(); // /
                break;
            }
            self.advance();
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_string(&mut self, start_line: usize, start_col: usize) -> Result<String, Error> {
        let mut bytes = Vec::new();
        let mut error: Option<Error> = None;
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(Error::new(ErrorCode::L002, Span::new(start_line, start_col),
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch == b'\\' {
                let esc = Span::new(self.line, self.column);
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b't'  => bytes.push(b'\t'),
                    b'"'  => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        // Keep consuming so the rest of the string doesn't cascade.
                        if error.is_none() {
                            error = Some(Error::new(ErrorCode::L003, esc,
                                format!("unknown escape sequence `\\{}`", other as char)));
                        }
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        if let Some(e) = error { return Err(e); }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, first: u8) -> f64 {
        let mut s = String::new();
        s.push(first as char);
        self.read_digits(&mut s);
        // consume decimal only if followed by at least one digit
        // (`a.0` style field access is not valid, but `1.x` must stay a dot)
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            s.push(self.advance() as char);
            self.read_digits(&mut s);
        }
        if matches!(self.peek(), b'e' | b'E') {
            let sign = matches!(self.peek_next(), b'+' | b'-');
            let digit_at = if sign { self.pos + 2 } else { self.pos + 1 };
            if digit_at < self.source.len() && self.source[digit_at].is_ascii_digit() {
                s.push(self.advance() as char);
                if sign { s.push(self.advance() as char); }
                self.read_digits(&mut s);
            }
        }
        s.parse().unwrap_or(0.0)
    }

    fn read_digits(&mut self, s: &mut String) {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance() as char);
        }
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            s.push(self.advance() as char);
        }
        s
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> Vec<Error> {
        Lexer::new(src).tokenize().unwrap_err()
    }

    #[test]
    fn empty() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn integer_becomes_num() {
        assert_eq!(lex("42"), vec![TokenKind::Num(42.0), TokenKind::Eof]);
    }

    #[test]
    fn decimal_literal() {
        assert_eq!(lex("3.25"), vec![TokenKind::Num(3.25), TokenKind::Eof]);
    }

    #[test]
    fn exponent_literal() {
        assert_eq!(lex("1e3"), vec![TokenKind::Num(1000.0), TokenKind::Eof]);
        assert_eq!(lex("2.5e-1"), vec![TokenKind::Num(0.25), TokenKind::Eof]);
    }

    #[test]
    fn exponent_needs_digit() {
        // `2e` is a number followed by an identifier, not a malformed exponent
        assert_eq!(
            lex("2e"),
            vec![TokenKind::Num(2.0), TokenKind::Ident("e".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn dot_not_consumed_by_number() {
        assert_eq!(
            lex("s.dist"),
            vec![TokenKind::Ident("s".into()), TokenKind::Dot, TokenKind::Ident("dist".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(lex("let"),  vec![TokenKind::Let,  TokenKind::Eof]);
        assert_eq!(lex("in"),   vec![TokenKind::In,   TokenKind::Eof]);
        assert_eq!(lex("if"),   vec![TokenKind::If,   TokenKind::Eof]);
        assert_eq!(lex("else"), vec![TokenKind::Else, TokenKind::Eof]);
        assert_eq!(lex("null"), vec![TokenKind::Null, TokenKind::Eof]);
    }

    #[test]
    fn bool_literals() {
        assert_eq!(lex("true"),  vec![TokenKind::Bool(true),  TokenKind::Eof]);
        assert_eq!(lex("false"), vec![TokenKind::Bool(false), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(lex("=="), vec![TokenKind::EqEq,   TokenKind::Eof]);
        assert_eq!(lex("!="), vec![TokenKind::BangEq, TokenKind::Eof]);
        assert_eq!(lex("<="), vec![TokenKind::LtEq,   TokenKind::Eof]);
        assert_eq!(lex(">="), vec![TokenKind::GtEq,   TokenKind::Eof]);
        assert_eq!(lex("->"), vec![TokenKind::Arrow,  TokenKind::Eof]);
        assert_eq!(lex("&&"), vec![TokenKind::AndAnd, TokenKind::Eof]);
        assert_eq!(lex("||"), vec![TokenKind::OrOr,   TokenKind::Eof]);
    }

    #[test]
    fn line_comment_skipped() {
        assert_eq!(lex("// comment\n42"), vec![TokenKind::Num(42.0), TokenKind::Eof]);
    }

    #[test]
    fn block_comment_skipped() {
        assert_eq!(lex("/* a\nb */42"), vec![TokenKind::Num(42.0), TokenKind::Eof]);
    }

    #[test]
    fn string_literal() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::StringLit("hello".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_escape_newline() {
        assert_eq!(lex(r#""a\nb""#), vec![TokenKind::StringLit("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_keeps_utf8() {
        assert_eq!(lex("\"héllo\""), vec![TokenKind::StringLit("héllo".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_error() {
        let errs = lex_err(r#""oops"#);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L002);
    }

    #[test]
    fn invalid_escape_error() {
        let errs = lex_err(r#""\q""#);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L003);
    }

    #[test]
    fn bare_ampersand_error() {
        let errs = lex_err("a & b");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::L001);
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn lambda_tokens() {
        assert_eq!(
            lex("[x, y] -> x + y"),
            vec![
                TokenKind::LBracket,
                TokenKind::Ident("x".into()), TokenKind::Comma, TokenKind::Ident("y".into()),
                TokenKind::RBracket,
                TokenKind::Arrow,
                TokenKind::Ident("x".into()), TokenKind::Plus, TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn token_kind_helpers() {
        assert!(TokenKind::Plus.is_arithmetic());
        assert!(TokenKind::EqEq.is_comparison());
        assert!(TokenKind::Num(1.0).is_literal());
        assert!(TokenKind::Let.is_keyword());
        assert!(!TokenKind::Ident("x".into()).is_keyword());
    }
}
