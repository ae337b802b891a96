use std::rc::Rc;

use crate::syntax::ast::*;
use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// A program is a single expression followed by end of input.
    pub fn parse(mut self) -> Result<Expr, Vec<Error>> {
        let expr = self.parse_expr().map_err(|e| vec![e])?;
        if !self.is_at_end() {
            return Err(vec![self.unexpected("end of input")]);
        }
        Ok(expr)
    }

    /// A definition list without the surrounding `let ... in`, as used by
    /// the prelude: `a = 1; b = 2;`
    pub fn parse_defs(mut self) -> Result<Vec<Def>, Vec<Error>> {
        let mut errors = Vec::new();
        let mut defs = Vec::new();

        while !self.is_at_end() {
            let pos_before = self.pos;
            match self.parse_def() {
                Ok(d) => defs.push(d),
                Err(e) => { errors.push(e); self.recover(); }
            }
            if !self.matches(TokenKind::Semicolon) && !self.is_at_end() && errors.is_empty() {
                errors.push(self.unexpected("`;`"));
                self.recover();
            }
            // guarantee progress on unrecognised tokens
            if self.pos == pos_before {
                self.advance();
            }
        }

        if errors.is_empty() { Ok(defs) } else { Err(errors) }
    }

    // ─── Binding forms ───────────────────────────────────────────────────────

    fn parse_def(&mut self) -> Result<Def, Error> {
        let span = self.span();
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Def { name, value, span })
    }

    fn parse_let(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        self.expect(TokenKind::Let)?;
        let mut defs = Vec::new();
        while !self.check(TokenKind::In) && !self.is_at_end() {
            defs.push(self.parse_def()?);
            if !self.matches(TokenKind::Semicolon) { break; }
        }
        self.expect(TokenKind::In)?;
        let body = self.parse_expr()?;
        Ok(Expr::Let { defs, body: Rc::new(body), span })
    }

    fn parse_if(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let else_expr = self.parse_expr()?;
        Ok(Expr::If {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span,
        })
    }

    fn parse_lambda(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        let param = self.parse_pattern()?;
        self.expect(TokenKind::Arrow)?;
        let body = self.parse_expr()?;
        Ok(Expr::Lambda(Rc::new(Lambda { param, body, span })))
    }

    fn parse_pattern(&mut self) -> Result<Pattern, Error> {
        let span = self.span();
        if self.matches(TokenKind::LBracket) {
            let mut items = Vec::new();
            while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                items.push(self.parse_pattern()?);
                if !self.matches(TokenKind::Comma) { break; }
            }
            self.expect(TokenKind::RBracket)?;
            Ok(Pattern::List(items, span))
        } else {
            Ok(Pattern::Ident(self.expect_ident()?, span))
        }
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub fn parse_expr(&mut self) -> Result<Expr, Error> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::If  => self.parse_if(),
            TokenKind::Ident(_) if self.peek_next_is(TokenKind::Arrow) => self.parse_lambda(),
            TokenKind::LBracket if self.is_pattern_lambda() => self.parse_lambda(),
            _ => self.parse_or(),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::OrOr) {
            let span = left.span();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::AndAnd) {
            let span = left.span();
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt   => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt   => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_addition()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        if self.matches(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        if self.matches(TokenKind::Bang) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Not, operand: Box::new(operand), span });
        }
        self.parse_power()
    }

    /// `a ^ b` binds tighter than unary minus and is right-associative:
    /// `-x^2` is `-(x^2)`, `a^b^c` is `a^(b^c)`.
    fn parse_power(&mut self) -> Result<Expr, Error> {
        let base = self.parse_postfix()?;
        if self.check(TokenKind::Caret) {
            let span = base.span();
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::BinOp { left: Box::new(base), op: BinOp::Pow, right: Box::new(exponent), span });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                // field access: expr.name
                TokenKind::Dot => {
                    let span = expr.span();
                    self.advance();
                    let field = self.expect_ident()?;
                    expr = Expr::Field { expr: Box::new(expr), field, span };
                }

                // call: expr(args)
                TokenKind::LParen => {
                    let span = expr.span();
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::Call { callee: Box::new(expr), args, span };
                }

                // index: expr[i]
                TokenKind::LBracket => {
                    let span = expr.span();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index { expr: Box::new(expr), index: Box::new(index), span };
                }

                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Num(v)       => { self.advance(); Ok(Expr::Num(v, span)) }
            TokenKind::Bool(v)      => { self.advance(); Ok(Expr::Bool(v, span)) }
            TokenKind::Null         => { self.advance(); Ok(Expr::Null(span)) }
            TokenKind::StringLit(s) => { self.advance(); Ok(Expr::StringLit(s, span)) }
            TokenKind::Ident(name)  => { self.advance(); Ok(Expr::Ident(name, span)) }

            // grouped expression
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            // list literal
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_expr()?);
                    if !self.matches(TokenKind::Comma) { break; }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items, span))
            }

            // record literal: fields separated by `,` or `;`
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                    let name = self.expect_ident()?;
                    self.expect(TokenKind::Colon)?;
                    fields.push((name, self.parse_expr()?));
                    if !self.matches(TokenKind::Comma) && !self.matches(TokenKind::Semicolon) { break; }
                }
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::Record(fields, span))
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    // ─── Argument lists ──────────────────────────────────────────────────────

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn peek_next_is(&self, kind: TokenKind) -> bool {
        if self.pos + 1 < self.tokens.len() {
            self.tokens[self.pos + 1].kind == kind
        } else {
            false
        }
    }

    /// Returns true when the current `[` opens a list pattern followed by
    /// `->`. Only identifiers, commas and nested brackets may appear inside.
    fn is_pattern_lambda(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        while i < self.tokens.len() {
            match &self.tokens[i].kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1 < self.tokens.len()
                            && self.tokens[i + 1].kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Ident(_) | TokenKind::Comma => {}
                _ => return false,
            }
            i += 1;
        }
        false
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(Error::new(
                ErrorCode::P002,
                Span::new(tok.line, tok.column),
                format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        if let TokenKind::Ident(s) = self.peek_kind() {
            self.advance();
            Ok(s)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        Error::new(
            ErrorCode::P001,
            Span::new(tok.line, tok.column),
            format!("expected {}, found {}", expected, tok.kind.describe()),
        )
    }

    /// Skip tokens until the next definition boundary. Used after a parse
    /// error in a definition list.
    fn recover(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => { self.advance(); break; }
                _ => { self.advance(); }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;

    fn parse(src: &str) -> Expr {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    fn parse_err(src: &str) -> Vec<Error> {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect_err("expected parse error")
    }

    fn defs(src: &str) -> Vec<Def> {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse_defs().expect("parse_defs failed")
    }

    // ── literals ─────────────────────────────────────────────────────────────

    #[test]
    fn num_literal() {
        assert!(matches!(parse("1.5"), Expr::Num(v, _) if v == 1.5));
    }

    #[test]
    fn null_and_bool() {
        assert!(matches!(parse("null"), Expr::Null(_)));
        assert!(matches!(parse("false"), Expr::Bool(false, _)));
    }

    #[test]
    fn empty_list() {
        assert!(matches!(parse("[]"), Expr::List(items, _) if items.is_empty()));
    }

    #[test]
    fn list_trailing_comma() {
        assert!(matches!(parse("[1, 2,]"), Expr::List(items, _) if items.len() == 2));
    }

    #[test]
    fn record_literal() {
        match parse("{a: 1, b: [2, 3]; c: true}") {
            Expr::Record(fields, _) => {
                let names: Vec<_> = fields.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
            }
            other => panic!("expected Record, got {other:?}"),
        }
    }

    // ── operators ────────────────────────────────────────────────────────────

    #[test]
    fn operator_precedence_mul_over_add() {
        match parse("1 + 2 * 3") {
            Expr::BinOp { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::BinOp { op: BinOp::Mul, .. }));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn operator_precedence_compare_over_logical() {
        match parse("a < b && c >= d") {
            Expr::BinOp { op: BinOp::And, left, right, .. } => {
                assert!(matches!(*left, Expr::BinOp { op: BinOp::Lt, .. }));
                assert!(matches!(*right, Expr::BinOp { op: BinOp::GtEq, .. }));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn neg_binds_looser_than_power() {
        match parse("-x^2") {
            Expr::UnOp { op: UnOp::Neg, operand, .. } => {
                assert!(matches!(*operand, Expr::BinOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected Neg, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        match parse("a ^ b ^ c") {
            Expr::BinOp { op: BinOp::Pow, left, right, .. } => {
                assert!(matches!(*left, Expr::Ident(ref n, _) if n == "a"));
                assert!(matches!(*right, Expr::BinOp { op: BinOp::Pow, .. }));
            }
            other => panic!("expected Pow, got {other:?}"),
        }
    }

    #[test]
    fn unary_not() {
        assert!(matches!(parse("!a"), Expr::UnOp { op: UnOp::Not, .. }));
    }

    // ── postfix ──────────────────────────────────────────────────────────────

    #[test]
    fn field_call_index_chain() {
        match parse("s.dist(p)[0]") {
            Expr::Index { expr, .. } => match *expr {
                Expr::Call { callee, args, .. } => {
                    assert_eq!(args.len(), 1);
                    assert!(matches!(*callee, Expr::Field { ref field, .. } if field == "dist"));
                }
                other => panic!("expected Call, got {other:?}"),
            },
            other => panic!("expected Index, got {other:?}"),
        }
    }

    #[test]
    fn call_with_several_args() {
        assert!(matches!(parse("f(1, 2, 3)"), Expr::Call { args, .. } if args.len() == 3));
    }

    // ── binding forms ────────────────────────────────────────────────────────

    #[test]
    fn lambda_ident_param() {
        match parse("x -> x + 1") {
            Expr::Lambda(l) => {
                assert_eq!(l.param, Pattern::Ident("x".into(), Span::new(1, 1)));
                assert!(matches!(l.body, Expr::BinOp { op: BinOp::Add, .. }));
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn lambda_list_pattern() {
        match parse("[a, [b, c]] -> a") {
            Expr::Lambda(l) => match &l.param {
                Pattern::List(items, _) => {
                    assert_eq!(items.len(), 2);
                    assert!(matches!(items[1], Pattern::List(ref inner, _) if inner.len() == 2));
                }
                other => panic!("expected list pattern, got {other:?}"),
            },
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn list_literal_not_confused_with_pattern() {
        assert!(matches!(parse("[a, b]"), Expr::List(..)));
        assert!(matches!(parse("[a + 1] "), Expr::List(..)));
    }

    #[test]
    fn lambda_body_extends_right() {
        match parse("x -> y -> x + y") {
            Expr::Lambda(l) => assert!(matches!(l.body, Expr::Lambda(_))),
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn let_block() {
        match parse("let a = 1; b = a + 1; in b") {
            Expr::Let { defs, body, .. } => {
                assert_eq!(defs.len(), 2);
                assert_eq!(defs[1].name, "b");
                assert!(matches!(body.as_ref(), Expr::Ident(n, _) if n == "b"));
            }
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn let_without_trailing_semicolon() {
        assert!(matches!(parse("let a = 1 in a"), Expr::Let { .. }));
    }

    #[test]
    fn if_else() {
        match parse("if (x > 0) x else -x") {
            Expr::If { condition, else_expr, .. } => {
                assert!(matches!(*condition, Expr::BinOp { op: BinOp::Gt, .. }));
                assert!(matches!(*else_expr, Expr::UnOp { op: UnOp::Neg, .. }));
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn nub_strips_lets() {
        let phrase = Rc::new(parse("let a = 1; in let b = 2; in [a, b]"));
        assert!(matches!(nub(&phrase).as_ref(), Expr::List(..)));
    }

    #[test]
    fn free_vars_of_lambda() {
        match parse("p -> let q = p - c; in mag(q) - r") {
            Expr::Lambda(l) => {
                let free: Vec<_> = l.free_vars().into_iter().collect();
                assert_eq!(free, vec!["c", "mag", "r"]);
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    // ── definition lists ─────────────────────────────────────────────────────

    #[test]
    fn defs_list() {
        let d = defs("a = 1; f = x -> x; ");
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].name, "a");
    }

    #[test]
    fn defs_missing_semicolon() {
        let tokens = Lexer::new("a = 1 b = 2").tokenize().unwrap();
        let errs = Parser::new(tokens).parse_defs().unwrap_err();
        assert_eq!(errs[0].code, ErrorCode::P001);
    }

    // ── errors ───────────────────────────────────────────────────────────────

    #[test]
    fn missing_bracket_is_error() {
        let errs = parse_err("[1, 2");
        assert_eq!(errs[0].code, ErrorCode::P002);
    }

    #[test]
    fn trailing_tokens_are_error() {
        let errs = parse_err("1 2");
        assert_eq!(errs[0].code, ErrorCode::P001);
        assert_eq!(errs[0].span, Span::new(1, 3));
    }

    #[test]
    fn if_requires_parenthesised_condition() {
        let errs = parse_err("if x 1 else 2");
        assert_eq!(errs[0].code, ErrorCode::P002);
    }
}
