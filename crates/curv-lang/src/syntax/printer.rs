//! Source printer: renders an AST back to text the parser accepts.
//!
//! Output is not a pretty-printer; it inserts the minimum parentheses the
//! grammar needs, so `parse(print(e))` has the same structure as `e`.

use std::fmt::{self, Write};

use crate::syntax::ast::{BinOp, Def, Expr, Pattern, UnOp};

// Binding strength, loosest first.
const PREC_OPEN: u8 = 0;    // lambda, let, if: extend as far right as possible
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_EQ: u8 = 3;
const PREC_CMP: u8 = 4;
const PREC_ADD: u8 = 5;
const PREC_MUL: u8 = 6;
const PREC_UNARY: u8 = 7;
const PREC_POW: u8 = 8;
const PREC_POSTFIX: u8 = 9;
const PREC_ATOM: u8 = 10;

fn binop_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Or => PREC_OR,
        BinOp::And => PREC_AND,
        BinOp::Eq | BinOp::NotEq => PREC_EQ,
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => PREC_CMP,
        BinOp::Add | BinOp::Sub => PREC_ADD,
        BinOp::Mul | BinOp::Div => PREC_MUL,
        BinOp::Pow => PREC_POW,
    }
}

fn prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Num(n, _) if n.is_sign_negative() && !n.is_nan() => PREC_UNARY,
        Expr::Num(..) | Expr::Bool(..) | Expr::Null(_) | Expr::StringLit(..)
        | Expr::Ident(..) | Expr::List(..) | Expr::Record(..) => PREC_ATOM,
        Expr::BinOp { op, .. } => binop_prec(*op),
        Expr::UnOp { .. } => PREC_UNARY,
        Expr::If { .. } | Expr::Let { .. } | Expr::Lambda(_) => PREC_OPEN,
        Expr::Call { .. } | Expr::Index { .. } | Expr::Field { .. } => PREC_POSTFIX,
    }
}

/// Reparsable spelling of a number. Non-finite values use the `inf`
/// builtin; NaN has no literal and is spelled as a computation.
pub fn format_num(n: f64) -> String {
    if n.is_nan() {
        "(0/0)".into()
    } else if n == f64::INFINITY {
        "inf".into()
    } else if n == f64::NEG_INFINITY {
        "-inf".into()
    } else if n == 0.0 {
        // -0 prints as `0`; the sign of zero doesn't survive a round trip
        "0".into()
    } else {
        format!("{n}")
    }
}

pub fn write_string_lit(out: &mut impl Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"'  => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            c    => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

pub fn write_pattern(out: &mut impl Write, pat: &Pattern) -> fmt::Result {
    match pat {
        Pattern::Ident(name, _) => out.write_str(name),
        Pattern::List(items, _) => {
            out.write_char('[')?;
            for (i, p) in items.iter().enumerate() {
                if i > 0 { out.write_str(", ")?; }
                write_pattern(out, p)?;
            }
            out.write_char(']')
        }
    }
}

/// `a = 1; b = 2; `, as written in `let` blocks and exported closures.
pub fn write_defs(out: &mut impl Write, defs: &[Def]) -> fmt::Result {
    for def in defs {
        write!(out, "{} = ", def.name)?;
        write_expr(out, &def.value, PREC_OPEN)?;
        out.write_str("; ")?;
    }
    Ok(())
}

/// Write `expr`, parenthesised if it binds looser than `min_prec`.
pub fn write_expr(out: &mut impl Write, expr: &Expr, min_prec: u8) -> fmt::Result {
    let paren = prec(expr) < min_prec;
    if paren { out.write_char('(')?; }

    match expr {
        Expr::Num(n, _) => out.write_str(&format_num(*n))?,
        Expr::Bool(b, _) => write!(out, "{b}")?,
        Expr::Null(_) => out.write_str("null")?,
        Expr::StringLit(s, _) => write_string_lit(out, s)?,
        Expr::Ident(name, _) => out.write_str(name)?,

        Expr::List(items, _) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 { out.write_str(", ")?; }
                write_expr(out, item, PREC_OPEN)?;
            }
            out.write_char(']')?;
        }

        Expr::Record(fields, _) => {
            out.write_char('{')?;
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 { out.write_str(", ")?; }
                write!(out, "{name}: ")?;
                write_expr(out, value, PREC_OPEN)?;
            }
            out.write_char('}')?;
        }

        Expr::BinOp { left, op, right, .. } => {
            let p = binop_prec(*op);
            // left-associative except `^`, whose base is a postfix expression
            let (lp, rp) = if *op == BinOp::Pow { (PREC_POSTFIX, PREC_UNARY) } else { (p, p + 1) };
            write_expr(out, left, lp)?;
            write!(out, " {} ", op.symbol())?;
            write_expr(out, right, rp)?;
        }

        Expr::UnOp { op, operand, .. } => {
            out.write_str(match op { UnOp::Neg => "-", UnOp::Not => "!" })?;
            write_expr(out, operand, PREC_UNARY)?;
        }

        Expr::If { condition, then_expr, else_expr, .. } => {
            out.write_str("if (")?;
            write_expr(out, condition, PREC_OPEN)?;
            out.write_str(") ")?;
            // a bare lambda or let here would swallow the `else`
            write_expr(out, then_expr, PREC_OR)?;
            out.write_str(" else ")?;
            write_expr(out, else_expr, PREC_OPEN)?;
        }

        Expr::Let { defs, body, .. } => {
            out.write_str("let ")?;
            write_defs(out, defs)?;
            out.write_str("in ")?;
            write_expr(out, body, PREC_OPEN)?;
        }

        Expr::Lambda(lambda) => {
            write_pattern(out, &lambda.param)?;
            out.write_str(" -> ")?;
            write_expr(out, &lambda.body, PREC_OPEN)?;
        }

        Expr::Call { callee, args, .. } => {
            write_expr(out, callee, PREC_POSTFIX)?;
            out.write_char('(')?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 { out.write_str(", ")?; }
                write_expr(out, arg, PREC_OPEN)?;
            }
            out.write_char(')')?;
        }

        Expr::Index { expr, index, .. } => {
            write_expr(out, expr, PREC_POSTFIX)?;
            out.write_char('[')?;
            write_expr(out, index, PREC_OPEN)?;
            out.write_char(']')?;
        }

        Expr::Field { expr, field, .. } => {
            write_expr(out, expr, PREC_POSTFIX)?;
            write!(out, ".{field}")?;
        }
    }

    if paren { out.write_char(')')?; }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, PREC_OPEN)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::syntax::ast::Expr;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::parser::Parser;

    fn parse(src: &str) -> Expr {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    /// Printing is a fixed point after one pass.
    fn reprint(src: &str) -> String {
        let once = parse(src).to_string();
        let twice = parse(&once).to_string();
        assert_eq!(once, twice, "printer output did not reparse to the same tree");
        once
    }

    #[test]
    fn minimal_parens() {
        assert_eq!(reprint("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(reprint("1 + (2 * 3)"), "1 + 2 * 3");
        assert_eq!(reprint("a - (b - c)"), "a - (b - c)");
    }

    #[test]
    fn power_and_negation() {
        assert_eq!(reprint("-x^2"), "-x ^ 2");
        assert_eq!(reprint("(-x)^2"), "(-x) ^ 2");
        assert_eq!(reprint("a^(b^c)"), "a ^ b ^ c");
        assert_eq!(reprint("(a^b)^c"), "(a ^ b) ^ c");
    }

    #[test]
    fn binding_forms() {
        assert_eq!(reprint("let a = 1; in [a, x -> x]"), "let a = 1; in [a, x -> x]");
        assert_eq!(reprint("(x -> x) (1)"), "(x -> x)(1)");
        assert_eq!(reprint("(if (c) 1 else 2) + 3"), "(if (c) 1 else 2) + 3");
        assert_eq!(reprint("if (c) (x -> x) else y -> y"), "if (c) (x -> x) else y -> y");
    }

    #[test]
    fn records_and_postfix() {
        assert_eq!(reprint("{a: 1; b: s.dist(p)[0]}"), "{a: 1, b: s.dist(p)[0]}");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(reprint(r#""a\"b\\c\n""#), r#""a\"b\\c\n""#);
    }

    #[test]
    fn number_spelling() {
        assert_eq!(super::format_num(1.0), "1");
        assert_eq!(super::format_num(-0.5), "-0.5");
        assert_eq!(super::format_num(f64::INFINITY), "inf");
        assert_eq!(super::format_num(f64::NEG_INFINITY), "-inf");
        assert_eq!(super::format_num(f64::NAN), "(0/0)");
    }
}
