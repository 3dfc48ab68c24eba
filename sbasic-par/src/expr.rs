//! Pratt expression parsing (spec.md §4.2), grounded in `faxc-par`'s
//! `expr.rs`: a binding-power table plus a single climbing loop, rather
//! than one recursive-descent function per precedence level.
//!
//! Precedence, loosest to tightest: `IMP`, `EQV`, `XOR`, `OR`, `AND`,
//! unary `NOT`, relational (`= <> < <= > >=`), `+ -`, `MOD`, `\` (integer
//! division), `* /`, unary `-`, `^` (right-associative).

use sbasic_lex::{Keyword, Token};
use sbasic_util::Symbol;

use crate::ast::{BinOp, Expr, Literal, UnOp};
use crate::Parser;

mod bp {
    pub const MIN: u8 = 0;
    pub const IMP: u8 = 2;
    pub const EQV: u8 = 4;
    pub const XOR: u8 = 6;
    pub const OR: u8 = 8;
    pub const AND: u8 = 10;
    pub const NOT: u8 = 12;
    pub const CMP: u8 = 14;
    pub const ADD: u8 = 16;
    pub const MOD: u8 = 18;
    pub const IDIV: u8 = 20;
    pub const MUL: u8 = 22;
    pub const UNARY_NEG: u8 = 24;
    pub const POW: u8 = 26;
}

/// Left/right binding power and operator for an infix token, or `None` if
/// the token does not continue an expression.
fn infix_binding_power(token: &Token) -> Option<(u8, u8, BinOp)> {
    use BinOp::*;
    Some(match token {
        Token::Keyword(Keyword::Imp) => (bp::IMP, bp::IMP + 1, Imp),
        Token::Keyword(Keyword::Eqv) => (bp::EQV, bp::EQV + 1, Eqv),
        Token::Keyword(Keyword::Xor) => (bp::XOR, bp::XOR + 1, Xor),
        Token::Keyword(Keyword::Or) => (bp::OR, bp::OR + 1, Or),
        Token::Keyword(Keyword::And) => (bp::AND, bp::AND + 1, And),
        Token::Equal => (bp::CMP, bp::CMP + 1, Eq),
        Token::NotEqual => (bp::CMP, bp::CMP + 1, NotEq),
        Token::Less => (bp::CMP, bp::CMP + 1, Lt),
        Token::LessEqual => (bp::CMP, bp::CMP + 1, LtEq),
        Token::Greater => (bp::CMP, bp::CMP + 1, Gt),
        Token::GreaterEqual => (bp::CMP, bp::CMP + 1, GtEq),
        Token::Plus => (bp::ADD, bp::ADD + 1, Add),
        Token::Minus => (bp::ADD, bp::ADD + 1, Sub),
        Token::Keyword(Keyword::Mod) => (bp::MOD, bp::MOD + 1, Mod),
        Token::Backslash => (bp::IDIV, bp::IDIV + 1, IntDiv),
        Token::Star => (bp::MUL, bp::MUL + 1, Mul),
        Token::Slash => (bp::MUL, bp::MUL + 1, Div),
        // Right-associative: the right operand binds at the same power.
        Token::Caret => (bp::POW, bp::POW, Pow),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Expr {
        self.parse_expression_bp(bp::MIN)
    }

    fn parse_expression_bp(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix();

        loop {
            let Some((l_bp, r_bp, op)) = infix_binding_power(&self.peek().token) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let op_span = self.advance().span;
            let rhs = self.parse_expression_bp(r_bp);
            let span = lhs.span().to(rhs.span()).to(op_span);
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }

        lhs
    }

    fn parse_prefix(&mut self) -> Expr {
        let start = self.current_span();
        match &self.peek().token {
            Token::Keyword(Keyword::Not) => {
                self.advance();
                let operand = self.parse_expression_bp(bp::NOT);
                let span = start.to(operand.span());
                Expr::Unary(UnOp::Not, Box::new(operand), span)
            }
            Token::Minus => {
                self.advance();
                let operand = self.parse_expression_bp(bp::UNARY_NEG);
                let span = start.to(operand.span());
                Expr::Unary(UnOp::Neg, Box::new(operand), span)
            }
            Token::Plus => {
                // Unary plus is a no-op; still require an operand.
                self.advance();
                self.parse_expression_bp(bp::UNARY_NEG)
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parses a primary expression, then any trailing `(args)` call or
    /// subscript form. The two are syntactically identical — spec.md
    /// §4.4.2 resolves the ambiguity at evaluation time.
    fn parse_postfix(&mut self) -> Expr {
        let primary = self.parse_primary();
        if let Expr::Var(name, span) = primary {
            if self.check(&Token::LParen) {
                self.advance();
                let args = self.parse_arg_list();
                let end = self.current_span();
                self.expect_token(Token::RParen);
                return Expr::Call(name, args, span.to(end));
            }
        }
        primary
    }

    fn parse_arg_list(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.check(&Token::RParen) {
            return args;
        }
        args.push(self.parse_expression());
        while self.match_token(&Token::Comma) {
            args.push(self.parse_expression());
        }
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let span = self.current_span();
        match self.peek().token.clone() {
            Token::Integer(n) => {
                self.advance();
                Expr::Literal(Literal::Integer(n), span)
            }
            Token::Long(n) => {
                self.advance();
                Expr::Literal(Literal::Long(n), span)
            }
            Token::Single(n) => {
                self.advance();
                Expr::Literal(Literal::Single(n), span)
            }
            Token::Double(n) => {
                self.advance();
                Expr::Literal(Literal::Double(n), span)
            }
            Token::Str(s) => {
                self.advance();
                Expr::Literal(Literal::Str(s), span)
            }
            Token::Ident(s) => {
                self.advance();
                Expr::Var(s, span)
            }
            // A handful of keywords double as builtin-function names
            // outside of their dollar-suffixed spelling (PI, INT, LEN...).
            Token::Keyword(kw) if builtin_keyword_name(kw).is_some() => {
                self.advance();
                let name = Symbol::intern(builtin_keyword_name(kw).unwrap());
                if self.check(&Token::LParen) {
                    self.advance();
                    let args = self.parse_arg_list();
                    let end = self.current_span();
                    self.expect_token(Token::RParen);
                    Expr::Call(name, args, span.to(end))
                } else {
                    // PI takes no parens.
                    Expr::Call(name, Vec::new(), span)
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect_token(Token::RParen);
                inner
            }
            _ => {
                let tok = self.peek().token.clone();
                self.error(span, &format!("expected an expression, found {tok}"));
                self.advance();
                Expr::Literal(Literal::Integer(0), span)
            }
        }
    }
}

/// Builtin functions whose name is also a bare keyword (not `$`-suffixed),
/// so they need mapping back to an identifier `Symbol` for `Expr::Call`.
fn builtin_keyword_name(kw: Keyword) -> Option<&'static str> {
    use Keyword::*;
    Some(match kw {
        Abs => "ABS",
        Atn => "ATN",
        Atan2 => "ATAN2",
        Cos => "COS",
        Exp => "EXP",
        Fix => "FIX",
        Int => "INT",
        Log => "LOG",
        Rnd => "RND",
        Sgn => "SGN",
        Sin => "SIN",
        Sqr => "SQR",
        Tan => "TAN",
        Round => "ROUND",
        Pi => "PI",
        Asc => "ASC",
        InStr => "INSTR",
        Val => "VAL",
        Tab => "TAB",
        Spc => "SPC",
        CInt => "CINT",
        CLng => "CLNG",
        CSng => "CSNG",
        CDbl => "CDBL",
        Timer => "TIMER",
        Eof => "EOF",
        Lof => "LOF",
        Loc => "LOC",
        FreeFile => "FREEFILE",
        LBound => "LBOUND",
        UBound => "UBOUND",
        Len => "LEN",
        Chr => "CHR$",
        Left => "LEFT$",
        Mid => "MID$",
        Right => "RIGHT$",
        StrFn => "STR$",
        StringFn => "STRING$",
        Space => "SPACE$",
        LTrim => "LTRIM$",
        RTrim => "RTRIM$",
        Trim => "TRIM$",
        UCase => "UCASE$",
        LCase => "LCASE$",
        Hex => "HEX$",
        Oct => "OCT$",
        InKey => "INKEY$",
        DateFn => "DATE$",
        TimeFn => "TIME$",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbasic_lex::Lexer;
    use sbasic_util::Handler;

    fn parse_expr(source: &str) -> Expr {
        let tokens: Vec<_> = Lexer::new(source).collect();
        let mut handler = Handler::new();
        let mut parser = Parser::new(tokens, &mut handler);
        let expr = parser.parse_expression();
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        expr
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Binary(BinOp::Add, lhs, rhs, _) => {
                assert!(matches!(*lhs, Expr::Literal(Literal::Integer(1), _)));
                assert!(matches!(*rhs, Expr::Binary(BinOp::Mul, _, _, _)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn caret_is_right_associative() {
        // 2 ^ 3 ^ 2 == 2 ^ (3 ^ 2), not (2 ^ 3) ^ 2.
        let expr = parse_expr("2 ^ 3 ^ 2");
        match expr {
            Expr::Binary(BinOp::Pow, lhs, rhs, _) => {
                assert!(matches!(*lhs, Expr::Literal(Literal::Integer(2), _)));
                assert!(matches!(*rhs, Expr::Binary(BinOp::Pow, _, _, _)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn function_call_parses_argument_list() {
        let expr = parse_expr("LEFT$(A$, 3)");
        match expr {
            Expr::Call(name, args, _) => {
                assert_eq!(name.as_str(), "LEFT$");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn unary_not_binds_looser_than_comparison() {
        // NOT A = B means NOT (A = B).
        let expr = parse_expr("NOT A = B");
        match expr {
            Expr::Unary(UnOp::Not, inner, _) => {
                assert!(matches!(*inner, Expr::Binary(BinOp::Eq, _, _, _)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
