//! `SUB`/`FUNCTION` header parsing (spec.md §4.2, §4.4.4).
//!
//! A header is pushed into the flat statement array like any other
//! statement; its `end_index` is back-patched once the matching `END
//! SUB`/`END FUNCTION` is reached (see `stmt.rs::close_sub`/`close_function`),
//! which is also the point at which the routine is registered into
//! `Program::subs`/`Program::funcs` — this is the Open Question 3
//! resolution from SPEC_FULL.md: a top-level call skips a routine body by
//! jumping straight to `end_index` rather than scanning for it at runtime.

use sbasic_lex::{Keyword, Token};
use sbasic_util::Symbol;

use crate::ast::*;
use crate::{OpenBlock, Parser};

impl<'a> Parser<'a> {
    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if !self.match_token(&Token::LParen) {
            return params;
        }
        if self.check(&Token::RParen) {
            self.advance();
            return params;
        }
        loop {
            let mode = if self.match_keyword(Keyword::ByVal) {
                ParamMode::ByVal
            } else {
                self.match_keyword(Keyword::ByRef);
                ParamMode::ByRef
            };
            let span = self.current_span();
            let name = match self.peek().token.clone() {
                Token::Ident(s) => {
                    self.advance();
                    s
                }
                _ => {
                    self.error(span, "expected a parameter name");
                    Symbol::intern("")
                }
            };
            let is_array = if self.match_token(&Token::LParen) {
                self.expect_token(Token::RParen);
                true
            } else {
                false
            };
            let suffix_kind = ValueKind::from_ident_text(name.as_str());
            let kind = if self.match_keyword(Keyword::As) {
                match self.peek().token.clone() {
                    Token::Keyword(Keyword::IntegerType) => {
                        self.advance();
                        ValueKind::Integer
                    }
                    Token::Keyword(Keyword::LongType) => {
                        self.advance();
                        ValueKind::Long
                    }
                    Token::Keyword(Keyword::SingleType) => {
                        self.advance();
                        ValueKind::Single
                    }
                    Token::Keyword(Keyword::DoubleType) => {
                        self.advance();
                        ValueKind::Double
                    }
                    Token::Keyword(Keyword::StringType) => {
                        self.advance();
                        ValueKind::String
                    }
                    _ => suffix_kind,
                }
            } else {
                suffix_kind
            };
            params.push(Param {
                name,
                kind,
                mode,
                is_array,
            });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect_token(Token::RParen);
        params
    }

    pub(crate) fn parse_sub_header(&mut self) {
        let span = self.current_span();
        self.advance();
        let is_static = self.match_keyword(Keyword::Static);
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a SUB name");
                Symbol::intern("")
            }
        };
        let params = self.parse_param_list();
        let signature = SubSignature {
            name,
            params,
            is_static,
        };
        let header_index = self.push_statement(Statement::SubHeader {
            signature,
            end_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::Sub { header_index });
    }

    pub(crate) fn parse_function_header(&mut self) {
        let span = self.current_span();
        self.advance();
        let is_static = self.match_keyword(Keyword::Static);
        let span_name = self.current_span();
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a FUNCTION name");
                Symbol::intern("")
            }
        };
        let params = self.parse_param_list();
        let return_kind = if self.match_keyword(Keyword::As) {
            match self.peek().token.clone() {
                Token::Keyword(Keyword::IntegerType) => {
                    self.advance();
                    ValueKind::Integer
                }
                Token::Keyword(Keyword::LongType) => {
                    self.advance();
                    ValueKind::Long
                }
                Token::Keyword(Keyword::SingleType) => {
                    self.advance();
                    ValueKind::Single
                }
                Token::Keyword(Keyword::DoubleType) => {
                    self.advance();
                    ValueKind::Double
                }
                Token::Keyword(Keyword::StringType) => {
                    self.advance();
                    ValueKind::String
                }
                other => {
                    self.error(span_name, &format!("expected a type name, found {other}"));
                    ValueKind::Single
                }
            }
        } else {
            ValueKind::from_ident_text(name.as_str())
        };
        let signature = FuncSignature {
            name,
            params,
            return_kind,
            is_static,
        };
        let header_index = self.push_statement(Statement::FuncHeader {
            signature,
            end_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::Function { header_index });
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use sbasic_util::Handler;

    #[test]
    fn sub_with_byref_and_byval_params_registers_in_program() {
        let source = "SUB Greet(BYVAL Name$, BYREF Count%)\nPRINT Name$\nEND SUB\n";
        let mut handler = Handler::new();
        let program = parse(source, &mut handler);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        assert!(program.subs.contains_key(&sbasic_util::Symbol::intern("Greet")));
        let def = &program.subs[&sbasic_util::Symbol::intern("greet")];
        assert_eq!(def.signature.params.len(), 2);
    }

    #[test]
    fn function_return_kind_defaults_to_suffix() {
        let source = "FUNCTION Square%(N%)\nSquare% = N% * N%\nEND FUNCTION\n";
        let mut handler = Handler::new();
        let program = parse(source, &mut handler);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        let def = &program.funcs[&sbasic_util::Symbol::intern("Square%")];
        assert_eq!(def.signature.return_kind, crate::ast::ValueKind::Integer);
    }
}
