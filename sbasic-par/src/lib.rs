//! The recursive-descent / Pratt parser (spec.md §4.2): token stream →
//! [`Program`] — a flat statement array plus the line/label/routine side
//! tables that make unstructured control flow and `SUB`/`FUNCTION`
//! dispatch possible without a nested tree.
//!
//! Parsing never aborts on the first error: like `faxc-par`, malformed
//! constructs are reported to a [`Handler`] and the parser recovers at the
//! next statement boundary (a `Newline`, `Colon`, or line number) so a
//! single file can surface every syntax error in one pass.

mod expr;
mod items;
mod stmt;

pub mod ast;

pub use ast::*;

use sbasic_lex::{Lexer, SpannedToken, Token};
use sbasic_util::{Handler, Span};

/// Parses an entire source string and returns the assembled [`Program`].
/// Diagnostics accumulate in `handler`; callers should check
/// `handler.has_errors()` before trusting the result.
pub fn parse(source: &str, handler: &mut Handler) -> Program {
    let mut lexer = Lexer::new(source);
    let mut tokens: Vec<SpannedToken> = (&mut lexer).collect();
    let eof_span = lexer.span();
    tokens.push(SpannedToken {
        token: Token::Eof,
        span: eof_span,
    });
    let mut parser = Parser::new(tokens, handler);
    parser.parse_program()
}

/// Tracks a still-open block construct while its body is being parsed, so
/// the header statement can be back-patched with a jump index once the
/// closing keyword is reached.
enum OpenBlock {
    If {
        header_index: StmtIndex,
        /// `Goto`s inserted at the end of each THEN/ELSEIF body, all
        /// jumping to the statement after `END IF` — patched once known.
        end_gotos: Vec<StmtIndex>,
    },
    For {
        header_index: StmtIndex,
    },
    While {
        header_index: StmtIndex,
    },
    Do {
        header_index: StmtIndex,
    },
    Select {
        header_index: StmtIndex,
        /// The most recently opened `CASE` header, back-patched with the
        /// next `CASE`'s index (or the end index, for the last one).
        current_case: Option<StmtIndex>,
        end_gotos: Vec<StmtIndex>,
    },
    Sub {
        header_index: StmtIndex,
    },
    Function {
        header_index: StmtIndex,
    },
}

pub(crate) struct Parser<'a> {
    tokens: Vec<SpannedToken>,
    position: usize,
    handler: &'a mut Handler,
    program: Program,
    open_blocks: Vec<OpenBlock>,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<SpannedToken>, handler: &'a mut Handler) -> Self {
        Parser {
            tokens,
            position: 0,
            handler,
            program: Program::default(),
            open_blocks: Vec::new(),
        }
    }

    fn parse_program(mut self) -> Program {
        self.skip_newlines();
        while !self.at_eof() {
            if let Token::LineNumber(n) = self.peek().token {
                let idx = self.program.statements.len();
                self.program.statements.push(Statement::LineMarker(n));
                self.program.line_map.insert(n, idx);
                self.advance();
            }
            if self.at_eof() {
                break;
            }
            self.parse_line();
            self.skip_newlines();
        }

        if !self.open_blocks.is_empty() {
            let span = self.current_span();
            self.error(span, "unterminated block at end of file");
        }

        self.program
    }

    /// Parses every `:`-separated statement on one logical source line.
    fn parse_line(&mut self) {
        loop {
            if self.at_eof() || self.check(&Token::Newline) {
                break;
            }
            self.parse_statement();
            if self.check(&Token::Colon) {
                self.advance();
                continue;
            }
            break;
        }
    }

    // --- token-stream primitives -------------------------------------

    pub(crate) fn peek(&self) -> &SpannedToken {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &SpannedToken {
        let idx = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn advance(&mut self) -> SpannedToken {
        let tok = self.tokens[self.position.min(self.tokens.len() - 1)].clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        tok
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek().token, Token::Eof)
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        &self.peek().token == token
    }

    pub(crate) fn check_keyword(&self, kw: sbasic_lex::Keyword) -> bool {
        matches!(&self.peek().token, Token::Keyword(k) if *k == kw)
    }

    pub(crate) fn match_keyword(&mut self, kw: sbasic_lex::Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, kw: sbasic_lex::Keyword) -> bool {
        if self.match_keyword(kw) {
            true
        } else {
            let span = self.current_span();
            self.error(span, &format!("expected {kw}, found {}", self.peek().token));
            false
        }
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(&mut self, token: Token) -> bool {
        if self.match_token(&token) {
            true
        } else {
            let span = self.current_span();
            self.error(span, &format!("expected {token}, found {}", self.peek().token));
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&Token::Newline) {
            self.advance();
        }
    }

    pub(crate) fn error(&mut self, span: Span, message: &str) {
        self.handler.error(message.to_string(), span);
    }

    /// Recovers from a malformed statement by discarding tokens up to the
    /// next statement boundary, so later lines still get parsed and
    /// reported on.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_eof() && !self.check(&Token::Newline) && !self.check(&Token::Colon) {
            self.advance();
        }
    }

    pub(crate) fn push_statement(&mut self, stmt: Statement) -> StmtIndex {
        let idx = self.program.statements.len();
        self.program.statements.push(stmt);
        idx
    }

    pub(crate) fn next_index(&self) -> StmtIndex {
        self.program.statements.len()
    }

    pub(crate) fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbasic_util::Handler;

    #[test]
    fn empty_program_has_no_statements() {
        let mut handler = Handler::new();
        let program = parse("", &mut handler);
        assert!(program.statements.is_empty());
        assert!(!handler.has_errors());
    }

    #[test]
    fn line_numbers_populate_the_line_map() {
        let mut handler = Handler::new();
        let program = parse("10 PRINT 1\n20 PRINT 2\n", &mut handler);
        assert!(program.line_map.contains_key(&10));
        assert!(program.line_map.contains_key(&20));
    }
}
