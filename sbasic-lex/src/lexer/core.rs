//! Core lexer: dispatch loop, newline handling, and line-number detection.

use sbasic_util::Span;

use crate::cursor::Cursor;
use crate::token::{Keyword, SpannedToken, Token};

/// Lexer for the BASIC dialect (spec.md §4.1).
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
    /// True until the first non-newline token on the current line is
    /// emitted. A leading unsigned integer while this holds lexes as a
    /// `LineNumber`, never an `Integer` literal.
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            at_line_start: true,
        }
    }

    /// The span of the token most recently returned by `next_token`.
    pub fn span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.cursor.skip_spaces_and_tabs();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::Eof;
        }

        let c = self.cursor.current_char();

        if matches!(c, '\r' | '\n') {
            return self.lex_newline();
        }

        let was_line_start = self.at_line_start;
        self.at_line_start = false;

        if was_line_start && c.is_ascii_digit() {
            return self.lex_line_number();
        }

        match c {
            '\'' => self.lex_rem_tick(),
            '"' => self.lex_string(),
            '+' => {
                self.cursor.advance();
                Token::Plus
            }
            '-' => {
                self.cursor.advance();
                Token::Minus
            }
            '*' => {
                self.cursor.advance();
                Token::Star
            }
            '/' => {
                self.cursor.advance();
                Token::Slash
            }
            '\\' => {
                self.cursor.advance();
                Token::Backslash
            }
            '^' => {
                self.cursor.advance();
                Token::Caret
            }
            '=' => {
                self.cursor.advance();
                Token::Equal
            }
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '(' => {
                self.cursor.advance();
                Token::LParen
            }
            ')' => {
                self.cursor.advance();
                Token::RParen
            }
            ',' => {
                self.cursor.advance();
                Token::Comma
            }
            ';' => {
                self.cursor.advance();
                Token::Semicolon
            }
            ':' => {
                self.cursor.advance();
                Token::Colon
            }
            '#' => {
                self.cursor.advance();
                Token::Hash
            }
            '$' => {
                self.cursor.advance();
                Token::Dollar
            }
            '%' => {
                self.cursor.advance();
                Token::Percent
            }
            '&' => {
                self.cursor.advance();
                Token::Ampersand
            }
            '!' => {
                self.cursor.advance();
                Token::Bang
            }
            '?' => {
                self.cursor.advance();
                Token::Keyword(Keyword::Print)
            }
            c if c.is_ascii_digit() => self.lex_number(),
            c if crate::unicode::is_ident_start(c) => self.lex_ident_or_rem(),
            c => {
                self.cursor.advance();
                Token::Illegal(c)
            }
        }
    }

    /// CR, CRLF, and LF all collapse to a single newline token.
    fn lex_newline(&mut self) -> Token {
        if self.cursor.current_char() == '\r' {
            self.cursor.advance();
            self.cursor.match_char('\n');
        } else {
            self.cursor.advance();
        }
        self.at_line_start = true;
        Token::Newline
    }

    fn lex_line_number(&mut self) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        Token::LineNumber(text.parse().unwrap_or(u32::MAX))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token == Token::Eof {
            None
        } else {
            Some(SpannedToken {
                token,
                span: self.span(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token();
            if t == Token::Eof {
                break;
            }
            out.push(t);
        }
        out
    }

    #[test]
    fn leading_integer_is_a_line_number() {
        assert_eq!(tokens("10 PRINT")[0], Token::LineNumber(10));
    }

    #[test]
    fn integer_after_line_start_is_not_a_line_number() {
        let t = tokens("LET X = 10");
        assert!(t.iter().any(|t| *t == Token::Integer(10)));
    }

    #[test]
    fn crlf_and_lf_both_produce_one_newline() {
        assert_eq!(tokens("10\r\n20"), vec![
            Token::LineNumber(10),
            Token::Newline,
            Token::LineNumber(20)
        ]);
    }

    #[test]
    fn question_mark_is_print() {
        assert_eq!(tokens("? X"), vec![
            Token::Keyword(Keyword::Print),
            Token::Ident(sbasic_util::Symbol::intern("X"))
        ]);
    }

    #[test]
    fn illegal_byte_is_reported_as_illegal_token() {
        assert_eq!(tokens("@")[0], Token::Illegal('@'));
    }
}
