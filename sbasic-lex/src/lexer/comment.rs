//! Comment lexing: `'` and `REM` both introduce a comment that extends to
//! end-of-line, emitted as a single [`Token::Rem`].

use sbasic_util::Symbol;

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Handles a `'` comment marker.
    pub fn lex_rem_tick(&mut self) -> Token {
        self.cursor.advance();
        self.finish_rem_comment()
    }

    /// Consumes text up to (but not including) the line terminator and
    /// wraps it in a `Rem` token. Shared by `'` and `REM`.
    pub(crate) fn finish_rem_comment(&mut self) -> Token {
        let start = self.cursor.position();
        while !self.cursor.is_at_end() && !matches!(self.cursor.current_char(), '\n' | '\r') {
            self.cursor.advance();
        }
        Token::Rem(Symbol::intern_exact(self.cursor.slice_from(start).trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Token {
        Lexer::new(source).next_token()
    }

    #[test]
    fn tick_comment_runs_to_end_of_line() {
        assert_eq!(lex("' a comment\n"), Token::Rem(Symbol::intern_exact("a comment")));
    }

    #[test]
    fn comment_does_not_consume_the_newline() {
        let mut lexer = Lexer::new("' x\n10");
        lexer.next_token();
        assert_eq!(lexer.next_token(), Token::Newline);
        assert_eq!(lexer.next_token(), Token::LineNumber(10));
    }
}
