//! String literal lexing.

use sbasic_util::Symbol;

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a string literal. Runs from `"` to the next `"` or newline;
    /// a newline or EOF inside the string implicitly closes it rather than
    /// erroring — spec.md leaves unterminated strings un-fatal at the
    /// lexer layer.
    pub fn lex_string(&mut self) -> Token {
        self.cursor.advance();
        let start = self.cursor.position();
        while !self.cursor.is_at_end() && !matches!(self.cursor.current_char(), '"' | '\n' | '\r')
        {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        if self.cursor.current_char() == '"' {
            self.cursor.advance();
        }
        Token::Str(Symbol::intern_exact(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Token {
        Lexer::new(source).next_token()
    }

    #[test]
    fn simple_string() {
        assert_eq!(lex("\"hello\""), Token::Str(Symbol::intern_exact("hello")));
    }

    #[test]
    fn string_preserves_case() {
        assert_eq!(
            lex("\"Hello World\""),
            Token::Str(Symbol::intern_exact("Hello World"))
        );
    }

    #[test]
    fn unterminated_string_closes_at_newline() {
        let mut lexer = Lexer::new("\"oops\nPRINT");
        assert_eq!(lexer.next_token(), Token::Str(Symbol::intern_exact("oops")));
        assert_eq!(lexer.next_token(), Token::Newline);
    }

    #[test]
    fn unterminated_string_closes_at_eof() {
        assert_eq!(lex("\"oops"), Token::Str(Symbol::intern_exact("oops")));
    }
}
