//! Multi-character comparison-operator lexing (`<= >= <> ><`).

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Handles `<`, `<=`, `<>`.
    pub fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::LessEqual
        } else if self.cursor.match_char('>') {
            Token::NotEqual
        } else {
            Token::Less
        }
    }

    /// Handles `>`, `>=`, `><` (the dialect's second spelling of not-equal).
    pub fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::GreaterEqual
        } else if self.cursor.match_char('<') {
            Token::NotEqual
        } else {
            Token::Greater
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Token {
        Lexer::new(source).next_token()
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(lex("<"), Token::Less);
        assert_eq!(lex("<="), Token::LessEqual);
        assert_eq!(lex(">"), Token::Greater);
        assert_eq!(lex(">="), Token::GreaterEqual);
        assert_eq!(lex("<>"), Token::NotEqual);
        assert_eq!(lex("><"), Token::NotEqual);
        assert_eq!(lex("="), Token::Equal);
    }
}
