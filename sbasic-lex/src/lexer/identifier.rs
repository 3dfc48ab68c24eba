//! Identifier, keyword, and `REM` lexing.

use sbasic_util::Symbol;

use crate::token::{keyword_from_ident, Token};
use crate::unicode::{is_ident_continue, is_type_suffix};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an identifier, a reserved keyword, or the start of a `REM`
    /// comment. Identifiers may carry a single trailing type suffix
    /// (`$ % & ! #`); a suffixed identifier that happens to spell a
    /// builtin name (`LEFT$`, `CHR$`, ...) matches that builtin's keyword,
    /// since the suffix is part of the builtin's reserved spelling rather
    /// than a user-chosen type annotation.
    pub fn lex_ident_or_rem(&mut self) -> Token {
        let word_start = self.cursor.position();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let word = self.cursor.slice_from(word_start);
        if word.eq_ignore_ascii_case("REM") {
            return self.finish_rem_comment();
        }

        if is_type_suffix(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        match keyword_from_ident(&text.to_ascii_uppercase()) {
            Some(k) => Token::Keyword(k),
            None => Token::Ident(Symbol::intern(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn lex(source: &str) -> Token {
        Lexer::new(source).next_token()
    }

    #[test]
    fn plain_identifier() {
        assert_eq!(lex("total"), Token::Ident(Symbol::intern("total")));
    }

    #[test]
    fn suffixed_identifier_keeps_suffix() {
        assert_eq!(lex("total$"), Token::Ident(Symbol::intern("total$")));
    }

    #[test]
    fn keyword_is_case_insensitive() {
        assert_eq!(lex("Print"), Token::Keyword(Keyword::Print));
        assert_eq!(lex("PRINT"), Token::Keyword(Keyword::Print));
    }

    #[test]
    fn dollar_suffixed_builtin_is_a_keyword() {
        assert_eq!(lex("left$"), Token::Keyword(Keyword::Left));
    }

    #[test]
    fn rem_starts_a_comment() {
        assert_eq!(
            lex("REM hello world"),
            Token::Rem(Symbol::intern_exact("hello world"))
        );
    }

    #[test]
    fn rem_is_recognised_case_insensitively() {
        assert!(matches!(lex("rem x"), Token::Rem(_)));
    }
}
