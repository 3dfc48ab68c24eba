//! Numeric literal lexing (spec.md §4.1): optional decimal point, optional
//! `E`/`e`/`D`/`d` exponent with optional sign, optional trailing type
//! suffix. `D` normalises to `E` for parsing and forces `Double`; a literal
//! with a decimal point or any exponent is a float; `#`/`!` force float
//! regardless of shape.
//!
//! An un-suffixed whole number without decimal/exponent picks the
//! narrowest of `Integer`/`Long`/`Double` that holds its value — the
//! dialect has no literal syntax for forcing width without a suffix, so
//! this is the natural reading of "implicit coercion and promotion" from
//! spec.md §3.

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    pub fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let mut is_float = false;

        if self.cursor.current_char() == '.' {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let mut forces_double = false;
        if matches!(self.cursor.current_char(), 'E' | 'e' | 'D' | 'd') {
            is_float = true;
            forces_double = matches!(self.cursor.current_char(), 'D' | 'd');
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let mut mantissa = self.cursor.slice_from(start).to_string();
        if let Some(idx) = mantissa.find(['D', 'd']) {
            mantissa.replace_range(idx..idx + 1, "E");
        }

        let suffix = self.cursor.current_char();
        let suffix = if matches!(suffix, '%' | '&' | '!' | '#') {
            self.cursor.advance();
            Some(suffix)
        } else {
            None
        };

        match suffix {
            Some('%') => Token::Integer(mantissa.parse::<f64>().unwrap_or(0.0) as i32),
            Some('&') => Token::Long(mantissa.parse::<f64>().unwrap_or(0.0) as i64),
            Some('!') => Token::Single(mantissa.parse::<f32>().unwrap_or(0.0)),
            Some('#') => Token::Double(mantissa.parse::<f64>().unwrap_or(0.0)),
            _ if is_float && forces_double => {
                Token::Double(mantissa.parse::<f64>().unwrap_or(0.0))
            }
            _ if is_float => Token::Single(mantissa.parse::<f32>().unwrap_or(0.0)),
            _ => match mantissa.parse::<i32>() {
                Ok(v) => Token::Integer(v),
                Err(_) => match mantissa.parse::<i64>() {
                    Ok(v) => Token::Long(v),
                    Err(_) => Token::Double(mantissa.parse::<f64>().unwrap_or(0.0)),
                },
            },
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
    fn plain_integer() {
        assert_eq!(lex("42"), Token::Integer(42));
    }

    #[test]
    fn integer_overflowing_i32_becomes_long() {
        assert_eq!(lex("5000000000"), Token::Long(5_000_000_000));
    }

    #[test]
    fn decimal_point_makes_a_single() {
        assert_eq!(lex("3.5"), Token::Single(3.5));
    }

    #[test]
    fn e_exponent_is_single_by_default() {
        assert_eq!(lex("1E2"), Token::Single(100.0));
    }

    #[test]
    fn d_exponent_normalises_and_forces_double() {
        assert_eq!(lex("1D2"), Token::Double(100.0));
    }

    #[test]
    fn hash_suffix_forces_double() {
        assert_eq!(lex("3#"), Token::Double(3.0));
    }

    #[test]
    fn bang_suffix_forces_single() {
        assert_eq!(lex("3!"), Token::Single(3.0));
    }

    #[test]
    fn percent_suffix_forces_integer() {
        assert_eq!(lex("3%"), Token::Integer(3));
    }

    #[test]
    fn ampersand_suffix_forces_long() {
        assert_eq!(lex("3&"), Token::Long(3));
    }

    #[test]
    fn negative_exponent() {
        assert_eq!(lex("2.5E-3"), Token::Single(2.5E-3));
    }
}
