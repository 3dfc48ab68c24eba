//! Character classification. The dialect is 7-bit-ASCII-sensitive — every
//! keyword, operator and identifier character is ASCII — so these are
//! simple byte-range checks rather than full Unicode classification.

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_type_suffix(c: char) -> bool {
    matches!(c, '$' | '%' | '&' | '!' | '#')
}
