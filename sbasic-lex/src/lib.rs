//! The hand-written lexer (spec.md §4.1): source text → token stream with
//! line/column info. Keyword matching is case-insensitive; the grammar is
//! newline-sensitive, so newlines are emitted as tokens rather than
//! skipped as whitespace.
//!
//! `sbasic-par` drives this crate's [`Lexer`] through its `Iterator` impl,
//! collecting the lazy token sequence into the "token buffer" spec.md's
//! dataflow describes.

mod cursor;
mod lexer;
mod token;
mod unicode;

pub use lexer::Lexer;
pub use token::{keyword_from_ident, Keyword, SpannedToken, Token};
