//! Diagnostic reporting infrastructure shared by the lexer and parser.
//!
//! The lexer and parser never abort on the first problem — spec.md §4.2
//! says the parser "collects errors into a list and continues parsing, it
//! does not throw at the first failure". [`Handler`] is that list; each
//! entry is a [`Diagnostic`] built through [`DiagnosticBuilder`]'s fluent
//! API.

mod builder;
mod level;

pub use builder::DiagnosticBuilder;
pub use level::Level;

use crate::Span;
use std::cell::RefCell;

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}: {}",
            self.level, self.span.line, self.span.column, self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, " (help: {help})")?;
        }
        Ok(())
    }
}

/// Collects diagnostics emitted during lexing and parsing.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit(DiagnosticBuilder::error(message).span(span).build());
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_accumulates_without_aborting() {
        let handler = Handler::new();
        handler.error("first problem", Span::point(1, 1));
        handler.error("second problem", Span::point(2, 1));
        assert_eq!(handler.len(), 2);
        assert!(handler.has_errors());
    }

    #[test]
    fn fresh_handler_has_no_errors() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert!(handler.is_empty());
    }
}
