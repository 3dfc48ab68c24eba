use super::{Diagnostic, Level};
use crate::Span;

/// Fluent constructor for [`Diagnostic`] values.
///
/// ```ignore
/// DiagnosticBuilder::error("expected THEN after IF condition")
///     .span(span)
///     .help("add THEN before the statement")
///     .build()
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    help: Option<String>,
}

impl DiagnosticBuilder {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            help: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Level::Note, message)
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            help: self.help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_carries_help_text() {
        let d = DiagnosticBuilder::error("bad token")
            .span(Span::point(3, 5))
            .help("check your syntax")
            .build();
        assert_eq!(d.level, Level::Error);
        assert_eq!(d.span.line, 3);
        assert_eq!(d.help.as_deref(), Some("check your syntax"));
    }
}
