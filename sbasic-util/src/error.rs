//! The runtime error taxonomy.
//!
//! One variant per error kind a running program can raise (not a parse-time
//! diagnostic — see [`crate::diagnostic`] for those). `ON ERROR GOTO` and
//! `ERR`/`ERL` read these back out, so each variant carries the pieces a
//! handler needs: an `ERR` code, the line it happened on, and a message.

use crate::Span;
use thiserror::Error;

/// A runtime error, raised by the evaluator and either fatal or caught by
/// an active `ON ERROR GOTO` handler.
#[derive(Clone, Debug, Error)]
pub enum BasicError {
    #[error("Syntax error: {message}")]
    Syntax { message: String, span: Span },

    #[error("Type mismatch: {message}")]
    Type { message: String, span: Span },

    #[error("Illegal function call: {message}")]
    Value { message: String, span: Span },

    #[error("Subscript out of range: {message}")]
    Range { message: String, span: Span },

    #[error("Undefined name: {message}")]
    Name { message: String, span: Span },

    #[error("I/O error: {message}")]
    Io { message: String, span: Span },

    #[error("Control error: {message}")]
    Control { message: String, span: Span },

    #[error("Arithmetic error: {message}")]
    Arith { message: String, span: Span },
}

impl BasicError {
    /// The classic BASIC `ERR` code, for `ON ERROR GOTO` handlers that
    /// inspect `ERR` to decide how to recover.
    pub fn err_code(&self) -> u16 {
        match self {
            BasicError::Syntax { .. } => 2,
            BasicError::Value { .. } => 5,
            BasicError::Range { .. } => 9,
            BasicError::Type { .. } => 13,
            BasicError::Name { .. } => 16,
            BasicError::Arith { .. } => 11,
            BasicError::Io { .. } => 57,
            BasicError::Control { .. } => 50,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            BasicError::Syntax { span, .. }
            | BasicError::Type { span, .. }
            | BasicError::Value { span, .. }
            | BasicError::Range { span, .. }
            | BasicError::Name { span, .. }
            | BasicError::Io { span, .. }
            | BasicError::Control { span, .. }
            | BasicError::Arith { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BasicError::Syntax { message, .. }
            | BasicError::Type { message, .. }
            | BasicError::Value { message, .. }
            | BasicError::Range { message, .. }
            | BasicError::Name { message, .. }
            | BasicError::Io { message, .. }
            | BasicError::Control { message, .. }
            | BasicError::Arith { message, .. } => message,
        }
    }

    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        BasicError::Type {
            message: message.into(),
            span,
        }
    }

    pub fn name_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Name {
            message: message.into(),
            span,
        }
    }

    pub fn range_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Range {
            message: message.into(),
            span,
        }
    }

    pub fn value_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Value {
            message: message.into(),
            span,
        }
    }

    pub fn arith_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Arith {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Io {
            message: message.into(),
            span,
        }
    }

    pub fn control_error(message: impl Into<String>, span: Span) -> Self {
        BasicError::Control {
            message: message.into(),
            span,
        }
    }
}

pub type BasicResult<T> = Result<T, BasicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_codes_match_classic_basic_numbering() {
        let span = Span::DUMMY;
        assert_eq!(BasicError::type_mismatch("x", span).err_code(), 13);
        assert_eq!(BasicError::range_error("x", span).err_code(), 9);
        assert_eq!(BasicError::name_error("x", span).err_code(), 16);
    }

    #[test]
    fn message_accessor_unwraps_any_variant() {
        let err = BasicError::value_error("division by zero", Span::DUMMY);
        assert_eq!(err.message(), "division by zero");
    }
}
