//! Shared primitives used by every other `sbasic-*` crate: interned symbols,
//! source spans, the runtime error taxonomy, and diagnostic reporting.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use error::{BasicError, BasicResult};
pub use span::{SourceFile, Span};
pub use symbol::Symbol;
