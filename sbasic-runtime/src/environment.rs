//! Variable storage (spec.md §3 Environment, §4.3): case-folded scalar and
//! array maps plus a separate constant map, one `Environment` per active
//! scope (the module-level scope, or one `SUB`/`FUNCTION` call frame). A
//! frame's `shared` set records which names were declared `SHARED` inside
//! it; `sbasic-eval`'s call stack checks that set to decide whether a
//! read/write targets this frame or falls through to the module scope,
//! rather than `Environment` holding a parent pointer itself.
//!
//! Names are already case-folded `Symbol`s by the time they reach here
//! (interning upper-cases identifiers), so every map operation is a plain
//! hash lookup with no extra normalization step.

use rustc_hash::FxHashMap;
use sbasic_par::ValueKind;
use sbasic_util::{BasicError, BasicResult, Span, Symbol};

use crate::array::Array;
use crate::value::Value;

/// A single lexical scope: the module-level (global) scope, or one active
/// `SUB`/`FUNCTION` call frame.
#[derive(Default)]
pub struct Environment {
    scalars: FxHashMap<Symbol, Value>,
    arrays: FxHashMap<Symbol, Array>,
    constants: FxHashMap<Symbol, Value>,
    /// Names declared `SHARED` inside this frame — reads/writes of these
    /// go to the module scope instead of this frame's own maps.
    shared: FxHashMap<Symbol, ()>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_const(&mut self, name: Symbol, value: Value) {
        self.constants.insert(name, value);
    }

    pub fn is_const(&self, name: Symbol) -> bool {
        self.constants.contains_key(&name)
    }

    pub fn mark_shared(&mut self, name: Symbol) {
        self.shared.insert(name, ());
    }

    pub fn is_shared(&self, name: Symbol) -> bool {
        self.shared.contains_key(&name)
    }

    /// Reads a scalar, auto-vivifying it at its kind's default if it has
    /// never been assigned (spec.md §4.3).
    pub fn get_scalar(&mut self, name: Symbol) -> Value {
        if let Some(v) = self.constants.get(&name) {
            return v.clone();
        }
        self.scalars
            .entry(name)
            .or_insert_with(|| Value::default_for(ValueKind::from_ident_text(name.as_str())))
            .clone()
    }

    pub fn set_scalar(&mut self, name: Symbol, value: Value, span: Span) -> BasicResult<()> {
        if self.is_const(name) {
            return Err(BasicError::type_mismatch(
                format!("cannot assign to constant {}", name.as_str()),
                span,
            ));
        }
        self.scalars.insert(name, value);
        Ok(())
    }

    pub fn declare_array(&mut self, name: Symbol, array: Array) {
        self.arrays.insert(name, array);
    }

    pub fn has_array(&self, name: Symbol) -> bool {
        self.arrays.contains_key(&name)
    }

    pub fn array(&self, name: Symbol) -> Option<&Array> {
        self.arrays.get(&name)
    }

    pub fn array_mut(&mut self, name: Symbol) -> Option<&mut Array> {
        self.arrays.get_mut(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_scalar_auto_vivifies_to_default() {
        let mut env = Environment::new();
        assert_eq!(env.get_scalar(Symbol::intern("X")), Value::Single(0.0));
        assert_eq!(env.get_scalar(Symbol::intern("N%")), Value::Integer(0));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut env = Environment::new();
        env.set_scalar(Symbol::intern("X"), Value::Single(3.5), Span::DUMMY)
            .unwrap();
        assert_eq!(env.get_scalar(Symbol::intern("X")), Value::Single(3.5));
    }

    #[test]
    fn assigning_a_constant_errors() {
        let mut env = Environment::new();
        env.declare_const(Symbol::intern("PI"), Value::Double(3.14));
        assert!(env
            .set_scalar(Symbol::intern("PI"), Value::Double(0.0), Span::DUMMY)
            .is_err());
    }
}
