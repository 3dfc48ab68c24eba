//! The five-kind value model (spec.md §3 Value, §4.3): `Integer`, `Long`,
//! `Single`, `Double`, `String`. Coercion follows classic BASIC's implicit
//! numeric promotion — the narrower of two numeric operands widens to the
//! wider before a binary operator runs, and a `String` never silently
//! converts to or from a number.

use sbasic_par::ValueKind;
use sbasic_util::{BasicError, BasicResult, Span};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i16),
    Long(i32),
    Single(f32),
    Double(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Long(_) => ValueKind::Long,
            Value::Single(_) => ValueKind::Single,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::String,
        }
    }

    /// The zero/empty value a freshly auto-vivified variable of this kind
    /// takes on (spec.md §4.3 Environment: "reading an undeclared name
    /// auto-vivifies it at its default value").
    pub fn default_for(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Long => Value::Long(0),
            ValueKind::Single => Value::Single(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String => Value::Str(String::new()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Str(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Long(n) => Some(*n as f64),
            Value::Single(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self, span: Span) -> BasicResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(BasicError::type_mismatch(
                "expected a string value".into(),
                span,
            )),
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Long(n) => *n != 0,
            Value::Single(n) => *n != 0.0,
            Value::Double(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    pub fn from_bool(b: bool) -> Value {
        // Classic BASIC: TRUE is -1, FALSE is 0.
        Value::Integer(if b { -1 } else { 0 })
    }

    /// Converts a value to the target kind (spec.md §4.3 coercion rules),
    /// e.g. assigning a `Double` expression into an `Integer` variable.
    pub fn coerce(&self, kind: ValueKind, span: Span) -> BasicResult<Value> {
        match (self, kind) {
            (Value::Str(_), ValueKind::String) => Ok(self.clone()),
            (Value::Str(_), _) => Err(BasicError::type_mismatch(
                "cannot convert a string to a number".into(),
                span,
            )),
            (_, ValueKind::String) => Err(BasicError::type_mismatch(
                "cannot convert a number to a string".into(),
                span,
            )),
            (_, ValueKind::Integer) => {
                let n = self.as_f64().unwrap().trunc();
                if !(i16::MIN as f64..=i16::MAX as f64).contains(&n) {
                    return Err(BasicError::range_error(
                        "value out of range for Integer".into(),
                        span,
                    ));
                }
                Ok(Value::Integer(n as i16))
            }
            (_, ValueKind::Long) => {
                let n = self.as_f64().unwrap().trunc();
                if !(i32::MIN as f64..=i32::MAX as f64).contains(&n) {
                    return Err(BasicError::range_error(
                        "value out of range for Long".into(),
                        span,
                    ));
                }
                Ok(Value::Long(n as i32))
            }
            (_, ValueKind::Single) => Ok(Value::Single(self.as_f64().unwrap() as f32)),
            (_, ValueKind::Double) => Ok(Value::Double(self.as_f64().unwrap())),
        }
    }

    /// The widest of two numeric kinds, used to pick the common type
    /// before evaluating a binary arithmetic operator.
    pub fn promote_pair(a: &Value, b: &Value, span: Span) -> BasicResult<(f64, f64, ValueKind)> {
        if !a.is_numeric() || !b.is_numeric() {
            return Err(BasicError::type_mismatch(
                "expected numeric operands".into(),
                span,
            ));
        }
        let kind = widest(a.kind(), b.kind());
        Ok((a.as_f64().unwrap(), b.as_f64().unwrap(), kind))
    }

    pub fn from_f64(n: f64, kind: ValueKind) -> Value {
        match kind {
            ValueKind::Integer => Value::Integer(n as i16),
            ValueKind::Long => Value::Long(n as i32),
            ValueKind::Single => Value::Single(n as f32),
            ValueKind::Double => Value::Double(n),
            ValueKind::String => unreachable!("numeric result cannot target String"),
        }
    }
}

fn rank(kind: ValueKind) -> u8 {
    match kind {
        ValueKind::Integer => 0,
        ValueKind::Long => 1,
        ValueKind::Single => 2,
        ValueKind::Double => 3,
        ValueKind::String => 4,
    }
}

pub fn widest(a: ValueKind, b: ValueKind) -> ValueKind {
    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}

impl fmt::Display for Value {
    /// `PRINT`'s default numeric formatting: a leading space for
    /// non-negative numbers (where a minus sign would otherwise go), no
    /// trailing zeros beyond what the value needs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}{n}", if *n >= 0 { " " } else { "" }),
            Value::Long(n) => write!(f, "{}{n}", if *n >= 0 { " " } else { "" }),
            Value::Single(n) => write!(f, "{}{}", if *n >= 0.0 { " " } else { "" }, format_float_f32(*n)),
            Value::Double(n) => write!(f, "{}{}", if *n >= 0.0 { " " } else { "" }, format_float_f64(*n)),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// True once the plain decimal rendering would be unwieldy enough that
/// classic BASIC switches to exponential notation.
fn needs_exponent(abs: f64) -> bool {
    abs != 0.0 && (abs >= 1e16 || abs < 1e-4)
}

fn format_float_f32(n: f32) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n.trunc())
    } else if needs_exponent(n.abs() as f64) {
        format!("{n:E}")
    } else {
        format!("{n}")
    }
}

fn format_float_f64(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n.trunc())
    } else if needs_exponent(n.abs()) {
        format!("{n:E}")
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widest_picks_the_wider_numeric_kind() {
        assert_eq!(widest(ValueKind::Integer, ValueKind::Double), ValueKind::Double);
        assert_eq!(widest(ValueKind::Single, ValueKind::Long), ValueKind::Single);
    }

    #[test]
    fn coerce_double_to_integer_truncates_toward_zero() {
        let v = Value::Double(2.7).coerce(ValueKind::Integer, Span::DUMMY).unwrap();
        assert_eq!(v, Value::Integer(2));
        let v = Value::Double(-2.7).coerce(ValueKind::Integer, Span::DUMMY).unwrap();
        assert_eq!(v, Value::Integer(-2));
    }

    #[test]
    fn coerce_out_of_range_is_a_range_error() {
        let err = Value::Double(100000.0).coerce(ValueKind::Integer, Span::DUMMY);
        assert!(err.is_err());
    }

    #[test]
    fn string_does_not_coerce_to_numeric() {
        assert!(Value::Str("x".into()).coerce(ValueKind::Double, Span::DUMMY).is_err());
    }

    #[test]
    fn true_is_negative_one() {
        assert_eq!(Value::from_bool(true), Value::Integer(-1));
        assert_eq!(Value::from_bool(false), Value::Integer(0));
    }

    #[test]
    fn single_prints_at_its_own_precision_not_widened_through_f64() {
        assert_eq!(Value::Single(3.14).to_string(), " 3.14");
    }

    #[test]
    fn double_uses_exponential_notation_for_unwieldy_magnitudes() {
        let s = Value::Double(1.5e20).to_string();
        assert!(s.contains('E'), "expected an uppercase exponent in {s:?}");
    }
}
