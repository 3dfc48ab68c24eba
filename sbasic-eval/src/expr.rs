//! Expression evaluation (spec.md §4.4.2): literals, variable reads,
//! unary/binary operators, and the `Expr::Call` ambiguity between a
//! user `FUNCTION`, an array index, and a builtin.

use std::cmp::Ordering;

use sbasic_par::{BinOp, Expr, Literal, UnOp, ValueKind};
use sbasic_util::{BasicError, BasicResult, Span, Symbol};

use sbasic_runtime::Value;

use crate::builtins;
use crate::host::Host;

use super::evaluator::Evaluator;

pub(crate) fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Integer(n) => Value::Integer(*n as i16),
        Literal::Long(n) => Value::Long(*n as i32),
        Literal::Single(n) => Value::Single(*n),
        Literal::Double(n) => Value::Double(*n),
        Literal::Str(s) => Value::Str(s.as_str().to_string()),
    }
}

impl<'p, 'h, H: Host> Evaluator<'p, 'h, H> {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> BasicResult<Value> {
        match expr {
            Expr::Literal(lit, _) => Ok(literal_to_value(lit)),
            Expr::Var(name, _) => Ok(self.get_scalar(*name)),
            Expr::Unary(op, inner, span) => {
                let v = self.eval_expr(inner)?;
                match op {
                    UnOp::Neg => negate(v, *span),
                    UnOp::Not => self.not_value(v, *span),
                }
            }
            Expr::Binary(op, l, r, span) => {
                let lv = self.eval_expr(l)?;
                let rv = self.eval_expr(r)?;
                self.eval_binop(*op, &lv, &rv, *span)
            }
            Expr::Call(name, args, span) => self.eval_call(*name, args, *span),
        }
    }

    /// spec.md §4.4.2: "look up a user `FUNCTION` of that name; failing
    /// that, look up a declared array; failing that, try the builtin
    /// registry" — the same `Expr::Call` node resolves differently
    /// depending on what's in scope at the call site.
    fn eval_call(&mut self, name: Symbol, args: &[Expr], span: Span) -> BasicResult<Value> {
        if self.program.funcs.contains_key(&name) {
            return self.invoke_function(name, args, span);
        }
        if let Some(v) = self.eval_stateful_builtin(name, args, span)? {
            return Ok(v);
        }
        if self.has_array(name) {
            let indices = self.eval_indices(args, span)?;
            let env_idx = self.env_index_for(name);
            return self.envs[env_idx].array(name).unwrap().get(&indices, span);
        }
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a)?);
        }
        builtins::call(name, &values, &mut self.rng, span)
    }

    /// Builtins that need evaluator-owned state (`FileTable`, the array
    /// store, or the `Host`) rather than being pure functions of their
    /// argument values — `builtins::call` can't see any of these.
    fn eval_stateful_builtin(&mut self, name: Symbol, args: &[Expr], span: Span) -> BasicResult<Option<Value>> {
        Ok(Some(match name.as_str() {
            "EOF" => {
                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(0.0) as i32;
                if n == 0 {
                    Value::from_bool(self.files.console_is_eof())
                } else {
                    Value::from_bool(self.files.get_mut(n, span)?.is_eof(span)?)
                }
            }
            "LOF" => {
                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(0.0) as i32;
                if n == 0 {
                    Value::Long(0)
                } else {
                    Value::Long(self.files.get_mut(n, span)?.len(span)? as i32)
                }
            }
            "LOC" => {
                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(0.0) as i32;
                if n == 0 {
                    Value::Long(0)
                } else {
                    Value::Long(self.files.get_mut(n, span)?.position(span)? as i32)
                }
            }
            "FREEFILE" => Value::Integer(self.files.free_file() as i16),
            "LBOUND" => self.array_bound(args, span, true)?,
            "UBOUND" => self.array_bound(args, span, false)?,
            "INKEY$" => Value::Str(self.host.key().map(|c| c.to_string()).unwrap_or_default()),
            "TAB" => {
                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(1.0) as usize;
                Value::Str(" ".repeat(n.saturating_sub(1)))
            }
            "SPC" => {
                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(0.0).max(0.0) as usize;
                Value::Str(" ".repeat(n))
            }
            _ => return Ok(None),
        }))
    }

    fn array_bound(&mut self, args: &[Expr], span: Span, lower: bool) -> BasicResult<Value> {
        let Expr::Var(name, _) = &args[0] else {
            return Err(BasicError::type_mismatch(
                "LBOUND/UBOUND expects an array name".into(),
                span,
            ));
        };
        let dim = if args.len() > 1 {
            (self.eval_expr(&args[1])?.as_f64().unwrap_or(1.0) as usize).saturating_sub(1)
        } else {
            0
        };
        let env_idx = self.env_index_for(*name);
        let arr = self.envs[env_idx]
            .array(*name)
            .ok_or_else(|| BasicError::name_error(format!("{} is not an array", name.as_str()), span))?;
        let b = if lower { arr.lbound(dim, span)? } else { arr.ubound(dim, span)? };
        Ok(Value::Long(b))
    }

    pub(crate) fn eval_binop(&self, op: BinOp, l: &Value, r: &Value, span: Span) -> BasicResult<Value> {
        match op {
            BinOp::Add => {
                if let (Value::Str(a), Value::Str(b)) = (l, r) {
                    return Ok(Value::Str(format!("{a}{b}")));
                }
                numeric_binop(l, r, span, |a, b| a + b)
            }
            BinOp::Sub => numeric_binop(l, r, span, |a, b| a - b),
            BinOp::Mul => numeric_binop(l, r, span, |a, b| a * b),
            BinOp::Div => {
                let (a, b, kind) = Value::promote_pair(l, r, span)?;
                if b == 0.0 {
                    return Err(BasicError::arith_error("division by zero".into(), span));
                }
                let result_kind = if matches!(kind, ValueKind::Integer | ValueKind::Long) {
                    ValueKind::Single
                } else {
                    kind
                };
                Ok(Value::from_f64(a / b, result_kind))
            }
            BinOp::IntDiv => {
                let (a, b, _) = Value::promote_pair(l, r, span)?;
                let bi = b.round() as i64;
                if bi == 0 {
                    return Err(BasicError::arith_error("division by zero".into(), span));
                }
                Ok(Value::Long((a.round() as i64 / bi) as i32))
            }
            BinOp::Mod => {
                let (a, b, _) = Value::promote_pair(l, r, span)?;
                let bi = b.round() as i64;
                if bi == 0 {
                    return Err(BasicError::arith_error("division by zero".into(), span));
                }
                Ok(Value::Long((a.round() as i64 % bi) as i32))
            }
            BinOp::Pow => {
                let (a, b, kind) = Value::promote_pair(l, r, span)?;
                let result_kind = if kind == ValueKind::Single { ValueKind::Single } else { ValueKind::Double };
                Ok(Value::from_f64(a.powf(b), result_kind))
            }
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => compare(op, l, r, span),
            BinOp::And => bitwise(l, r, span, |a, b| a & b),
            BinOp::Or => bitwise(l, r, span, |a, b| a | b),
            BinOp::Xor => bitwise(l, r, span, |a, b| a ^ b),
            BinOp::Imp => bitwise(l, r, span, |a, b| !a | b),
            BinOp::Eqv => bitwise(l, r, span, |a, b| !(a ^ b)),
        }
    }

    fn not_value(&self, v: Value, span: Span) -> BasicResult<Value> {
        let n = v
            .as_f64()
            .ok_or_else(|| BasicError::type_mismatch("cannot apply NOT to a string".into(), span))?;
        let i = n.round() as i32;
        Ok(if v.kind() == ValueKind::Integer {
            Value::Integer((!i) as i16)
        } else {
            Value::Long(!i)
        })
    }
}

fn negate(v: Value, span: Span) -> BasicResult<Value> {
    match v {
        Value::Integer(n) => Ok(Value::Integer(-n)),
        Value::Long(n) => Ok(Value::Long(-n)),
        Value::Single(n) => Ok(Value::Single(-n)),
        Value::Double(n) => Ok(Value::Double(-n)),
        Value::Str(_) => Err(BasicError::type_mismatch("cannot negate a string".into(), span)),
    }
}

fn numeric_binop(l: &Value, r: &Value, span: Span, f: impl Fn(f64, f64) -> f64) -> BasicResult<Value> {
    let (a, b, kind) = Value::promote_pair(l, r, span)?;
    Ok(Value::from_f64(f(a, b), kind))
}

fn bitwise(l: &Value, r: &Value, span: Span, f: impl Fn(i32, i32) -> i32) -> BasicResult<Value> {
    let (a, b, kind) = Value::promote_pair(l, r, span)?;
    let result = f(a.round() as i32, b.round() as i32);
    Ok(if kind == ValueKind::Integer {
        Value::Integer(result as i16)
    } else {
        Value::Long(result)
    })
}

fn compare(op: BinOp, l: &Value, r: &Value, span: Span) -> BasicResult<Value> {
    let ord = match (l, r) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Str(_), _) | (_, Value::Str(_)) => {
            return Err(BasicError::type_mismatch("cannot compare a string to a number".into(), span));
        }
        _ => {
            let (a, b, _) = Value::promote_pair(l, r, span)?;
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    };
    let b = match op {
        BinOp::Eq => ord == Ordering::Equal,
        BinOp::NotEq => ord != Ordering::Equal,
        BinOp::Lt => ord == Ordering::Less,
        BinOp::LtEq => ord != Ordering::Greater,
        BinOp::Gt => ord == Ordering::Greater,
        BinOp::GtEq => ord != Ordering::Less,
        _ => unreachable!("compare() only called for comparison operators"),
    };
    Ok(Value::from_bool(b))
}
