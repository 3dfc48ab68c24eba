//! `SUB`/`FUNCTION` invocation (spec.md §4.4.4, §3 Open Question 1/3).
//!
//! A call recurses through Rust's own call stack: `invoke` pushes a fresh
//! `Environment`, saves `pc`, runs a nested `exec_loop` down to the
//! activation depth the call itself created, then restores `pc` so the
//! *caller's* loop resumes exactly where it left off. `ExecStacks` only
//! needs to track when the callee's own `RETURN`/`EXIT` fires — it never
//! sees the caller's `pc` at all.
//!
//! Open Question 1 ("does `BYREF` actually write back to the caller?") is
//! resolved the same way for `BYVAL` and `BYREF` parameters: everything
//! binds by value into the callee's environment. A `BYREF` parameter that
//! mutates its local copy never becomes visible to the caller — see the
//! regression test at the bottom of this file.

use sbasic_par::{Expr, ValueKind};
use sbasic_runtime::{CallFrame, Environment, Value};
use sbasic_util::{BasicError, BasicResult, Span, Symbol};

use crate::evaluator::Routine;
use crate::host::Host;

use super::evaluator::Evaluator;

impl<'p, 'h, H: Host> Evaluator<'p, 'h, H> {
    pub(crate) fn invoke(&mut self, routine: Routine, args: &[Expr], span: Span) -> BasicResult<Value> {
        let (routine_name, params, header_index, is_static, result_name) = match &routine {
            Routine::Sub(def) => (
                def.signature.name,
                def.signature.params.clone(),
                def.header_index,
                def.signature.is_static,
                None,
            ),
            Routine::Func(def) => (
                def.signature.name,
                def.signature.params.clone(),
                def.header_index,
                def.signature.is_static,
                Some(def.signature.name),
            ),
        };

        if args.len() != params.len() {
            return Err(BasicError::control_error(
                format!(
                    "{} expects {} argument(s), found {}",
                    routine_name.as_str(),
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }

        let mut new_env = if is_static {
            self.static_envs.remove(&routine_name).unwrap_or_default()
        } else {
            Environment::new()
        };

        // Arguments are evaluated against the *caller's* environment,
        // before `new_env` is pushed, so a by-value copy of each is all
        // the callee ever sees.
        for (p, a) in params.iter().zip(args.iter()) {
            if p.is_array {
                let Expr::Var(arr_name, _) = a else {
                    return Err(BasicError::type_mismatch(
                        format!("{} expects an array argument", p.name.as_str()),
                        span,
                    ));
                };
                let env_idx = self.env_index_for(*arr_name);
                let arr = self.envs[env_idx].array(*arr_name).cloned().ok_or_else(|| {
                    BasicError::name_error(format!("{} is not a declared array", arr_name.as_str()), span)
                })?;
                new_env.declare_array(p.name, arr);
            } else {
                let v = self.eval_expr(a)?;
                let coerced = v.coerce(p.kind, span)?;
                new_env.set_scalar(p.name, coerced, span)?;
            }
        }

        self.envs.push(new_env);
        self.exec.push_call(CallFrame {
            return_index: self.pc + 1,
            result_name,
        });
        let target_depth = self.exec.depth();

        let saved_pc = self.pc;
        self.pc = header_index + 1;
        self.exec_loop(target_depth)?;
        self.pc = saved_pc;

        let finished_env = self.envs.pop().expect("invoke pushed exactly one environment");
        if is_static {
            self.static_envs.insert(routine_name, finished_env);
        }
        Ok(self.pending_result.take().unwrap_or_else(|| Value::default_for(ValueKind::Single)))
    }

    pub(crate) fn invoke_function(&mut self, name: Symbol, args: &[Expr], span: Span) -> BasicResult<Value> {
        let def = self
            .program
            .funcs
            .get(&name)
            .cloned()
            .expect("caller already confirmed this name is a registered FUNCTION");
        self.invoke(Routine::Func(def), args, span)
    }

    /// `CALL name(...)` and the bareword-statement form of a routine call;
    /// only reachable for a `SUB`, unless a program calls a `FUNCTION` as
    /// a statement and discards its result, which classic BASIC also
    /// permits.
    pub(crate) fn call_statement(&mut self, name: Symbol, args: &[Expr], span: Span) -> BasicResult<()> {
        if let Some(def) = self.program.subs.get(&name).cloned() {
            self.invoke(Routine::Sub(def), args, span)?;
            return Ok(());
        }
        if let Some(def) = self.program.funcs.get(&name).cloned() {
            self.invoke(Routine::Func(def), args, span)?;
            return Ok(());
        }
        Err(BasicError::name_error(format!("undefined SUB {}", name.as_str()), span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use sbasic_par::ast::{FuncDef, FuncSignature, Param, ParamMode};
    use sbasic_par::{Literal, Program, Statement};
    use sbasic_util::Span;

    struct NullHost;
    impl Host for NullHost {
        fn print(&mut self, _text: &str) {}
        fn input(&mut self, _prompt: &str) -> String {
            String::new()
        }
        fn key(&mut self) -> Option<char> {
            None
        }
    }

    /// A BYVAL-by-convention parameter mutated inside the callee never
    /// changes the caller's copy, matching the Open Question 1 resolution.
    #[test]
    fn parameters_bind_by_value_regardless_of_declared_mode() {
        let mut program = Program::default();
        // FUNCTION Bump(n AS INTEGER): n = n + 1: Bump = n
        let header = Statement::FuncHeader {
            signature: FuncSignature {
                name: Symbol::intern("BUMP"),
                params: vec![Param {
                    name: Symbol::intern("N"),
                    kind: ValueKind::Integer,
                    mode: ParamMode::ByRef,
                    is_array: false,
                }],
                return_kind: ValueKind::Integer,
                is_static: false,
            },
            end_index: 3,
            span: Span::DUMMY,
        };
        let header_index = 0;
        program.statements.push(header);
        program.statements.push(Statement::Let {
            target: sbasic_par::LValue::Scalar(Symbol::intern("N"), Span::DUMMY),
            value: Expr::Binary(
                sbasic_par::BinOp::Add,
                Box::new(Expr::Var(Symbol::intern("N"), Span::DUMMY)),
                Box::new(Expr::Literal(Literal::Integer(1), Span::DUMMY)),
                Span::DUMMY,
            ),
            span: Span::DUMMY,
        });
        program.statements.push(Statement::Let {
            target: sbasic_par::LValue::Scalar(Symbol::intern("BUMP"), Span::DUMMY),
            value: Expr::Var(Symbol::intern("N"), Span::DUMMY),
            span: Span::DUMMY,
        });
        program.statements.push(Statement::EndFunc { span: Span::DUMMY });
        program.funcs.insert(
            Symbol::intern("BUMP"),
            FuncDef {
                signature: match &program.statements[0] {
                    Statement::FuncHeader { signature, .. } => signature.clone(),
                    _ => unreachable!(),
                },
                header_index,
                end_index: 4,
            },
        );

        let mut host = NullHost;
        let mut eval = Evaluator::new(&program, &mut host);
        eval.set_scalar(Symbol::intern("N"), Value::Integer(5), Span::DUMMY).unwrap();
        let result = eval
            .invoke_function(
                Symbol::intern("BUMP"),
                &[Expr::Var(Symbol::intern("N"), Span::DUMMY)],
                Span::DUMMY,
            )
            .unwrap();
        assert_eq!(result, Value::Integer(6));
        // The caller's own N is untouched by the callee's mutation.
        assert_eq!(eval.get_scalar(Symbol::intern("N")), Value::Integer(5));
    }
}
