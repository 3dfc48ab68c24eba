//! Evaluator state and the statement dispatch loop (spec.md §4.4).
//!
//! Statements live in a flat array (`Program::statements`); there is no
//! nested tree to recurse over, so the loop is a `pc` that walks the array
//! and a [`Flow`] each dispatch returns to say where `pc` goes next. A
//! `SUB`/`FUNCTION` call recurses through Rust's own call stack (see
//! `routine::invoke`), saving and restoring `pc` around the nested loop so
//! the two don't stomp on each other.

use rustc_hash::FxHashMap;

use sbasic_par::{Program, Statement, StmtIndex};
use sbasic_runtime::{Array, Environment, ExecStacks, FileTable, Value};
use sbasic_util::{BasicError, BasicResult, Span, Symbol};

use crate::builtins::Rng;
use crate::host::Host;
use crate::print::Cursor;

/// What a dispatched statement tells the loop to do next.
pub(crate) enum Flow {
    /// Fall through to the next statement in the array.
    Next,
    /// Jump to an absolute statement index.
    Jump(StmtIndex),
    /// `END`: stop the program.
    Halt,
}

/// A `SELECT CASE` in progress: the scrutinee's value, and the index one
/// past `END SELECT` so the evaluator can drop the frame once `pc` reaches
/// it (rather than needing an explicit "close" statement to pop it).
pub(crate) struct SelectFrame {
    pub end_index: StmtIndex,
    pub value: Value,
}

/// Which kind of routine (or none) `call_routine` resolved a name to.
pub(crate) enum Routine {
    Sub(sbasic_par::SubDef),
    Func(sbasic_par::FuncDef),
}

pub struct Evaluator<'p, 'h, H: Host> {
    pub(crate) program: &'p Program,
    pub(crate) host: &'h mut H,
    pub(crate) envs: Vec<Environment>,
    pub(crate) exec: ExecStacks,
    pub(crate) files: FileTable,
    pub(crate) rng: Rng,
    pub(crate) data_ptr: usize,
    pub(crate) pc: StmtIndex,
    pub(crate) running: bool,
    pub(crate) cursor: Cursor,
    pub(crate) file_cursors: FxHashMap<i32, Cursor>,
    pub(crate) select_stack: Vec<SelectFrame>,
    pub(crate) pending_result: Option<Value>,
    /// Persistent scopes for `STATIC SUB`/`STATIC FUNCTION` routines,
    /// keyed by routine name, reinstated instead of a fresh `Environment`
    /// on each call (spec.md's `is_static` flag on a routine signature).
    pub(crate) static_envs: FxHashMap<Symbol, Environment>,
}

impl<'p, 'h, H: Host> Evaluator<'p, 'h, H> {
    pub fn new(program: &'p Program, host: &'h mut H) -> Self {
        Evaluator {
            program,
            host,
            envs: vec![Environment::new()],
            exec: ExecStacks::new(),
            files: FileTable::new(),
            rng: Rng::default(),
            data_ptr: 0,
            pc: 0,
            running: true,
            cursor: Cursor::new(),
            file_cursors: FxHashMap::default(),
            select_stack: Vec::new(),
            pending_result: None,
            static_envs: FxHashMap::default(),
        }
    }

    pub fn run(&mut self) -> BasicResult<()> {
        self.exec_loop(0)
    }

    /// Drives statements until `pc` runs off the end, `running` goes
    /// false, or the activation depth drops below `min_depth` — the way a
    /// recursive routine call's own loop knows its `RETURN` has fired.
    pub(crate) fn exec_loop(&mut self, min_depth: usize) -> BasicResult<()> {
        let len = self.program.statements.len();
        while self.running && self.pc < len && self.exec.depth() >= min_depth {
            while let Some(top) = self.select_stack.last() {
                if top.end_index == self.pc {
                    self.select_stack.pop();
                } else {
                    break;
                }
            }
            match self.dispatch(self.pc)? {
                Flow::Next => self.pc += 1,
                Flow::Jump(idx) => self.pc = idx,
                Flow::Halt => self.running = false,
            }
        }
        Ok(())
    }

    /// Resolves `SHARED`: a name declared `SHARED` in the current frame
    /// reads/writes the module scope (index 0) instead of this frame.
    pub(crate) fn env_index_for(&self, name: Symbol) -> usize {
        let top = self.envs.len() - 1;
        if top == 0 || !self.envs[top].is_shared(name) {
            top
        } else {
            0
        }
    }

    pub(crate) fn get_scalar(&mut self, name: Symbol) -> Value {
        let idx = self.env_index_for(name);
        self.envs[idx].get_scalar(name)
    }

    pub(crate) fn set_scalar(&mut self, name: Symbol, value: Value, span: Span) -> BasicResult<()> {
        let idx = self.env_index_for(name);
        self.envs[idx].set_scalar(name, value, span)
    }

    pub(crate) fn has_array(&self, name: Symbol) -> bool {
        let idx = self.env_index_for(name);
        self.envs[idx].has_array(name)
    }

    /// Auto-vivifies an undeclared array at `(0, 10)` bounds per
    /// dimension on first indexed assignment — classic QBasic's implicit
    /// default, documented in DESIGN.md since spec.md itself is silent on
    /// what an un-`DIM`ed array's bounds should be.
    pub(crate) fn ensure_array(&mut self, name: Symbol, dims: usize) {
        let env_idx = self.env_index_for(name);
        if !self.envs[env_idx].has_array(name) {
            let kind = sbasic_par::ValueKind::from_ident_text(name.as_str());
            let bounds = vec![(0i32, 10i32); dims];
            self.envs[env_idx].declare_array(name, Array::new(kind, bounds));
        }
    }

    pub(crate) fn eval_index(&mut self, e: &sbasic_par::Expr, span: Span) -> BasicResult<i32> {
        let v = self.eval_expr(e)?;
        let f = v
            .as_f64()
            .ok_or_else(|| BasicError::type_mismatch("expected a numeric subscript".into(), span))?;
        Ok(f.round() as i32)
    }

    pub(crate) fn eval_indices(&mut self, exprs: &[sbasic_par::Expr], span: Span) -> BasicResult<Vec<i32>> {
        exprs.iter().map(|e| self.eval_index(e, span)).collect()
    }

    /// The kind an lvalue's eventual assignment must coerce to: the
    /// current stored kind of a scalar, or an indexed target's array
    /// element kind (auto-vivifying the array first, same as a real
    /// assignment would).
    pub(crate) fn target_kind(&mut self, target: &sbasic_par::LValue, span: Span) -> BasicResult<sbasic_par::ValueKind> {
        use sbasic_par::LValue;
        match target {
            LValue::Scalar(name, _) => Ok(self.get_scalar(*name).kind()),
            LValue::Indexed(name, idx_exprs, sp) => {
                let indices = self.eval_indices(idx_exprs, *sp)?;
                self.ensure_array(*name, indices.len());
                let env_idx = self.env_index_for(*name);
                Ok(self.envs[env_idx].array(*name).unwrap().kind)
            }
        }
    }

    pub(crate) fn assign_lvalue(&mut self, target: &sbasic_par::LValue, value: Value, span: Span) -> BasicResult<()> {
        use sbasic_par::LValue;
        match target {
            LValue::Scalar(name, sp) => {
                let kind = self.get_scalar(*name).kind();
                let coerced = value.coerce(kind, *sp)?;
                self.set_scalar(*name, coerced, *sp)
            }
            LValue::Indexed(name, idx_exprs, sp) => {
                let indices = self.eval_indices(idx_exprs, *sp)?;
                self.ensure_array(*name, indices.len());
                let env_idx = self.env_index_for(*name);
                let kind = self.envs[env_idx].array(*name).unwrap().kind;
                let coerced = value.coerce(kind, *sp)?;
                self.envs[env_idx].array_mut(*name).unwrap().set(&indices, coerced, *sp)
            }
        }
    }

    pub(crate) fn resolve(&self, target: sbasic_par::JumpTarget, span: Span) -> BasicResult<StmtIndex> {
        self.program
            .resolve_target(target)
            .ok_or_else(|| BasicError::name_error("undefined line number or label".into(), span))
    }

    /// Shared by `RETURN`, `EXIT SUB`/`EXIT FUNCTION`, and falling off the
    /// end of a routine body at `END SUB`/`END FUNCTION` — whichever
    /// activation is nearest enclosing (`GOSUB` or a routine call) is
    /// popped and control resumes at its return point.
    pub(crate) fn do_return(&mut self, explicit_value: Option<&sbasic_par::Expr>, span: Span) -> BasicResult<Flow> {
        use sbasic_runtime::PoppedFrame;
        let popped = self
            .exec
            .pop_activation()
            .ok_or_else(|| BasicError::control_error("RETURN without GOSUB".into(), span))?;
        match popped {
            PoppedFrame::Gosub(frame) => {
                if explicit_value.is_some() {
                    return Err(BasicError::control_error(
                        "RETURN value has no meaning inside a GOSUB".into(),
                        span,
                    ));
                }
                Ok(Flow::Jump(frame.return_index))
            }
            PoppedFrame::Call(frame) => {
                let result = match (frame.result_name, explicit_value) {
                    (Some(_), Some(e)) => Some(self.eval_expr(e)?),
                    (Some(rn), None) => {
                        let idx = self.envs.len() - 1;
                        Some(self.envs[idx].get_scalar(rn))
                    }
                    (None, Some(_)) => {
                        return Err(BasicError::control_error(
                            "RETURN value has no meaning inside a SUB".into(),
                            span,
                        ));
                    }
                    (None, None) => None,
                };
                self.pending_result = result;
                Ok(Flow::Jump(frame.return_index))
            }
        }
    }
}
