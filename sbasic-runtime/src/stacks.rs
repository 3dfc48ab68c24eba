//! Execution stacks (spec.md §3, §4.4.3): the frames an active `FOR`,
//! `WHILE`, or `DO` loop pushes while its body runs, plus the `GOSUB`
//! return-address stack. Each loop frame records the statement-array
//! indices of its own body, mirroring `ForHeader`/`WhileHeader`/
//! `DoHeader`'s own `next_index`/`end_index` fields so the evaluator can
//! jump without re-deriving them.

use sbasic_par::StmtIndex;
use sbasic_util::Symbol;

#[derive(Clone, Debug)]
pub struct ForFrame {
    pub var: Symbol,
    pub limit: f64,
    pub step: f64,
    pub header_index: StmtIndex,
    pub body_start: StmtIndex,
    pub after_next: StmtIndex,
}

#[derive(Clone, Debug)]
pub struct WhileFrame {
    pub header_index: StmtIndex,
    pub body_start: StmtIndex,
    pub after_wend: StmtIndex,
}

#[derive(Clone, Debug)]
pub struct DoFrame {
    pub header_index: StmtIndex,
    pub body_start: StmtIndex,
    pub after_loop: StmtIndex,
}

/// A pending `GOSUB` or routine call's return point.
#[derive(Clone, Copy, Debug)]
pub struct ReturnFrame {
    pub return_index: StmtIndex,
}

/// A call to a `SUB`/`FUNCTION`: the frame to pop on return. For a
/// `FUNCTION`, `result_name` is the scalar the body assigns to signal its
/// return value — the evaluator reads it back out of the callee's
/// environment just before popping that environment.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub return_index: StmtIndex,
    pub result_name: Option<Symbol>,
}

/// Which of `gosub_stack`/`call_stack` a `RETURN` should pop — `RETURN`
/// is shared by `GOSUB` and routine activations, so something has to
/// record the interleaving order between the two stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Gosub,
    Call,
}

/// The frame popped by [`ExecStacks::pop_activation`], tagged by which
/// stack it came from.
#[derive(Clone, Debug)]
pub enum PoppedFrame {
    Gosub(ReturnFrame),
    Call(CallFrame),
}

/// The three loop stacks plus the `GOSUB`/call return stack (spec.md §3:
/// "Call stack, FOR stack, DO stack, WHILE stack").
#[derive(Default)]
pub struct ExecStacks {
    pub for_stack: Vec<ForFrame>,
    pub while_stack: Vec<WhileFrame>,
    pub do_stack: Vec<DoFrame>,
    pub gosub_stack: Vec<ReturnFrame>,
    pub call_stack: Vec<CallFrame>,
    /// Push/pop order across `gosub_stack` and `call_stack`, so `RETURN`
    /// can tell which one its nearest enclosing activation belongs to.
    pub activations: Vec<Activation>,
}

impl ExecStacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_gosub(&mut self, frame: ReturnFrame) {
        self.gosub_stack.push(frame);
        self.activations.push(Activation::Gosub);
    }

    pub fn push_call(&mut self, frame: CallFrame) {
        self.call_stack.push(frame);
        self.activations.push(Activation::Call);
    }

    /// Pops the most recently pushed activation, whichever stack it is on,
    /// and returns the frame itself so `RETURN` can act on it.
    pub fn pop_activation(&mut self) -> Option<PoppedFrame> {
        match self.activations.pop()? {
            Activation::Gosub => self.gosub_stack.pop().map(PoppedFrame::Gosub),
            Activation::Call => self.call_stack.pop().map(PoppedFrame::Call),
        }
    }

    pub fn depth(&self) -> usize {
        self.activations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_activation_respects_interleaving_order() {
        let mut stacks = ExecStacks::new();
        stacks.push_gosub(ReturnFrame { return_index: 1 });
        stacks.push_call(CallFrame {
            return_index: 2,
            result_name: Some(Symbol::intern("F")),
        });
        // A GOSUB inside the routine's body returns to its own call site
        // first, even though it was pushed before the call frame.
        match stacks.pop_activation().unwrap() {
            PoppedFrame::Call(frame) => assert_eq!(frame.return_index, 2),
            PoppedFrame::Gosub(_) => panic!("expected the call frame to pop first"),
        }
        match stacks.pop_activation().unwrap() {
            PoppedFrame::Gosub(frame) => assert_eq!(frame.return_index, 1),
            PoppedFrame::Call(_) => panic!("expected the gosub frame to pop second"),
        }
        assert!(stacks.pop_activation().is_none());
    }
}
