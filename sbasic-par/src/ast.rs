//! Program tree and side tables (spec.md §3 Program, §4.2).
//!
//! The statement array is flat: block constructs (`IF`, `FOR`, `WHILE`,
//! `DO`, `SELECT CASE`, `SUB`/`FUNCTION`) do not own nested bodies. Instead
//! their header statement carries the indices of the statements that
//! follow it in the same array — "the parser's flat, indexed sequence of
//! program statements, used as the control-flow substrate" (GLOSSARY). This
//! is what lets an unstructured `GOTO`/`GOSUB` land anywhere, including
//! inside a loop or `IF` body, and it is how `sbasic-eval` implements the
//! Open Question 3 resolution in SPEC_FULL.md: a top-level `SUB`/`FUNCTION`
//! header is skipped by jumping straight to its recorded `end_index`.

use rustc_hash::FxHashMap;
use sbasic_util::{Span, Symbol};

pub type StmtIndex = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Long,
    Single,
    Double,
    String,
}

impl ValueKind {
    /// Infers a kind from a type-suffix character, if any.
    pub fn from_suffix(c: char) -> Option<ValueKind> {
        Some(match c {
            '%' => ValueKind::Integer,
            '&' => ValueKind::Long,
            '!' => ValueKind::Single,
            '#' => ValueKind::Double,
            '$' => ValueKind::String,
            _ => return None,
        })
    }

    /// Infers a kind from an identifier's trailing suffix, defaulting to
    /// `Single` for an undeclared, unsuffixed name (spec.md §4.3).
    pub fn from_ident_text(text: &str) -> ValueKind {
        text.chars()
            .last()
            .and_then(ValueKind::from_suffix)
            .unwrap_or(ValueKind::Single)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i32),
    Long(i64),
    Single(f32),
    Double(f64),
    Str(Symbol),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,
    Imp,
    Eqv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// An expression node. `Call` covers both array subscripting and routine
/// invocation — spec.md §4.4.2 has the evaluator disambiguate the two at
/// run time ("on failure treat the same syntactic form as a function
/// call"), so the parser deliberately does not.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    Var(Symbol, Span),
    Unary(UnOp, Box<Expr>, Span),
    Binary(BinOp, Box<Expr>, Box<Expr>, Span),
    Call(Symbol, Vec<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, s)
            | Expr::Var(_, s)
            | Expr::Unary(_, _, s)
            | Expr::Binary(_, _, _, s)
            | Expr::Call(_, _, s) => *s,
        }
    }
}

/// An assignment target: a scalar name, or an indexed element of an array
/// (or, syntactically indistinguishable until evaluation, a call — see
/// `Expr::Call`).
#[derive(Clone, Debug, PartialEq)]
pub enum LValue {
    Scalar(Symbol, Span),
    Indexed(Symbol, Vec<Expr>, Span),
}

impl LValue {
    pub fn span(&self) -> Span {
        match self {
            LValue::Scalar(_, s) | LValue::Indexed(_, _, s) => *s,
        }
    }
}

/// One `DIM`/`REDIM`/parameter declaration: a name, its kind (inferred from
/// suffix or explicit `AS`), and, for arrays, a bound pair per dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct DimDecl {
    pub name: Symbol,
    pub kind: ValueKind,
    /// `None` for a scalar; `Some(bounds)` for an array, one `(lower,
    /// upper)` expression pair per dimension.
    pub dims: Option<Vec<(Expr, Expr)>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    Line(u32),
    Label(Symbol),
    /// A statement-array index computed at parse time — used only for the
    /// `Goto`s the parser synthesizes to thread `ELSEIF`/`ELSE`/`CASE`
    /// bodies together; never produced from source text.
    Index(StmtIndex),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitKind {
    For,
    Do,
    While,
    Sub,
    Function,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CondSide {
    Pre,
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CondPolarity {
    While,
    Until,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoCondition {
    pub side: CondSide,
    pub polarity: CondPolarity,
    pub expr: Expr,
}

/// One value in a `SELECT CASE` clause's comma-separated list.
#[derive(Clone, Debug, PartialEq)]
pub enum CaseValue {
    Single(Expr),
    Range(Expr, Expr),
    Is(BinOp, Expr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintSep {
    Comma,
    Semicolon,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PrintElem {
    Expr(Expr),
    Sep(PrintSep),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Input,
    Output,
    Append,
    Binary,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamMode {
    ByVal,
    ByRef,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Symbol,
    pub kind: ValueKind,
    pub mode: ParamMode,
    pub is_array: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubSignature {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncSignature {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_kind: ValueKind,
    pub is_static: bool,
}

/// A registered `SUB`: its signature plus the body's position in the flat
/// statement array.
#[derive(Clone, Debug, PartialEq)]
pub struct SubDef {
    pub signature: SubSignature,
    /// Index of the `SubHeader` statement itself.
    pub header_index: StmtIndex,
    /// Index of the first statement after `END SUB`.
    pub end_index: StmtIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDef {
    pub signature: FuncSignature,
    pub header_index: StmtIndex,
    pub end_index: StmtIndex,
}

/// One flat-array entry. Block headers carry the index to jump to; their
/// bodies are the statements that simply follow in program order.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// A bare line number at the start of a source line — populates the
    /// line map during parsing; a no-op at run time.
    LineMarker(u32),
    /// A label (`Foo:`) — populates the label map; a no-op at run time.
    Label(Symbol),

    Let {
        target: LValue,
        value: Expr,
        span: Span,
    },
    Dim {
        decls: Vec<DimDecl>,
        shared: bool,
        is_static: bool,
        span: Span,
    },
    Redim {
        decls: Vec<DimDecl>,
        preserve: bool,
        span: Span,
    },
    ConstDecl {
        name: Symbol,
        value: Expr,
        span: Span,
    },

    Print {
        file: Option<Expr>,
        using: Option<Expr>,
        items: Vec<PrintElem>,
        span: Span,
    },
    Input {
        file: Option<Expr>,
        prompt: Option<Symbol>,
        targets: Vec<LValue>,
        span: Span,
    },
    LineInput {
        file: Option<Expr>,
        target: LValue,
        span: Span,
    },

    /// `IF cond THEN ...`. `false_target` is where execution continues when
    /// `cond` is falsy: the `ELSEIF`/`ELSE` branch, or past the whole
    /// construct if there is none.
    IfHeader {
        cond: Expr,
        false_target: StmtIndex,
        span: Span,
    },
    /// Unconditional jump, auto-inserted at the end of a THEN/CASE/loop
    /// body to skip the statements that follow it in the flat array.
    Goto {
        target: JumpTarget,
        span: Span,
    },

    ForHeader {
        var: Symbol,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        /// Index of the first statement after the matching `NEXT`.
        next_index: StmtIndex,
        span: Span,
    },
    Next {
        var: Option<Symbol>,
        /// Index of the `ForHeader` this `NEXT` closes.
        header_index: StmtIndex,
        span: Span,
    },

    WhileHeader {
        cond: Expr,
        /// Index of the first statement after the matching `WEND`.
        end_index: StmtIndex,
        span: Span,
    },
    Wend {
        header_index: StmtIndex,
        span: Span,
    },

    DoHeader {
        pre: Option<DoCondition>,
        /// Index of the first statement after the matching `LOOP`.
        end_index: StmtIndex,
        span: Span,
    },
    LoopStmt {
        post: Option<DoCondition>,
        header_index: StmtIndex,
        span: Span,
    },

    SelectHeader {
        scrutinee: Expr,
        end_index: StmtIndex,
        span: Span,
    },
    /// One `CASE` clause. `values` is empty for `CASE ELSE`.
    CaseHeader {
        values: Vec<CaseValue>,
        next_case_index: StmtIndex,
        span: Span,
    },

    GotoStmt {
        target: JumpTarget,
        span: Span,
    },
    GosubStmt {
        target: JumpTarget,
        span: Span,
    },
    ReturnStmt {
        value: Option<Expr>,
        span: Span,
    },
    OnJump {
        selector: Expr,
        is_gosub: bool,
        targets: Vec<JumpTarget>,
        span: Span,
    },

    SubHeader {
        signature: SubSignature,
        end_index: StmtIndex,
        span: Span,
    },
    EndSub {
        span: Span,
    },
    FuncHeader {
        signature: FuncSignature,
        end_index: StmtIndex,
        span: Span,
    },
    EndFunc {
        span: Span,
    },
    CallStmt {
        name: Symbol,
        args: Vec<Expr>,
        span: Span,
    },
    Exit {
        kind: ExitKind,
        span: Span,
    },

    Data {
        values: Vec<Literal>,
        span: Span,
    },
    Read {
        targets: Vec<LValue>,
        span: Span,
    },
    Restore {
        target: Option<JumpTarget>,
        span: Span,
    },

    Open {
        path: Expr,
        mode: FileMode,
        file_no: Expr,
        record_len: Option<Expr>,
        span: Span,
    },
    Close {
        files: Vec<Expr>,
        span: Span,
    },
    Get {
        file: Expr,
        record: Option<Expr>,
        target: LValue,
        span: Span,
    },
    Put {
        file: Expr,
        record: Option<Expr>,
        value: Expr,
        span: Span,
    },
    Seek {
        file: Expr,
        position: Expr,
        span: Span,
    },

    End {
        span: Span,
    },
    Stop {
        span: Span,
    },
    Rem {
        span: Span,
    },

    Line {
        x1: Expr,
        y1: Expr,
        x2: Expr,
        y2: Expr,
        color: Option<Expr>,
        filled: Option<bool>,
        span: Span,
    },
    PSet {
        x: Expr,
        y: Expr,
        color: Option<Expr>,
        span: Span,
    },
    Circle {
        x: Expr,
        y: Expr,
        radius: Expr,
        color: Option<Expr>,
        span: Span,
    },
    Cls {
        span: Span,
    },
    Locate {
        row: Option<Expr>,
        col: Option<Expr>,
        span: Span,
    },
    Color {
        fg: Option<Expr>,
        bg: Option<Expr>,
        span: Span,
    },
    Randomize {
        seed: Option<Expr>,
        span: Span,
    },
}

/// Root aggregate produced by the parser (spec.md §3 Program).
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Line number → statement-array index.
    pub line_map: FxHashMap<u32, StmtIndex>,
    /// Case-folded label → statement-array index.
    pub label_map: FxHashMap<Symbol, StmtIndex>,
    pub subs: FxHashMap<Symbol, SubDef>,
    pub funcs: FxHashMap<Symbol, FuncDef>,
    /// Every `DATA` literal, in source order, across every `DATA`
    /// statement in the program.
    pub data_items: Vec<Literal>,
}

impl Program {
    pub fn resolve_target(&self, target: JumpTarget) -> Option<StmtIndex> {
        match target {
            JumpTarget::Line(n) => self.line_map.get(&n).copied(),
            JumpTarget::Label(s) => self.label_map.get(&s).copied(),
            JumpTarget::Index(i) => Some(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_from_suffix() {
        assert_eq!(ValueKind::from_ident_text("X%"), ValueKind::Integer);
        assert_eq!(ValueKind::from_ident_text("X$"), ValueKind::String);
        assert_eq!(ValueKind::from_ident_text("X"), ValueKind::Single);
    }

    #[test]
    fn program_resolves_line_and_label_targets() {
        let mut program = Program::default();
        program.line_map.insert(100, 4);
        program.label_map.insert(Symbol::intern("LOOP"), 7);
        assert_eq!(program.resolve_target(JumpTarget::Line(100)), Some(4));
        assert_eq!(
            program.resolve_target(JumpTarget::Label(Symbol::intern("loop"))),
            Some(7)
        );
    }
}
