//! Runtime data model (spec.md §3, §4.3): the pieces a running program's
//! state is made of — values, arrays, variable scopes, execution stacks,
//! and open files — independent of how the tree-walking evaluator in
//! `sbasic-eval` drives them.

pub mod array;
pub mod environment;
pub mod files;
pub mod stacks;
pub mod value;

pub use array::Array;
pub use environment::Environment;
pub use files::{FileHandle, FileTable, DEFAULT_RECORD_LEN};
pub use stacks::{Activation, CallFrame, DoFrame, ExecStacks, ForFrame, PoppedFrame, ReturnFrame, WhileFrame};
pub use value::{widest, Value};
