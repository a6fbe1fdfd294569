//! Microcode toolchain for the Irata machine: a builder DSL for defining
//! instructions as steps of control assertions, a pass pipeline that merges
//! and validates them, and a flattener producing the complete entry table
//! the controller is programmed from.

pub mod compiler;
pub mod dsl;
pub mod error;
pub mod ir;
pub mod isa;
pub mod passes;
pub mod table;

pub use compiler::{compile_irata, Compiler};
pub use error::{CompileError, DslError, UcodeError};
pub use table::{Entry, Table};
