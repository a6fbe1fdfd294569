use thiserror::Error;

/// Errors surfaced while building an instruction set through the DSL.
/// Builder methods chain; the first error poisons the builder and is
/// returned by `build`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    #[error("{instruction}: status {status} already constrained to {current}, cannot constrain to {requested}")]
    StatusConflict { instruction: String, status: String, current: bool, requested: bool },
    #[error("{0}")]
    InvalidArgument(String),
}

/// Errors surfaced by the compiler passes and the table flattener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{instruction}: fetch stage differs from the canonical fetch: expected [{expected}], found [{found}]")]
    InconsistentFetchStage { instruction: String, expected: String, found: String },
    #[error("{instruction} step {step_index}: {problem}")]
    MissingStepAdvance { instruction: String, step_index: usize, problem: String },
    #[error("{instruction} step {step_index}: bus {bus} has {problem}")]
    BusConflict { instruction: String, step_index: usize, bus: String, problem: String },
    #[error("{instruction}: constrains [{statuses}] but no variant covers the complementary assignments")]
    IncompleteStatusCoverage { instruction: String, statuses: String },
    #[error("catalog instruction {0} has no microcode")]
    UncoveredInstruction(String),
    #[error("duplicate table entry: {instruction} step {step_index} statuses [{statuses}]")]
    DuplicateEntry { instruction: String, step_index: u8, statuses: String },
}

/// Either half of the microcode toolchain can fail; callers compiling from
/// the DSL in one shot get both under one roof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UcodeError {
    #[error(transparent)]
    Dsl(#[from] DslError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}
