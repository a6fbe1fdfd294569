//! Compiler passes. Each pass is a pure transform or validation over the IR;
//! the pipeline threads the instruction set through them in order.

mod bus_validator;
mod fetch_stage_validator;
mod instruction_coverage_validator;
mod status_completeness_validator;
mod step_index_transformer;
mod step_index_validator;
mod step_merger;

pub use bus_validator::BusValidator;
pub use fetch_stage_validator::FetchStageValidator;
pub use instruction_coverage_validator::InstructionCoverageValidator;
pub use status_completeness_validator::StatusCompletenessValidator;
pub use step_index_transformer::StepIndexTransformer;
pub use step_index_validator::StepIndexValidator;
pub use step_merger::StepMerger;

use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir;

pub trait Pass {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError>;
}
