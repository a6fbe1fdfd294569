use hdl::IrataDecl;

use crate::dsl;
use crate::error::{CompileError, UcodeError};
use crate::ir;
use crate::passes::{
    BusValidator, FetchStageValidator, InstructionCoverageValidator, Pass,
    StatusCompletenessValidator, StepIndexTransformer, StepIndexValidator, StepMerger,
};
use crate::table::Table;

/// Ordered pass pipeline. Transforms run before the validators that depend
/// on them; the fetch validator runs first, on the unmerged input, so its
/// step-by-step comparison sees exactly what the DSL produced.
pub struct Compiler {
    passes: Vec<Box<dyn Pass>>,
}

impl Compiler {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Compiler {
        Compiler { passes }
    }

    /// The canonical pipeline for the Irata machine.
    pub fn irata() -> Compiler {
        Compiler::new(vec![
            Box::new(FetchStageValidator),
            Box::new(StepMerger),
            Box::new(StepIndexTransformer),
            Box::new(StepIndexValidator),
            Box::new(BusValidator),
            Box::new(StatusCompletenessValidator),
            Box::new(InstructionCoverageValidator::new()),
        ])
    }

    pub fn run_passes(
        &self,
        instruction_set: &dsl::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let mut set = ir::InstructionSet::from_dsl(instruction_set);
        for pass in &self.passes {
            set = pass.run(set, irata)?;
        }
        Ok(set)
    }

    pub fn compile(
        &self,
        instruction_set: &dsl::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<Table, CompileError> {
        let set = self.run_passes(instruction_set, irata)?;
        Table::compile(&set, &irata.topology)
    }
}

/// Compiles the full Irata instruction set against its machine topology.
pub fn compile_irata(irata: &IrataDecl) -> Result<Table, UcodeError> {
    let set = crate::isa::instruction_set(irata)?;
    let table = Compiler::irata().compile(&set, irata)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl::IrataDecl;

    #[test]
    fn full_isa_compiles() {
        let irata = IrataDecl::build();
        let table = compile_irata(&irata).unwrap();
        assert!(!table.entries.is_empty());
        // Exactly one status dimension: the latched zero flag.
        assert_eq!(table.statuses().len(), 1);
        assert!(table
            .statuses()
            .contains(&irata.cpu.status_register.zero));
        assert!(table.controls().len() <= 32);
    }

    #[test]
    fn every_entry_resets_or_increments_the_step_counter() {
        let irata = IrataDecl::build();
        let step_counter = irata.cpu.controller.step_counter;
        let table = compile_irata(&irata).unwrap();
        for entry in &table.entries {
            let increments = entry.controls.contains(&step_counter.increment);
            let resets = entry.controls.contains(&step_counter.reset);
            assert!(increments ^ resets, "entry for {}", entry.instruction);
        }
    }
}
