//! Microcode definitions for the Irata instruction set.

use common::AddressingMode::{Absolute, Immediate, None as Implied};
use hdl::IrataDecl;

use crate::dsl::{InstructionSet, InstructionSetBuilder};
use crate::error::DslError;

/// Defines the microcode for every catalog instruction against `irata`.
pub fn instruction_set(irata: &IrataDecl) -> Result<InstructionSet, DslError> {
    let cpu = &irata.cpu;
    let latch = cpu.status_register.latch;
    let zero = cpu.status_register.zero;
    let mut b = InstructionSetBuilder::new(irata);

    b.instruction("hlt", Implied).step().control(irata.halt);
    b.instruction("crs", Implied).step().control(irata.crash);
    b.instruction("nop", Implied).step();

    b.instruction("lda", Immediate).read_memory_at_pc(&cpu.a);
    b.instruction("lda", Absolute).indirect_read_memory_at_pc(&cpu.a);
    b.instruction("sta", Absolute).indirect_write_memory_at_pc(&cpu.a);
    b.instruction("ldx", Immediate).read_memory_at_pc(&cpu.x);

    b.instruction("tax", Implied).copy(&cpu.a, &cpu.x);
    b.instruction("txa", Implied).copy(&cpu.x, &cpu.a);

    // The latch captures X's detect lines into the status register at the
    // end of the same tick the counter updates in.
    b.instruction("inx", Implied).step().control(cpu.x.increment).control(latch);
    b.instruction("dex", Implied).step().control(cpu.x.decrement).control(latch);

    b.instruction("jmp", Absolute).read_word_at_pc(&cpu.pc);

    // Conditional jumps: the taken variant loads the operand into the
    // program counter; the skipped variant steps over the two operand
    // bytes. The stage boundary keeps the two increments in separate
    // steps.
    b.instruction("jeq", Absolute).with_status(zero, true).read_word_at_pc(&cpu.pc);
    b.instruction("jeq", Absolute)
        .with_status(zero, false)
        .step()
        .control(cpu.pc.increment)
        .next_stage()
        .step()
        .control(cpu.pc.increment);

    b.instruction("jne", Absolute).with_status(zero, false).read_word_at_pc(&cpu.pc);
    b.instruction("jne", Absolute)
        .with_status(zero, true)
        .step()
        .control(cpu.pc.increment)
        .next_stage()
        .step()
        .control(cpu.pc.increment);

    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_every_catalog_instruction() {
        let irata = IrataDecl::build();
        let set = instruction_set(&irata).unwrap();
        for entry in common::INSTRUCTIONS.iter() {
            assert!(
                set.instructions.iter().any(|i| i.descriptor == *entry),
                "no microcode for {}",
                entry
            );
        }
    }

    #[test]
    fn conditional_jumps_have_complementary_variants() {
        let irata = IrataDecl::build();
        let zero = irata.cpu.status_register.zero;
        let set = instruction_set(&irata).unwrap();
        let jeq: Vec<_> =
            set.instructions.iter().filter(|i| i.descriptor.name == "jeq").collect();
        assert_eq!(jeq.len(), 2);
        let values: Vec<bool> = jeq.iter().map(|v| v.statuses[&zero]).collect();
        assert!(values.contains(&true));
        assert!(values.contains(&false));
    }

    #[test]
    fn skipped_branch_advances_past_both_operand_bytes() {
        let irata = IrataDecl::build();
        let zero = irata.cpu.status_register.zero;
        let increment = irata.cpu.pc.increment;
        let set = instruction_set(&irata).unwrap();
        let skipped = set
            .instructions
            .iter()
            .find(|i| i.descriptor.name == "jne" && i.statuses.get(&zero) == Some(&true))
            .unwrap();
        let increments = skipped
            .steps
            .iter()
            .filter(|s| s.stage >= 1 && s.controls.contains(&increment))
            .count();
        assert_eq!(increments, 2);
    }
}
