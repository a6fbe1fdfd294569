extern crate strum;
#[macro_use]
extern crate strum_macros;

#[macro_use]
extern crate bitflags;

use lazy_static::lazy_static;

bitflags! {
    /// Bit layout of the packed status register byte.
    pub struct StatusFlags: u8 {
        const ZERO = 0b0000_0010;
        const NEGATIVE = 0b1000_0000;
    }
}

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AddressingMode {
    None,
    Immediate,
    Absolute,
}

/// One row of the instruction catalog: the opcode-level identity of an
/// instruction, shared between the assembler, the microcode compiler and the
/// simulator. The microcode compiler cross-checks its output against this
/// catalog but does not own it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub name: &'static str,
    pub opcode: u8,
    pub mode: AddressingMode,
    pub description: &'static str,
}

impl Instruction {
    const fn new(
        name: &'static str,
        opcode: u8,
        mode: AddressingMode,
        description: &'static str,
    ) -> Instruction {
        Instruction { name, opcode, mode, description }
    }
}

impl PartialOrd for Instruction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instruction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.name, self.mode, self.opcode).cmp(&(other.name, other.mode, other.opcode))
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            AddressingMode::None => write!(f, "{} (0x{:02x})", self.name, self.opcode),
            mode => write!(f, "{} {} (0x{:02x})", self.name, mode, self.opcode),
        }
    }
}

lazy_static! {
    pub static ref INSTRUCTIONS: Vec<Instruction> = vec![
        Instruction::new("hlt", 0x01, AddressingMode::None, "stop the clock"),
        Instruction::new("crs", 0x02, AddressingMode::None, "deliberate crash"),
        Instruction::new("nop", 0x03, AddressingMode::None, "no operation"),
        Instruction::new("lda", 0x10, AddressingMode::Immediate, "load A with immediate"),
        Instruction::new("lda", 0x11, AddressingMode::Absolute, "load A from memory"),
        Instruction::new("sta", 0x12, AddressingMode::Absolute, "store A to memory"),
        Instruction::new("ldx", 0x13, AddressingMode::Immediate, "load X with immediate"),
        Instruction::new("tax", 0x14, AddressingMode::None, "copy A to X"),
        Instruction::new("txa", 0x15, AddressingMode::None, "copy X to A"),
        Instruction::new("inx", 0x16, AddressingMode::None, "increment X"),
        Instruction::new("dex", 0x17, AddressingMode::None, "decrement X"),
        Instruction::new("jmp", 0x20, AddressingMode::Absolute, "jump"),
        Instruction::new("jeq", 0x21, AddressingMode::Absolute, "jump if zero set"),
        Instruction::new("jne", 0x22, AddressingMode::Absolute, "jump if zero clear"),
    ];
}

pub fn find_instruction(name: &str, mode: AddressingMode) -> Option<&'static Instruction> {
    INSTRUCTIONS.iter().find(|i| i.name.eq_ignore_ascii_case(name) && i.mode == mode)
}

pub fn instruction_by_opcode(opcode: u8) -> Option<&'static Instruction> {
    INSTRUCTIONS.iter().find(|i| i.opcode == opcode)
}

/// Minimum number of bits needed to represent every value in `[0, max]`.
/// Every encoder in the workspace sizes its fields with this one formula.
pub fn bits_to_represent(max: u32) -> u32 {
    32 - max.leading_zeros()
}
