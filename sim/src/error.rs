use thiserror::Error;

/// Errors sizing or applying the bit-level encoders. Raised while building
/// the instruction memory image, or at runtime if the controller is handed
/// values the image was not sized for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("cannot encode {0} statuses into an 8 bit status field")]
    TooManyStatuses(usize),
    #[error("cannot encode {0} controls into a 32 bit control word")]
    TooManyControls(usize),
    #[error("address space needs {0} bits, the image is limited to 16")]
    TooManyAddressBits(u32),
    #[error("status assignment is missing {0}")]
    MissingStatus(String),
    #[error("unknown status {0}")]
    UnknownStatus(String),
    #[error("unknown control {0}")]
    UnknownControl(String),
    #[error("opcode 0x{opcode:02x} does not fit the {bits} bit opcode field")]
    OpcodeOutOfRange { opcode: u8, bits: u32 },
    #[error("step index {step_index} does not fit the {bits} bit step field")]
    StepIndexOutOfRange { step_index: u8, bits: u32 },
    #[error("duplicate instruction memory address 0x{0:04x}")]
    DuplicateAddress(u16),
}

/// Errors raised while ticking the machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("no microcode at address 0x{address:04x} (opcode 0x{opcode:02x} step {step_index})")]
    UnknownAddress { opcode: u8, step_index: u8, address: u16 },
    #[error("status {0} is not part of this machine")]
    StatusNotFound(String),
    #[error("control {0} is not part of this machine")]
    ControlNotFound(String),
    #[error("{component} read {bus} while nothing was driving it")]
    OpenBusRead { component: String, bus: String },
    #[error("bus conflict on {bus}: driven by both {first} and {second}")]
    BusWriteConflict { bus: String, first: String, second: String },
    #[error("crash control asserted")]
    Crashed,
}
