//! Tick-level simulator for the Irata machine. Components are instantiated
//! against the shared topology and stepped through the five tick phases:
//! Control, Write, Read, Process, Clear.

pub mod bank;
pub mod bus;
pub mod controller;
pub mod counter;
pub mod error;
pub mod machine;
pub mod memory;
pub mod register;
pub mod status_register;
pub mod word;

pub use bank::{Controls, Statuses};
pub use bus::Bus;
pub use controller::{
    ControlEncoder, Controller, InstructionEncoder, InstructionMemory, StatusEncoder,
};
pub use error::{EncodeError, TickError};
pub use machine::Machine;
pub use memory::Memory;
