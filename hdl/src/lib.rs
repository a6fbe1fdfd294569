extern crate strum;
#[macro_use]
extern crate strum_macros;

mod irata;
mod tick_phase;
mod topology;

pub use irata::{
    ByteRegisterDecl, ControllerDecl, CpuDecl, IndexCounterDecl, IrataDecl, MemoryDecl,
    StatusRegisterDecl, StepCounterDecl, WordCounterDecl, WordRegisterDecl,
};
pub use tick_phase::TickPhase;
pub use topology::{
    BusConnection, BusDecl, BusId, BusWidth, ComponentId, ControlDecl, ControlId, StatusDecl,
    StatusId, Topology,
};
