//! Declaration model.
//!
//! This module contains the inert value types a machine is declared from:
//! - `State` declarations with an "initial" flag
//! - `EventSpec` declarations, validated into `Event`s at build time
//! - `MachineDescriptor`, the validated set owned by one machine type
//!
//! Nothing in this module has side effects.

mod descriptor;
mod event;
mod state;

pub use descriptor::MachineDescriptor;
pub use event::{Event, EventSpec};
pub use state::State;
