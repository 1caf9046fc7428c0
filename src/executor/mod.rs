//! Transition executor and the generated instance surface.
//!
//! A built `MachineClass` is shared by all of its instances. Each instance
//! is a `Machine` handle exposing the generated operations: the current
//! state, per-state predicates, triggers, and introspection of which events
//! are legal right now.
//!
//! # Transition Phases
//!
//! Firing an event runs `validate -> before hooks -> commit -> after hooks`:
//! - an event not legal from the current state fails with
//!   `TransitionError::InvalidTransition` and changes nothing
//! - a before hook returning `false` ends the attempt with
//!   `TransitionOutcome::Aborted`, which is not an error
//! - a storage write failure surfaces as `TransitionError::StorageFailure`
//!   after the before hooks have run

mod class;
mod machine;
mod transition;

pub use class::{MachineClass, StatePredicate};
pub use machine::Machine;
pub use transition::{TransitionError, TransitionOutcome, Trigger};
