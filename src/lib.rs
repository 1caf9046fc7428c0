//! Statu: declarative finite state machines for plain data.
//!
//! A machine type is declared once from states, events and before/after
//! hooks, validated, and then shared by every instance. Instances wrap the
//! user's own data in a `Machine` handle that exposes the current state,
//! per-state predicates, event triggers, and which events are legal now.
//!
//! # Core Concepts
//!
//! - **State** / **Event**: inert declarations, validated at build time
//! - **Hooks**: before hooks may veto a transition by returning `false`;
//!   after hooks run once the new state is committed
//! - **Extension**: a derived type keeps its parent's machine and hooks and
//!   adds its own; derived hooks run first, then the parent's
//! - **Storage**: the current state is read and written through a pluggable
//!   backend (in-memory by default)
//!
//! # Example
//!
//! ```rust
//! use statu::machine;
//!
//! #[derive(Default)]
//! struct Robot {
//!     log: Vec<&'static str>,
//! }
//!
//! let robot = machine! {
//!     Robot {
//!         initial: sleeping,
//!         states: [running, cleaning],
//!         events: {
//!             run: [sleeping] => running,
//!             cleanup: [running] => cleaning,
//!             sleep: [running, cleaning] => sleeping,
//!         }
//!     }
//! }
//! .after("sleep", |r: &mut Robot| r.log.push("zzz"))
//! .build()
//! .unwrap();
//!
//! let mut machine = robot.instantiate(Robot::default()).unwrap();
//! assert_eq!(machine.current_state(), "sleeping");
//! assert_eq!(machine.get_next_event_names(), vec!["run"]);
//!
//! machine.fire("run").unwrap();
//! machine.fire("sleep").unwrap();
//! assert!(machine.is("sleeping"));
//! assert_eq!(machine.data().log, vec!["zzz"]);
//! ```

pub mod builder;
pub mod core;
pub mod executor;
pub mod registry;
pub mod storage;

// Re-export commonly used types
pub use crate::builder::{extend_machine, new_machine, BuildError, MachineBuilder};
pub use crate::core::{Event, EventSpec, MachineDescriptor, State};
pub use crate::executor::{
    Machine, MachineClass, StatePredicate, TransitionError, TransitionOutcome, Trigger,
};
pub use crate::registry::{HookOutcome, Phase};
pub use crate::storage::{StateStorage, StorageError};
