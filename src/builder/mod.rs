//! Builder API for machine types.
//!
//! This module provides the fluent `MachineBuilder`, the `machine!` macro,
//! and two entry points: one declaring a fresh machine type and one
//! extending an existing type with hooks (and optionally more states and
//! events) of its own.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;

use crate::executor::MachineClass;
use std::sync::Arc;

/// Start declaring a new machine type.
///
/// # Example
///
/// ```
/// use statu::builder::new_machine;
/// use statu::core::{EventSpec, State};
///
/// struct Door;
///
/// let door = new_machine::<Door>("Door")
///     .state(State::initial("closed"))
///     .state(State::new("open"))
///     .event(EventSpec::new("open").from("closed").to("open"))
///     .build()
///     .unwrap();
///
/// assert_eq!(door.name(), "Door");
/// ```
pub fn new_machine<T: 'static>(name: impl Into<String>) -> MachineBuilder<T> {
    MachineBuilder::new(name)
}

/// Start declaring a type that reuses `parent`'s machine and registers its
/// own, independent hook entry.
///
/// # Example
///
/// ```
/// use statu::builder::{extend_machine, new_machine};
/// use statu::core::{EventSpec, State};
///
/// struct Door;
///
/// let door = new_machine::<Door>("Door")
///     .state(State::initial("closed"))
///     .state(State::new("open"))
///     .event(EventSpec::new("open").from("closed").to("open"))
///     .build()
///     .unwrap();
///
/// let creaky = extend_machine(&door, "CreakyDoor")
///     .before("open", |_: &mut Door| {})
///     .build()
///     .unwrap();
///
/// assert!(creaky.extends(&door));
/// assert!(!door.extends(&creaky));
/// ```
pub fn extend_machine<T: 'static>(
    parent: &Arc<MachineClass<T>>,
    name: impl Into<String>,
) -> MachineBuilder<T> {
    MachineBuilder::extend(parent, name)
}
