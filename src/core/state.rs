//! State declarations.
//!
//! A `State` is an inert value: a name and an "initial" flag. Declaring a
//! state does nothing on its own; validation happens when the machine is
//! built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared state of a machine.
///
/// # Example
///
/// ```rust
/// use statu::core::State;
///
/// let sleeping = State::initial("sleeping");
/// let running = State::new("running");
///
/// assert!(sleeping.is_initial());
/// assert!(!running.is_initial());
/// assert_eq!(running.name(), "running");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct State {
    name: String,
    is_initial: bool,
}

impl State {
    /// Declare a regular (non-initial) state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_initial: false,
        }
    }

    /// Declare the state new instances start in.
    pub fn initial(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_initial: true,
        }
    }

    /// Get the state's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this state was declared as the initial state.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
