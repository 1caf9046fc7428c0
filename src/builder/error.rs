//! Build errors for machine types.

use thiserror::Error;

/// Errors that can occur when building a machine type.
///
/// A build that fails produces nothing: there is no partially built type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Multiple initial states: '{first}' and '{second}'. Mark exactly one state with State::initial")]
    MultipleInitialStates { first: String, second: String },

    #[error("No initial state declared. Add a state with State::initial")]
    NoInitialState,

    #[error("Event '{event}' references unknown state '{state}'")]
    UnknownState { event: String, state: String },

    #[error("State '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("Event '{0}' is declared more than once")]
    DuplicateEvent(String),

    #[error("Event '{event}' has no source states. Call .from(state)")]
    EmptyFromStates { event: String },

    #[error("Event '{event}' has no target state. Call .to(state)")]
    MissingToState { event: String },

    #[error("Hook registered for undeclared event '{event}'")]
    UnknownEvent { event: String },
}
