//! The validated, immutable description of one machine type.

use super::event::{Event, EventSpec};
use super::state::State;
use crate::builder::machine::{validate_events, validate_states};
use crate::builder::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// States and events owned by one machine type.
///
/// Produced once by the builder and shared (behind an `Arc`) by every
/// instance of the type and by any type extending it. Holds the invariants
/// established at build time: exactly one initial state, unique names, and
/// every event referencing only declared states.
///
/// Deserializing re-runs the build-time validation, so a decoded
/// descriptor holds the same invariants as a built one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDescriptor")]
pub struct MachineDescriptor {
    states: Vec<State>,
    events: Vec<Event>,
    initial: usize,
}

impl MachineDescriptor {
    /// `initial` indexes into `states`; the builder guarantees it.
    pub(crate) fn new(states: Vec<State>, events: Vec<Event>, initial: usize) -> Self {
        Self {
            states,
            events,
            initial,
        }
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Declared events, in declaration order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn initial_state(&self) -> &State {
        &self.states[self.initial]
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name() == name)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name() == name)
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    /// Mapping of every declared event by name.
    pub fn event_map(&self) -> BTreeMap<&str, &Event> {
        self.events.iter().map(|e| (e.name(), e)).collect()
    }

    /// Names of the events whose source states contain `state`, in
    /// declaration order (pure).
    pub fn next_event_names(&self, state: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.can_fire_from(state))
            .map(Event::name)
            .collect()
    }
}

/// Wire form of a descriptor before validation.
#[derive(Deserialize)]
struct UncheckedDescriptor {
    states: Vec<State>,
    events: Vec<Event>,
    initial: usize,
}

impl TryFrom<UncheckedDescriptor> for MachineDescriptor {
    type Error = BuildError;

    fn try_from(raw: UncheckedDescriptor) -> Result<Self, Self::Error> {
        let initial = validate_states(&raw.states)?;
        if raw.initial != initial {
            return Err(BuildError::NoInitialState);
        }
        let specs = raw.events.iter().map(<EventSpec as From<&Event>>::from).collect();
        let events = validate_events(&raw.states, specs)?;
        Ok(Self::new(raw.states, events, initial))
    }
}
