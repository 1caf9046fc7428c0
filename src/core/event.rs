//! Event declarations.

use serde::{Deserialize, Serialize};

/// An event as declared, before it has been checked against the machine's
/// states.
///
/// States are referenced by name. Nothing is validated here; an event
/// naming an undeclared state is only rejected when the machine is built.
///
/// # Example
///
/// ```rust
/// use statu::core::EventSpec;
///
/// let sleep = EventSpec::new("sleep")
///     .from_states(["running", "cleaning"])
///     .to("sleeping");
///
/// assert_eq!(sleep.name(), "sleep");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSpec {
    pub(crate) name: String,
    pub(crate) from_states: Vec<String>,
    pub(crate) to_state: Option<String>,
}

impl EventSpec {
    /// Start declaring an event.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from_states: Vec::new(),
            to_state: None,
        }
    }

    /// Add a source state. May be called more than once.
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.push_from(state.into());
        self
    }

    /// Add several source states at once.
    pub fn from_states<I, N>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        for state in states {
            self.push_from(state.into());
        }
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to_state = Some(state.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn push_from(&mut self, state: String) {
        if !self.from_states.contains(&state) {
            self.from_states.push(state);
        }
    }
}

impl From<&Event> for EventSpec {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            from_states: event.from_states.clone(),
            to_state: Some(event.to_state.clone()),
        }
    }
}

/// A validated event: every state it names belongs to its machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    from_states: Vec<String>,
    to_state: String,
}

impl Event {
    pub(crate) fn new(name: String, from_states: Vec<String>, to_state: String) -> Self {
        Self {
            name,
            from_states,
            to_state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source states, in declaration order.
    pub fn from_states(&self) -> &[String] {
        &self.from_states
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    /// Check if the event may fire while the machine is in `state` (pure).
    pub fn can_fire_from(&self, state: &str) -> bool {
        self.from_states.iter().any(|s| s == state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_collects_from_states_in_order() {
        let spec = EventSpec::new("sleep")
            .from("running")
            .from("cleaning")
            .to("sleeping");

        assert_eq!(spec.from_states, vec!["running", "cleaning"]);
        assert_eq!(spec.to_state.as_deref(), Some("sleeping"));
    }

    #[test]
    fn spec_ignores_repeated_from_states() {
        let spec = EventSpec::new("sleep").from_states(["running", "running", "cleaning"]);

        assert_eq!(spec.from_states, vec!["running", "cleaning"]);
    }

    #[test]
    fn spec_without_target_has_no_to_state() {
        let spec = EventSpec::new("run").from("sleeping");
        assert!(spec.to_state.is_none());
    }

    #[test]
    fn can_fire_from_checks_membership() {
        let event = Event::new(
            "sleep".to_string(),
            vec!["running".to_string(), "cleaning".to_string()],
            "sleeping".to_string(),
        );

        assert!(event.can_fire_from("running"));
        assert!(event.can_fire_from("cleaning"));
        assert!(!event.can_fire_from("sleeping"));
    }
}
