//! Per-instance machine handle and transition execution.

use crate::core::Event;
use crate::executor::class::MachineClass;
use crate::executor::transition::{TransitionError, TransitionOutcome, Trigger};
use crate::registry::{HookOutcome, Phase};
use crate::storage::StateField;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An instance of a machine type: the user's data, the in-memory state
/// field, and a shared reference to the type.
pub struct Machine<T> {
    class: Arc<MachineClass<T>>,
    data: T,
    field: StateField,
}

impl<T> Machine<T> {
    pub(crate) fn new(class: Arc<MachineClass<T>>, data: T, field: StateField) -> Self {
        Self { class, data, field }
    }

    pub fn class(&self) -> &Arc<MachineClass<T>> {
        &self.class
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    /// Current state, as reported by the storage backend.
    pub fn current_state(&self) -> String {
        self.class
            .storage()
            .read_current_state(&self.data, &self.field)
    }

    /// Check if the instance is currently in `state`.
    pub fn is(&self, state: &str) -> bool {
        self.current_state() == state
    }

    /// Every declared event, keyed by name.
    pub fn get_events(&self) -> BTreeMap<&str, &Event> {
        self.class.events()
    }

    /// Names of the events that may fire from the current state, in
    /// declaration order.
    pub fn get_next_event_names(&self) -> Vec<String> {
        let current = self.current_state();
        self.class
            .descriptor()
            .next_event_names(&current)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Triggers for the events that may fire from the current state.
    pub fn get_next_event_methods(&self) -> BTreeMap<String, Trigger> {
        self.get_next_event_names()
            .into_iter()
            .filter_map(|name| self.class.trigger(&name).map(|t| (name, t)))
            .collect()
    }

    /// Check if `event` is declared and may fire from the current state.
    pub fn can_fire(&self, event: &str) -> bool {
        let current = self.current_state();
        self.class
            .descriptor()
            .event(event)
            .is_some_and(|e| e.can_fire_from(&current))
    }

    /// Fire a declared event by name.
    pub fn fire(&mut self, event: &str) -> Result<TransitionOutcome, TransitionError> {
        let class = Arc::clone(&self.class);
        let event = class
            .descriptor()
            .event(event)
            .ok_or_else(|| TransitionError::UnknownEvent {
                event: event.to_string(),
            })?;
        self.run_transition(event)
    }

    /// Validate, run before hooks, commit, run after hooks.
    ///
    /// A before hook returning `false` stops the transition with nothing
    /// committed and no further hooks run. After hooks cannot undo a
    /// committed state.
    pub(crate) fn run_transition(
        &mut self,
        event: &Event,
    ) -> Result<TransitionOutcome, TransitionError> {
        let class = Arc::clone(&self.class);
        let storage = class.storage();

        let current = storage.read_current_state(&self.data, &self.field);
        if !event.can_fire_from(&current) {
            return Err(TransitionError::InvalidTransition {
                event: event.name().to_string(),
                current,
            });
        }

        for callback in class.hooks(Phase::Before, event.name()) {
            if callback.invoke(&mut self.data) == HookOutcome::Abort {
                info!(
                    machine = class.name(),
                    event = event.name(),
                    hook_owner = callback.owner_name(),
                    "before hook returned false, transition aborted"
                );
                return Ok(TransitionOutcome::Aborted {
                    event: event.name().to_string(),
                    state: current,
                    hook_owner: callback.owner_name().to_string(),
                });
            }
        }

        if let Err(error) =
            storage.write_current_state(&mut self.data, &mut self.field, event.to_state())
        {
            warn!(
                machine = class.name(),
                event = event.name(),
                backend = storage.backend(),
                %error,
                "failed to commit transition"
            );
            return Err(error.into());
        }

        for callback in class.hooks(Phase::After, event.name()) {
            callback.invoke(&mut self.data);
        }

        debug!(
            machine = class.name(),
            event = event.name(),
            from = %current,
            to = event.to_state(),
            "transition committed"
        );

        Ok(TransitionOutcome::Completed {
            event: event.name().to_string(),
            from: current,
            to: event.to_state().to_string(),
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Machine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("class", &self.class.name())
            .field("state", &self.current_state())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::MachineBuilder;
    use crate::core::{EventSpec, State};
    use crate::executor::{MachineClass, TransitionError, TransitionOutcome};
    use crate::storage::{FieldDescriptor, StateField, StateStorage, StorageError};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Robot {
        log: Vec<&'static str>,
    }

    fn robot() -> MachineBuilder<Robot> {
        MachineBuilder::new("Robot")
            .state(State::initial("sleeping"))
            .state(State::new("running"))
            .state(State::new("cleaning"))
            .event(EventSpec::new("run").from("sleeping").to("running"))
            .event(EventSpec::new("cleanup").from("running").to("cleaning"))
            .event(
                EventSpec::new("sleep")
                    .from_states(["running", "cleaning"])
                    .to("sleeping"),
            )
    }

    fn build(builder: MachineBuilder<Robot>) -> Arc<MachineClass<Robot>> {
        builder.build().unwrap()
    }

    #[test]
    fn new_instance_starts_in_initial_state() {
        let class = build(robot());
        let machine = class.instantiate(Robot::default()).unwrap();

        assert_eq!(machine.current_state(), "sleeping");
        assert!(machine.is("sleeping"));
        assert!(!machine.is("running"));
        assert_eq!(machine.get_next_event_names(), vec!["run"]);
    }

    #[test]
    fn legal_event_commits_target_state() {
        let class = build(robot());
        let mut machine = class.instantiate(Robot::default()).unwrap();

        let outcome = machine.fire("run").unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Completed {
                event: "run".to_string(),
                from: "sleeping".to_string(),
                to: "running".to_string(),
            }
        );
        assert!(machine.is("running"));
        assert_eq!(machine.get_next_event_names(), vec!["cleanup", "sleep"]);
    }

    #[test]
    fn illegal_event_is_rejected_without_side_effects() {
        let class = build(robot().before("cleanup", |r: &mut Robot| r.log.push("before")));
        let mut machine = class.instantiate(Robot::default()).unwrap();

        let result = machine.fire("cleanup");

        assert_eq!(
            result,
            Err(TransitionError::InvalidTransition {
                event: "cleanup".to_string(),
                current: "sleeping".to_string(),
            })
        );
        assert!(machine.is("sleeping"));
        assert!(machine.data().log.is_empty());
    }

    #[test]
    fn unknown_event_name_is_an_error() {
        let class = build(robot());
        let mut machine = class.instantiate(Robot::default()).unwrap();

        assert_eq!(
            machine.fire("fly"),
            Err(TransitionError::UnknownEvent {
                event: "fly".to_string()
            })
        );
    }

    #[test]
    fn hooks_run_in_order_around_commit() {
        let class = build(
            robot()
                .before("sleep", |r: &mut Robot| r.log.push("sleepy"))
                .before("sleep", |r: &mut Robot| r.log.push("really sleepy"))
                .after("sleep", |r: &mut Robot| r.log.push("zzz"))
                .after("sleep", |r: &mut Robot| r.log.push("ZZZ")),
        );
        let mut machine = class.instantiate(Robot::default()).unwrap();

        machine.fire("run").unwrap();
        machine.fire("sleep").unwrap();

        assert_eq!(
            machine.data().log,
            vec!["sleepy", "really sleepy", "zzz", "ZZZ"]
        );
        assert!(machine.is("sleeping"));
    }

    #[test]
    fn before_hook_false_aborts_everything_after_it() {
        let class = build(
            robot()
                .before("sleep", |r: &mut Robot| {
                    r.log.push("veto");
                    false
                })
                .before("sleep", |r: &mut Robot| r.log.push("second before"))
                .after("sleep", |r: &mut Robot| r.log.push("after")),
        );
        let mut machine = class.instantiate(Robot::default()).unwrap();
        machine.fire("run").unwrap();

        let outcome = machine.fire("sleep").unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Aborted {
                event: "sleep".to_string(),
                state: "running".to_string(),
                hook_owner: "Robot".to_string(),
            }
        );
        assert!(machine.is("running"));
        assert_eq!(machine.data().log, vec!["veto"]);
    }

    #[test]
    fn only_false_aborts() {
        let class = build(
            robot()
                .before("run", |_: &mut Robot| Some(true))
                .before("run", |_: &mut Robot| None::<bool>)
                .before("run", |_: &mut Robot| true),
        );
        let mut machine = class.instantiate(Robot::default()).unwrap();

        assert!(machine.fire("run").unwrap().is_completed());
    }

    #[test]
    fn after_hook_false_does_not_undo() {
        let class = build(robot().after("run", |_: &mut Robot| false));
        let mut machine = class.instantiate(Robot::default()).unwrap();

        assert!(machine.fire("run").unwrap().is_completed());
        assert!(machine.is("running"));
    }

    struct FailingStorage;

    impl StateStorage<Robot> for FailingStorage {
        fn backend(&self) -> &'static str {
            "failing"
        }

        fn declare_storage_field(&self, initial: &State) -> FieldDescriptor {
            FieldDescriptor::new("state", initial)
        }

        fn read_current_state(&self, _data: &Robot, field: &StateField) -> String {
            field.value().to_string()
        }

        fn write_current_state(
            &self,
            _data: &mut Robot,
            _field: &mut StateField,
            _new_state: &str,
        ) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                reason: "connection reset".to_string(),
            })
        }
    }

    #[test]
    fn storage_failure_propagates_after_before_hooks() {
        let class = build(
            robot()
                .storage(FailingStorage)
                .before("run", |r: &mut Robot| r.log.push("before"))
                .after("run", |r: &mut Robot| r.log.push("after")),
        );
        let mut machine = class.instantiate(Robot::default()).unwrap();

        let result = machine.fire("run");

        assert!(matches!(result, Err(TransitionError::StorageFailure(_))));
        assert!(machine.is("sleeping"));
        assert_eq!(machine.data().log, vec!["before"]);
    }

    #[test]
    fn next_event_methods_are_invocable() {
        let class = build(robot());
        let mut machine = class.instantiate(Robot::default()).unwrap();

        let methods = machine.get_next_event_methods();
        assert_eq!(methods.keys().collect::<Vec<_>>(), vec!["run"]);

        methods["run"].fire(&mut machine).unwrap();
        assert!(machine.is("running"));

        let methods = machine.get_next_event_methods();
        assert_eq!(methods.keys().collect::<Vec<_>>(), vec!["cleanup", "sleep"]);
        methods["sleep"].fire(&mut machine).unwrap();
        assert!(machine.is("sleeping"));
    }

    #[test]
    fn trigger_from_unrelated_type_is_rejected() {
        let first = build(robot());
        let second = build(robot());
        let mut machine = second.instantiate(Robot::default()).unwrap();

        let foreign = first.trigger("run").unwrap();

        assert!(matches!(
            foreign.fire(&mut machine),
            Err(TransitionError::UnknownEvent { .. })
        ));
        assert!(machine.is("sleeping"));
    }

    #[test]
    fn can_fire_reflects_current_state() {
        let class = build(robot());
        let machine = class.instantiate(Robot::default()).unwrap();

        assert!(machine.can_fire("run"));
        assert!(!machine.can_fire("sleep"));
        assert!(!machine.can_fire("fly"));
    }

    #[test]
    fn restore_validates_state_name() {
        let class = build(robot());

        let machine = class.restore(Robot::default(), "cleaning").unwrap();
        assert!(machine.is("cleaning"));
        assert_eq!(machine.get_next_event_names(), vec!["sleep"]);

        assert!(matches!(
            class.restore(Robot::default(), "flying"),
            Err(StorageError::UndeclaredState { .. })
        ));
    }
}
