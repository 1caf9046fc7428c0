//! Builder for constructing machine types.

use crate::builder::error::BuildError;
use crate::core::{Event, EventSpec, MachineDescriptor, State};
use crate::executor::MachineClass;
use crate::registry::{Callback, CallbackIndex, ClassId, HookAction, HookOutcome, HookTable, Phase};
use crate::storage::{MemoryStorage, StateStorage};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

struct HookSpec<T> {
    phase: Phase,
    event_name: String,
    action: HookAction<T>,
}

/// Builder for machine types with a fluent API.
///
/// `MachineBuilder::new` declares a fresh machine. `MachineBuilder::extend`
/// declares a type that keeps a parent's states, events and hooks and adds
/// its own; the parent's hooks stay registered under the parent and fire
/// after the new type's hooks.
///
/// # Example
///
/// ```rust
/// use statu::builder::MachineBuilder;
/// use statu::core::{EventSpec, State};
///
/// struct Robot {
///     naps: u32,
/// }
///
/// let robot = MachineBuilder::<Robot>::new("Robot")
///     .state(State::initial("sleeping"))
///     .state(State::new("running"))
///     .event(EventSpec::new("run").from("sleeping").to("running"))
///     .event(EventSpec::new("sleep").from("running").to("sleeping"))
///     .after("sleep", |r: &mut Robot| r.naps += 1)
///     .build()
///     .unwrap();
///
/// let mut machine = robot.instantiate(Robot { naps: 0 }).unwrap();
/// machine.fire("run").unwrap();
/// machine.fire("sleep").unwrap();
/// assert_eq!(machine.data().naps, 1);
/// ```
pub struct MachineBuilder<T: 'static> {
    name: String,
    parent: Option<Arc<MachineClass<T>>>,
    states: Vec<State>,
    events: Vec<EventSpec>,
    hooks: Vec<HookSpec<T>>,
    storage: Option<Arc<dyn StateStorage<T>>>,
}

impl<T: 'static> MachineBuilder<T> {
    /// Start declaring a new machine type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            states: Vec::new(),
            events: Vec::new(),
            hooks: Vec::new(),
            storage: None,
        }
    }

    /// Start declaring a machine type derived from `parent`.
    pub fn extend(parent: &Arc<MachineClass<T>>, name: impl Into<String>) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            ..Self::new(name)
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Declare several states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Declare an event.
    pub fn event(mut self, event: EventSpec) -> Self {
        self.events.push(event);
        self
    }

    /// Register a hook run before `event` commits.
    ///
    /// Returning `false` (or `Some(false)`) aborts the transition.
    pub fn before<F, R>(self, event: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: Into<HookOutcome>,
    {
        self.hook(Phase::Before, event, hook)
    }

    /// Register a hook run after `event` commits. Its result is ignored.
    pub fn after<F, R>(self, event: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: Into<HookOutcome>,
    {
        self.hook(Phase::After, event, hook)
    }

    pub fn hook<F, R>(mut self, phase: Phase, event: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: Into<HookOutcome>,
    {
        self.hooks.push(HookSpec {
            phase,
            event_name: event.into(),
            action: Arc::new(move |instance: &mut T| -> HookOutcome { hook(instance).into() }),
        });
        self
    }

    /// Persist the current state with `storage` instead of the default
    /// in-memory field. Overrides the parent's backend when extending.
    pub fn storage<S>(mut self, storage: S) -> Self
    where
        S: StateStorage<T> + 'static,
    {
        let storage: Arc<dyn StateStorage<T>> = Arc::new(storage);
        self.storage = Some(storage);
        self
    }

    /// Validate the declarations and build the machine type.
    pub fn build(self) -> Result<Arc<MachineClass<T>>, BuildError> {
        let id = ClassId::fresh();
        let descriptor = self.descriptor()?;

        let mut table = HookTable::new();
        for spec in self.hooks {
            if descriptor.event(&spec.event_name).is_none() {
                return Err(BuildError::UnknownEvent {
                    event: spec.event_name,
                });
            }
            table.push(Callback::from_action(
                spec.phase,
                spec.event_name,
                id,
                self.name.clone(),
                spec.action,
            ));
        }
        let hook_count = table.len();

        let (index, mut lineage, inherited_storage) = match &self.parent {
            Some(parent) => (
                parent.index().with_entry(id, table),
                parent.lineage().to_vec(),
                Some(parent.storage_handle()),
            ),
            None => (CallbackIndex::new().with_entry(id, table), Vec::new(), None),
        };
        lineage.insert(0, id);

        let storage = self
            .storage
            .or(inherited_storage)
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()) as Arc<dyn StateStorage<T>>);
        let field = storage.declare_storage_field(descriptor.initial_state());

        debug!(
            machine = %self.name,
            class = %id,
            states = descriptor.states().len(),
            events = descriptor.events().len(),
            hooks = hook_count,
            backend = storage.backend(),
            "built machine type"
        );

        Ok(Arc::new(MachineClass::new(
            id, self.name, lineage, descriptor, index, storage, field,
        )))
    }

    /// The parent's descriptor is shared as-is when nothing new is declared.
    fn descriptor(&self) -> Result<Arc<MachineDescriptor>, BuildError> {
        if let Some(parent) = &self.parent {
            if self.states.is_empty() && self.events.is_empty() {
                return Ok(parent.descriptor_handle());
            }
        }

        let (mut states, mut specs): (Vec<State>, Vec<EventSpec>) = match &self.parent {
            Some(parent) => (
                parent.descriptor().states().to_vec(),
                parent.descriptor().events().iter().map(<EventSpec as From<&Event>>::from).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        states.extend(self.states.iter().cloned());
        specs.extend(self.events.iter().cloned());

        let initial = validate_states(&states)?;
        let events = validate_events(&states, specs)?;
        Ok(Arc::new(MachineDescriptor::new(states, events, initial)))
    }
}

/// Index of the unique initial state.
pub(crate) fn validate_states(states: &[State]) -> Result<usize, BuildError> {
    let mut seen = HashSet::new();
    let mut initial: Option<usize> = None;

    for (i, state) in states.iter().enumerate() {
        if !seen.insert(state.name()) {
            return Err(BuildError::DuplicateState(state.name().to_string()));
        }
        if state.is_initial() {
            if let Some(first) = initial {
                return Err(BuildError::MultipleInitialStates {
                    first: states[first].name().to_string(),
                    second: state.name().to_string(),
                });
            }
            initial = Some(i);
        }
    }

    initial.ok_or(BuildError::NoInitialState)
}

pub(crate) fn validate_events(
    states: &[State],
    specs: Vec<EventSpec>,
) -> Result<Vec<Event>, BuildError> {
    let declared = |name: &str| states.iter().any(|s| s.name() == name);
    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(specs.len());

    for spec in specs {
        if !seen.insert(spec.name.clone()) {
            return Err(BuildError::DuplicateEvent(spec.name));
        }
        let to_state = spec.to_state.ok_or_else(|| BuildError::MissingToState {
            event: spec.name.clone(),
        })?;
        if spec.from_states.is_empty() {
            return Err(BuildError::EmptyFromStates { event: spec.name });
        }
        if let Some(unknown) = spec
            .from_states
            .iter()
            .chain(std::iter::once(&to_state))
            .find(|s| !declared(s.as_str()))
        {
            return Err(BuildError::UnknownState {
                event: spec.name.clone(),
                state: unknown.clone(),
            });
        }
        events.push(Event::new(spec.name, spec.from_states, to_state));
    }

    Ok(events)
}
