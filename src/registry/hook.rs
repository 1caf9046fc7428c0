//! Hook callbacks and their outcomes.

use super::ClassId;
use std::fmt;
use std::sync::Arc;

/// When a hook runs relative to the state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// What a hook asks the executor to do next.
///
/// Only an explicit `false` aborts. Hooks returning `()`, `true`, `None`
/// or `Some(true)` continue. After hooks cannot abort; their outcome is
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HookOutcome {
    #[default]
    Continue,
    Abort,
}

impl From<()> for HookOutcome {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for HookOutcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Continue
        } else {
            Self::Abort
        }
    }
}

impl From<Option<bool>> for HookOutcome {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(false) => Self::Abort,
            _ => Self::Continue,
        }
    }
}

/// Type alias for hook actions.
pub type HookAction<T> = Arc<dyn Fn(&mut T) -> HookOutcome + Send + Sync>;

/// A before/after hook for one event, registered by one machine type.
pub struct Callback<T> {
    phase: Phase,
    event_name: String,
    owner: ClassId,
    owner_name: String,
    action: HookAction<T>,
}

impl<T> Callback<T> {
    pub fn new<F, R>(
        phase: Phase,
        event_name: impl Into<String>,
        owner: ClassId,
        owner_name: impl Into<String>,
        action: F,
    ) -> Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: Into<HookOutcome>,
    {
        Self {
            phase,
            event_name: event_name.into(),
            owner,
            owner_name: owner_name.into(),
            action: Arc::new(move |instance: &mut T| -> HookOutcome { action(instance).into() }),
        }
    }

    pub(crate) fn from_action(
        phase: Phase,
        event_name: impl Into<String>,
        owner: ClassId,
        owner_name: impl Into<String>,
        action: HookAction<T>,
    ) -> Self {
        Self {
            phase,
            event_name: event_name.into(),
            owner,
            owner_name: owner_name.into(),
            action,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn owner(&self) -> ClassId {
        self.owner
    }

    /// Name of the declaring machine type, for diagnostics.
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn invoke(&self, instance: &mut T) -> HookOutcome {
        (self.action)(instance)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            event_name: self.event_name.clone(),
            owner: self.owner,
            owner_name: self.owner_name.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("phase", &self.phase)
            .field("event_name", &self.event_name)
            .field("owner", &self.owner_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_false_aborts() {
        assert_eq!(HookOutcome::from(()), HookOutcome::Continue);
        assert_eq!(HookOutcome::from(true), HookOutcome::Continue);
        assert_eq!(HookOutcome::from(false), HookOutcome::Abort);
        assert_eq!(HookOutcome::from(None), HookOutcome::Continue);
        assert_eq!(HookOutcome::from(Some(true)), HookOutcome::Continue);
        assert_eq!(HookOutcome::from(Some(false)), HookOutcome::Abort);
    }

    #[test]
    fn callback_converts_return_value() {
        let owner = ClassId::fresh();
        let veto = Callback::new(Phase::Before, "sleep", owner, "Robot", |count: &mut u32| {
            *count += 1;
            false
        });
        let unit = Callback::new(Phase::After, "sleep", owner, "Robot", |count: &mut u32| {
            *count += 10;
        });

        let mut count = 0;
        assert_eq!(veto.invoke(&mut count), HookOutcome::Abort);
        assert_eq!(unit.invoke(&mut count), HookOutcome::Continue);
        assert_eq!(count, 11);
    }

    #[test]
    fn clones_share_the_action() {
        let owner = ClassId::fresh();
        let callback = Callback::new(Phase::Before, "run", owner, "Robot", |n: &mut i32| *n += 1);
        let copy = callback.clone();

        let mut n = 0;
        callback.invoke(&mut n);
        copy.invoke(&mut n);

        assert_eq!(n, 2);
        assert_eq!(copy.owner(), owner);
        assert_eq!(copy.owner_name(), "Robot");
        assert_eq!(copy.event_name(), "run");
    }
}
