//! Transition outcomes, errors and triggers.

use crate::core::Event;
use crate::executor::machine::Machine;
use crate::registry::ClassId;
use crate::storage::StorageError;

/// How a transition attempt ended when no error occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// State committed and after hooks ran
    Completed {
        event: String,
        from: String,
        to: String,
    },

    /// A before hook returned `false`; nothing was committed
    Aborted {
        event: String,
        state: String,
        hook_owner: String,
    },
}

impl TransitionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Errors that can occur during transitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Event '{event}' cannot fire from state '{current}'")]
    InvalidTransition { event: String, current: String },

    #[error("Event '{event}' is not declared by this machine")]
    UnknownEvent { event: String },

    #[error("Failed to persist transition: {0}")]
    StorageFailure(#[from] StorageError),
}

/// A zero-argument operation attempting one event's transition.
///
/// Closed over the event's declaration; works on instances of the type
/// that produced it and of any type extending it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    owner: ClassId,
    event: Event,
}

impl Trigger {
    pub(crate) fn new(owner: ClassId, event: Event) -> Self {
        Self { owner, event }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn name(&self) -> &str {
        self.event.name()
    }

    pub fn fire<T>(&self, machine: &mut Machine<T>) -> Result<TransitionOutcome, TransitionError> {
        let applies = machine.class().lineage().contains(&self.owner)
            && machine.class().descriptor().event(self.event.name()) == Some(&self.event);
        if !applies {
            return Err(TransitionError::UnknownEvent {
                event: self.event.name().to_string(),
            });
        }
        machine.run_transition(&self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_predicates() {
        let completed = TransitionOutcome::Completed {
            event: "run".to_string(),
            from: "sleeping".to_string(),
            to: "running".to_string(),
        };
        let aborted = TransitionOutcome::Aborted {
            event: "run".to_string(),
            state: "sleeping".to_string(),
            hook_owner: "Robot".to_string(),
        };

        assert!(completed.is_completed());
        assert!(!completed.is_aborted());
        assert!(aborted.is_aborted());
        assert!(!aborted.is_completed());
    }

    #[test]
    fn storage_errors_convert() {
        let error: TransitionError = StorageError::WriteFailed {
            reason: "disk full".to_string(),
        }
        .into();

        assert!(matches!(error, TransitionError::StorageFailure(_)));
        assert_eq!(
            error.to_string(),
            "Failed to persist transition: Failed to write state: disk full"
        );
    }
}
