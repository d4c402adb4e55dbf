//! Error types for the ACE client and the lifecycle engine

use beam_models::{BeamAction, DescriptorError, InstancePhase, InstanceResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::Sequence;

/// Failure of a single remote action call
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionError {
    #[error("{action}: transport error: {message}")]
    Transport { action: BeamAction, message: String },

    #[error("{action}: control plane answered HTTP {status}")]
    Rejected { action: BeamAction, status: u16 },

    #[error("{action}: malformed response: {message}")]
    Malformed { action: BeamAction, message: String },

    #[error("{action} requires a non-empty '{field}'")]
    InvalidDescriptor { action: BeamAction, field: String },

    #[error("{action}: cancelled")]
    Cancelled { action: BeamAction },
}

impl ActionError {
    pub fn action(&self) -> BeamAction {
        match self {
            ActionError::Transport { action, .. }
            | ActionError::Rejected { action, .. }
            | ActionError::Malformed { action, .. }
            | ActionError::InvalidDescriptor { action, .. }
            | ActionError::Cancelled { action } => *action,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ActionError::Transport { .. })
    }

    /// Encode for the `Err(String)` side of a duroxide activity
    pub fn into_activity_error(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| self.to_string())
    }

    /// Decode an activity error string.
    ///
    /// Strings that did not come from [`ActionError::into_activity_error`]
    /// (runtime failures such as an unregistered activity) are reported as
    /// transport errors against `action`.
    pub fn from_activity_error(action: BeamAction, raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| ActionError::Transport {
            action,
            message: raw.to_string(),
        })
    }
}

impl From<DescriptorError> for ActionError {
    fn from(err: DescriptorError) -> Self {
        ActionError::InvalidDescriptor {
            action: err.action,
            field: err.field.to_string(),
        }
    }
}

/// Failure of one lifecycle step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{phase} failed: {source}")]
    ActionFailed {
        phase: BeamAction,
        #[source]
        source: ActionError,
    },

    #[error("{phase}: expected instance to reach '{expected}' but it reported '{observed}'")]
    ConvergenceFailed {
        phase: BeamAction,
        expected: InstancePhase,
        observed: String,
    },

    #[error("{phase}: instance still '{waiting}' after {attempts} status checks")]
    ConvergenceTimeout {
        phase: BeamAction,
        waiting: InstancePhase,
        attempts: u32,
    },

    #[error("{phase}: cancelled")]
    Cancelled { phase: BeamAction },
}

impl LifecycleError {
    pub fn action(phase: BeamAction, source: ActionError) -> Self {
        match source {
            ActionError::Cancelled { .. } => LifecycleError::Cancelled { phase },
            source => LifecycleError::ActionFailed { phase, source },
        }
    }

    /// The lifecycle step that failed
    pub fn phase(&self) -> BeamAction {
        match self {
            LifecycleError::ActionFailed { phase, .. }
            | LifecycleError::ConvergenceFailed { phase, .. }
            | LifecycleError::ConvergenceTimeout { phase, .. }
            | LifecycleError::Cancelled { phase } => *phase,
        }
    }

    pub fn is_convergence(&self) -> bool {
        matches!(
            self,
            LifecycleError::ConvergenceFailed { .. } | LifecycleError::ConvergenceTimeout { .. }
        )
    }
}

/// A bring-up or teardown sequence that stopped early.
///
/// Nothing is rolled back: `last_known` is the state the remote entity was
/// left in and `completed` lists the steps that fully finished.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{sequence} aborted at {}: {error}", .error.phase())]
pub struct SequenceError {
    pub sequence: Sequence,
    #[source]
    pub error: LifecycleError,
    pub last_known: Option<InstanceResult>,
    pub completed: Vec<BeamAction>,
}

impl SequenceError {
    pub fn phase(&self) -> BeamAction {
        self.error.phase()
    }
}
