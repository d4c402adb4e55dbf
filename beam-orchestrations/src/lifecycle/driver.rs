//! The seam between the lifecycle engine and whatever executes its steps

use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::Sequence;
use crate::ace_client::RemoteActions;
use crate::error::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Info,
    Warn,
    Error,
}

/// A pause that ended because the caller cancelled it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Executes lifecycle steps on behalf of the engine
#[allow(async_fn_in_trait)]
pub trait LifecycleDriver {
    /// Issue exactly one remote action
    async fn perform(
        &self,
        action: BeamAction,
        descriptor: &ResourceDescriptor,
    ) -> Result<InstanceResult, ActionError>;

    /// Wait between status checks
    async fn pause(&self, interval: Duration) -> Result<(), Cancelled>;

    /// Report progress, tagged with the sequence and phase
    fn trace(&self, level: TraceLevel, sequence: Sequence, phase: BeamAction, message: &str);
}

/// Runs steps in-process against a [`RemoteActions`] implementation.
///
/// Every action call and every pause races the cancellation token, so a
/// stuck poll can be abandoned on shutdown.
#[derive(Clone)]
pub struct DirectDriver {
    actions: Arc<dyn RemoteActions>,
    cancel: CancellationToken,
}

impl DirectDriver {
    pub fn new(actions: Arc<dyn RemoteActions>) -> Self {
        Self::with_cancellation(actions, CancellationToken::new())
    }

    pub fn with_cancellation(actions: Arc<dyn RemoteActions>, cancel: CancellationToken) -> Self {
        Self { actions, cancel }
    }

    /// Token that aborts any in-flight call or pause of this driver
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl LifecycleDriver for DirectDriver {
    async fn perform(
        &self,
        action: BeamAction,
        descriptor: &ResourceDescriptor,
    ) -> Result<InstanceResult, ActionError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ActionError::Cancelled { action }),
            result = self.actions.perform(action, descriptor) => result,
        }
    }

    async fn pause(&self, interval: Duration) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(interval) => Ok(()),
        }
    }

    fn trace(&self, level: TraceLevel, sequence: Sequence, phase: BeamAction, message: &str) {
        match level {
            TraceLevel::Info => {
                tracing::info!(sequence = %sequence, phase = %phase, "{}", message)
            }
            TraceLevel::Warn => {
                tracing::warn!(sequence = %sequence, phase = %phase, "{}", message)
            }
            TraceLevel::Error => {
                tracing::error!(sequence = %sequence, phase = %phase, "{}", message)
            }
        }
    }
}
