//! Lifecycle driver backed by a duroxide orchestration context

use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use duroxide::OrchestrationContext;
use std::time::Duration;

use crate::activity_names;
use crate::activity_types::RemoteActionInput;
use crate::error::ActionError;
use crate::lifecycle::{Cancelled, LifecycleDriver, Sequence, TraceLevel};

/// Issues each remote action as an activity and waits with durable timers,
/// so a restarted worker replays completed steps instead of repeating them.
pub struct DurableDriver<'a> {
    ctx: &'a OrchestrationContext,
}

impl<'a> DurableDriver<'a> {
    pub fn new(ctx: &'a OrchestrationContext) -> Self {
        Self { ctx }
    }
}

impl LifecycleDriver for DurableDriver<'_> {
    async fn perform(
        &self,
        action: BeamAction,
        descriptor: &ResourceDescriptor,
    ) -> Result<InstanceResult, ActionError> {
        let input = RemoteActionInput {
            action,
            descriptor: descriptor.clone(),
        };

        self.ctx
            .schedule_activity_typed::<RemoteActionInput, InstanceResult>(
                activity_names::for_action(action),
                &input,
            )
            .into_activity_typed::<InstanceResult>()
            .await
            .map_err(|e| ActionError::from_activity_error(action, &e.to_string()))
    }

    // Cancellation of a durable run goes through the runtime, not the timer
    async fn pause(&self, interval: Duration) -> Result<(), Cancelled> {
        self.ctx.schedule_timer(interval).into_timer().await;
        Ok(())
    }

    fn trace(&self, level: TraceLevel, sequence: Sequence, phase: BeamAction, message: &str) {
        let line = format!("[{}:{}] {}", sequence, phase, message);
        match level {
            TraceLevel::Info => self.ctx.trace_info(line),
            TraceLevel::Warn => self.ctx.trace_warn(line),
            TraceLevel::Error => self.ctx.trace_error(line),
        }
    }
}
