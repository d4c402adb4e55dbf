//! Remote action activity
//!
//! One function serves every action; the registry binds it under a separate
//! name per action (see [`crate::activity_names`]).

use beam_models::InstanceResult;
use duroxide::ActivityContext;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::ace_client::RemoteActions;
use crate::activity_types::RemoteActionInput;

static REMOTE_ACTIONS: OnceCell<Arc<dyn RemoteActions>> = OnceCell::new();

/// Install the client used by remote action activities. First call wins.
pub fn init_remote_actions(actions: Arc<dyn RemoteActions>) {
    REMOTE_ACTIONS.set(actions).ok();
}

fn get_remote_actions() -> Result<Arc<dyn RemoteActions>, String> {
    REMOTE_ACTIONS
        .get()
        .cloned()
        .ok_or_else(|| "ACE client not initialized".to_string())
}

pub async fn activity(
    ctx: ActivityContext,
    input: RemoteActionInput,
) -> Result<InstanceResult, String> {
    let RemoteActionInput { action, descriptor } = input;
    ctx.trace_info(format!("Issuing '{}' for program '{}'", action, descriptor.program));

    let actions = get_remote_actions()?;

    match actions.perform(action, &descriptor).await {
        Ok(result) => {
            ctx.trace_info(format!(
                "'{}' answered status '{}' (entity '{}')",
                action, result.status, result.entity_id
            ));
            Ok(result)
        }
        Err(err) => {
            ctx.trace_warn(format!("'{}' failed: {}", action, err));
            Err(err.into_activity_error())
        }
    }
}
