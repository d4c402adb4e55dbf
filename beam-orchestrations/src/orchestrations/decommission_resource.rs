//! Decommission resource orchestration

use duroxide::OrchestrationContext;

use super::driver::DurableDriver;
use crate::lifecycle::decommission_resource;
use crate::types::{DecommissionResourceInput, DecommissionResourceOutput, SequenceFailure};

pub async fn decommission_resource_orchestration(
    ctx: OrchestrationContext,
    input: DecommissionResourceInput,
) -> Result<DecommissionResourceOutput, String> {
    ctx.trace_info(format!(
        "Decommissioning '{}' cloned from '{}' (orchestration: {})",
        input.descriptor.program, input.descriptor.template, input.orchestration_id
    ));

    let start_time = ctx.utcnow().await
        .map_err(|e| format!("Failed to get start time: {}", e))?;

    let driver = DurableDriver::new(&ctx);
    let result = match decommission_resource(&driver, &input.descriptor, &input.poll_policy()).await {
        Ok(result) => result,
        Err(err) => {
            ctx.trace_error(format!("Decommissioning failed: {}", err));
            if let Some(last) = &err.last_known {
                ctx.trace_warn(format!(
                    "Instance left in '{}' (entity '{}'); start decommission again to finish teardown",
                    last.status, last.entity_id
                ));
            }
            return Err(serde_json::to_string(&SequenceFailure::from(&err))
                .unwrap_or_else(|_| err.to_string()));
        }
    };

    let end_time = ctx.utcnow().await
        .map_err(|e| format!("Failed to get end time: {}", e))?;
    let elapsed_seconds = end_time.duration_since(start_time)
        .map_err(|e| format!("Failed to calculate duration: {}", e))?
        .as_secs();

    ctx.trace_info(format!(
        "Decommissioned '{}' in {} seconds (status: {})",
        input.descriptor.program, elapsed_seconds, result.status
    ));

    Ok(DecommissionResourceOutput {
        program: input.descriptor.program,
        result,
        elapsed_seconds,
    })
}
