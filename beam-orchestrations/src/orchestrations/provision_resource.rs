//! Provision resource orchestration

use duroxide::OrchestrationContext;

use super::driver::DurableDriver;
use crate::lifecycle::provision_resource;
use crate::types::{ProvisionResourceInput, ProvisionResourceOutput, SequenceFailure};

pub async fn provision_resource_orchestration(
    ctx: OrchestrationContext,
    input: ProvisionResourceInput,
) -> Result<ProvisionResourceOutput, String> {
    ctx.trace_info(format!(
        "Provisioning '{}' from template '{}' (orchestration: {})",
        input.descriptor.program, input.descriptor.template, input.orchestration_id
    ));

    let start_time = ctx.utcnow().await
        .map_err(|e| format!("Failed to get start time: {}", e))?;

    let driver = DurableDriver::new(&ctx);
    let result = match provision_resource(&driver, &input.descriptor, &input.poll_policy()).await {
        Ok(result) => result,
        Err(err) => {
            ctx.trace_error(format!("Provisioning failed: {}", err));
            if let Some(last) = &err.last_known {
                ctx.trace_warn(format!(
                    "Instance left in '{}' (entity '{}'); no rollback performed",
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
        "Provisioned '{}' in {} seconds (status: {})",
        input.descriptor.program, elapsed_seconds, result.status
    ));

    Ok(ProvisionResourceOutput {
        program: input.descriptor.program,
        result,
        elapsed_seconds,
    })
}
