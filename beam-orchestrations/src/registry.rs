//! Registry builders for BEAM orchestrations and activities

use beam_models::BeamAction;
use duroxide::runtime::registry::ActivityRegistry;
use duroxide::OrchestrationRegistry;

use crate::activities;
use crate::activity_names;
use crate::names::orchestrations;

/// Create an OrchestrationRegistry with both lifecycle orchestrations
///
/// # Example
///
/// ```rust,no_run
/// use beam_orchestrations::registry::create_orchestration_registry;
///
/// let orchestrations = create_orchestration_registry();
/// ```
pub fn create_orchestration_registry() -> OrchestrationRegistry {
    OrchestrationRegistry::builder()
        .register_typed(
            orchestrations::PROVISION_RESOURCE,
            crate::orchestrations::provision_resource::provision_resource_orchestration,
        )
        .register_typed(
            orchestrations::DECOMMISSION_RESOURCE,
            crate::orchestrations::decommission_resource::decommission_resource_orchestration,
        )
        .build()
}

/// Create an ActivityRegistry with one activity per remote action
///
/// The activities call whatever client was installed with
/// [`crate::init_remote_actions`].
pub fn create_activity_registry() -> ActivityRegistry {
    BeamAction::ALL
        .into_iter()
        .fold(ActivityRegistry::builder(), |builder, action| {
            builder.register_typed(
                activity_names::for_action(action),
                activities::remote_action::activity,
            )
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestration_registry_can_be_created() {
        let _registry = create_orchestration_registry();
    }

    #[test]
    fn test_activity_registry_can_be_created() {
        let _registry = create_activity_registry();
    }
}
