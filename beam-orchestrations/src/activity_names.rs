//! Name constants for BEAM activities
//!
//! Every remote action is its own activity so that each call is recorded in
//! orchestration history and replayed rather than re-issued.

use beam_models::BeamAction;

/// Activity names
pub mod activities {
    /// **Input:** [`crate::activity_types::RemoteActionInput`]  
    /// **Output:** [`beam_models::InstanceResult`]
    pub const CLONE: &str = "beam-orchestrations::activity::clone";
    pub const CHANGE: &str = "beam-orchestrations::activity::change";
    pub const CREATE: &str = "beam-orchestrations::activity::create";
    pub const START: &str = "beam-orchestrations::activity::start";
    pub const LOCK: &str = "beam-orchestrations::activity::lock";
    pub const UNLOCK: &str = "beam-orchestrations::activity::unlock";
    /// Read-only; scheduled repeatedly while waiting for convergence
    pub const STATUS: &str = "beam-orchestrations::activity::status";
    pub const STOP: &str = "beam-orchestrations::activity::stop";
    pub const SUSPEND: &str = "beam-orchestrations::activity::suspend";
    pub const RESUME: &str = "beam-orchestrations::activity::resume";
    pub const DROP: &str = "beam-orchestrations::activity::drop";
    pub const DELETE: &str = "beam-orchestrations::activity::delete";
}

/// Activity that issues `action`
pub fn for_action(action: BeamAction) -> &'static str {
    match action {
        BeamAction::Clone => activities::CLONE,
        BeamAction::Change => activities::CHANGE,
        BeamAction::Create => activities::CREATE,
        BeamAction::Start => activities::START,
        BeamAction::Lock => activities::LOCK,
        BeamAction::Unlock => activities::UNLOCK,
        BeamAction::Status => activities::STATUS,
        BeamAction::Stop => activities::STOP,
        BeamAction::Suspend => activities::SUSPEND,
        BeamAction::Resume => activities::RESUME,
        BeamAction::Drop => activities::DROP,
        BeamAction::Delete => activities::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_name_ends_with_wire_name() {
        for action in BeamAction::ALL {
            let name = for_action(action);
            assert!(name.starts_with("beam-orchestrations::activity::"));
            assert!(name.ends_with(action.wire_name()), "{} -> {}", action, name);
        }
    }
}
