//! Resource lifecycle engine
//!
//! Bring-up and teardown are fixed, strictly ordered step lists. Each step
//! issues one remote action and, for asynchronous actions, waits until the
//! instance converges on the expected phase before the next step runs.
//!
//! The engine is written against [`LifecycleDriver`], so the same sequence
//! runs in-process ([`DirectDriver`]) or durably inside a duroxide
//! orchestration (`crate::orchestrations::driver::DurableDriver`).

use beam_models::{BeamAction, InstancePhase};
use serde::{Deserialize, Serialize};

pub mod driver;
pub mod poller;
pub mod sequence;

pub use driver::{Cancelled, DirectDriver, LifecycleDriver, TraceLevel};
pub use poller::{wait_for_status, ConvergenceFailure, PollPolicy, DURABLE_MAX_ATTEMPTS};
pub use sequence::{
    decommission_model, decommission_resource, provision_model, provision_resource, run_sequence,
    validate_sequence,
};

/// Which fixed sequence is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sequence {
    /// Bring-up: clone, create, start, lock
    Provision,
    /// Teardown: unlock, stop, drop, delete
    Decommission,
    /// Model only: clone
    ProvisionModel,
    /// Model only: delete
    DecommissionModel,
}

impl Sequence {
    pub fn steps(self) -> &'static [PhaseStep] {
        match self {
            Sequence::Provision => BRING_UP,
            Sequence::Decommission => TEAR_DOWN,
            Sequence::ProvisionModel => MODEL_BRING_UP,
            Sequence::DecommissionModel => MODEL_TEAR_DOWN,
        }
    }

    /// Whether the sequence ends with a running instance or removes one
    pub fn touches_instance(self) -> bool {
        matches!(self, Sequence::Provision | Sequence::Decommission)
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sequence::Provision => f.write_str("provision"),
            Sequence::Decommission => f.write_str("decommission"),
            Sequence::ProvisionModel => f.write_str("provision-model"),
            Sequence::DecommissionModel => f.write_str("decommission-model"),
        }
    }
}

/// Transient phase an action leaves the instance in, and the terminal phase
/// polling must observe before the sequence moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    pub waiting: InstancePhase,
    pub waited: InstancePhase,
}

/// One ordered step of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub action: BeamAction,
    /// `None` for actions the remote completes before answering
    pub convergence: Option<Convergence>,
}

impl PhaseStep {
    pub const fn immediate(action: BeamAction) -> Self {
        Self {
            action,
            convergence: None,
        }
    }

    pub const fn converging(action: BeamAction, waiting: InstancePhase, waited: InstancePhase) -> Self {
        Self {
            action,
            convergence: Some(Convergence { waiting, waited }),
        }
    }
}

pub const BRING_UP: &[PhaseStep] = &[
    PhaseStep::immediate(BeamAction::Clone),
    PhaseStep::converging(BeamAction::Create, InstancePhase::Creating, InstancePhase::Created),
    PhaseStep::converging(BeamAction::Start, InstancePhase::Starting, InstancePhase::Started),
    PhaseStep::immediate(BeamAction::Lock),
];

// A stopped instance reports the idle "created" token, not a dedicated one.
pub const TEAR_DOWN: &[PhaseStep] = &[
    PhaseStep::immediate(BeamAction::Unlock),
    PhaseStep::converging(BeamAction::Stop, InstancePhase::Stopping, InstancePhase::Created),
    PhaseStep::converging(BeamAction::Drop, InstancePhase::Deleting, InstancePhase::Absent),
    PhaseStep::immediate(BeamAction::Delete),
];

/// A model is cloned from its template without creating an instance
pub const MODEL_BRING_UP: &[PhaseStep] = &[PhaseStep::immediate(BeamAction::Clone)];

pub const MODEL_TEAR_DOWN: &[PhaseStep] = &[PhaseStep::immediate(BeamAction::Delete)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bring_up_order() {
        let actions: Vec<_> = Sequence::Provision.steps().iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![BeamAction::Clone, BeamAction::Create, BeamAction::Start, BeamAction::Lock]
        );
    }

    #[test]
    fn test_teardown_reuses_idle_token_for_stop() {
        let stop = TEAR_DOWN[1];
        assert_eq!(stop.action, BeamAction::Stop);
        assert_eq!(
            stop.convergence,
            Some(Convergence {
                waiting: InstancePhase::Stopping,
                waited: InstancePhase::Created,
            })
        );
        assert_eq!(TEAR_DOWN[2].convergence.map(|c| c.waited), Some(InstancePhase::Absent));
    }

    #[test]
    fn test_model_sequences_never_poll() {
        for sequence in [Sequence::ProvisionModel, Sequence::DecommissionModel] {
            assert!(!sequence.touches_instance());
            assert!(sequence.steps().iter().all(|s| s.convergence.is_none()));
        }
        assert_eq!(Sequence::ProvisionModel.steps()[0].action, BeamAction::Clone);
        assert_eq!(Sequence::DecommissionModel.steps()[0].action, BeamAction::Delete);
        assert_eq!(Sequence::DecommissionModel.to_string(), "decommission-model");
        assert_eq!(
            serde_json::to_string(&Sequence::ProvisionModel).unwrap(),
            "\"provision-model\""
        );
    }

    #[test]
    fn test_waiting_phase_matches_acknowledgement() {
        for step in BRING_UP.iter().chain(TEAR_DOWN) {
            if let Some(convergence) = step.convergence {
                assert_eq!(step.action.acknowledged_phase(), Some(convergence.waiting));
                assert!(convergence.waiting.is_transient());
            }
        }
    }
}
