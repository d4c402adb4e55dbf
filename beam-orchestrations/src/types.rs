//! Input and output types for BEAM orchestrations

use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{PollPolicy, DURABLE_MAX_ATTEMPTS};

// ============================================================================
// Provision Resource Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvisionResourceInput {
    pub descriptor: ResourceDescriptor,
    /// Status polling policy (default: every 3 seconds, capped at
    /// `DURABLE_MAX_ATTEMPTS` checks)
    #[serde(default)]
    pub poll: PollPolicy,
    /// Unique orchestration/request identifier
    pub orchestration_id: String,
}

impl ProvisionResourceInput {
    /// Polling policy the orchestration actually runs with
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll.or_bounded(DURABLE_MAX_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvisionResourceOutput {
    /// Target instance name
    pub program: String,
    /// Final instance state, expected to be `locked`
    pub result: InstanceResult,
    /// Wall time of the whole sequence
    pub elapsed_seconds: u64,
}

// ============================================================================
// Decommission Resource Orchestration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecommissionResourceInput {
    pub descriptor: ResourceDescriptor,
    #[serde(default)]
    pub poll: PollPolicy,
    pub orchestration_id: String,
}

impl DecommissionResourceInput {
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll.or_bounded(DURABLE_MAX_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecommissionResourceOutput {
    pub program: String,
    /// Final instance state, expected to be `deleted`
    pub result: InstanceResult,
    pub elapsed_seconds: u64,
}

// ============================================================================
// Failure report
// ============================================================================

/// JSON carried in the `Err` of a failed lifecycle orchestration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceFailure {
    /// Step that aborted the run
    pub phase: BeamAction,
    pub message: String,
    /// State the remote entity was left in, if anything was observed
    pub last_known: Option<InstanceResult>,
    /// Steps that fully finished before the failure
    pub completed: Vec<BeamAction>,
}

impl From<&crate::error::SequenceError> for SequenceFailure {
    fn from(err: &crate::error::SequenceError) -> Self {
        Self {
            phase: err.phase(),
            message: err.to_string(),
            last_known: err.last_known.clone(),
            completed: err.completed.clone(),
        }
    }
}
