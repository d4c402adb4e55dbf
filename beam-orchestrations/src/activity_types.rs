//! Input types for BEAM activities

use beam_models::{BeamAction, ResourceDescriptor};
use serde::{Deserialize, Serialize};

/// Input for every remote action activity. The output is an
/// [`beam_models::InstanceResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteActionInput {
    pub action: BeamAction,
    pub descriptor: ResourceDescriptor,
}
