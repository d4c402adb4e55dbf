//! Name constants for BEAM orchestrations
//!
//! Following the Duroxide naming convention: {crate-name}::{type}::{name}

/// Orchestration names
pub mod orchestrations {
    /// Bring a resource up: clone, create, start, lock
    ///
    /// **Input:** [`crate::types::ProvisionResourceInput`]  
    /// **Output:** [`crate::types::ProvisionResourceOutput`]  
    /// **Activities used:** one per remote action, see [`crate::activity_names`]
    /// **Duration:** dominated by the create and start convergence waits
    pub const PROVISION_RESOURCE: &str = "beam-orchestrations::orchestration::provision-resource";

    /// Tear a resource down: unlock, stop, drop, delete
    ///
    /// **Input:** [`crate::types::DecommissionResourceInput`]  
    /// **Output:** [`crate::types::DecommissionResourceOutput`]  
    /// **Note:** Never rolls back; a failed run can simply be started again
    pub const DECOMMISSION_RESOURCE: &str = "beam-orchestrations::orchestration::decommission-resource";
}
