//! Data model shared by the BEAM lifecycle crates
//!
//! A [`ResourceDescriptor`] says what is being provisioned, a [`BeamAction`]
//! names one remote control-plane call, and an [`InstanceResult`] is what a
//! single call reports back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod phase;

pub use phase::InstancePhase;

/// One remote action understood by the ACE control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamAction {
    Clone,
    Change,
    Create,
    Start,
    Lock,
    Unlock,
    Status,
    Stop,
    Suspend,
    Resume,
    Drop,
    Delete,
}

impl BeamAction {
    pub const ALL: [BeamAction; 12] = [
        BeamAction::Clone,
        BeamAction::Change,
        BeamAction::Create,
        BeamAction::Start,
        BeamAction::Lock,
        BeamAction::Unlock,
        BeamAction::Status,
        BeamAction::Stop,
        BeamAction::Suspend,
        BeamAction::Resume,
        BeamAction::Drop,
        BeamAction::Delete,
    ];

    /// Value of the `action` field on the wire
    pub fn wire_name(self) -> &'static str {
        match self {
            BeamAction::Clone => "clone",
            BeamAction::Change => "change",
            BeamAction::Create => "create",
            BeamAction::Start => "start",
            BeamAction::Lock => "lock",
            BeamAction::Unlock => "unlock",
            BeamAction::Status => "status",
            BeamAction::Stop => "stop",
            BeamAction::Suspend => "suspend",
            BeamAction::Resume => "resume",
            BeamAction::Drop => "drop",
            BeamAction::Delete => "delete",
        }
    }

    /// Whether the action addresses the instance by hostname
    pub fn requires_domain(self) -> bool {
        matches!(
            self,
            BeamAction::Clone | BeamAction::Change | BeamAction::Create | BeamAction::Status
        )
    }

    /// What a bare success acknowledgement means for this action.
    ///
    /// `None` for the status query, which must always report a real token.
    pub fn acknowledged_phase(self) -> Option<InstancePhase> {
        match self {
            BeamAction::Clone => Some(InstancePhase::Cloned),
            BeamAction::Change => Some(InstancePhase::Changed),
            BeamAction::Create => Some(InstancePhase::Creating),
            BeamAction::Start => Some(InstancePhase::Starting),
            BeamAction::Lock => Some(InstancePhase::Locked),
            BeamAction::Unlock => Some(InstancePhase::Started),
            BeamAction::Stop => Some(InstancePhase::Stopping),
            BeamAction::Suspend => Some(InstancePhase::Suspending),
            BeamAction::Resume => Some(InstancePhase::Resuming),
            BeamAction::Drop => Some(InstancePhase::Deleting),
            BeamAction::Delete => Some(InstancePhase::Deleted),
            BeamAction::Status => None,
        }
    }
}

impl std::fmt::Display for BeamAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Descriptor field rejected by [`ResourceDescriptor::validate_for`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action} requires a non-empty '{field}'")]
pub struct DescriptorError {
    pub action: BeamAction,
    pub field: &'static str,
}

/// What is being provisioned. Created once per operation and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Source model name
    pub template: String,
    /// Target instance name; replaces the template identity in the clone
    pub program: String,
    /// Hostname qualifier for the instance
    pub domain: String,
    pub region: String,
    /// Cloud provider selector (sent as `provider`)
    pub category: String,
    /// Opaque instance configuration payload
    pub param: String,
}

impl ResourceDescriptor {
    pub fn new(template: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_placement(mut self, region: impl Into<String>, category: impl Into<String>) -> Self {
        self.region = region.into();
        self.category = category.into();
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Check the fields `action` consumes before anything goes on the wire
    pub fn validate_for(&self, action: BeamAction) -> Result<(), DescriptorError> {
        if self.template.trim().is_empty() {
            return Err(DescriptorError { action, field: "template" });
        }
        if self.program.trim().is_empty() {
            return Err(DescriptorError { action, field: "program" });
        }
        if action.requires_domain() && self.domain.trim().is_empty() {
            return Err(DescriptorError { action, field: "domain" });
        }
        Ok(())
    }
}

/// Outcome of one remote action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceResult {
    /// Raw status token as reported by the control plane
    pub status: String,
    /// Remote-assigned identifier; empty until the remote provides one
    #[serde(default)]
    pub entity_id: String,
}

impl InstanceResult {
    pub fn new(status: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            entity_id: entity_id.into(),
        }
    }

    /// The bare success sentinel a client fabricates when the remote sends no body
    pub fn acknowledged() -> Self {
        Self::new(InstancePhase::Acknowledged.token(), "")
    }

    pub fn in_phase(phase: InstancePhase, entity_id: impl Into<String>) -> Self {
        Self::new(phase.token(), entity_id)
    }

    pub fn phase(&self) -> Option<InstancePhase> {
        InstancePhase::from_token(&self.status)
    }

    pub fn is_acknowledged(&self) -> bool {
        self.phase() == Some(InstancePhase::Acknowledged)
    }

    /// Replace a bare acknowledgement with `phase`; anything else is returned as is
    pub fn acknowledged_as(self, phase: InstancePhase) -> Self {
        if self.is_acknowledged() {
            Self::in_phase(phase, self.entity_id)
        } else {
            self
        }
    }

    /// Map a bare acknowledgement onto what it means for `action`
    pub fn resolve(self, action: BeamAction) -> Self {
        match action.acknowledged_phase() {
            Some(phase) => self.acknowledged_as(phase),
            None => self,
        }
    }

    /// Keep the identifier from `previous` when this result carries none
    pub fn inherit_entity_id(self, previous: Option<&InstanceResult>) -> Self {
        match previous {
            Some(prev) if self.entity_id.is_empty() => Self {
                entity_id: prev.entity_id.clone(),
                ..self
            },
            _ => self,
        }
    }
}
