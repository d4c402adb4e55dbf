//! Phase vocabulary for BEAM instances
//!
//! The control plane reports status as free-form string tokens. This module
//! owns the one table that maps those tokens onto [`InstancePhase`]; nothing
//! else in the workspace compares raw status strings.

use serde::{Deserialize, Serialize};

/// Where a BEAM model or instance sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstancePhase {
    /// Bare success acknowledgement with no structured body ("200")
    Acknowledged,
    Cloned,
    Changed,
    Creating,
    /// Instance exists but is idle. Also the state a stopped instance returns to.
    Created,
    Starting,
    Started,
    Locked,
    Unlocked,
    Stopping,
    Suspending,
    Suspended,
    Resuming,
    Deleting,
    /// No instance exists ("none")
    Absent,
    /// The model itself has been removed
    Deleted,
}

const TOKEN_TABLE: &[(InstancePhase, &str)] = &[
    (InstancePhase::Acknowledged, "200"),
    (InstancePhase::Cloned, "cloned"),
    (InstancePhase::Changed, "changed"),
    (InstancePhase::Creating, "creating"),
    (InstancePhase::Created, "created"),
    (InstancePhase::Starting, "starting"),
    (InstancePhase::Started, "started"),
    (InstancePhase::Locked, "locked"),
    (InstancePhase::Unlocked, "unlocked"),
    (InstancePhase::Stopping, "stopping"),
    (InstancePhase::Suspending, "suspending"),
    (InstancePhase::Suspended, "suspended"),
    (InstancePhase::Resuming, "resuming"),
    (InstancePhase::Deleting, "deleting"),
    (InstancePhase::Absent, "none"),
    (InstancePhase::Deleted, "deleted"),
];

impl InstancePhase {
    /// Map a raw remote token onto a phase. Unknown tokens (including
    /// remote error strings) yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        TOKEN_TABLE
            .iter()
            .find(|(_, t)| t.eq_ignore_ascii_case(token))
            .map(|(phase, _)| *phase)
    }

    /// The wire token for this phase
    pub fn token(self) -> &'static str {
        TOKEN_TABLE
            .iter()
            .find(|(phase, _)| *phase == self)
            .map(|(_, t)| *t)
            .unwrap_or("none")
    }

    /// Whether this phase is a transient state that polling should wait out
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            InstancePhase::Creating
                | InstancePhase::Starting
                | InstancePhase::Stopping
                | InstancePhase::Suspending
                | InstancePhase::Resuming
                | InstancePhase::Deleting
        )
    }
}

impl std::fmt::Display for InstancePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
