//! In-memory [`RemoteActions`] with per-action scripted answers

use async_trait::async_trait;
use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use beam_orchestrations::ace_client::RemoteActions;
use beam_orchestrations::ActionError;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Answer = Result<InstanceResult, ActionError>;

/// Answers are consumed in order; the last one for an action repeats once
/// the script runs out. Unscripted actions answer with a bare acknowledgement.
#[derive(Default)]
pub struct ScriptedActions {
    scripts: Mutex<HashMap<BeamAction, VecDeque<Answer>>>,
    calls: Mutex<Vec<BeamAction>>,
}

impl ScriptedActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, action: BeamAction, answers: Vec<Answer>) -> &Self {
        self.scripts.lock().unwrap().insert(action, answers.into());
        self
    }

    /// Script `status` answers from plain tokens
    pub fn statuses(&self, tokens: &[(&str, &str)]) -> &Self {
        let answers = tokens
            .iter()
            .map(|(status, id)| Ok(InstanceResult::new(*status, *id)))
            .collect();
        self.script(BeamAction::Status, answers)
    }

    pub fn calls(&self) -> Vec<BeamAction> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than status queries
    pub fn mutations(&self) -> Vec<BeamAction> {
        self.calls()
            .into_iter()
            .filter(|a| *a != BeamAction::Status)
            .collect()
    }

    pub fn count(&self, action: BeamAction) -> usize {
        self.calls().iter().filter(|a| **a == action).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

pub fn transport_error(action: BeamAction) -> Answer {
    Err(ActionError::Transport {
        action,
        message: "connection refused".to_string(),
    })
}

pub fn rejected(action: BeamAction, status: u16) -> Answer {
    Err(ActionError::Rejected { action, status })
}

#[async_trait]
impl RemoteActions for ScriptedActions {
    async fn perform(&self, action: BeamAction, _descriptor: &ResourceDescriptor) -> Answer {
        self.calls.lock().unwrap().push(action);

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&action) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(InstanceResult::acknowledged())),
            None => Ok(InstanceResult::acknowledged()),
        }
    }
}
