//! Convergence primitive: wait for an instance to leave a transient phase

use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::driver::{LifecycleDriver, TraceLevel};
use super::{Convergence, Sequence};
use crate::error::{ActionError, LifecycleError};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Bound applied to durable runs that did not set one: about 20 minutes of
/// status checks at the default interval. A durable orchestration has no
/// Ctrl+C, so an unbounded poll could never be stopped.
pub const DURABLE_MAX_ATTEMPTS: u32 = 400;

/// How often to check status and when to give up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Delay before each status check
    pub interval_seconds: u64,
    /// Maximum number of status checks, failed ones included. `None` polls
    /// until the instance settles or the caller cancels.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn bounded(interval_seconds: u64, max_attempts: u32) -> Self {
        Self {
            interval_seconds,
            max_attempts: Some(max_attempts),
        }
    }

    /// Keep an explicit bound, otherwise cap at `max_attempts`
    pub fn or_bounded(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: self.max_attempts.or(Some(max_attempts)),
            ..self
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Polling ended without reaching the expected phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceFailure {
    pub error: LifecycleError,
    /// Most recent state the poller saw
    pub last_observed: InstanceResult,
}

/// Block until the instance leaves `convergence.waiting`, then require
/// `convergence.waited`.
///
/// A bare acknowledgement from the triggering action counts as
/// `convergence.waiting`. Failed status queries are logged and polling
/// continues, except for a descriptor the status query can never accept.
/// Otherwise only the policy bound or cancellation end the loop early.
pub async fn wait_for_status<D: LifecycleDriver>(
    driver: &D,
    sequence: Sequence,
    phase: BeamAction,
    descriptor: &ResourceDescriptor,
    initial: InstanceResult,
    convergence: Convergence,
    policy: &PollPolicy,
) -> Result<InstanceResult, ConvergenceFailure> {
    let Convergence { waiting, waited } = convergence;
    let mut current = initial.acknowledged_as(waiting);
    let mut attempts: u32 = 0;

    while current.phase() == Some(waiting) {
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                let error = LifecycleError::ConvergenceTimeout {
                    phase,
                    waiting,
                    attempts,
                };
                return Err(ConvergenceFailure {
                    error,
                    last_observed: current,
                });
            }
        }

        if driver.pause(policy.interval()).await.is_err() {
            return Err(ConvergenceFailure {
                error: LifecycleError::Cancelled { phase },
                last_observed: current,
            });
        }
        attempts += 1;

        match driver.perform(BeamAction::Status, descriptor).await {
            Ok(observed) => {
                driver.trace(
                    TraceLevel::Info,
                    sequence,
                    phase,
                    &format!(
                        "status check {}: '{}' (waiting on '{}' to become '{}')",
                        attempts, observed.status, waiting, waited
                    ),
                );
                current = observed.inherit_entity_id(Some(&current));
            }
            Err(ActionError::Cancelled { .. }) => {
                return Err(ConvergenceFailure {
                    error: LifecycleError::Cancelled { phase },
                    last_observed: current,
                });
            }
            Err(err @ ActionError::InvalidDescriptor { .. }) => {
                return Err(ConvergenceFailure {
                    error: LifecycleError::action(phase, err),
                    last_observed: current,
                });
            }
            Err(err) => {
                driver.trace(
                    TraceLevel::Warn,
                    sequence,
                    phase,
                    &format!("status check {} failed, will retry: {}", attempts, err),
                );
            }
        }
    }

    if current.phase() == Some(waited) {
        Ok(current)
    } else {
        Err(ConvergenceFailure {
            error: LifecycleError::ConvergenceFailed {
                phase,
                expected: waited,
                observed: current.status.clone(),
            },
            last_observed: current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::driver::Cancelled;
    use beam_models::InstancePhase;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays canned status answers without sleeping
    struct Replay {
        answers: RefCell<VecDeque<Result<InstanceResult, ActionError>>>,
        pauses: Cell<u32>,
        cancel_after: Option<u32>,
    }

    impl Replay {
        fn new(answers: Vec<Result<InstanceResult, ActionError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                pauses: Cell::new(0),
                cancel_after: None,
            }
        }
    }

    impl LifecycleDriver for Replay {
        async fn perform(
            &self,
            action: BeamAction,
            _descriptor: &ResourceDescriptor,
        ) -> Result<InstanceResult, ActionError> {
            assert_eq!(action, BeamAction::Status);
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(InstanceResult::new("creating", "")))
        }

        async fn pause(&self, _interval: Duration) -> Result<(), Cancelled> {
            if self.cancel_after == Some(self.pauses.get()) {
                return Err(Cancelled);
            }
            self.pauses.set(self.pauses.get() + 1);
            Ok(())
        }

        fn trace(&self, _: TraceLevel, _: Sequence, _: BeamAction, _: &str) {}
    }

    const CREATE: Convergence = Convergence {
        waiting: InstancePhase::Creating,
        waited: InstancePhase::Created,
    };

    async fn poll(
        driver: &Replay,
        initial: InstanceResult,
        policy: PollPolicy,
    ) -> Result<InstanceResult, ConvergenceFailure> {
        let descriptor = ResourceDescriptor::new("base", "app1").with_domain("app1.example");
        wait_for_status(
            driver,
            Sequence::Provision,
            BeamAction::Create,
            &descriptor,
            initial,
            CREATE,
            &policy,
        )
        .await
    }

    #[tokio::test]
    async fn test_acknowledgement_is_treated_as_waiting() {
        let driver = Replay::new(vec![
            Ok(InstanceResult::new("creating", "")),
            Ok(InstanceResult::new("created", "i-7")),
        ]);
        let result = poll(&driver, InstanceResult::acknowledged(), PollPolicy::default())
            .await
            .unwrap();
        assert_eq!(result, InstanceResult::new("created", "i-7"));
        assert_eq!(driver.pauses.get(), 2);
    }

    #[tokio::test]
    async fn test_already_settled_result_skips_polling() {
        let driver = Replay::new(vec![]);
        let result = poll(&driver, InstanceResult::new("created", "i-1"), PollPolicy::default())
            .await
            .unwrap();
        assert_eq!(result.status, "created");
        assert_eq!(driver.pauses.get(), 0);
    }

    #[tokio::test]
    async fn test_failed_status_checks_are_retried() {
        let transport = || {
            Err(ActionError::Transport {
                action: BeamAction::Status,
                message: "connection reset".to_string(),
            })
        };
        let driver = Replay::new(vec![
            transport(),
            transport(),
            Ok(InstanceResult::new("created", "")),
        ]);
        let result = poll(&driver, InstanceResult::new("creating", "i-3"), PollPolicy::default())
            .await
            .unwrap();
        assert_eq!(result, InstanceResult::new("created", "i-3"));
        assert_eq!(driver.pauses.get(), 3);
    }

    #[tokio::test]
    async fn test_unexpected_terminal_token_fails_convergence() {
        let driver = Replay::new(vec![Ok(InstanceResult::new("error", "i-3"))]);
        let failure = poll(&driver, InstanceResult::acknowledged(), PollPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(
            failure.error,
            LifecycleError::ConvergenceFailed {
                phase: BeamAction::Create,
                expected: InstancePhase::Created,
                observed: "error".to_string(),
            }
        );
        assert_eq!(failure.last_observed.status, "error");
    }

    #[tokio::test]
    async fn test_bounded_policy_times_out() {
        let driver = Replay::new(vec![]);
        let failure = poll(&driver, InstanceResult::acknowledged(), PollPolicy::bounded(3, 4))
            .await
            .unwrap_err();
        assert_eq!(
            failure.error,
            LifecycleError::ConvergenceTimeout {
                phase: BeamAction::Create,
                waiting: InstancePhase::Creating,
                attempts: 4,
            }
        );
        assert_eq!(driver.pauses.get(), 4);
    }

    #[tokio::test]
    async fn test_cancelled_pause_stops_polling() {
        let mut driver = Replay::new(vec![]);
        driver.cancel_after = Some(2);
        let failure = poll(&driver, InstanceResult::acknowledged(), PollPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(failure.error, LifecycleError::Cancelled { phase: BeamAction::Create });
        assert_eq!(failure.last_observed.status, "creating");
    }

    #[tokio::test]
    async fn test_invalid_descriptor_is_not_retried() {
        let driver = Replay::new(vec![Err(ActionError::InvalidDescriptor {
            action: BeamAction::Status,
            field: "domain".to_string(),
        })]);
        let failure = poll(&driver, InstanceResult::acknowledged(), PollPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(
            failure.error,
            LifecycleError::ActionFailed {
                phase: BeamAction::Create,
                source: ActionError::InvalidDescriptor { .. },
            }
        ));
        assert_eq!(driver.pauses.get(), 1);
    }

    #[test]
    fn test_policy_defaults() {
        let policy: PollPolicy = serde_json::from_str(r#"{"interval_seconds":5}"#).unwrap();
        assert_eq!(policy.interval(), Duration::from_secs(5));
        assert_eq!(policy.max_attempts, None);
        assert_eq!(PollPolicy::default().interval_seconds, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_or_bounded_keeps_explicit_bound() {
        assert_eq!(PollPolicy::default().or_bounded(400).max_attempts, Some(400));
        assert_eq!(PollPolicy::bounded(5, 12).or_bounded(400), PollPolicy::bounded(5, 12));
    }
}
