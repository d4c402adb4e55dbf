//! Bring-up and teardown runners

use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};

use super::driver::{LifecycleDriver, TraceLevel};
use super::poller::{wait_for_status, ConvergenceFailure, PollPolicy};
use super::Sequence;
use crate::error::{ActionError, LifecycleError, SequenceError};

/// Check the descriptor against every call `sequence` can make, including
/// the status queries of converging steps.
///
/// A field missing here would otherwise surface only after earlier steps
/// had already changed the remote entity.
pub fn validate_sequence(
    sequence: Sequence,
    descriptor: &ResourceDescriptor,
) -> Result<(), LifecycleError> {
    for step in sequence.steps() {
        let status_check = step.convergence.map(|_| BeamAction::Status);
        for action in std::iter::once(step.action).chain(status_check) {
            descriptor
                .validate_for(action)
                .map_err(|err| LifecycleError::action(step.action, ActionError::from(err)))?;
        }
    }
    Ok(())
}

/// Run every step of `sequence` in order and return the final instance state.
///
/// The first failing step aborts the run. Nothing already done is undone;
/// the error carries the last state observed so a caller can decide what to
/// clean up. Re-running starts again from the first step.
pub async fn run_sequence<D: LifecycleDriver>(
    driver: &D,
    sequence: Sequence,
    descriptor: &ResourceDescriptor,
    policy: &PollPolicy,
) -> Result<InstanceResult, SequenceError> {
    let mut last_known: Option<InstanceResult> = None;
    let mut completed = Vec::new();

    let abort = |error: LifecycleError, last_known: Option<InstanceResult>, completed: Vec<_>| {
        driver.trace(TraceLevel::Error, sequence, error.phase(), &error.to_string());
        SequenceError {
            sequence,
            error,
            last_known,
            completed,
        }
    };

    if let Err(error) = validate_sequence(sequence, descriptor) {
        return Err(abort(error, None, completed));
    }

    for step in sequence.steps() {
        let phase = step.action;
        driver.trace(TraceLevel::Info, sequence, phase, "issuing action");

        let reported = match driver.perform(phase, descriptor).await {
            Ok(result) => result.inherit_entity_id(last_known.as_ref()),
            Err(err) => {
                return Err(abort(LifecycleError::action(phase, err), last_known, completed));
            }
        };

        let settled = match step.convergence {
            None => reported.resolve(phase),
            Some(convergence) => {
                let outcome =
                    wait_for_status(driver, sequence, phase, descriptor, reported, convergence, policy)
                        .await;
                match outcome {
                    Ok(result) => result,
                    Err(ConvergenceFailure { error, last_observed }) => {
                        return Err(abort(error, Some(last_observed), completed));
                    }
                }
            }
        };

        driver.trace(
            TraceLevel::Info,
            sequence,
            phase,
            &format!("completed with status '{}'", settled.status),
        );
        last_known = Some(settled);
        completed.push(phase);
    }

    Ok(last_known.unwrap_or_default())
}

/// clone, create, start, lock
pub async fn provision_resource<D: LifecycleDriver>(
    driver: &D,
    descriptor: &ResourceDescriptor,
    policy: &PollPolicy,
) -> Result<InstanceResult, SequenceError> {
    run_sequence(driver, Sequence::Provision, descriptor, policy).await
}

/// unlock, stop, drop, delete
pub async fn decommission_resource<D: LifecycleDriver>(
    driver: &D,
    descriptor: &ResourceDescriptor,
    policy: &PollPolicy,
) -> Result<InstanceResult, SequenceError> {
    run_sequence(driver, Sequence::Decommission, descriptor, policy).await
}

/// clone only; no instance is created
pub async fn provision_model<D: LifecycleDriver>(
    driver: &D,
    descriptor: &ResourceDescriptor,
    policy: &PollPolicy,
) -> Result<InstanceResult, SequenceError> {
    run_sequence(driver, Sequence::ProvisionModel, descriptor, policy).await
}

/// delete the model only
pub async fn decommission_model<D: LifecycleDriver>(
    driver: &D,
    descriptor: &ResourceDescriptor,
    policy: &PollPolicy,
) -> Result<InstanceResult, SequenceError> {
    run_sequence(driver, Sequence::DecommissionModel, descriptor, policy).await
}
