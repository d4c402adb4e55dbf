use anyhow::{Context, Result};
use beam_models::{BeamAction, InstanceResult, ResourceDescriptor};
use beam_orchestrations::ace_client::{AceClient, RemoteActions};
use beam_orchestrations::lifecycle::{run_sequence, DirectDriver, Sequence};
use beam_orchestrations::names::orchestrations;
use beam_orchestrations::types::{DecommissionResourceInput, ProvisionResourceInput};
use beam_orchestrations::SequenceError;
use duroxide::{Client, OrchestrationStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::commands::orchestration::print_output;
use crate::config::Config;

pub async fn run_provision(config: &Config, descriptor: ResourceDescriptor, durable: bool) -> Result<()> {
    if durable {
        run_durable(config, Sequence::Provision, descriptor).await
    } else {
        run_direct(config, Sequence::Provision, descriptor).await
    }
}

pub async fn run_decommission(config: &Config, descriptor: ResourceDescriptor, durable: bool) -> Result<()> {
    if durable {
        run_durable(config, Sequence::Decommission, descriptor).await
    } else {
        run_direct(config, Sequence::Decommission, descriptor).await
    }
}

/// Clone or delete a model without touching any instance. Always in-process:
/// neither sequence polls, so there is nothing for a durable run to resume.
pub async fn run_model(config: &Config, sequence: Sequence, descriptor: ResourceDescriptor) -> Result<()> {
    if sequence.touches_instance() {
        anyhow::bail!("'{}' is not a model sequence", sequence);
    }
    run_direct(config, sequence, descriptor).await
}

/// Issue a single action outside any sequence
pub async fn run_action(config: &Config, action: BeamAction, descriptor: ResourceDescriptor) -> Result<()> {
    let client = AceClient::connect(&config.ace).await?;

    let result = match action {
        BeamAction::Status => client.instance_status(&descriptor).await,
        BeamAction::Change => client.change_model(&descriptor).await,
        BeamAction::Suspend => client.suspend_instance(&descriptor).await,
        BeamAction::Resume => client.resume_instance(&descriptor).await,
        other => client.perform(other, &descriptor).await,
    }
    .with_context(|| format!("'{}' failed for program '{}'", action, descriptor.program))?
    .resolve(action);

    println!("✓ {} accepted", action);
    println!();
    print_instance(&descriptor, &result);

    Ok(())
}

async fn run_direct(config: &Config, sequence: Sequence, descriptor: ResourceDescriptor) -> Result<()> {
    tracing::info!(sequence = %sequence, program = %descriptor.program, "Running in-process");

    let client = AceClient::connect(&config.ace).await?;
    let cancel = CancellationToken::new();
    let driver = DirectDriver::with_cancellation(Arc::new(client), cancel.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling after the current call");
            cancel.cancel();
        }
    });

    let outcome = run_sequence(&driver, sequence, &descriptor, &config.poll).await;
    interrupt.abort();

    match outcome {
        Ok(result) => {
            println!("✓ {} complete", sequence);
            println!();
            print_instance(&descriptor, &result);
            Ok(())
        }
        Err(err) => {
            print_failure(&err);
            Err(err.into())
        }
    }
}

async fn run_durable(config: &Config, sequence: Sequence, descriptor: ResourceDescriptor) -> Result<()> {
    let (runtime, store) = crate::duroxide::initialize(config).await?;
    let client = Client::new(store);

    // Fresh id per invocation, so a re-run starts from the first step
    let guid = Uuid::new_v4().to_string();
    let instance_id = format!("{}-{}-{}", sequence, descriptor.program, &guid[..8]);

    let (name, input_json) = match sequence {
        Sequence::Provision => (
            orchestrations::PROVISION_RESOURCE,
            serde_json::to_string(&ProvisionResourceInput {
                descriptor: descriptor.clone(),
                poll: config.poll,
                orchestration_id: instance_id.clone(),
            })?,
        ),
        Sequence::Decommission => (
            orchestrations::DECOMMISSION_RESOURCE,
            serde_json::to_string(&DecommissionResourceInput {
                descriptor: descriptor.clone(),
                poll: config.poll,
                orchestration_id: instance_id.clone(),
            })?,
        ),
        Sequence::ProvisionModel | Sequence::DecommissionModel => {
            anyhow::bail!("'{}' has no durable orchestration", sequence);
        }
    };

    client
        .start_orchestration(&instance_id, name, input_json)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start orchestration: {}", e))?;

    println!("✓ {} started", sequence);
    println!();
    println!("  Program:       {}", descriptor.program);
    println!("  Orchestration: {}", instance_id);
    println!();

    let outcome = wait_for_orchestration(&client, &instance_id).await;

    tracing::info!("Shutting down Duroxide runtime");
    runtime.shutdown(None).await;

    outcome
}

async fn wait_for_orchestration(client: &Client, instance_id: &str) -> Result<()> {
    loop {
        match client.get_orchestration_status(instance_id).await {
            OrchestrationStatus::Completed { output, .. } => {
                println!("✓ Orchestration completed");
                println!();
                print_output(&output);
                return Ok(());
            }
            OrchestrationStatus::Failed { details, .. } => {
                println!("✗ Orchestration failed");
                println!();
                println!("{:?}", details);
                anyhow::bail!("Orchestration '{}' failed", instance_id);
            }
            OrchestrationStatus::NotFound => {
                anyhow::bail!("Orchestration '{}' not found", instance_id);
            }
            OrchestrationStatus::Running { .. } => {}
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Detached. The orchestration is durable and resumes with the next runtime.");
                println!();
                println!("Check status with:");
                println!("  beam orchestration {}", instance_id);
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_secs(2)) => {}
        }
    }
}

fn print_instance(descriptor: &ResourceDescriptor, result: &InstanceResult) {
    let phase = result
        .phase()
        .map(|p| format!("{:?}", p))
        .unwrap_or_else(|| "unrecognized".to_string());

    println!("  Program:      {}", descriptor.program);
    println!("  Template:     {}", descriptor.template);
    println!("  Status:       {} ({})", result.status, phase);
    println!("  Entity ID:    {}", if result.entity_id.is_empty() { "-" } else { result.entity_id.as_str() });
    println!("  Last updated: {}", chrono::Utc::now().to_rfc3339());
}

fn print_failure(err: &SequenceError) {
    println!("✗ {} aborted at '{}'", err.sequence, err.phase());
    println!();
    println!("  Error:     {}", err.error);

    let completed: Vec<_> = err.completed.iter().map(|a| a.wire_name()).collect();
    println!(
        "  Completed: {}",
        if completed.is_empty() { "-".to_string() } else { completed.join(", ") }
    );

    match &err.last_known {
        Some(last) => println!(
            "  Last seen: {} (entity: {})",
            last.status,
            if last.entity_id.is_empty() { "-" } else { last.entity_id.as_str() }
        ),
        None => println!("  Last seen: -"),
    }

    println!();
    println!("Nothing was rolled back. Re-running `beam {}` starts again from the first step.", err.sequence);
}
