use anyhow::Result;
use beam_models::BeamAction;
use beam_orchestrations::lifecycle::Sequence;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod duroxide;

use cli::{Args, Mode};
use config::Config;

/// Initialize tracing with two outputs:
/// 1. stderr, so stdout stays clean for command output
/// 2. ~/.beam/beam.log, for a persistent record of every run
fn initialize_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,beam_orchestrations=debug,duroxide=info,duroxide_pg=warn".into());

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let beam_dir = PathBuf::from(home).join(".beam");
    std::fs::create_dir_all(&beam_dir).ok();

    let file_appender = tracing_appender::rolling::never(&beam_dir, "beam.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops file logging
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    initialize_tracing()?;

    let load = || Config::load(&args.ace);

    match &args.mode {
        Mode::Provision { resource, durable } => {
            commands::resource::run_provision(&load()?, resource.descriptor(), *durable).await
        }
        Mode::Decommission { resource, durable } => {
            commands::resource::run_decommission(&load()?, resource.descriptor(), *durable).await
        }
        Mode::ProvisionModel { resource } => {
            commands::resource::run_model(&load()?, Sequence::ProvisionModel, resource.descriptor()).await
        }
        Mode::DecommissionModel { resource } => {
            commands::resource::run_model(&load()?, Sequence::DecommissionModel, resource.descriptor()).await
        }
        Mode::Status { resource } => {
            commands::resource::run_action(&load()?, BeamAction::Status, resource.descriptor()).await
        }
        Mode::Change { resource } => {
            commands::resource::run_action(&load()?, BeamAction::Change, resource.descriptor()).await
        }
        Mode::Suspend { resource } => {
            commands::resource::run_action(&load()?, BeamAction::Suspend, resource.descriptor()).await
        }
        Mode::Resume { resource } => {
            commands::resource::run_action(&load()?, BeamAction::Resume, resource.descriptor()).await
        }
        Mode::Orchestration { id } => {
            // Reading orchestration state needs only the store, not an ACE session
            let db_url = config::database_url_from_env()?;
            commands::orchestration::get(&db_url, id).await
        }
    }
}
