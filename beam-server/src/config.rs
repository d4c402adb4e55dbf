use anyhow::{Context, Result};
use beam_orchestrations::ace_client::AceClientConfig;
use beam_orchestrations::lifecycle::PollPolicy;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::cli::AceArgs;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub ace: AceClientConfig,
    pub poll: PollPolicy,
    /// Only needed for durable runs
    pub database_url: Option<String>,
}

impl Config {
    pub fn load(args: &AceArgs) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(args, |name| std::env::var(name).ok())
    }

    fn from_lookup(args: &AceArgs, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |flag: &Option<String>, name: &str| -> Result<String> {
            flag.clone()
                .or_else(|| lookup(name))
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set", name))
        };

        let ace = AceClientConfig {
            host: required(&args.ace_host, "ACE_HOST")?,
            account: required(&args.ace_account, "ACE_ACCOUNT")?,
            api_key: required(&args.ace_apikey, "ACE_APIKEY")?,
            request_timeout: Duration::from_secs(
                parse_var(&lookup, "BEAM_REQUEST_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        };

        let poll = PollPolicy {
            interval_seconds: parse_var(&lookup, "BEAM_POLL_INTERVAL_SECS")?
                .unwrap_or(PollPolicy::default().interval_seconds),
            max_attempts: parse_var::<NonZeroU32>(&lookup, "BEAM_POLL_MAX_ATTEMPTS")?
                .map(NonZeroU32::get),
        };

        Ok(Self {
            ace,
            poll,
            database_url: lookup("DATABASE_URL"),
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set for durable runs")
    }
}

/// `DATABASE_URL` alone, for commands that never talk to ACE
pub fn database_url_from_env() -> Result<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a positive integer, got '{}'", name, raw.trim())),
        _ => Ok(None),
    }
}
