//! BEAM Orchestrations - lifecycle sequencing for instances on the ACE control plane
//!
//! This crate provides the ACE action client, the status poller and the two
//! lifecycle sequences (provision and decommission). The sequences run either
//! in-process through [`lifecycle::DirectDriver`] or as durable duroxide
//! orchestrations registered by [`registry`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use beam_models::ResourceDescriptor;
//! use beam_orchestrations::ace_client::{AceClient, AceClientConfig};
//! use beam_orchestrations::lifecycle::{provision_resource, DirectDriver, PollPolicy};
//!
//! # async fn example(config: AceClientConfig) -> anyhow::Result<()> {
//! let client = AceClient::connect(&config).await?;
//! let driver = DirectDriver::new(Arc::new(client));
//! let descriptor = ResourceDescriptor::new("base-model", "app1").with_domain("app1.example.com");
//!
//! let result = provision_resource(&driver, &descriptor, &PollPolicy::default()).await?;
//! assert_eq!(result.status, "locked");
//! # Ok(())
//! # }
//! ```

// Engine
pub mod ace_client;
pub mod error;
pub mod lifecycle;

// Orchestration exports
pub mod names;
pub mod types;
pub mod registry;

// Activity exports
pub mod activity_names;
pub mod activity_types;

mod orchestrations;
mod activities;

pub use activities::remote_action::init_remote_actions;
pub use error::{ActionError, LifecycleError, SequenceError};
pub use types::*;
pub use activity_types::*;
