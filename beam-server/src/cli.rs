use beam_models::ResourceDescriptor;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// BEAM - instance lifecycle on the ACE control plane
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub ace: AceArgs,

    #[command(subcommand)]
    pub mode: Mode,
}

/// ACE session settings; each falls back to its environment variable
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct AceArgs {
    /// Control plane host (or full endpoint URL)
    #[arg(long, env = "ACE_HOST", global = true)]
    pub ace_host: Option<String>,

    /// Account name used for login and on every request
    #[arg(long, env = "ACE_ACCOUNT", global = true)]
    pub ace_account: Option<String>,

    /// API key for the login exchange
    #[arg(long, env = "ACE_APIKEY", global = true, hide_env_values = true)]
    pub ace_apikey: Option<String>,
}

/// What is being provisioned
#[derive(ClapArgs, Debug, Clone)]
pub struct ResourceArgs {
    /// Source model to clone from
    #[arg(short, long)]
    pub template: String,

    /// Target instance name
    #[arg(short, long)]
    pub program: String,

    /// Hostname for the instance (required by clone, create, change and status)
    #[arg(short, long, default_value = "")]
    pub domain: String,

    /// Placement region
    #[arg(long, default_value = "")]
    pub region: String,

    /// Cloud provider selector
    #[arg(long, default_value = "")]
    pub category: String,

    /// Instance configuration payload
    #[arg(long, default_value = "")]
    pub param: String,
}

impl ResourceArgs {
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new(&self.template, &self.program)
            .with_domain(&self.domain)
            .with_placement(&self.region, &self.category)
            .with_param(&self.param)
    }
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Clone, create, start and lock an instance
    Provision {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Run as a durable orchestration (requires DATABASE_URL)
        #[arg(long)]
        durable: bool,
    },

    /// Unlock, stop, drop and delete an instance
    Decommission {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Run as a durable orchestration (requires DATABASE_URL)
        #[arg(long)]
        durable: bool,
    },

    /// Clone a model from its template without creating an instance
    ProvisionModel {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Delete a model that has no instance
    DecommissionModel {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Query the current instance status
    Status {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Push a new configuration payload (--param) to the model
    Change {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Suspend a running instance
    Suspend {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Resume a suspended instance
    Resume {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Show a durable orchestration's status and output
    Orchestration {
        /// Orchestration ID
        id: String,
    },
}
