//! Shared setup for the OpsOrch GitHub plugin executables.
//!
//! Each executable serves one resource domain over stdio:
//!
//! - `opsorch-github-ticket-plugin` and `opsorch-github-deployment-plugin`
//!   bind their adapter from the `config` embedded in the first valid
//!   request, unless `--config-file` is given
//! - `opsorch-github-team-plugin` binds its adapter at startup from
//!   `OPSORCH_TEAM_CONFIG` or `--config-file`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use opsorch_bridge::{Backend, Bridge, DecodeErrorPolicy, Domain, ErrorFormat};
use opsorch_core::RawConfig;
use opsorch_github::{DeploymentAdapter, TeamAdapter, TicketAdapter};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the team plugin configuration (JSON).
pub const TEAM_CONFIG_ENV: &str = "OPSORCH_TEAM_CONFIG";

/// Options shared by every plugin executable.
#[derive(Args, Debug, Clone, Default)]
pub struct PluginArgs {
    /// Enable debug logging (stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop serving after answering an undecodable request line
    #[arg(long)]
    pub exit_on_decode_error: bool,

    /// Load the adapter configuration from a TOML or JSON file
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl PluginArgs {
    pub fn decode_error_policy(&self) -> DecodeErrorPolicy {
        if self.exit_on_decode_error {
            DecodeErrorPolicy::Terminate
        } else {
            DecodeErrorPolicy::Continue
        }
    }

    fn load_config_file(&self) -> anyhow::Result<Option<RawConfig>> {
        self.config_file
            .as_deref()
            .map(|path| {
                RawConfig::load_from(path)
                    .with_context(|| format!("Failed to load {}", path.display()))
            })
            .transpose()
    }
}

/// Initialize logging on stderr; stdout carries the protocol.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Backend factories
// =============================================================================

pub fn ticket_backend(raw: &RawConfig) -> opsorch_core::Result<Backend> {
    Ok(Backend::Ticket(Arc::new(TicketAdapter::new(raw)?)))
}

pub fn deployment_backend(raw: &RawConfig) -> opsorch_core::Result<Backend> {
    Ok(Backend::Deployment(Arc::new(DeploymentAdapter::new(raw)?)))
}

pub fn team_backend(raw: &RawConfig) -> opsorch_core::Result<Backend> {
    Ok(Backend::Team(Arc::new(TeamAdapter::new(raw)?)))
}

// =============================================================================
// Bridges
// =============================================================================

fn repo_bridge(
    args: &PluginArgs,
    domain: Domain,
    factory: fn(&RawConfig) -> opsorch_core::Result<Backend>,
) -> anyhow::Result<Bridge> {
    let bridge = match args.load_config_file()? {
        Some(raw) => {
            info!(domain = domain.name(), "Binding adapter from config file");
            Bridge::ready(factory(&raw)?)
        }
        None => Bridge::lazy(domain, factory),
    };

    Ok(bridge
        .with_error_format(ErrorFormat::Text)
        .with_decode_error_policy(args.decode_error_policy()))
}

/// Bridge for the ticket plugin.
pub fn ticket_bridge(args: &PluginArgs) -> anyhow::Result<Bridge> {
    repo_bridge(args, Domain::Ticket, ticket_backend)
}

/// Bridge for the deployment plugin.
pub fn deployment_bridge(args: &PluginArgs) -> anyhow::Result<Bridge> {
    repo_bridge(args, Domain::Deployment, deployment_backend)
}

/// Bridge for the team plugin.
///
/// `config_json` (from the environment) takes precedence over `--config-file`.
/// Fails when neither is present or the configuration is invalid.
pub fn team_bridge(args: &PluginArgs, config_json: Option<&str>) -> anyhow::Result<Bridge> {
    let raw = match config_json {
        Some(json) => RawConfig::from_json_str(json)
            .with_context(|| format!("Invalid {}", TEAM_CONFIG_ENV))?,
        None => match args.load_config_file()? {
            Some(raw) => raw,
            None => bail!("{} environment variable is required", TEAM_CONFIG_ENV),
        },
    };

    let backend = team_backend(&raw)?;
    info!("Team adapter bound at startup");

    Ok(Bridge::ready(backend)
        .with_error_format(ErrorFormat::Structured)
        .with_decode_error_policy(args.decode_error_policy()))
}
