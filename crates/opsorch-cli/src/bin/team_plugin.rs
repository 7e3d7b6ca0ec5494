//! OpsOrch team plugin backed by GitHub organization teams.

use clap::Parser;
use opsorch_cli::{init_logging, team_bridge, PluginArgs};

#[derive(Parser)]
#[command(name = "opsorch-github-team-plugin")]
#[command(version = "v1.0.0", about = "Serve GitHub teams as OpsOrch teams over stdio")]
struct Cli {
    /// Adapter configuration as a JSON object
    #[arg(long, env = "OPSORCH_TEAM_CONFIG", hide_env_values = true)]
    config: Option<String>,

    #[command(flatten)]
    plugin: PluginArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.plugin.verbose);

    let mut bridge = team_bridge(&cli.plugin, cli.config.as_deref())?;
    bridge.serve_stdio().await?;

    Ok(())
}
