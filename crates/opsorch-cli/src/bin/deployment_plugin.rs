//! OpsOrch deployment plugin backed by GitHub Actions workflow runs.

use clap::Parser;
use opsorch_cli::{deployment_bridge, init_logging, PluginArgs};

#[derive(Parser)]
#[command(name = "opsorch-github-deployment-plugin")]
#[command(
    version = "v1.0.0",
    about = "Serve GitHub Actions workflow runs as OpsOrch deployments over stdio"
)]
struct Cli {
    #[command(flatten)]
    plugin: PluginArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.plugin.verbose);

    let mut bridge = deployment_bridge(&cli.plugin)?;
    bridge.serve_stdio().await?;

    Ok(())
}
