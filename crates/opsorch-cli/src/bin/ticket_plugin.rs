//! OpsOrch ticket plugin backed by GitHub issues.

use clap::Parser;
use opsorch_cli::{init_logging, ticket_bridge, PluginArgs};

#[derive(Parser)]
#[command(name = "opsorch-github-ticket-plugin")]
#[command(version = "v1.0.0", about = "Serve GitHub issues as OpsOrch tickets over stdio")]
struct Cli {
    #[command(flatten)]
    plugin: PluginArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.plugin.verbose);

    let mut bridge = ticket_bridge(&cli.plugin)?;
    bridge.serve_stdio().await?;

    Ok(())
}
