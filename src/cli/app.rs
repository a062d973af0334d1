use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::init_logging;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let loaded = aipanel_cli::config::load(cli.config.as_deref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.logging.level.clone());
    init_logging(&level, cli.json_logs || loaded.config.logging.json)?;

    info!("Starting aipanel v{}", env!("CARGO_PKG_VERSION"));
    info!(
        path = %loaded.path.display(),
        from_file = loaded.from_file,
        "configuration resolved"
    );

    let ctx = CliContext::new(loaded, cli.output);
    match dispatch(&cli, &ctx).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
