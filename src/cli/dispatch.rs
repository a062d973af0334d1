use anyhow::Result;

use super::ask::cmd_ask;
use super::commands::Commands;
use super::config::cmd_config;
use super::context::CliContext;
use super::env::CliArgs;
use super::sites::cmd_sites;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Ask(args) => cmd_ask(args, ctx).await,
        Commands::Sites(args) => cmd_sites(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}
