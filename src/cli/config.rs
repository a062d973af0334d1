use anyhow::Result;
use clap::{Args, Subcommand};

use super::context::CliContext;
use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show which configuration file is used
    Path,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let format = match ctx.output() {
                OutputFormat::Human => OutputFormat::Yaml,
                other => other,
            };
            if matches!(ctx.output(), OutputFormat::Human) {
                println!("Current configuration ({}):", ctx.config_path().display());
            }
            emit(format, ctx.config(), String::new)?;
        }
        ConfigAction::Path => {
            let state = if ctx.config_from_file() {
                "loaded"
            } else {
                "not found, defaults in use"
            };
            println!("{} ({state})", ctx.config_path().display());
        }
    }
    Ok(())
}
