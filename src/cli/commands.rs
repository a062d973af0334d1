use clap::Subcommand;

use super::ask::AskArgs;
use super::config::ConfigArgs;
use super::sites::SitesArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Ask one question on several chat sites and cross-reference the replies
    Ask(AskArgs),

    /// List registered site profiles
    Sites(SitesArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}
