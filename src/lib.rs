//! aipanel library
//!
//! Configuration loading and the multi-site relay used by the `aipanel` binary.

pub mod config;
pub mod errors;
pub mod relay;

pub use config::{AppConfig, LoadedConfig, LoggingConfig};
pub use errors::{ConfigError, RelayError};
pub use relay::{AnswerStatus, PageFactory, Relay, RelayReport, SiteAnswer};
