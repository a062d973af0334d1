//! Per-site chat adapter.
//!
//! Drives one page through locate → commit → settle → submit → arm observer, guarded by a
//! sending flag that is released on a cooldown timer however the pipeline ends.

mod adapter;
mod config;
mod errors;
pub mod profiles;
mod registry;
mod session;
mod stage;

pub use adapter::{InjectOutcome, SiteAdapter};
pub use config::{AdapterConfig, AdapterTimings};
pub use errors::AdapterError;
pub use registry::ProfileRegistry;
pub use session::{InjectionSession, SendingFlag, SendingLease};
pub use stage::InjectionStage;
