//! Submit trigger.
//!
//! Retargets icon glyphs to their interactive container, then fires a fixed chain of
//! activation strategies. No strategy can observe whether the page accepted the submit, so
//! every report ends `Unconfirmed` and the caller flags the control for manual action.

pub mod errors;
pub mod model;
pub mod policy;
pub mod strategies;

mod retarget;
mod runner;

pub use errors::TriggerError;
pub use model::{AttemptOutcome, StrategyAttempt, TriggerReport, TriggerVerdict};
pub use policy::TriggerTimings;
pub use retarget::{is_glyph, retarget, GLYPH_TAGS};
pub use runner::SubmitTrigger;
pub use strategies::{default_chain, FireCtx, SubmitStrategy};
