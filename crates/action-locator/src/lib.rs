//! Element location for the site adapters.
//!
//! This crate turns an ordered list of candidate selectors into one usable element:
//! - Visibility oracle (computed style + layout box)
//! - Selector pass in priority order (earlier selector wins, never DOM position)
//! - Keyword fallback over a broader element class, ranked by typed matchers

pub mod errors;
pub mod resolver;
pub mod strategies;
pub mod types;
pub mod visibility;

pub use errors::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
pub use visibility::*;
