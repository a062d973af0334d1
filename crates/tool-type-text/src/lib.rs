//! Input committer.
//!
//! Framework-managed editors ignore a plain `value` assignment. Plain text controls get the
//! native setter followed by synthetic `input`/`change`/`keydown`; rich-text hosts get a
//! clipboard paste, and typing emulation when the clipboard is out of reach.

pub mod errors;
pub mod model;
pub mod policy;

mod runner;
mod typing;

pub use errors::CommitError;
pub use model::{CommitMode, CommitReport};
pub use policy::CommitTimings;
pub use runner::{effective_kind, InputCommitter};
