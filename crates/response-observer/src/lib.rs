//! Response observer.
//!
//! There is no "done" signal for a streamed reply. The observer keeps a buffer of the latest
//! assistant text, refreshed on container mutations, and declares a reply complete once its
//! length has held still for a number of consecutive samples.

mod buffer;
mod config;
mod errors;
mod model;
mod observer;
mod stability;

pub use buffer::ResponseBuffer;
pub use config::ObserverConfig;
pub use errors::ObserverError;
pub use model::StreamOutcome;
pub use observer::{ResponseObserver, WatchHandle};
pub use stability::{Stability, StabilityTracker};
