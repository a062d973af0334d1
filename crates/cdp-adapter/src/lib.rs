//! Chromium-backed [`dom_port::DomPort`].
//!
//! [`ChromeSession`] launches (or reuses) a browser and opens pages; each page is wrapped in a
//! [`CdpDom`] that answers port calls by evaluating small scripts against a per-page element
//! registry kept on `window`.

mod browser;
pub mod config;
mod dom;
mod errors;
mod script;

pub use browser::ChromeSession;
pub use config::CdpConfig;
pub use dom::CdpDom;
pub use errors::CdpDomError;
