//! Page access port used by every aipanel component.
//!
//! Components never touch a browser directly: they go through [`DomPort`], which exposes the
//! handful of DOM operations the adapters need (queries, snapshots, synthetic events, editing
//! commands, mutation subscriptions). [`MemoryDom`] is an in-process document that implements
//! the port for tests and demos; the CDP-backed implementation lives in `cdp-adapter`.

pub mod errors;
pub mod events;
pub mod memory;
pub mod port;
pub mod selector;
pub mod types;

pub use errors::DomError;
pub use events::{DomEvent, EditCommand, EventFlags, KeyInput, MouseKind, PointerKind};
pub use memory::{DomAction, ElementSpec, MemoryDom};
pub use port::{DomPort, MutationRecord, MutationStream, ReadyState};
pub use selector::{SelectorError, SelectorList};
pub use types::{ComputedStyle, ElementRef, ElementSnapshot, Point, Rect};
