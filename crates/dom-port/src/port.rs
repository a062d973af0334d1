use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::DomError;
use crate::events::{DomEvent, EditCommand};
use crate::types::{ElementRef, ElementSnapshot};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_loading(self) -> bool {
        matches!(self, ReadyState::Loading)
    }
}

/// One child-list change observed under a watched root.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationRecord {
    pub target: ElementRef,
    pub added_nodes: usize,
}

pub type MutationStream = mpsc::UnboundedReceiver<MutationRecord>;

/// Operations the adapters perform against a page.
///
/// Every element-scoped call fails with [`DomError::StaleElement`] once the element has been
/// detached; callers re-locate instead of retrying the stale handle.
#[async_trait]
pub trait DomPort: Send + Sync {
    /// All connected elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError>;

    /// `document.querySelector`.
    async fn query_first(&self, selector: &str) -> Result<Option<ElementRef>, DomError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn snapshot(&self, element: &ElementRef) -> Result<ElementSnapshot, DomError>;

    async fn body(&self) -> Result<ElementRef, DomError>;

    /// Nearest inclusive ancestor matching `selector`.
    async fn closest(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, DomError>;

    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, DomError>;

    async fn text_content(&self, element: &ElementRef) -> Result<String, DomError>;

    async fn focus(&self, element: &ElementRef) -> Result<(), DomError>;

    /// Writes through the prototype's native `value` setter, bypassing framework overrides.
    async fn set_native_value(&self, element: &ElementRef, value: &str) -> Result<(), DomError>;

    /// Removes every child of a contenteditable host.
    async fn clear_content(&self, element: &ElementRef) -> Result<(), DomError>;

    async fn dispatch(&self, element: &ElementRef, event: DomEvent) -> Result<(), DomError>;

    /// `element.click()`.
    async fn activate(&self, element: &ElementRef) -> Result<(), DomError>;

    /// Calls a click handler stored on the element's framework instance properties.
    /// Returns `false` when the element carries no such handler.
    async fn invoke_framework_handler(&self, element: &ElementRef) -> Result<bool, DomError>;

    /// Writes plain text to the system clipboard.
    async fn clipboard_write(&self, text: &str) -> Result<(), DomError>;

    /// `document.execCommand`; returns the command's boolean result.
    async fn exec_command(&self, command: EditCommand) -> Result<bool, DomError>;

    /// Toggles the manual-action highlight on a control.
    async fn set_highlight(&self, element: &ElementRef, on: bool) -> Result<(), DomError>;

    async fn ready_state(&self) -> Result<ReadyState, DomError>;

    /// Resolves once the document has left the `loading` state.
    async fn dom_content_loaded(&self) -> Result<(), DomError>;

    /// Child-list + subtree mutations under `root`. The stream ends when the port stops
    /// observing (page gone, root detached).
    async fn observe_mutations(&self, root: &ElementRef) -> Result<MutationStream, DomError>;
}
