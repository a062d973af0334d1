use std::sync::Arc;
use std::time::Instant;

use action_locator::Located;
use aipanel_core_types::EditorKind;
use dom_port::{DomError, DomEvent, DomPort, EditCommand, ElementRef, ElementSnapshot, KeyInput};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::errors::CommitError;
use crate::model::{CommitMode, CommitReport};
use crate::policy::CommitTimings;
use crate::typing::type_text;

/// Editor kind the element itself asks for, falling back to the declared one.
pub fn effective_kind(snapshot: &ElementSnapshot, declared: EditorKind) -> EditorKind {
    if snapshot.is_text_control() {
        EditorKind::PlainTextarea
    } else if snapshot.is_content_editable() {
        EditorKind::RichText
    } else {
        declared
    }
}

/// Writes text into a located editor so the page's framework registers it.
#[derive(Clone)]
pub struct InputCommitter {
    port: Arc<dyn DomPort>,
    timings: CommitTimings,
}

impl InputCommitter {
    pub fn new(port: Arc<dyn DomPort>, timings: CommitTimings) -> Self {
        Self { port, timings }
    }

    pub fn timings(&self) -> &CommitTimings {
        &self.timings
    }

    #[instrument(skip_all, fields(element = %target.element, chars = text.chars().count()))]
    pub async fn commit(
        &self,
        target: &Located,
        declared: EditorKind,
        text: &str,
    ) -> Result<CommitReport, CommitError> {
        let started = Instant::now();
        let element = &target.element;
        let mode = match effective_kind(&target.snapshot, declared) {
            EditorKind::PlainTextarea => {
                self.commit_native(element, text).await?;
                CommitMode::NativeValue
            }
            EditorKind::RichText => self.commit_rich(element, text).await?,
        };
        info!(mode = mode.as_str(), "text committed");
        Ok(CommitReport::new(mode, text, started).finish(Instant::now()))
    }

    /// The pause a caller must take between commit and submission.
    pub async fn settle(&self) {
        sleep(self.timings.settle()).await;
    }

    async fn commit_native(&self, element: &ElementRef, text: &str) -> Result<(), CommitError> {
        self.port.focus(element).await?;
        self.port
            .set_native_value(element, text)
            .await
            .map_err(|err| match err {
                DomError::Unsupported(_) => CommitError::NotEditable(element.to_string()),
                other => other.into(),
            })?;
        self.port.dispatch(element, DomEvent::Input).await?;
        self.port.dispatch(element, DomEvent::Change).await?;
        self.port
            .dispatch(element, DomEvent::KeyDown(KeyInput::bare()))
            .await?;
        Ok(())
    }

    async fn commit_rich(&self, element: &ElementRef, text: &str) -> Result<CommitMode, CommitError> {
        self.port.focus(element).await?;
        if let Err(err) = self.paste(element, text).await {
            warn!(error = %err, "paste path failed, falling back to typing");
            type_text(self.port.as_ref(), element, text, &self.timings).await?;
            return Ok(CommitMode::TypingEmulation);
        }
        Ok(CommitMode::ClipboardPaste)
    }

    async fn paste(&self, element: &ElementRef, text: &str) -> Result<(), DomError> {
        self.port.clipboard_write(text).await?;
        sleep(self.timings.paste_delay()).await;
        self.port
            .dispatch(
                element,
                DomEvent::Paste {
                    text: text.to_string(),
                },
            )
            .await?;
        let pasted = self.port.exec_command(EditCommand::Paste).await?;
        debug!(pasted, "execCommand('paste') issued");
        Ok(())
    }
}
