//! Character-by-character typing for editors that refuse pasted text.

use dom_port::{DomEvent, DomPort, EditCommand, ElementRef, KeyInput};
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::errors::CommitError;
use crate::policy::CommitTimings;

/// Focus, clear, then replay every character as keydown / `insertText` / keyup.
pub(crate) async fn type_text(
    port: &dyn DomPort,
    element: &ElementRef,
    text: &str,
    timings: &CommitTimings,
) -> Result<(), CommitError> {
    port.focus(element).await?;
    sleep(timings.focus_delay()).await;
    port.clear_content(element).await?;
    sleep(timings.focus_delay()).await;

    for ch in text.chars() {
        let key = KeyInput::for_char(ch);
        port.dispatch(element, DomEvent::KeyDown(key.clone())).await?;
        let inserted = port
            .exec_command(EditCommand::InsertText(ch.to_string()))
            .await?;
        if !inserted {
            trace!(%element, "insertText reported no change");
        }
        port.dispatch(element, DomEvent::KeyUp(key)).await?;
        sleep(timings.keystroke_delay()).await;
    }

    port.dispatch(element, DomEvent::Input).await?;
    port.dispatch(element, DomEvent::Change).await?;
    debug!(%element, chars = text.chars().count(), "typing emulation finished");
    Ok(())
}
