//! Visibility oracle

use dom_port::{DomPort, ElementRef, ElementSnapshot};
use tracing::debug;

/// An element is usable when it is rendered, not hidden, not fully transparent and laid out.
pub fn is_visible(snapshot: &ElementSnapshot) -> bool {
    snapshot.style.display != "none"
        && snapshot.style.visibility != "hidden"
        && !is_transparent(&snapshot.style.opacity)
        && snapshot.has_layout
}

fn is_transparent(opacity: &str) -> bool {
    opacity
        .trim()
        .parse::<f64>()
        .map_or(false, |value| value == 0.0)
}

/// Snapshot `element` and apply [`is_visible`]. A stale handle is not visible.
pub async fn check_visible(port: &dyn DomPort, element: &ElementRef) -> bool {
    match port.snapshot(element).await {
        Ok(snapshot) => is_visible(&snapshot),
        Err(err) => {
            debug!(%element, error = %err, "visibility probe failed");
            false
        }
    }
}
