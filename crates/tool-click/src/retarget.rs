use dom_port::{DomError, DomPort, ElementRef};
use tracing::debug;

/// Tags that render an icon but rarely own the click listener.
pub const GLYPH_TAGS: &[&str] = &["svg", "path", "use", "img", "span", "i"];

const INTERACTIVE_ANCESTOR: &str = r#"button, [role="button"]"#;

pub fn is_glyph(tag: &str) -> bool {
    GLYPH_TAGS.contains(&tag)
}

/// Moves a glyph target to the element that most likely handles the click: the site's
/// container selector, then the nearest button-like ancestor, then the parent.
pub async fn retarget(
    port: &dyn DomPort,
    element: &ElementRef,
    tag: &str,
    container: Option<&str>,
) -> Result<ElementRef, DomError> {
    if !is_glyph(tag) {
        return Ok(element.clone());
    }

    if let Some(selector) = container {
        match port.closest(element, selector).await {
            Ok(Some(found)) => {
                debug!(%element, %found, selector, "retargeted to site container");
                return Ok(found);
            }
            Ok(None) => {}
            Err(DomError::InvalidSelector { .. }) => {
                debug!(selector, "container selector rejected, skipping");
            }
            Err(err) => return Err(err),
        }
    }

    if let Some(found) = port.closest(element, INTERACTIVE_ANCESTOR).await? {
        debug!(%element, %found, "retargeted to interactive ancestor");
        return Ok(found);
    }

    Ok(port.parent(element).await?.unwrap_or_else(|| element.clone()))
}
