use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to an element owned by a [`crate::DomPort`] implementation.
///
/// Handles are cheap to clone and may go stale when the host page removes the node.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Resolved style values as `getComputedStyle` reports them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

/// Point-in-time view of one element, enough to rank and classify it without further
/// round trips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub element: ElementRef,
    /// Lower-cased tag name.
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// `textContent` of the element.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: ComputedStyle,
    /// `offsetParent !== null`.
    #[serde(default)]
    pub has_layout: bool,
    #[serde(default)]
    pub rect: Option<Rect>,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or_default()
    }

    pub fn is_text_control(&self) -> bool {
        matches!(self.tag.as_str(), "textarea" | "input")
    }

    pub fn is_content_editable(&self) -> bool {
        matches!(
            self.attr("contenteditable"),
            Some("") | Some("true") | Some("plaintext-only")
        )
    }

    pub fn center(&self) -> Option<Point> {
        self.rect.map(|rect| rect.center())
    }
}
