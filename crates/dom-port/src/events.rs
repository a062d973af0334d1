use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::Point;

bitflags! {
    /// Event init flags applied when a synthetic event is constructed.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct EventFlags: u8 {
        const BUBBLES = 0b0001;
        const CANCELABLE = 0b0010;
    }
}

/// Key description carried by synthetic keyboard events.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
    pub code: String,
    pub key_code: u32,
}

impl KeyInput {
    pub fn enter() -> Self {
        Self {
            key: "Enter".to_string(),
            code: "Enter".to_string(),
            key_code: 13,
        }
    }

    pub fn space() -> Self {
        Self {
            key: " ".to_string(),
            code: "Space".to_string(),
            key_code: 32,
        }
    }

    pub fn for_char(ch: char) -> Self {
        Self {
            key: ch.to_string(),
            code: format!("Key{}", ch.to_uppercase()),
            key_code: ch as u32,
        }
    }

    /// Keyboard event without any key information, used as a change-detection nudge.
    pub fn bare() -> Self {
        Self {
            key: String::new(),
            code: String::new(),
            key_code: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseKind {
    Over,
    Move,
    Down,
    Up,
    Click,
}

/// Synthetic DOM events the adapters dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomEvent {
    Input,
    Change,
    KeyDown(KeyInput),
    KeyPress(KeyInput),
    KeyUp(KeyInput),
    Paste { text: String },
    Pointer { phase: PointerKind, at: Point },
    Mouse { phase: MouseKind, at: Point },
}

impl DomEvent {
    /// DOM event type name (`input`, `keydown`, `pointerdown`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::KeyDown(_) => "keydown",
            DomEvent::KeyPress(_) => "keypress",
            DomEvent::KeyUp(_) => "keyup",
            DomEvent::Paste { .. } => "paste",
            DomEvent::Pointer { phase, .. } => match phase {
                PointerKind::Down => "pointerdown",
                PointerKind::Up => "pointerup",
            },
            DomEvent::Mouse { phase, .. } => match phase {
                MouseKind::Over => "mouseover",
                MouseKind::Move => "mousemove",
                MouseKind::Down => "mousedown",
                MouseKind::Up => "mouseup",
                MouseKind::Click => "click",
            },
        }
    }

    pub fn flags(&self) -> EventFlags {
        match self {
            DomEvent::Input | DomEvent::Change => EventFlags::BUBBLES,
            _ => EventFlags::BUBBLES | EventFlags::CANCELABLE,
        }
    }
}

/// `document.execCommand` invocations.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    Paste,
    InsertText(String),
}
