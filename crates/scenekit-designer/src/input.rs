//! Pointer and keyboard events as the host delivers them.

use serde::{Deserialize, Serialize};

use scenekit_core::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event. `world` is the camera-mapped position; `screen` is the
/// raw position used for pixel thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub world: Point,
    pub screen: Point,
    #[serde(default)]
    pub button: PointerButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Primary-button event with identical world and screen positions, as
    /// with an identity camera.
    pub fn at(x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        Self {
            world: p,
            screen: p,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.button == PointerButton::Primary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name as reported by the host, e.g. `"c"`, `"Delete"`.
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Set while a text field has focus; the editor ignores the key.
    #[serde(default)]
    pub text_input_focused: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
            text_input_focused: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    pub fn is_delete(&self) -> bool {
        self.is("delete") || self.is("backspace")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::ctrl().command());
        assert!(Modifiers {
            meta: true,
            ..Modifiers::NONE
        }
        .command());
        assert!(!Modifiers::shift().command());
    }

    #[test]
    fn test_key_matching_ignores_case() {
        assert!(KeyEvent::new("C").is("c"));
        assert!(KeyEvent::new("Backspace").is_delete());
        assert!(!KeyEvent::new("Enter").is_delete());
    }
}
