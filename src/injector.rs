//! Click and keyboard injection on top of an `InputBackend`.
//!
//! Callers speak the bottom-left coordinate convention; the injector flips to
//! the top-left convention expected by event posting. Event creation failures
//! are swallowed: a click or key press that cannot be built simply does not
//! happen.

use crate::keys;
use crate::platform::{InputBackend, Modifier, ModifierFlags, MouseEventKind, ScreenPoint};

/// Where a click lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTarget {
    /// The live cursor position, read when the click is performed.
    Cursor,
    /// A fixed point, origin bottom-left of the primary display.
    At(ScreenPoint),
}

pub struct Injector {
    backend: Box<dyn InputBackend>,
}

impl Injector {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self { backend }
    }

    /// Posts left button down then up at the resolved target.
    ///
    /// Without a primary display there is nothing to convert against, and
    /// without a cursor reading there is nothing to click at. Either way the
    /// click is skipped.
    pub fn click(&self, target: ClickTarget) {
        let Some(height) = self.backend.primary_display_height() else {
            return;
        };
        let point = match target {
            ClickTarget::Cursor => match self.backend.cursor_location() {
                Some(point) => point,
                None => return,
            },
            ClickTarget::At(point) => point,
        }
        .flipped(height);

        let _ = self.backend.post_mouse(MouseEventKind::LeftDown, point);
        let _ = self.backend.post_mouse(MouseEventKind::LeftUp, point);
    }

    /// Posts key down then key up, both carrying the modifier mask.
    pub fn key_press(&self, key_code: u16, modifiers: &[Modifier]) {
        let flags = Some(ModifierFlags::from_modifiers(modifiers));
        let _ = self.backend.post_key(key_code, true, flags);
        let _ = self.backend.post_key(key_code, false, flags);
    }

    /// Command-Tab: hold command, tap tab, release command.
    pub fn app_switch(&self) {
        let command = Some(ModifierFlags::COMMAND);
        let _ = self.backend.post_key(keys::COMMAND, true, None);
        let _ = self.backend.post_key(keys::TAB, true, command);
        let _ = self.backend.post_key(keys::TAB, false, command);
        let _ = self.backend.post_key(keys::COMMAND, false, None);
    }

    /// Cursor position, origin bottom-left.
    pub fn cursor_position(&self) -> Option<ScreenPoint> {
        self.backend.cursor_location()
    }

    pub fn is_left_button_pressed(&self) -> bool {
        self.backend.is_left_button_pressed()
    }
}
