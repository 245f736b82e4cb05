//! Platform abstraction layer.
//!
//! Defines the OS seams used by the portable core: `InputBackend` (event
//! synthesis and cursor queries), `PermissionGate` (accessibility trust) and
//! `Timer` (a repeating run-loop timer). Platform-specific implementations
//! live in child modules and are reached through the factory functions below.

use std::ops::BitOr;
use std::rc::Rc;
use std::time::Duration;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod unsupported;

#[cfg(target_os = "macos")]
use macos as backend;
#[cfg(not(target_os = "macos"))]
use unsupported as backend;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("platform unavailable: {0}")]
    Unavailable(String),
    #[error("could not create {0} event")]
    EventCreationFailed(&'static str),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A global screen coordinate in points.
///
/// The same type carries both conventions used on macOS; which one applies is
/// stated by whoever produces the value. Cursor queries and bridge callers use
/// origin bottom-left of the primary display, event posting uses origin
/// top-left.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirrors the point vertically around the primary display.
    ///
    /// `y' = display_height - y`. The mapping is its own inverse, so it
    /// converts bottom-left to top-left and back.
    pub fn flipped(self, display_height: f64) -> Self {
        Self {
            x: self.x,
            y: display_height - self.y,
        }
    }
}

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// Left mouse button transitions. Only the left button is ever synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    LeftDown,
    LeftUp,
}

/// Named modifier keys accepted by key-press requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Command,
    Alt,
    Shift,
    Control,
}

impl Modifier {
    /// Parses the lowercase names used by UI callers. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "command" => Some(Modifier::Command),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "control" => Some(Modifier::Control),
            _ => None,
        }
    }

    pub fn flag(self) -> ModifierFlags {
        match self {
            Modifier::Command => ModifierFlags::COMMAND,
            Modifier::Alt => ModifierFlags::ALTERNATE,
            Modifier::Shift => ModifierFlags::SHIFT,
            Modifier::Control => ModifierFlags::CONTROL,
        }
    }
}

/// Modifier bitmask. Bit values match `CGEventFlags` so the macOS backend can
/// pass them through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags(u64);

impl ModifierFlags {
    pub const SHIFT: Self = Self(0x0002_0000);
    pub const CONTROL: Self = Self(0x0004_0000);
    pub const ALTERNATE: Self = Self(0x0008_0000);
    pub const COMMAND: Self = Self(0x0010_0000);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn from_modifiers(modifiers: &[Modifier]) -> Self {
        modifiers
            .iter()
            .fold(Self::empty(), |flags, m| flags | m.flag())
    }
}

impl BitOr for ModifierFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// OS primitives for synthesizing and observing input.
pub trait InputBackend {
    /// Live cursor location, origin bottom-left of the primary display.
    /// `None` when the OS cannot report it.
    fn cursor_location(&self) -> Option<ScreenPoint>;

    /// Height of the primary display in points, if one is attached.
    fn primary_display_height(&self) -> Option<f64>;

    /// Posts a mouse event at `point` (origin top-left).
    fn post_mouse(&self, kind: MouseEventKind, point: ScreenPoint) -> Result<(), PlatformError>;

    /// Posts a key event. `flags: None` keeps whatever flags the OS assigns
    /// on creation; `Some` overwrites them.
    fn post_key(
        &self,
        key_code: u16,
        key_down: bool,
        flags: Option<ModifierFlags>,
    ) -> Result<(), PlatformError>;

    /// Whether the left mouse button is currently held.
    fn is_left_button_pressed(&self) -> bool;
}

impl<T: InputBackend + ?Sized> InputBackend for Rc<T> {
    fn cursor_location(&self) -> Option<ScreenPoint> {
        (**self).cursor_location()
    }

    fn primary_display_height(&self) -> Option<f64> {
        (**self).primary_display_height()
    }

    fn post_mouse(&self, kind: MouseEventKind, point: ScreenPoint) -> Result<(), PlatformError> {
        (**self).post_mouse(kind, point)
    }

    fn post_key(
        &self,
        key_code: u16,
        key_down: bool,
        flags: Option<ModifierFlags>,
    ) -> Result<(), PlatformError> {
        (**self).post_key(key_code, key_down, flags)
    }

    fn is_left_button_pressed(&self) -> bool {
        (**self).is_left_button_pressed()
    }
}

/// Accessibility trust check.
pub trait PermissionGate {
    /// Returns the current trust status. When `prompt_if_needed` is set and the
    /// process is untrusted, the OS may show its consent dialog; the returned
    /// value still reflects the status at call time.
    fn check_permission(&self, prompt_if_needed: bool) -> bool;
}

impl<T: PermissionGate + ?Sized> PermissionGate for Rc<T> {
    fn check_permission(&self, prompt_if_needed: bool) -> bool {
        (**self).check_permission(prompt_if_needed)
    }
}

/// A single repeating timer bound to the calling thread's event loop.
///
/// At most one callback is armed at a time. `disarm()` must guarantee that no
/// callback runs after it returns.
pub trait Timer {
    fn arm(&mut self, interval: Duration, on_fire: Box<dyn FnMut()>)
        -> Result<(), PlatformError>;

    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Returns the event-synthesis backend for this OS.
pub fn create_input_backend() -> Result<Box<dyn InputBackend>, PlatformError> {
    backend::create_input_backend()
}

/// Returns the accessibility permission gate for this OS.
pub fn create_permission_gate() -> Result<Box<dyn PermissionGate>, PlatformError> {
    backend::create_permission_gate()
}

/// Returns a repeating timer attached to the current thread's run loop.
pub fn create_timer() -> Result<Box<dyn Timer>, PlatformError> {
    backend::create_timer()
}

/// Drives the current thread's event loop, forever when `duration` is `None`.
pub fn run_event_loop(duration: Option<Duration>) -> Result<(), PlatformError> {
    backend::run_event_loop(duration)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipping_converts_bottom_left_to_top_left() {
        let height = 900.0;
        for k in [0.0, 1.0, 250.5, 899.0, 900.0] {
            let converted = ScreenPoint::new(42.0, height - k).flipped(height);
            assert_eq!(converted, ScreenPoint::new(42.0, k), "k = {k}");
        }
    }

    #[test]
    fn flipping_twice_is_identity() {
        let p = ScreenPoint::new(10.0, 300.25);
        assert_eq!(p.flipped(1080.0).flipped(1080.0), p);
    }

    #[test]
    fn modifier_names_parse() {
        assert_eq!(Modifier::from_name("command"), Some(Modifier::Command));
        assert_eq!(Modifier::from_name("alt"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_name("shift"), Some(Modifier::Shift));
        assert_eq!(Modifier::from_name("control"), Some(Modifier::Control));
        assert_eq!(Modifier::from_name("Command"), None);
        assert_eq!(Modifier::from_name("fn"), None);
    }

    #[test]
    fn flags_use_cg_event_bit_values() {
        let flags = ModifierFlags::from_modifiers(&[Modifier::Command, Modifier::Shift]);
        assert_eq!(flags.bits(), 0x0010_0000 | 0x0002_0000);
        assert_eq!(flags, ModifierFlags::COMMAND | ModifierFlags::SHIFT);
    }

    #[test]
    fn no_modifiers_is_empty_mask() {
        assert_eq!(ModifierFlags::from_modifiers(&[]), ModifierFlags::empty());
    }
}
