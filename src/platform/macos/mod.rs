//! macOS platform backend.
//!
//! Injection: CGEventPost at the HID level via `MacOSInput`.
//! Permission: `AXIsProcessTrustedWithOptions` via `AccessibilityGate`.
//! Timer: CFRunLoopTimer in the common run loop modes via `RunLoopTimer`.
//!
//! Posting synthetic events requires Accessibility permission. Guide the user to:
//!   System Settings > Privacy & Security > Accessibility

mod events;
mod permission;
mod timer;

use std::time::Duration;

use events::MacOSInput;
use permission::AccessibilityGate;
use timer::RunLoopTimer;

use crate::platform::{InputBackend, PermissionGate, PlatformError, Timer};

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Returns the CGEvent-based input backend.
pub fn create_input_backend() -> Result<Box<dyn InputBackend>, PlatformError> {
    Ok(Box::new(MacOSInput::new()))
}

/// Returns the accessibility trust gate.
pub fn create_permission_gate() -> Result<Box<dyn PermissionGate>, PlatformError> {
    Ok(Box::new(AccessibilityGate))
}

/// Returns a timer bound to the calling thread's CFRunLoop.
///
/// Call this from the thread that will run the loop (normally the main thread).
pub fn create_timer() -> Result<Box<dyn Timer>, PlatformError> {
    Ok(Box::new(RunLoopTimer::new()))
}

/// Runs the calling thread's CFRunLoop.
pub fn run_event_loop(duration: Option<Duration>) -> Result<(), PlatformError> {
    timer::run_current_loop(duration);
    Ok(())
}
