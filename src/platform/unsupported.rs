//! Fallback for targets without an input backend.
//!
//! Every factory fails with `PlatformError::Unavailable` so the binary exits
//! with a clear message instead of silently doing nothing.

use std::time::Duration;

use crate::platform::{InputBackend, PermissionGate, PlatformError, Timer};

const REASON: &str = "synthetic input is only implemented for macOS";

pub fn create_input_backend() -> Result<Box<dyn InputBackend>, PlatformError> {
    Err(PlatformError::Unavailable(REASON.into()))
}

pub fn create_permission_gate() -> Result<Box<dyn PermissionGate>, PlatformError> {
    Err(PlatformError::Unavailable(REASON.into()))
}

pub fn create_timer() -> Result<Box<dyn Timer>, PlatformError> {
    Err(PlatformError::Unavailable(REASON.into()))
}

pub fn run_event_loop(_duration: Option<Duration>) -> Result<(), PlatformError> {
    Err(PlatformError::Unavailable(REASON.into()))
}
