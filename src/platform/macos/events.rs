//! macOS input backend via CGEventPost.
//!
//! `MacOSInput` implements `InputBackend`. Posting is synchronous:
//! `CGEventPost` hands the event to the window server before returning, so no
//! background thread is needed. Each call creates a `CGEvent`, posts it and
//! releases it immediately.

use std::ffi::c_void;

use crate::platform::{InputBackend, ModifierFlags, MouseEventKind, PlatformError, ScreenPoint};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// CGEventTapLocation: kCGHIDEventTap -- inject where hardware events enter,
/// so every session-level consumer sees the click.
const CG_HID_EVENT_TAP: u32 = 0;

/// CGEventType values for the left button.
const CG_EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const CG_EVENT_LEFT_MOUSE_UP: u32 = 2;

/// CGMouseButton: kCGMouseButtonLeft.
const CG_MOUSE_BUTTON_LEFT: u32 = 0;

/// kCGEventSourceStateCombinedSessionState: hardware and posted events together.
const CG_EVENT_SOURCE_STATE_COMBINED_SESSION: i32 = 0;

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

type CGEventRef = *mut c_void;
type CGEventSourceRef = *mut c_void;
type CGDirectDisplayID = u32;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
struct CGSize {
    width: f64,
    height: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
struct CGRect {
    origin: CGPoint,
    size: CGSize,
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventCreate(source: CGEventSourceRef) -> CGEventRef;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventCreateMouseEvent(
        source: CGEventSourceRef,
        mouse_type: u32,
        position: CGPoint,
        button: u32,
    ) -> CGEventRef;
    fn CGEventCreateKeyboardEvent(
        source: CGEventSourceRef,
        virtual_key: u16,
        key_down: bool,
    ) -> CGEventRef;
    fn CGEventSetFlags(event: CGEventRef, flags: u64);
    fn CGEventPost(tap_location: u32, event: CGEventRef);
    fn CGEventSourceButtonState(state_id: i32, button: u32) -> bool;
    fn CGMainDisplayID() -> CGDirectDisplayID;
    fn CGDisplayBounds(display: CGDirectDisplayID) -> CGRect;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: *const c_void);
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Synthesizes mouse and keyboard events with Core Graphics.
pub struct MacOSInput;

impl MacOSInput {
    pub fn new() -> Self {
        MacOSInput
    }
}

fn mouse_event_type(kind: MouseEventKind) -> u32 {
    match kind {
        MouseEventKind::LeftDown => CG_EVENT_LEFT_MOUSE_DOWN,
        MouseEventKind::LeftUp => CG_EVENT_LEFT_MOUSE_UP,
    }
}

/// Posts and releases a freshly created event.
///
/// # Safety
/// `event` must be a non-null CGEventRef owned by the caller.
unsafe fn post_and_release(event: CGEventRef) {
    CGEventPost(CG_HID_EVENT_TAP, event);
    CFRelease(event.cast::<c_void>());
}

// ---------------------------------------------------------------------------
// InputBackend trait impl
// ---------------------------------------------------------------------------

impl InputBackend for MacOSInput {
    /// Reads the cursor through an empty CGEvent, which reports top-left
    /// coordinates, and flips it to the bottom-left convention.
    fn cursor_location(&self) -> Option<ScreenPoint> {
        let top_left = unsafe {
            let event = CGEventCreate(std::ptr::null_mut());
            if event.is_null() {
                return None;
            }
            let location = CGEventGetLocation(event);
            CFRelease(event.cast::<c_void>());
            ScreenPoint::new(location.x, location.y)
        };

        Some(match self.primary_display_height() {
            Some(height) => top_left.flipped(height),
            None => top_left,
        })
    }

    fn primary_display_height(&self) -> Option<f64> {
        let bounds = unsafe { CGDisplayBounds(CGMainDisplayID()) };
        (bounds.size.height > 0.0).then_some(bounds.size.height)
    }

    fn post_mouse(&self, kind: MouseEventKind, point: ScreenPoint) -> Result<(), PlatformError> {
        let position = CGPoint {
            x: point.x,
            y: point.y,
        };

        unsafe {
            let event = CGEventCreateMouseEvent(
                std::ptr::null_mut(),
                mouse_event_type(kind),
                position,
                CG_MOUSE_BUTTON_LEFT,
            );
            if event.is_null() {
                return Err(PlatformError::EventCreationFailed("mouse"));
            }
            post_and_release(event);
        }

        log::debug!("input: posted {:?} at ({}, {})", kind, point.x, point.y);
        Ok(())
    }

    fn post_key(
        &self,
        key_code: u16,
        key_down: bool,
        flags: Option<ModifierFlags>,
    ) -> Result<(), PlatformError> {
        unsafe {
            let event = CGEventCreateKeyboardEvent(std::ptr::null_mut(), key_code, key_down);
            if event.is_null() {
                return Err(PlatformError::EventCreationFailed("keyboard"));
            }
            if let Some(flags) = flags {
                CGEventSetFlags(event, flags.bits());
            }
            post_and_release(event);
        }

        log::debug!(
            "input: posted key {} {} flags={:?}",
            key_code,
            if key_down { "down" } else { "up" },
            flags
        );
        Ok(())
    }

    fn is_left_button_pressed(&self) -> bool {
        unsafe {
            CGEventSourceButtonState(CG_EVENT_SOURCE_STATE_COMBINED_SESSION, CG_MOUSE_BUTTON_LEFT)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
