//! Repeating timer on the calling thread's CFRunLoop.
//!
//! `RunLoopTimer` implements `Timer`. The timer is added in
//! `kCFRunLoopCommonModes`, so it keeps firing while a menu is tracked or a
//! modal panel runs the loop in a non-default mode.
//!
//! Memory ownership:
//!   The boxed callback is leaked into the timer context's `info` pointer when
//!   armed and reclaimed in `disarm()`, right after `CFRunLoopTimerInvalidate`.
//!   Invalidation is synchronous on the owning thread, so the callback can no
//!   longer be entered once `disarm()` returns.

use std::ffi::c_void;
use std::time::Duration;

use crate::platform::{PlatformError, Timer};

// ---------------------------------------------------------------------------
// Raw FFI types and declarations
// ---------------------------------------------------------------------------

type CFRunLoopRef = *mut c_void;
type CFRunLoopTimerRef = *mut c_void;
type CFStringRef = *const c_void;
type CFAbsoluteTime = f64;
type CFTimeInterval = f64;

/// Signature required by CFRunLoopTimerCreate for the C callback.
type CFRunLoopTimerCallBack = unsafe extern "C" fn(timer: CFRunLoopTimerRef, info: *mut c_void);

/// Copied by CFRunLoopTimerCreate; only `info` is used.
#[repr(C)]
struct CFRunLoopTimerContext {
    version: isize,
    info: *mut c_void,
    retain: Option<unsafe extern "C" fn(*const c_void) -> *const c_void>,
    release: Option<unsafe extern "C" fn(*const c_void)>,
    copy_description: Option<unsafe extern "C" fn(*const c_void) -> CFStringRef>,
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFAbsoluteTimeGetCurrent() -> CFAbsoluteTime;

    fn CFRunLoopTimerCreate(
        allocator: *const c_void,
        fire_date: CFAbsoluteTime,
        interval: CFTimeInterval,
        flags: usize,
        order: isize,
        callout: CFRunLoopTimerCallBack,
        context: *mut CFRunLoopTimerContext,
    ) -> CFRunLoopTimerRef;

    fn CFRunLoopTimerInvalidate(timer: CFRunLoopTimerRef);

    fn CFRunLoopGetCurrent() -> CFRunLoopRef;

    fn CFRunLoopAddTimer(rl: CFRunLoopRef, timer: CFRunLoopTimerRef, mode: CFStringRef);

    fn CFRunLoopRun();

    fn CFRunLoopRunInMode(
        mode: CFStringRef,
        seconds: CFTimeInterval,
        return_after_source_handled: bool,
    ) -> i32;

    fn CFRelease(cf: *const c_void);

    static kCFRunLoopCommonModes: CFStringRef;
    static kCFRunLoopDefaultMode: CFStringRef;
}

// ---------------------------------------------------------------------------
// Callback state
// ---------------------------------------------------------------------------

type FireCallback = Box<dyn FnMut()>;

/// A timer currently scheduled on the run loop.
struct ArmedTimer {
    timer: CFRunLoopTimerRef,
    callback: *mut FireCallback,
}

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// A single repeating CFRunLoopTimer, re-armable after `disarm()`.
pub struct RunLoopTimer {
    armed: Option<ArmedTimer>,
}

impl RunLoopTimer {
    pub fn new() -> Self {
        Self { armed: None }
    }
}

// ---------------------------------------------------------------------------
// Timer trait impl
// ---------------------------------------------------------------------------

impl Timer for RunLoopTimer {
    fn arm(&mut self, interval: Duration, on_fire: FireCallback) -> Result<(), PlatformError> {
        if self.armed.is_some() {
            return Err(PlatformError::Other("timer is already armed".into()));
        }

        let seconds = interval.as_secs_f64();
        let callback = Box::into_raw(Box::new(on_fire));
        let mut context = CFRunLoopTimerContext {
            version: 0,
            info: callback.cast::<c_void>(),
            retain: None,
            release: None,
            copy_description: None,
        };

        let timer = unsafe {
            CFRunLoopTimerCreate(
                std::ptr::null(),
                CFAbsoluteTimeGetCurrent() + seconds,
                seconds,
                0,
                0,
                timer_callback,
                &mut context,
            )
        };

        if timer.is_null() {
            drop(unsafe { Box::from_raw(callback) });
            return Err(PlatformError::Other(
                "CFRunLoopTimerCreate returned null".into(),
            ));
        }

        unsafe { CFRunLoopAddTimer(CFRunLoopGetCurrent(), timer, kCFRunLoopCommonModes) };
        log::debug!("timer: armed every {:.3}s", seconds);

        self.armed = Some(ArmedTimer { timer, callback });
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(ArmedTimer { timer, callback }) = self.armed.take() {
            unsafe {
                CFRunLoopTimerInvalidate(timer);
                CFRelease(timer.cast::<c_void>());
                drop(Box::from_raw(callback));
            }
            log::debug!("timer: invalidated");
        }
    }

    fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for RunLoopTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

// ---------------------------------------------------------------------------
// C callback
// ---------------------------------------------------------------------------

/// Called by the run loop on the owning thread for each firing.
unsafe extern "C" fn timer_callback(_timer: CFRunLoopTimerRef, info: *mut c_void) {
    let callback = &mut *(info as *mut FireCallback);
    callback();
}

// ---------------------------------------------------------------------------
// Run loop driver
// ---------------------------------------------------------------------------

/// Runs the current thread's run loop, returning after `duration` if given.
pub fn run_current_loop(duration: Option<Duration>) {
    match duration {
        Some(duration) => unsafe {
            CFRunLoopRunInMode(kCFRunLoopDefaultMode, duration.as_secs_f64(), false);
        },
        None => unsafe { CFRunLoopRun() },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[link(name = "CoreFoundation", kind = "framework")]
    extern "C" {
        fn CFRunLoopContainsTimer(
            rl: CFRunLoopRef,
            timer: CFRunLoopTimerRef,
            mode: CFStringRef,
        ) -> bool;
    }

    fn counting_callback(count: &Rc<Cell<u32>>) -> FireCallback {
        let count = Rc::clone(count);
        Box::new(move || count.set(count.get() + 1))
    }

    /// Spins the current thread's run loop in the default mode.
    fn spin(seconds: f64) {
        unsafe { CFRunLoopRunInMode(kCFRunLoopDefaultMode, seconds, false) };
    }

    #[test]
    fn new_timer_is_disarmed() {
        let timer = RunLoopTimer::new();
        assert!(!timer.is_armed());
    }

    /// Disarming a timer that was never armed must not touch the run loop.
    #[test]
    fn disarm_on_unarmed_timer_is_noop() {
        let mut timer = RunLoopTimer::new();
        timer.disarm();
        assert!(!timer.is_armed());
    }

    #[test]
    fn armed_timer_fires_repeatedly_and_stops_on_disarm() {
        let count = Rc::new(Cell::new(0));
        let mut timer = RunLoopTimer::new();

        timer
            .arm(Duration::from_millis(10), counting_callback(&count))
            .unwrap();
        assert!(timer.is_armed());
        spin(0.055);
        let fired = count.get();
        assert!(fired >= 2, "fired {fired} times in 55ms");

        timer.disarm();
        assert!(!timer.is_armed());
        spin(0.03);
        assert_eq!(count.get(), fired);

        timer
            .arm(Duration::from_millis(10), counting_callback(&count))
            .unwrap();
        spin(0.035);
        assert!(count.get() > fired);
    }

    #[test]
    fn second_arm_is_rejected() {
        let count = Rc::new(Cell::new(0));
        let mut timer = RunLoopTimer::new();
        timer
            .arm(Duration::from_millis(10), counting_callback(&count))
            .unwrap();

        let again = timer.arm(Duration::from_millis(10), counting_callback(&count));

        assert!(matches!(again, Err(PlatformError::Other(_))));
        assert!(timer.is_armed());
    }

    #[test]
    fn armed_timer_is_registered_in_common_modes() {
        let count = Rc::new(Cell::new(0));
        let mut timer = RunLoopTimer::new();
        timer
            .arm(Duration::from_secs(60), counting_callback(&count))
            .unwrap();

        let armed = timer.armed.as_ref().unwrap();
        let registered = unsafe {
            CFRunLoopContainsTimer(CFRunLoopGetCurrent(), armed.timer, kCFRunLoopCommonModes)
        };

        assert!(registered);
        assert_eq!(count.get(), 0);
    }
}
