//! Deterministic stand-ins for the OS seams, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::platform::{
    InputBackend, ModifierFlags, MouseEventKind, PermissionGate, PlatformError, ScreenPoint, Timer,
};

// ---------------------------------------------------------------------------
// Input backend
// ---------------------------------------------------------------------------

/// Everything a `FakeInput` was asked to post, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Posted {
    Mouse(MouseEventKind, ScreenPoint),
    Key {
        code: u16,
        down: bool,
        flags: Option<ModifierFlags>,
    },
}

pub struct FakeInput {
    pub cursor: Cell<ScreenPoint>,
    /// When cleared, cursor queries fail as if the OS returned no event.
    pub cursor_available: Cell<bool>,
    pub display_height: Cell<Option<f64>>,
    pub button_pressed: Cell<bool>,
    /// When set, every post fails as if event creation returned null.
    pub fail_creation: Cell<bool>,
    pub posted: RefCell<Vec<Posted>>,
}

impl FakeInput {
    pub fn new(display_height: f64) -> Rc<Self> {
        Rc::new(Self {
            cursor: Cell::new(ScreenPoint::new(0.0, 0.0)),
            cursor_available: Cell::new(true),
            display_height: Cell::new(Some(display_height)),
            button_pressed: Cell::new(false),
            fail_creation: Cell::new(false),
            posted: RefCell::new(Vec::new()),
        })
    }

    pub fn posted(&self) -> Vec<Posted> {
        self.posted.borrow().clone()
    }

    /// Points of every mouse-down, i.e. one entry per click.
    pub fn clicks(&self) -> Vec<ScreenPoint> {
        self.posted
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Posted::Mouse(MouseEventKind::LeftDown, at) => Some(*at),
                _ => None,
            })
            .collect()
    }
}

impl InputBackend for FakeInput {
    fn cursor_location(&self) -> Option<ScreenPoint> {
        self.cursor_available.get().then(|| self.cursor.get())
    }

    fn primary_display_height(&self) -> Option<f64> {
        self.display_height.get()
    }

    fn post_mouse(&self, kind: MouseEventKind, point: ScreenPoint) -> Result<(), PlatformError> {
        if self.fail_creation.get() {
            return Err(PlatformError::EventCreationFailed("mouse"));
        }
        self.posted.borrow_mut().push(Posted::Mouse(kind, point));
        Ok(())
    }

    fn post_key(
        &self,
        key_code: u16,
        key_down: bool,
        flags: Option<ModifierFlags>,
    ) -> Result<(), PlatformError> {
        if self.fail_creation.get() {
            return Err(PlatformError::EventCreationFailed("keyboard"));
        }
        self.posted.borrow_mut().push(Posted::Key {
            code: key_code,
            down: key_down,
            flags,
        });
        Ok(())
    }

    fn is_left_button_pressed(&self) -> bool {
        self.button_pressed.get()
    }
}

// ---------------------------------------------------------------------------
// Permission gate
// ---------------------------------------------------------------------------

pub struct FakeGate {
    pub trusted: Cell<bool>,
    /// `prompt_if_needed` of every call, in order.
    pub calls: RefCell<Vec<bool>>,
}

impl FakeGate {
    pub fn new(trusted: bool) -> Rc<Self> {
        Rc::new(Self {
            trusted: Cell::new(trusted),
            calls: RefCell::new(Vec::new()),
        })
    }
}

impl PermissionGate for FakeGate {
    fn check_permission(&self, prompt_if_needed: bool) -> bool {
        self.calls.borrow_mut().push(prompt_if_needed);
        self.trusted.get()
    }
}

// ---------------------------------------------------------------------------
// Manual clock
// ---------------------------------------------------------------------------

struct Armed {
    interval: Duration,
    next_fire: Duration,
    on_fire: Box<dyn FnMut()>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    armed: Option<Armed>,
    arm_count: usize,
}

/// Timer half of a simulated clock; hand this to the code under test.
pub struct ManualTimer {
    state: Rc<RefCell<ClockState>>,
}

/// Test half of a simulated clock; advances time and fires due callbacks.
#[derive(Clone)]
pub struct ManualClock {
    state: Rc<RefCell<ClockState>>,
}

pub fn manual_clock() -> (ManualTimer, ManualClock) {
    let state = Rc::new(RefCell::new(ClockState::default()));
    (
        ManualTimer {
            state: Rc::clone(&state),
        },
        ManualClock { state },
    )
}

impl Timer for ManualTimer {
    fn arm(&mut self, interval: Duration, on_fire: Box<dyn FnMut()>) -> Result<(), PlatformError> {
        let mut state = self.state.borrow_mut();
        if state.armed.is_some() {
            return Err(PlatformError::Other("timer is already armed".into()));
        }
        state.armed = Some(Armed {
            interval,
            next_fire: state.now + interval,
            on_fire,
        });
        state.arm_count += 1;
        Ok(())
    }

    fn disarm(&mut self) {
        self.state.borrow_mut().armed = None;
    }

    fn is_armed(&self) -> bool {
        self.state.borrow().armed.is_some()
    }
}

impl ManualClock {
    /// Moves time forward, firing the armed callback once per elapsed period.
    ///
    /// Callbacks run while the clock is borrowed and must not touch the timer.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.borrow_mut();
        let target = state.now + by;
        loop {
            let ClockState { now, armed, .. } = &mut *state;
            match armed {
                Some(armed) if armed.next_fire <= target => {
                    *now = armed.next_fire;
                    armed.next_fire += armed.interval;
                    (armed.on_fire)();
                }
                _ => break,
            }
        }
        state.now = target;
    }

    pub fn arm_count(&self) -> usize {
        self.state.borrow().arm_count
    }

    pub fn armed_interval(&self) -> Option<Duration> {
        self.state.borrow().armed.as_ref().map(|a| a.interval)
    }
}
