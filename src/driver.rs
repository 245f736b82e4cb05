//! Periodic click driver.
//!
//! `Driver` is a two-state machine (idle / running) around a single repeating
//! `Timer`. Each firing clicks at the live cursor. The driver, its timer and
//! its injector all live on the thread that runs the event loop; `Rc` keeps the
//! whole graph `!Send`.

use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;

use crate::injector::{ClickTarget, Injector};
use crate::platform::{PermissionGate, PlatformError, Timer};

#[derive(Debug, thiserror::Error)]
pub enum ClickerError {
    #[error("click interval must be greater than zero")]
    InvalidInterval,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Observable driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickerState {
    pub running: bool,
    pub interval_millis: u64,
    /// Result of the last permission check; `true` until one has run.
    pub has_permission: bool,
}

pub type StateObserver = Box<dyn Fn(&ClickerState)>;

pub struct Driver {
    state: ClickerState,
    injector: Rc<Injector>,
    gate: Box<dyn PermissionGate>,
    timer: Box<dyn Timer>,
    observers: Vec<StateObserver>,
}

impl Driver {
    pub fn new(
        injector: Rc<Injector>,
        gate: Box<dyn PermissionGate>,
        timer: Box<dyn Timer>,
        interval_millis: u64,
    ) -> Result<Self, ClickerError> {
        if interval_millis == 0 {
            return Err(ClickerError::InvalidInterval);
        }
        Ok(Self {
            state: ClickerState {
                running: false,
                interval_millis,
                has_permission: true,
            },
            injector,
            gate,
            timer,
            observers: Vec::new(),
        })
    }

    pub fn state(&self) -> &ClickerState {
        &self.state
    }

    /// Registers a callback invoked after every state change.
    pub fn subscribe(&mut self, observer: StateObserver) {
        self.observers.push(observer);
    }

    /// Sets the period used by the next `start()`. A running timer keeps its
    /// current period.
    pub fn set_interval(&mut self, interval_millis: u64) -> Result<(), ClickerError> {
        if interval_millis == 0 {
            return Err(ClickerError::InvalidInterval);
        }
        if interval_millis != self.state.interval_millis {
            self.state.interval_millis = interval_millis;
            self.notify();
        }
        Ok(())
    }

    /// Starts clicking if permission is granted.
    ///
    /// A denied check is not an error: the driver stays idle and
    /// `state().has_permission` is `false`.
    pub fn start(&mut self) -> Result<(), ClickerError> {
        if self.state.running {
            return Ok(());
        }

        let granted = self.gate.check_permission(true);
        if granted != self.state.has_permission {
            self.state.has_permission = granted;
            self.notify();
        }
        if !granted {
            log::warn!(
                "driver: accessibility permission not granted. \
                 Grant it in System Settings > Privacy & Security > Accessibility, then start again."
            );
            return Ok(());
        }

        let injector = Rc::clone(&self.injector);
        self.timer.arm(
            Duration::from_millis(self.state.interval_millis),
            Box::new(move || injector.click(ClickTarget::Cursor)),
        )?;

        self.state.running = true;
        log::info!(
            "driver: clicking every {}ms",
            self.state.interval_millis
        );
        self.notify();
        Ok(())
    }

    /// Stops clicking. No callback fires after this returns.
    pub fn stop(&mut self) {
        if !self.state.running {
            return;
        }
        self.timer.disarm();
        self.state.running = false;
        log::info!("driver: stopped");
        self.notify();
    }

    fn notify(&self) {
        debug_assert_eq!(
            self.state.running,
            self.timer.is_armed(),
            "running flag out of sync with timer"
        );
        for observer in &self.observers {
            observer(&self.state);
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
