//! autoclicker -- periodic synthetic clicks for macOS.
//!
//! Entry point: logging, configuration, and wiring of the platform backends
//! into the click driver or the UI bridge.

mod bridge;
mod cli;
mod config;
mod driver;
mod injector;
mod keys;
mod platform;
#[cfg(test)]
mod testing;

use std::io;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use serde_json::{json, Value};

use bridge::{Bridge, MethodCall};
use cli::{Cli, Command};
use config::{Config, ConfigError};
use driver::{ClickerError, Driver};
use injector::Injector;
use platform::PlatformError;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Clicker(#[from] ClickerError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    // Default level is info; override with RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Run { interval, duration } => run_clicker(
            config.clicker.interval_ms,
            interval,
            duration.map(Duration::from_secs),
        ),
        Command::Serve => {
            let bridge = create_bridge()?;
            log::info!("bridge: serving on stdio");
            bridge.serve(io::stdin().lock(), io::stdout().lock())?;
            Ok(())
        }
        Command::Click { x, y } => {
            let arguments = match (x, y) {
                (Some(x), Some(y)) => json!({ "x": x, "y": y }),
                _ => Value::Null,
            };
            call_once("performClick", arguments)
        }
        Command::Position => call_once("getMousePosition", Value::Null),
        Command::CheckPermissions => call_once("checkPermissions", Value::Null),
        Command::Pressed => call_once("isMouseButtonPressed", Value::Null),
        Command::Key { key, modifiers } => {
            let key_code = keys::parse_key(&key).ok_or(AppError::UnknownKey(key))?;
            call_once(
                "performKeyPress",
                json!({ "keyCode": key_code, "modifiers": modifiers }),
            )
        }
        Command::SwitchApp => call_once("switchApplication", Value::Null),
    }
}

/// Starts the driver and runs the main-thread event loop.
///
/// Each state change is written to stdout as one JSON line so a wrapping UI
/// can follow it. `interval_override` comes from the command line and wins
/// over the configured interval.
fn run_clicker(
    configured_ms: u64,
    interval_override: Option<u64>,
    duration: Option<Duration>,
) -> Result<(), AppError> {
    let injector = Rc::new(Injector::new(platform::create_input_backend()?));
    let mut driver = Driver::new(
        injector,
        platform::create_permission_gate()?,
        platform::create_timer()?,
        configured_ms,
    )?;
    driver.subscribe(Box::new(|state| match serde_json::to_string(state) {
        Ok(line) => println!("{line}"),
        Err(e) => log::warn!("state: cannot encode: {}", e),
    }));
    if let Some(interval_ms) = interval_override {
        driver.set_interval(interval_ms)?;
    }

    driver.start()?;
    if !driver.state().running {
        return Err(PlatformError::PermissionDenied(
            "Accessibility permission required. \
             Grant it in System Settings > Privacy & Security > Accessibility, then run again."
                .into(),
        )
        .into());
    }

    platform::run_event_loop(duration)?;
    driver.stop();
    Ok(())
}

fn create_bridge() -> Result<Bridge, AppError> {
    let injector = Rc::new(Injector::new(platform::create_input_backend()?));
    Ok(Bridge::new(injector, platform::create_permission_gate()?))
}

/// Dispatches a single bridge call and prints its reply.
fn call_once(method: &str, arguments: Value) -> Result<(), AppError> {
    let bridge = create_bridge()?;
    let reply = bridge.handle(&MethodCall::new(method, arguments));
    println!(
        "{}",
        serde_json::to_string(&reply).map_err(io::Error::from)?
    );
    Ok(())
}
