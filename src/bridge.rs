//! Request/response bridge for a UI shell.
//!
//! A UI process sends method calls and receives one reply per call. Method
//! names and argument shapes follow the mouse channel the desktop UI already
//! speaks: `performClick`, `getMousePosition`, `checkPermissions`,
//! `isMouseButtonPressed`, `performKeyPress` and `switchApplication`.
//!
//! Over stdio each request and reply is a single line of JSON:
//!
//! ```text
//! > {"method":"performClick","arguments":{"x":100.0,"y":200.0}}
//! < {"status":"ok","result":null}
//! ```

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::injector::{ClickTarget, Injector};
use crate::platform::{Modifier, PermissionGate, ScreenPoint};

#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    fn f64_arg(&self, name: &str) -> Option<f64> {
        self.arguments.get(name).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    Ok { result: Value },
    NotImplemented,
    Error { message: String },
}

impl Reply {
    fn ok(result: Value) -> Self {
        Reply::Ok { result }
    }
}

pub struct Bridge {
    injector: Rc<Injector>,
    gate: Box<dyn PermissionGate>,
}

impl Bridge {
    pub fn new(injector: Rc<Injector>, gate: Box<dyn PermissionGate>) -> Self {
        Self { injector, gate }
    }

    pub fn handle(&self, call: &MethodCall) -> Reply {
        log::debug!("bridge: {} {}", call.method, call.arguments);
        match call.method.as_str() {
            "performClick" => {
                let target = match (call.f64_arg("x"), call.f64_arg("y")) {
                    (Some(x), Some(y)) => ClickTarget::At(ScreenPoint::new(x, y)),
                    _ => ClickTarget::Cursor,
                };
                self.injector.click(target);
                Reply::ok(Value::Null)
            }
            "getMousePosition" => match self.injector.cursor_position() {
                Some(position) => match serde_json::to_value(position) {
                    Ok(value) => Reply::ok(value),
                    Err(e) => Reply::Error {
                        message: format!("cannot encode cursor position: {e}"),
                    },
                },
                None => Reply::Error {
                    message: "cursor position unavailable".into(),
                },
            },
            "checkPermissions" => Reply::ok(Value::Bool(self.gate.check_permission(true))),
            "isMouseButtonPressed" => Reply::ok(Value::Bool(self.injector.is_left_button_pressed())),
            "performKeyPress" => {
                let key_code = call
                    .arguments
                    .get("keyCode")
                    .and_then(Value::as_u64)
                    .and_then(|code| u16::try_from(code).ok());
                if let Some(key_code) = key_code {
                    let modifiers = modifiers_arg(&call.arguments);
                    self.injector.key_press(key_code, &modifiers);
                }
                Reply::ok(Value::Null)
            }
            "switchApplication" => {
                self.injector.app_switch();
                Reply::ok(Value::Null)
            }
            other => {
                log::debug!("bridge: {} is not implemented", other);
                Reply::NotImplemented
            }
        }
    }

    /// Decodes and handles one JSON request line.
    pub fn handle_line(&self, line: &str) -> Reply {
        match serde_json::from_str::<MethodCall>(line) {
            Ok(call) => self.handle(&call),
            Err(e) => {
                log::warn!("bridge: malformed request: {}", e);
                Reply::Error {
                    message: format!("malformed request: {e}"),
                }
            }
        }
    }

    /// Answers newline-delimited JSON requests until `input` is exhausted.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle_line(&line);
            serde_json::to_writer(&mut output, &reply)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        log::info!("bridge: input closed");
        Ok(())
    }
}

/// Collects recognised modifier names. Unknown names are skipped, but a list
/// holding anything other than strings is discarded as a whole.
fn modifiers_arg(arguments: &Value) -> Vec<Modifier> {
    let names: Option<Vec<&str>> = arguments
        .get("modifiers")
        .and_then(Value::as_array)
        .and_then(|entries| entries.iter().map(Value::as_str).collect());
    names
        .unwrap_or_default()
        .into_iter()
        .filter_map(Modifier::from_name)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
