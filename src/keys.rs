//! macOS virtual key codes (CGKeyCode) used by key-press requests.
//!
//! Codes are physical key positions per Apple HIToolbox/Events.h and assume
//! an ANSI layout. Only the keys a user is likely to name on the command line
//! are listed; any other key is reachable through its numeric code.

/// kVK_Tab.
pub const TAB: u16 = 0x30;

/// kVK_Command (left).
pub const COMMAND: u16 = 0x37;

const NAMED_KEYS: &[(&str, u16)] = &[
    ("a", 0x00),
    ("s", 0x01),
    ("d", 0x02),
    ("f", 0x03),
    ("h", 0x04),
    ("g", 0x05),
    ("z", 0x06),
    ("x", 0x07),
    ("c", 0x08),
    ("v", 0x09),
    ("b", 0x0B),
    ("q", 0x0C),
    ("w", 0x0D),
    ("e", 0x0E),
    ("r", 0x0F),
    ("y", 0x10),
    ("t", 0x11),
    ("o", 0x1F),
    ("u", 0x20),
    ("i", 0x22),
    ("p", 0x23),
    ("l", 0x25),
    ("j", 0x26),
    ("k", 0x28),
    ("n", 0x2D),
    ("m", 0x2E),
    ("return", 0x24),
    ("enter", 0x24),
    ("tab", TAB),
    ("space", 0x31),
    ("delete", 0x33),
    ("escape", 0x35),
    ("command", COMMAND),
    ("shift", 0x38),
    ("capslock", 0x39),
    ("option", 0x3A),
    ("control", 0x3B),
    ("f1", 0x7A),
    ("f2", 0x78),
    ("f3", 0x63),
    ("f4", 0x76),
    ("f5", 0x60),
    ("left", 0x7B),
    ("right", 0x7C),
    ("down", 0x7D),
    ("up", 0x7E),
];

/// Parses a key given by name (`tab`, `a`), decimal code (`48`) or hex code (`0x30`).
pub fn parse_key(input: &str) -> Option<u16> {
    let input = input.trim();
    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        return u16::from_str_radix(hex, 16).ok();
    }
    if let Ok(code) = input.parse::<u16>() {
        return Some(code);
    }
    let lower = input.to_ascii_lowercase();
    NAMED_KEYS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|&(_, code)| code)
}
