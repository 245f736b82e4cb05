//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Periodic left-clicker for macOS, with a stdio bridge for UI shells.
#[derive(Parser, Debug)]
#[command(name = "autoclicker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Click at the cursor on a fixed interval
    Run {
        /// Milliseconds between clicks (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many seconds (default: run until killed)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Answer JSON method calls on stdin, one per line
    Serve,

    /// Click once, at the cursor or at X,Y (origin bottom-left)
    Click {
        #[arg(long, requires = "y", allow_negative_numbers = true)]
        x: Option<f64>,

        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<f64>,
    },

    /// Print the cursor position (origin bottom-left)
    Position,

    /// Check Accessibility permission, prompting if missing
    CheckPermissions,

    /// Print whether the left mouse button is held
    Pressed,

    /// Press and release a key
    Key {
        /// Key name (tab, a, space) or virtual key code (48, 0x30)
        key: String,

        /// Modifier to hold: command, alt, shift or control
        #[arg(short, long = "modifier")]
        modifiers: Vec<String>,
    },

    /// Send Command-Tab
    SwitchApp,
}
