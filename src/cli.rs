//! CLI argument parsing via clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resolve, change and export the persisted theme preference.
#[derive(Debug, Parser)]
#[command(name = "themestate", version)]
pub struct Cli {
    /// Class attribute painted by the server renderer, e.g. `page theme-dark`.
    #[arg(long = "marker", env = "THEMESTATE_MARKER")]
    pub marker: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the resolved theme state (default).
    Show,
    /// Pick a theme manually; disables auto mode.
    Set { theme: String },
    /// Toggle following the system color scheme.
    Auto,
    /// Navigate to a route and show the effective theme there.
    Route { path: String },
    /// Remember a user identity and mirror the theme to it.
    Login { identity: String },
    /// Forget the remembered identity.
    Logout,
    /// Write the preference to a settings file.
    Export {
        #[arg(default_value = "theme-settings.json")]
        file: PathBuf,
    },
    /// Apply a previously exported settings file.
    Import { file: PathBuf },
    /// Print the theme stylesheet element.
    Css,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show)
    }
}
