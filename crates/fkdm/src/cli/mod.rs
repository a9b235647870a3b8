//! Command-line interface for fkdm.
//!
//! Each view of the reporting app is a subcommand; `go` accepts a route
//! path directly.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    fill_form, ConfigCommand, JsonFlag, LoginCommand, NewReportArgs, ProfileCommand,
    ReportCommand, ShareTargetArg,
};

/// fkdm - FKDM activity reporting
///
/// Log in, file community-watch activity reports, and share them to
/// messaging apps as a formatted transcript.
#[derive(Debug, Parser)]
#[command(name = "fkdm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in
    Login(LoginCommand),

    /// Log out
    Logout,

    /// Show the dashboard
    Dashboard(JsonFlag),

    /// File, list, view and share reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Navigate to a route path, e.g. /view-report/<id>
    Go {
        /// Route path
        path: String,
    },

    /// Show storage and session status
    Status(JsonFlag),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
