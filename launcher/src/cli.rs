//! Command line interface of the `botops` binary

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::StopRequest;
use crate::config::LauncherConfig;
use shared::CommandId;

/// Startup, health-check and shutdown tooling for the paper-trading stack
#[derive(Debug, Parser)]
#[command(name = "botops")]
#[command(about = "Preflight checks, backend supervision and shutdown for the paper-trading stack")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to botops.toml in the project directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root of the trading project (defaults to the current directory)
    #[arg(long, global = true, env = "BOTOPS_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BOTOPS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Do not wait for Enter before exiting
    #[arg(long, global = true)]
    pub no_pause: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the files the launch depends on exist
    Preflight,

    /// File checks, runtime probe and import probes in one pass
    DebugStartup,

    /// Start (or attach to) the backend and keep it running until Ctrl+C
    Start(BackendArgs),

    /// Stop the backend and check that its port is released
    Stop(StopArgs),

    /// Capture the primary display to a PNG file
    Screenshot(ScreenshotArgs),

    /// Start the backend, verify its endpoints and run the viewer
    Launch(LaunchArgs),

    /// Verify the running backend is clean, consistent and connected
    Readiness(BackendArgs),
}

impl Command {
    pub fn id(&self) -> CommandId {
        match self {
            Command::Preflight => CommandId::Preflight,
            Command::DebugStartup => CommandId::DebugStartup,
            Command::Start(_) => CommandId::Start,
            Command::Stop(_) => CommandId::Stop,
            Command::Screenshot(_) => CommandId::Screenshot,
            Command::Launch(_) => CommandId::Launch,
            Command::Readiness(_) => CommandId::Readiness,
        }
    }

    /// Commands that print a report and may hold the console open
    pub fn pauses(&self) -> bool {
        matches!(self, Command::Preflight | Command::DebugStartup | Command::Readiness(_))
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// Backend port
    #[arg(long, env = "BOTOPS_PORT")]
    pub port: Option<u16>,

    /// Seconds to wait for the backend to answer
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct StopArgs {
    /// Backend port to check for release
    #[arg(long, env = "BOTOPS_PORT")]
    pub port: Option<u16>,

    /// Terminate exactly this PID instead of the recorded one
    #[arg(long, conflicts_with = "name")]
    pub pid: Option<u32>,

    /// Stop every process with this executable name, ignoring the recorded PID
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScreenshotArgs {
    /// Directory screenshots are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Fixed file name instead of a timestamped one
    #[arg(long)]
    pub file_name: Option<String>,

    /// Seconds to wait before capturing
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Window title fragment to bring forward first
    #[arg(long)]
    pub focus: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Only start and verify the backend, do not run the viewer
    #[arg(long)]
    pub no_viewer: bool,
}

impl BackendArgs {
    pub fn apply_to(&self, config: &mut LauncherConfig) {
        if let Some(port) = self.port {
            config.backend.port = port;
        }
        if let Some(secs) = self.timeout_secs {
            config.backend.ready_timeout_secs = secs;
        }
    }
}

impl StopArgs {
    pub fn apply_to(&self, config: &mut LauncherConfig) {
        if let Some(port) = self.port {
            config.backend.port = port;
        }
        if let Some(name) = &self.name {
            config.terminator.executable_name = name.clone();
        }
    }

    pub fn request(&self) -> StopRequest {
        match (self.pid, &self.name) {
            (Some(pid), _) => StopRequest::Pid(pid),
            (None, Some(_)) => StopRequest::ByName,
            (None, None) => StopRequest::Auto,
        }
    }
}

impl ScreenshotArgs {
    pub fn apply_to(&self, config: &mut LauncherConfig) {
        if let Some(dir) = &self.output_dir {
            config.screenshot.output_dir = dir.clone();
        }
        if let Some(secs) = self.delay_secs {
            config.screenshot.delay_secs = secs;
        }
        if let Some(title) = &self.focus {
            config.screenshot.focus_title = Some(title.clone());
        }
    }
}

impl Cli {
    /// Fold per-command flags into the loaded configuration
    pub fn apply_overrides(&self, config: &mut LauncherConfig) {
        match &self.command {
            Command::Preflight | Command::DebugStartup => {}
            Command::Start(args) | Command::Readiness(args) => args.apply_to(config),
            Command::Launch(args) => args.backend.apply_to(config),
            Command::Stop(args) => args.apply_to(config),
            Command::Screenshot(args) => args.apply_to(config),
        }
    }
}
