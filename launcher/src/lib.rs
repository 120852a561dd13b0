//! Launcher library for preflight, supervision and shutdown of the trading stack
//!
//! Every probe talks to the outside world through the traits in [`traits`],
//! so the workflows in [`commands`] run the same against real services and
//! against mocks.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use commands::CommandOutcome;
pub use config::LauncherConfig;
pub use crate::core::{
    BackendMonitor, BackendSupervisor, ImportProbe, PreflightChecker, ReadinessAssessor, RuntimeProbe,
    ScreenshotCapturer, Terminator,
};
pub use error::{LauncherError, LauncherResult};
pub use report::ConsoleReporter;
pub use traits::{CommandRunner, DisplaySource, HttpProbe, PortProbe, ProcessTable};
