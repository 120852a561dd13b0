//! Probe, shutdown and supervision components

pub mod imports;
pub mod monitor;
pub mod preflight;
pub mod readiness;
pub mod runtime;
pub mod screenshot;
pub mod supervisor;
pub mod terminator;

pub use imports::ImportProbe;
pub use monitor::BackendMonitor;
pub use preflight::PreflightChecker;
pub use readiness::{PortfolioSummary, ReadinessAssessment, ReadinessAssessor};
pub use runtime::{ResolvedRuntime, RuntimeProbe, RuntimeResolution};
pub use screenshot::{CaptureReport, CaptureSettings, ScreenshotCapturer};
pub use supervisor::{BackendState, BackendSupervisor, SupervisorSettings, TrackedProcess};
pub use terminator::{
    PortStatus, StopTarget, TerminationOutcome, TerminationReport, TerminationStrategy, Terminator, TerminatorSettings,
};
