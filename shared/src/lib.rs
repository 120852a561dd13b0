//! Shared types for the botops tooling
//!
//! Holds the probe/report data model, the command identity used to tag
//! every log line, and the tracing setup shared by the launcher binary
//! and its tests.

pub mod errors;
pub mod logging;
pub mod probe;
pub mod types;

pub use errors::*;
pub use probe::{CheckReport, ProbeKind, ProbeResult, Section};
pub use types::CommandId;
