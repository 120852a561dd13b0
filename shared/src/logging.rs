//! Shared logging utilities for consistent tracing across all commands
//!
//! Log events go to stderr so the PASS/FAIL report written to stdout stays
//! readable when piped.

use crate::errors::{SharedError, SharedResult};
use crate::types::CommandId;
use chrono::{DateTime, Local};
use tracing::{error, info};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Build the env-filter directive string for a base level
pub fn filter_directives(log_level: &str) -> SharedResult<String> {
    let base_level = log_level.trim().to_lowercase();
    if !LEVELS.contains(&base_level.as_str()) {
        return Err(SharedError::InvalidLogLevel {
            input: log_level.to_string(),
        });
    }

    Ok(format!(
        "launcher={base_level},botops={base_level},shared={base_level},reqwest=warn,hyper=warn"
    ))
}

/// Initialize the tracing subscriber once for the process
///
/// An invalid level falls back to `info`. Calling this twice is harmless;
/// the second subscriber is discarded.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let directives = filter_directives(log_level).unwrap_or_else(|_| {
        eprintln!("⚠️ Unknown log level '{log_level}', using info");
        "launcher=info,botops=info,shared=info,reqwest=warn,hyper=warn".to_string()
    });

    let _ = fmt()
        .with_env_filter(EnvFilter::new(&directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Local> = Local::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for command-aware info logging
#[macro_export]
macro_rules! step_info {
    ($command_id:expr, $($arg:tt)*) => {
        tracing::info!(
            command = %$command_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for command-aware warning logging
#[macro_export]
macro_rules! step_warn {
    ($command_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            command = %$command_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for command-aware error logging
#[macro_export]
macro_rules! step_error {
    ($command_id:expr, $($arg:tt)*) => {
        tracing::error!(
            command = %$command_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for command-aware debug logging
#[macro_export]
macro_rules! step_debug {
    ($command_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            command = %$command_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(command_id: &CommandId, details: &str) {
    info!(
        command = %command_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(command_id: &CommandId, reason: &str) {
    info!(
        command = %command_id,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(command_id: &CommandId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        command = %command_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(command_id: &CommandId, message: &str) {
    info!(
        command = %command_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
