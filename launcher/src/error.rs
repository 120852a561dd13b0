//! Launcher-specific error types
//!
//! Probe failures are reported as `ProbeResult`s; these variants are for
//! conditions that stop a command.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {field}")]
    Configuration { field: String },

    #[error("No usable runtime: tried {tried:?}")]
    RuntimeUnavailable { tried: Vec<String> },

    #[error("Failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("Command '{program}' timed out after {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("Backend readiness check failed: {message}")]
    Readiness { message: String },

    #[error("Backend at {url} not ready within {timeout:?}")]
    ReadinessTimeout { url: String, timeout: Duration },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Screen capture failed: {message}")]
    Capture { message: String },

    #[error("File operation failed: {operation} on {path}: {message}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl LauncherError {
    pub fn config(field: impl Into<String>) -> Self {
        LauncherError::Configuration { field: field.into() }
    }

    pub fn spawn(program: impl Into<String>, message: impl std::fmt::Display) -> Self {
        LauncherError::Spawn {
            program: program.into(),
            message: message.to_string(),
        }
    }

    pub fn readiness(message: impl Into<String>) -> Self {
        LauncherError::Readiness { message: message.into() }
    }

    pub fn http(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        LauncherError::Http {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn capture(message: impl Into<String>) -> Self {
        LauncherError::Capture { message: message.into() }
    }

    pub fn file_system(operation: impl Into<String>, path: impl Into<PathBuf>, source: impl std::fmt::Display) -> Self {
        LauncherError::FileSystem {
            operation: operation.into(),
            path: path.into(),
            message: source.to_string(),
        }
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;
