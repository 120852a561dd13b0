//! Shared error types for the botops tooling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown command identity: {input}")]
    UnknownCommand { input: String },

    #[error("Invalid log level: {input}")]
    InvalidLogLevel { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
