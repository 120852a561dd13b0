//! Command identity shared by logging and reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global command identity - set once at startup
static COMMAND_ID: OnceLock<CommandId> = OnceLock::new();

/// Which botops subcommand is running in this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandId {
    /// Library use or tests, before any subcommand claimed the process
    Launcher,
    Preflight,
    DebugStartup,
    Start,
    Stop,
    Screenshot,
    Launch,
    Readiness,
}

impl CommandId {
    /// Initialize the global command identity. Later calls keep the first value.
    pub fn init(id: CommandId) -> &'static CommandId {
        COMMAND_ID.get_or_init(|| id)
    }

    /// Get the global command identity, `Launcher` if none was set
    pub fn current() -> &'static CommandId {
        COMMAND_ID.get().unwrap_or(&CommandId::Launcher)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::Launcher => "launcher",
            CommandId::Preflight => "preflight",
            CommandId::DebugStartup => "debug-startup",
            CommandId::Start => "start",
            CommandId::Stop => "stop",
            CommandId::Screenshot => "screenshot",
            CommandId::Launch => "launch",
            CommandId::Readiness => "readiness",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "launcher" => Ok(CommandId::Launcher),
            "preflight" => Ok(CommandId::Preflight),
            "debug-startup" | "debug_startup" => Ok(CommandId::DebugStartup),
            "start" => Ok(CommandId::Start),
            "stop" => Ok(CommandId::Stop),
            "screenshot" => Ok(CommandId::Screenshot),
            "launch" => Ok(CommandId::Launch),
            "readiness" => Ok(CommandId::Readiness),
            _ => Err(SharedError::UnknownCommand { input: s.to_string() }),
        }
    }
}
