//! Trait definitions with mockall annotations for testing
//!
//! Every external collaborator the probes touch (child commands, the OS
//! process table, TCP ports, HTTP, the display) sits behind one of these
//! traits so the core components can be exercised with mocks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::LauncherResult;

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Primary display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Response of a plain HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Runs external commands to completion
///
/// A program that cannot be started is an `Err`; a program that starts and
/// exits non-zero is an `Ok` with that status.
#[mockall::automock]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> LauncherResult<CommandOutput>;
}

#[async_trait::async_trait]
impl<'a, T: CommandRunner + ?Sized> CommandRunner for &'a T {
    async fn run(&self, invocation: &Invocation) -> LauncherResult<CommandOutput> {
        (**self).run(invocation).await
    }
}

/// Read and signal access to the operating system's process table
#[mockall::automock]
pub trait ProcessTable: Send + Sync {
    /// PIDs whose executable name matches, excluding the current process
    fn find_by_name(&self, name: &str) -> Vec<u32>;

    fn is_alive(&self, pid: u32) -> bool;

    /// Executable name of a live process
    fn name_of(&self, pid: u32) -> Option<String>;

    /// Ask the process to exit (SIGTERM or platform equivalent)
    fn terminate(&self, pid: u32) -> bool;

    /// Force the process to exit
    fn kill(&self, pid: u32) -> bool;
}

/// Answers "is something listening on this address"
#[mockall::automock]
#[async_trait::async_trait]
pub trait PortProbe: Send + Sync {
    async fn is_listening(&self, addr: SocketAddr) -> bool;
}

/// Minimal HTTP GET client
#[mockall::automock]
#[async_trait::async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str) -> LauncherResult<HttpReply>;
}

/// Source of primary-display bitmaps
#[mockall::automock]
pub trait DisplaySource: Send + Sync {
    fn primary_bounds(&self) -> LauncherResult<DisplayBounds>;

    fn capture_primary(&self) -> LauncherResult<image::RgbaImage>;
}
