//! Backend supervision: attach or spawn, track, and stop only what we own

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::core::monitor::BackendMonitor;
use crate::core::preflight::PreflightChecker;
use crate::error::{LauncherError, LauncherResult};
use crate::traits::HttpProbe;
use shared::{step_debug, step_error, step_info, step_warn, CommandId};

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub runtime: String,
    pub project_dir: PathBuf,
    pub backend_args: Vec<String>,
    /// Resolved against the project dir
    pub viewer_script: PathBuf,
    /// Resolved against the project dir
    pub pid_file: PathBuf,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub shutdown_grace: Duration,
}

/// A child this run spawned and is responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedProcess {
    pub pid: u32,
    pub program: String,
    pub started_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendState {
    /// Backend was already serving; nothing is owned
    Attached,
    Started(TrackedProcess),
}

pub struct BackendSupervisor<H> {
    monitor: BackendMonitor<H>,
    settings: SupervisorSettings,
    child: Option<Child>,
}

impl<H: HttpProbe> BackendSupervisor<H> {
    pub fn new(monitor: BackendMonitor<H>, settings: SupervisorSettings) -> Self {
        Self {
            monitor,
            settings,
            child: None,
        }
    }

    pub fn monitor(&self) -> &BackendMonitor<H> {
        &self.monitor
    }

    pub fn owns_backend(&self) -> bool {
        self.child.is_some()
    }

    /// Attach to a serving backend, or start one and wait for it to answer
    pub async fn ensure_backend(&mut self) -> LauncherResult<BackendState> {
        if self.monitor.is_up().await {
            step_info!(
                CommandId::current(),
                "🔗 Backend already running at {}, attaching",
                self.monitor.base_url()
            );
            return Ok(BackendState::Attached);
        }

        let tracked = self.spawn_backend()?;

        let waited = {
            let monitor = &self.monitor;
            let child = &mut self.child;
            let still_alive = move || match child.as_mut().map(Child::try_wait) {
                Some(Ok(None)) => true,
                Some(Ok(Some(status))) => {
                    step_error!(CommandId::current(), "❌ Backend exited early with {}", status);
                    false
                }
                Some(Err(_)) | None => false,
            };
            monitor
                .wait_until_ready(self.settings.ready_timeout, self.settings.poll_interval, still_alive)
                .await
        };

        if let Err(e) = waited {
            step_error!(CommandId::current(), "❌ Backend did not become ready: {}", e);
            if let Err(cleanup) = self.shutdown().await {
                step_warn!(CommandId::current(), "⚠️ Cleanup after failed start: {}", cleanup);
            }
            return Err(e);
        }

        Ok(BackendState::Started(tracked))
    }

    fn spawn_backend(&mut self) -> LauncherResult<TrackedProcess> {
        let program = self.settings.runtime.clone();
        step_info!(
            CommandId::current(),
            "🚀 Starting backend: {} {}",
            program,
            self.settings.backend_args.join(" ")
        );

        let mut cmd = Command::new(&program);
        cmd.args(&self.settings.backend_args)
            .current_dir(&self.settings.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| LauncherError::spawn(&program, e))?;
        let pid = child
            .id()
            .ok_or_else(|| LauncherError::spawn(&program, "exited before a PID was assigned"))?;
        self.child = Some(child);

        let tracked = TrackedProcess {
            pid,
            program,
            started_at: Local::now(),
        };
        write_pid_file(&self.settings.pid_file, pid)?;
        step_info!(CommandId::current(), "📝 Tracking backend PID {}", pid);

        Ok(tracked)
    }

    /// Run the viewer to completion; false when it is missing or exits non-zero
    pub async fn launch_viewer(&self) -> LauncherResult<bool> {
        let checker = PreflightChecker::new(&self.settings.project_dir);
        let present = checker.check_one(&self.settings.viewer_script);
        if !present.passed {
            step_error!(CommandId::current(), "❌ Viewer not found: {}", present);
            return Ok(false);
        }

        step_info!(CommandId::current(), "🖥️ Launching viewer {}", self.settings.viewer_script.display());
        let status = Command::new(&self.settings.runtime)
            .arg(&self.settings.viewer_script)
            .current_dir(&self.settings.project_dir)
            .status()
            .await
            .map_err(|e| LauncherError::spawn(&self.settings.runtime, e))?;

        step_info!(CommandId::current(), "🏁 Viewer exited with {}", status);
        Ok(status.success())
    }

    /// Stop the backend if this run started it; attached backends are left alone
    pub async fn shutdown(&mut self) -> LauncherResult<()> {
        let Some(mut child) = self.child.take() else {
            step_debug!(CommandId::current(), "No owned backend to stop");
            return Ok(());
        };

        step_info!(CommandId::current(), "🛑 Stopping backend");
        request_terminate(&mut child);

        match tokio::time::timeout(self.settings.shutdown_grace, child.wait()).await {
            Ok(Ok(status)) => {
                step_info!(CommandId::current(), "✅ Backend exited with {}", status);
            }
            Ok(Err(e)) => {
                step_warn!(CommandId::current(), "⚠️ Error waiting for backend: {}", e);
            }
            Err(_) => {
                step_warn!(
                    CommandId::current(),
                    "🔨 Backend ignored terminate for {:?}, force killing",
                    self.settings.shutdown_grace
                );
                if let Err(e) = child.kill().await {
                    step_error!(CommandId::current(), "❌ Failed to kill backend: {}", e);
                }
            }
        }

        remove_pid_file(&self.settings.pid_file)
    }
}

impl<H> Drop for BackendSupervisor<H> {
    fn drop(&mut self) {
        // Emergency cleanup - force kill an owned backend
        if let Some(child) = self.child.as_mut() {
            step_warn!(CommandId::current(), "🚨 Emergency cleanup: force killing backend");
            let _ = child.start_kill();
            let _ = std::fs::remove_file(&self.settings.pid_file);
        }
    }
}

#[cfg(unix)]
fn request_terminate(child: &mut Child) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        step_warn!(CommandId::current(), "⚠️ Failed to send SIGTERM to {}: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn request_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        step_warn!(CommandId::current(), "⚠️ Failed to terminate backend: {}", e);
    }
}

pub fn write_pid_file(path: &Path, pid: u32) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::file_system("create directory", parent, e))?;
    }
    std::fs::write(path, format!("{pid}\n")).map_err(|e| LauncherError::file_system("write pid file", path, e))
}

/// `None` when there is no pid file; an unreadable or garbled one is logged and ignored
pub fn read_pid_file(path: &Path) -> Option<u32> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            step_warn!(CommandId::current(), "⚠️ Cannot read {}: {}", path.display(), e);
            return None;
        }
    };

    match content.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Some(pid),
        _ => {
            step_warn!(CommandId::current(), "⚠️ Ignoring malformed pid file {}", path.display());
            None
        }
    }
}

pub fn remove_pid_file(path: &Path) -> LauncherResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LauncherError::file_system("remove pid file", path, e)),
    }
}
