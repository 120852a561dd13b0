//! Real command runner backed by `tokio::process`

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::{CommandOutput, CommandRunner, Invocation};
use shared::{step_debug, CommandId};

#[derive(Debug, Clone, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for RealCommandRunner {
    async fn run(&self, invocation: &Invocation) -> LauncherResult<CommandOutput> {
        step_debug!(CommandId::current(), "▶️ Running: {}", invocation.display());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| LauncherError::spawn(&invocation.program, e))?;

        // kill_on_drop reaps the child if the timeout fires first
        let output = tokio::time::timeout(invocation.timeout, child.wait_with_output())
            .await
            .map_err(|_| LauncherError::CommandTimeout {
                program: invocation.program.clone(),
                timeout: invocation.timeout,
            })??;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        step_debug!(
            CommandId::current(),
            "🏁 '{}' exited with {:?}",
            invocation.program,
            result.status
        );
        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_captures_stdout_and_status() {
        let runner = RealCommandRunner::new();
        let output = runner
            .run(&Invocation::new("sh").args(["-c", "echo hello; exit 3"]))
            .await
            .unwrap();

        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let runner = RealCommandRunner::new();
        let result = runner
            .run(&Invocation::new("definitely-not-a-real-binary-4242"))
            .await;

        assert!(matches!(result, Err(LauncherError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let runner = RealCommandRunner::new();
        let result = runner
            .run(
                &Invocation::new("sleep")
                    .arg("5")
                    .timeout(Duration::from_millis(100)),
            )
            .await;

        assert!(matches!(result, Err(LauncherError::CommandTimeout { .. })));
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let runner = RealCommandRunner::new();
        let output = runner
            .run(&Invocation::new("ls").current_dir(dir.path()))
            .await
            .unwrap();

        assert!(output.stdout.contains("marker.txt"));
    }
}
