//! Interpreter reachability with a single fallback name

use std::time::Duration;

use crate::traits::{CommandRunner, Invocation};
use shared::{step_debug, step_warn, CommandId, ProbeKind, ProbeResult};

/// The interpreter name that answered the version probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRuntime {
    pub program: String,
    pub version: String,
}

/// Every attempt made, plus the runtime that worked if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeResolution {
    pub attempts: Vec<ProbeResult>,
    pub resolved: Option<ResolvedRuntime>,
}

impl RuntimeResolution {
    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }
}

pub struct RuntimeProbe<R> {
    runner: R,
    version_flag: String,
    timeout: Duration,
}

impl<R: CommandRunner> RuntimeProbe<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            version_flag: "--version".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Configure the flag that makes the interpreter print its version (fluent API)
    pub fn with_version_flag(mut self, flag: impl Into<String>) -> Self {
        self.version_flag = flag.into();
        self
    }

    /// Configure the per-attempt timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Try `primary`, then `fallback` exactly once if the primary failed
    pub async fn resolve(&self, primary: &str, fallback: Option<&str>) -> RuntimeResolution {
        let mut attempts = Vec::new();

        let (result, resolved) = self.attempt(primary).await;
        attempts.push(result);
        if resolved.is_some() {
            return RuntimeResolution { attempts, resolved };
        }

        if let Some(fallback) = fallback.filter(|name| *name != primary) {
            step_warn!(
                CommandId::current(),
                "⚠️ '{}' not usable, falling back to '{}'",
                primary,
                fallback
            );
            let (result, resolved) = self.attempt(fallback).await;
            attempts.push(result);
            return RuntimeResolution { attempts, resolved };
        }

        RuntimeResolution {
            attempts,
            resolved: None,
        }
    }

    async fn attempt(&self, program: &str) -> (ProbeResult, Option<ResolvedRuntime>) {
        let invocation = Invocation::new(program)
            .arg(self.version_flag.clone())
            .timeout(self.timeout);
        let name = format!("{} {}", program, self.version_flag);

        match self.runner.run(&invocation).await {
            Ok(output) if output.success() => {
                // Older interpreters print the version on stderr
                let version = first_line(&output.stdout)
                    .or_else(|| first_line(&output.stderr))
                    .unwrap_or_else(|| "unknown version".to_string());
                step_debug!(CommandId::current(), "🐍 {} -> {}", program, version);
                (
                    ProbeResult::pass(ProbeKind::Runtime, name).with_detail(version.clone()),
                    Some(ResolvedRuntime {
                        program: program.to_string(),
                        version,
                    }),
                )
            }
            Ok(output) => (
                ProbeResult::fail(ProbeKind::Runtime, name).with_detail(match output.status {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                }),
                None,
            ),
            Err(e) => (
                ProbeResult::fail(ProbeKind::Runtime, name).with_detail(e.to_string()),
                None,
            ),
        }
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LauncherError;
    use crate::traits::{CommandOutput, MockCommandRunner};

    fn exited(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            status: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.program == "python" && inv.args == vec!["--version".to_string()])
            .times(1)
            .returning(|_| Ok(exited(0, "Python 3.11.4\n", "")));

        let resolution = RuntimeProbe::new(runner).resolve("python", Some("py")).await;

        assert_eq!(resolution.attempts.len(), 1);
        assert!(resolution.attempts[0].passed);
        let resolved = resolution.resolved.unwrap();
        assert_eq!(resolved.program, "python");
        assert_eq!(resolved.version, "Python 3.11.4");
    }

    #[tokio::test]
    async fn test_failing_primary_tries_exactly_one_fallback() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.program == "python")
            .times(1)
            .returning(|inv| Err(LauncherError::spawn(&inv.program, "not found")));
        runner
            .expect_run()
            .withf(|inv| inv.program == "py")
            .times(1)
            .returning(|_| Ok(exited(0, "", "Python 2.7.18")));

        let resolution = RuntimeProbe::new(runner).resolve("python", Some("py")).await;

        assert_eq!(resolution.attempts.len(), 2);
        assert!(!resolution.attempts[0].passed);
        assert!(resolution.attempts[1].passed);
        assert_eq!(resolution.resolved.unwrap().version, "Python 2.7.18");
    }

    #[tokio::test]
    async fn test_both_failing_means_unavailable() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(2)
            .returning(|_| Ok(exited(9009, "", "not recognized")));

        let resolution = RuntimeProbe::new(runner).resolve("python", Some("py")).await;

        assert!(!resolution.is_available());
        assert_eq!(resolution.attempts.len(), 2);
        assert_eq!(resolution.attempts[1].detail.as_deref(), Some("exit status 9009"));
    }

    #[tokio::test]
    async fn test_no_fallback_configured() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_| Ok(exited(1, "", "")));

        let resolution = RuntimeProbe::new(runner).resolve("python", None).await;

        assert_eq!(resolution.attempts.len(), 1);
        assert!(!resolution.is_available());
    }

    #[tokio::test]
    async fn test_fallback_equal_to_primary_is_not_retried() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_| Ok(exited(1, "", "")));

        let resolution = RuntimeProbe::new(runner).resolve("python", Some("python")).await;
        assert_eq!(resolution.attempts.len(), 1);
    }
}
