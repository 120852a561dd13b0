//! Importability smoke tests for the backend's dependencies
//!
//! Only proves a module can be imported; nothing about its behaviour.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ImportSpec;
use crate::traits::{CommandRunner, Invocation};
use shared::{step_debug, CommandId, ProbeKind, ProbeResult};

pub struct ImportProbe<R> {
    runner: R,
    runtime: String,
    sentinel: String,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

impl<R: CommandRunner> ImportProbe<R> {
    pub fn new(runner: R, runtime: impl Into<String>, sentinel: impl Into<String>) -> Self {
        Self {
            runner,
            runtime: runtime.into(),
            sentinel: sentinel.into(),
            cwd: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Run probes from this directory so project-relative imports resolve (fluent API)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Configure the per-probe timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The inline program handed to `-c`
    pub fn program_for(&self, spec: &ImportSpec) -> String {
        format!("{}; print('{}')", spec.statement.trim().trim_end_matches(';'), self.sentinel)
    }

    /// Run every probe; one failing does not stop the others
    pub async fn check_all(&self, specs: &[ImportSpec]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(specs.len());
        for spec in specs {
            results.push(self.check(spec).await);
        }
        results
    }

    /// Passes iff the program exits 0 and printed the sentinel
    pub async fn check(&self, spec: &ImportSpec) -> ProbeResult {
        let mut invocation = Invocation::new(self.runtime.clone())
            .arg("-c")
            .arg(self.program_for(spec))
            .timeout(self.timeout);
        if let Some(dir) = &self.cwd {
            invocation = invocation.current_dir(dir.clone());
        }

        let result = match self.runner.run(&invocation).await {
            Ok(output) if output.success() && output.stdout.contains(&self.sentinel) => {
                ProbeResult::pass(ProbeKind::Import, spec.name.clone())
            }
            Ok(output) if output.success() => ProbeResult::fail(ProbeKind::Import, spec.name.clone())
                .with_detail("exited 0 without printing the sentinel"),
            Ok(output) => {
                let reason = last_line(&output.stderr).unwrap_or_else(|| match output.status {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                });
                ProbeResult::fail(ProbeKind::Import, spec.name.clone()).with_detail(reason)
            }
            Err(e) => ProbeResult::fail(ProbeKind::Import, spec.name.clone()).with_detail(e.to_string()),
        };

        step_debug!(CommandId::current(), "📦 {}", result);
        result
    }
}

/// Tracebacks end with the exception line, which is the useful part
fn last_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}
