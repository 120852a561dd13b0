//! HTTP liveness and endpoint sweep for the trading backend

use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::HttpProbe;
use shared::{step_debug, step_info, CommandId, ProbeKind, ProbeResult};

pub struct BackendMonitor<H> {
    http: H,
    base_url: String,
    liveness_path: String,
}

impl<H: HttpProbe> BackendMonitor<H> {
    pub fn new(http: H, base_url: impl Into<String>, liveness_path: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            liveness_path: liveness_path.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// True iff the liveness endpoint answers 200; transport errors count as down
    pub async fn is_up(&self) -> bool {
        match self.http.get(&self.url_for(&self.liveness_path)).await {
            Ok(reply) => reply.is_ok(),
            Err(e) => {
                step_debug!(CommandId::current(), "Backend not answering yet: {}", e);
                false
            }
        }
    }

    /// Poll until the backend is up, the timeout passes, or `still_alive` says
    /// the process behind it has gone
    ///
    /// Returns how long the wait took.
    pub async fn wait_until_ready<F>(
        &self,
        timeout: Duration,
        interval: Duration,
        mut still_alive: F,
    ) -> LauncherResult<Duration>
    where
        F: FnMut() -> bool + Send,
    {
        let started = Instant::now();
        step_info!(
            CommandId::current(),
            "⏳ Waiting for backend at {} (max: {:?})",
            self.base_url,
            timeout
        );

        loop {
            if self.is_up().await {
                let elapsed = started.elapsed();
                step_info!(CommandId::current(), "✅ Backend ready after {:?}", elapsed);
                return Ok(elapsed);
            }
            if !still_alive() {
                return Err(LauncherError::readiness(
                    "backend process exited before it became ready",
                ));
            }
            if started.elapsed() >= timeout {
                return Err(LauncherError::ReadinessTimeout {
                    url: self.url_for(&self.liveness_path),
                    timeout,
                });
            }
            sleep(interval.min(timeout.saturating_sub(started.elapsed()))).await;
        }
    }

    /// One result per endpoint, PASS iff it answered 200
    pub async fn verify_endpoints(&self, paths: &[String]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = match self.http.get(&self.url_for(path)).await {
                Ok(reply) if reply.is_ok() => ProbeResult::pass(ProbeKind::Http, path.clone()),
                Ok(reply) => ProbeResult::fail(ProbeKind::Http, path.clone())
                    .with_detail(format!("HTTP {}", reply.status)),
                Err(e) => ProbeResult::fail(ProbeKind::Http, path.clone()).with_detail(e.to_string()),
            };
            step_debug!(CommandId::current(), "🌐 {}", result);
            results.push(result);
        }
        results
    }
}
