//! Test helpers to reduce integration test boilerplate

use std::net::TcpListener;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launcher::traits::{CommandOutput, MockCommandRunner};
use launcher::LauncherConfig;

use super::fixtures::TestFixtures;

pub struct TestHelpers;

impl TestHelpers {
    /// Empty project directory
    pub fn empty_project() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    /// Project directory holding the stock viewer and backend files
    pub fn stock_project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        Self::touch(dir.path(), TestFixtures::VIEWER_SCRIPT);
        Self::touch(dir.path(), TestFixtures::BACKEND_MODULE);
        dir
    }

    pub fn touch(root: &Path, relative: &str) {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, "").unwrap();
    }

    /// Config rooted at `dir` with short timings
    pub fn config_for(dir: &Path) -> LauncherConfig {
        let mut config = LauncherConfig {
            project_dir: Some(dir.to_path_buf()),
            ..LauncherConfig::default()
        };
        config.backend.ready_timeout_secs = 5;
        config.backend.poll_interval_ms = 25;
        config.backend.shutdown_grace_secs = 2;
        config.terminator.grace_period_ms = 1000;
        config.terminator.release_timeout_ms = 200;
        config.terminator.poll_interval_ms = 20;
        config
    }

    /// Point the backend section of `config` at a mock server
    pub fn target(config: &mut LauncherConfig, server: &MockServer) {
        let addr = server.address();
        config.backend.host = addr.ip();
        config.backend.port = addr.port();
    }

    /// A localhost port nothing is listening on
    pub fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Runner that answers every version probe successfully
    pub fn working_runtime() -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                status: Some(0),
                stdout: "Python 3.12.1\n".to_string(),
                stderr: String::new(),
            })
        });
        runner
    }

    pub async fn mount_json(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    /// Backend answering the liveness and readiness endpoints
    pub async fn serving_backend(chart: String, health: String) -> MockServer {
        let server = MockServer::start().await;
        Self::mount_json(&server, "/api/chart-data", 200, chart).await;
        Self::mount_json(&server, "/health", 200, health).await;
        server
    }
}
