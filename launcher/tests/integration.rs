//! End-to-end workflow tests
//!
//! HTTP backends are wiremock servers; process tests spawn real short-lived
//! children and are unix-only.

use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launcher::commands::{self, StopRequest};
use launcher::core::{BackendState, BackendSupervisor, StopTarget, TerminationOutcome, TerminationStrategy};
use launcher::services::{RealHttpProbe, RealPortProbe, RealProcessTable};
use launcher::traits::MockCommandRunner;
use launcher::{BackendMonitor, ConsoleReporter};

mod common;
use common::{TestFixtures, TestHelpers};

fn http() -> RealHttpProbe {
    RealHttpProbe::new(Duration::from_secs(2)).unwrap()
}

/// Preflight over the stock layout reports every file present
#[test]
fn test_preflight_on_stock_project() {
    let project = TestHelpers::stock_project();
    let config = TestHelpers::config_for(project.path());

    let outcome = commands::run_preflight(&config).unwrap();

    assert!(outcome.report.all_passed());
    assert_eq!(outcome.report.passed_count(), 2);
}

/// Both files absent: two FAIL lines, then the runtime section still runs
#[tokio::test]
async fn test_missing_files_do_not_stop_debug_startup() {
    let project = TestHelpers::empty_project();
    let config = TestHelpers::config_for(project.path());
    let runner = TestHelpers::working_runtime();

    let outcome = commands::run_debug_startup(&config, &runner).await.unwrap();

    let files = outcome.report.section("File Checks").unwrap();
    assert_eq!(files.results.iter().filter(|r| !r.passed).count(), 2);
    assert!(outcome.report.section("Runtime").is_some());
    assert!(!outcome.failed);

    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    reporter.report(&outcome.report).unwrap();
    let printed = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(printed.contains("[FAIL] comprehensive_trading_viewer.py: not found at"));
}

#[tokio::test]
async fn test_readiness_of_clean_backend() {
    let project = TestHelpers::empty_project();
    let server =
        TestHelpers::serving_backend(TestFixtures::clean_chart_data(), TestFixtures::health_all_connected()).await;
    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);

    let outcome = commands::run_readiness(&config, http()).await.unwrap();

    assert!(!outcome.failed, "{:?}", outcome.report);
    assert!(outcome.report.section("Final Assessment").unwrap().all_passed());
}

#[tokio::test]
async fn test_readiness_after_trading_is_not_clean() {
    let project = TestHelpers::empty_project();
    let server =
        TestHelpers::serving_backend(TestFixtures::traded_chart_data(), TestFixtures::health_all_connected()).await;
    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);

    let outcome = commands::run_readiness(&config, http()).await.unwrap();

    assert!(outcome.failed);
    let api = outcome.report.section("API Verification").unwrap();
    let consistency = api.results.iter().find(|r| r.name == "mathematical consistency").unwrap();
    let baseline = api.results.iter().find(|r| r.name == "clean baseline").unwrap();
    assert!(consistency.passed);
    assert!(!baseline.passed);
}

#[tokio::test]
async fn test_readiness_with_disconnected_provider() {
    let project = TestHelpers::empty_project();
    let server =
        TestHelpers::serving_backend(TestFixtures::clean_chart_data(), TestFixtures::health_one_disconnected()).await;
    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);

    let outcome = commands::run_readiness(&config, http()).await.unwrap();

    assert!(outcome.failed);
    let health = outcome.report.section("Health Verification").unwrap();
    assert_eq!(health.results.iter().filter(|r| !r.passed).count(), 1);
}

/// A backend that is already serving is attached to and never stopped
#[tokio::test]
async fn test_launch_attaches_and_sweeps_endpoints() {
    let project = TestHelpers::stock_project();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/signals"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);
    let runner = TestHelpers::working_runtime();

    let outcome = commands::run_launch(&config, &runner, http(), false).await.unwrap();

    assert!(!outcome.failed);
    let backend = outcome.report.section("Backend").unwrap();
    assert_eq!(backend.results[0].detail.as_deref(), Some("already running, attached"));
    let endpoints = outcome.report.section("API Endpoints").unwrap();
    assert_eq!(endpoints.results.len(), 5);
    assert_eq!(endpoints.results.iter().filter(|r| !r.passed).count(), 1);
    assert!(!project.path().join(".botops/backend.pid").exists());
}

#[tokio::test]
async fn test_launch_without_runtime_fails() {
    let project = TestHelpers::stock_project();
    let config = TestHelpers::config_for(project.path());
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .returning(|inv| Err(launcher::LauncherError::spawn(&inv.program, "not found")));

    let outcome = commands::run_launch(&config, &runner, http(), true).await.unwrap();

    assert!(outcome.failed);
    assert_eq!(outcome.report.failed_count(), 1);
}

/// Spawned backend: pid file while running, gone after shutdown
#[cfg(unix)]
#[tokio::test]
async fn test_supervisor_owns_and_stops_spawned_backend() {
    let project = TestHelpers::empty_project();
    let server = MockServer::start().await;
    // Down for the attach check, up from then on
    Mock::given(method("GET"))
        .and(path("/api/chart-data"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chart-data"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);
    config.backend.args = vec!["30".to_string()];
    let settings = commands::supervisor_settings(&config, "sleep").unwrap();
    let pid_file = settings.pid_file.clone();
    let monitor = BackendMonitor::new(http(), config.backend.base_url(), config.backend.liveness_path.clone());
    let mut supervisor = BackendSupervisor::new(monitor, settings);

    let state = supervisor.ensure_backend().await.unwrap();

    let BackendState::Started(tracked) = &state else {
        panic!("expected a spawned backend, got {state:?}");
    };
    assert!(supervisor.owns_backend());
    assert_eq!(launcher::core::supervisor::read_pid_file(&pid_file), Some(tracked.pid));

    supervisor.shutdown().await.unwrap();

    assert!(!supervisor.owns_backend());
    assert!(!pid_file.exists());
}

/// Stop by recorded pid terminates exactly that process
#[cfg(unix)]
#[tokio::test]
async fn test_stop_terminates_recorded_pid() {
    let project = TestHelpers::empty_project();
    let mut config = TestHelpers::config_for(project.path());
    config.backend.port = TestHelpers::free_port();
    config.terminator.executable_name = "sleep".to_string();

    let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    let pid_file = config.resolve(&config.backend.pid_file).unwrap();
    launcher::core::supervisor::write_pid_file(&pid_file, child.id()).unwrap();

    let outcome = commands::run_stop(&config, RealProcessTable::new(), RealPortProbe::new(), StopRequest::Auto)
        .await
        .unwrap();
    let _ = child.wait();

    let section = outcome.report.section("Stop Backend").unwrap();
    assert!(section.all_passed(), "{section:?}");
    assert!(section.results[0].name.contains(&format!("tracked pid {}", child.id())));
    assert!(!pid_file.exists());
}

/// A recorded pid now held by some other program is never signalled
#[cfg(unix)]
#[tokio::test]
async fn test_stop_spares_process_reusing_recorded_pid() {
    let project = TestHelpers::empty_project();
    let mut config = TestHelpers::config_for(project.path());
    config.backend.port = TestHelpers::free_port();

    let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    let pid_file = config.resolve(&config.backend.pid_file).unwrap();
    launcher::core::supervisor::write_pid_file(&pid_file, child.id()).unwrap();

    let outcome = commands::run_stop(&config, RealProcessTable::new(), RealPortProbe::new(), StopRequest::Auto)
        .await
        .unwrap();
    let still_running = child.try_wait().unwrap().is_none();
    let _ = child.kill();
    let _ = child.wait();

    assert!(still_running, "stop signalled a process that is not the backend");
    let section = outcome.report.section("Stop Backend").unwrap();
    assert_eq!(section.results[0].detail.as_deref(), Some("no processes were running"));
    assert!(!pid_file.exists());
}

/// `start` spawns the backend, holds it until interrupted, then stops it
#[cfg(unix)]
#[tokio::test]
async fn test_start_stops_spawned_backend_on_interrupt() {
    let project = TestHelpers::empty_project();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chart-data"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chart-data"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);
    config.runtime.primary = "sleep".to_string();
    config.backend.args = vec!["30".to_string()];
    let runner = TestHelpers::working_runtime();

    let outcome = commands::run_start(&config, &runner, http(), std::future::ready(()))
        .await
        .unwrap();

    assert!(!outcome.failed);
    let backend = outcome.report.section("Backend").unwrap();
    assert!(backend.results[0].detail.as_deref().unwrap().starts_with("started sleep as pid"));
    assert_eq!(backend.notes, vec!["Backend stopped".to_string()]);
    assert!(!project.path().join(".botops/backend.pid").exists());
}

/// `start` against a serving backend returns without waiting for an interrupt
#[tokio::test]
async fn test_start_attaches_without_waiting() {
    let project = TestHelpers::empty_project();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let mut config = TestHelpers::config_for(project.path());
    TestHelpers::target(&mut config, &server);
    let runner = TestHelpers::working_runtime();

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        commands::run_start(&config, &runner, http(), std::future::pending::<()>()),
    )
    .await
    .expect("start kept waiting on an attached backend")
    .unwrap();

    let backend = outcome.report.section("Backend").unwrap();
    assert_eq!(backend.results[0].detail.as_deref(), Some("already running, attached"));
    assert!(backend.notes.is_empty());
    assert!(!project.path().join(".botops/backend.pid").exists());
}

/// A recorded pid that no longer exists is reported, not hunted by name
#[cfg(unix)]
#[tokio::test]
async fn test_stale_pid_is_none_running() {
    let mut config = TestHelpers::config_for(TestHelpers::empty_project().path());
    config.backend.port = TestHelpers::free_port();

    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();

    let terminator = launcher::Terminator::new(
        RealProcessTable::new(),
        RealPortProbe::new(),
        launcher::core::TerminatorSettings {
            executable_name: config.terminator.executable_name.clone(),
            owner_names: config.runtime.candidates(),
            port: config.backend.socket_addr(),
            grace_period: config.terminator.grace_period(),
            release_timeout: config.terminator.release_timeout(),
            poll_interval: config.terminator.poll_interval(),
        },
    );
    let report = terminator.stop(StopTarget::Recorded(pid)).await;

    assert_eq!(report.strategy, TerminationStrategy::TrackedPid(pid));
    assert_eq!(report.outcome, TerminationOutcome::NoneRunning);
}
