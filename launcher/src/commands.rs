//! One workflow per `botops` subcommand
//!
//! Each workflow is a straight sequence of probes that collects a
//! [`CheckReport`]. Failed probes are data; only conditions that stop a
//! command come back as errors.

use std::future::Future;
use std::process::ExitCode;

use crate::config::LauncherConfig;
use crate::core::supervisor::{read_pid_file, remove_pid_file};
use crate::core::{
    BackendMonitor, BackendState, BackendSupervisor, CaptureSettings, ImportProbe, PreflightChecker,
    ReadinessAssessor, ResolvedRuntime, RuntimeProbe, ScreenshotCapturer, StopTarget, SupervisorSettings,
    TerminationOutcome, Terminator, TerminatorSettings,
};
use crate::error::{LauncherError, LauncherResult};
use crate::traits::{CommandRunner, DisplaySource, HttpProbe, PortProbe, ProcessTable};
use shared::{logging, step_info, step_warn, CheckReport, CommandId, ProbeKind, ProbeResult, Section};

/// What a workflow printed and whether the binary should exit non-zero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub report: CheckReport,
    pub failed: bool,
}

impl CommandOutcome {
    pub fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    }
}

pub fn run_preflight(config: &LauncherConfig) -> LauncherResult<CommandOutcome> {
    let mut report = CheckReport::new();
    report.push(file_checks(config)?);
    Ok(CommandOutcome { report, failed: false })
}

fn file_checks(config: &LauncherConfig) -> LauncherResult<Section> {
    let checker = PreflightChecker::new(config.project_root()?);
    Ok(Section::with_results(
        "File Checks",
        checker.check(&config.preflight.expected_files),
    ))
}

/// File checks, runtime probe, then import probes
///
/// A missing runtime skips the import probes and fails the command.
pub async fn run_debug_startup<R: CommandRunner>(config: &LauncherConfig, runner: &R) -> LauncherResult<CommandOutcome> {
    let mut report = CheckReport::new();
    report.push(file_checks(config)?);

    let resolution = runtime_probe(config, runner)
        .resolve(&config.runtime.primary, config.runtime.fallback.as_deref())
        .await;
    let mut runtime_section = Section::with_results("Runtime", resolution.attempts.clone());

    let Some(runtime) = resolution.resolved else {
        runtime_section.note("No usable runtime found, install one or fix PATH");
        report.push(runtime_section);
        let mut imports = Section::new("Imports");
        imports.note("Skipped: no usable runtime");
        report.push(imports);
        return Ok(CommandOutcome { report, failed: true });
    };
    runtime_section.note(format!("Using {} ({})", runtime.program, runtime.version));
    report.push(runtime_section);

    let imports = ImportProbe::new(runner, runtime.program.clone(), config.imports.sentinel.clone())
        .with_working_dir(config.project_root()?)
        .with_timeout(config.runtime.command_timeout())
        .check_all(&config.imports.probes)
        .await;
    report.push(Section::with_results("Imports", imports));

    Ok(CommandOutcome { report, failed: false })
}

fn runtime_probe<'r, R: CommandRunner>(config: &LauncherConfig, runner: &'r R) -> RuntimeProbe<&'r R> {
    RuntimeProbe::new(runner)
        .with_version_flag(config.runtime.version_flag.clone())
        .with_timeout(config.runtime.command_timeout())
}

/// The interpreter to start the backend with, or a `RuntimeUnavailable` error
pub async fn resolve_runtime<R: CommandRunner>(config: &LauncherConfig, runner: &R) -> LauncherResult<ResolvedRuntime> {
    runtime_probe(config, runner)
        .resolve(&config.runtime.primary, config.runtime.fallback.as_deref())
        .await
        .resolved
        .ok_or_else(|| LauncherError::RuntimeUnavailable {
            tried: config.runtime.candidates(),
        })
}

pub fn supervisor_settings(config: &LauncherConfig, runtime: &str) -> LauncherResult<SupervisorSettings> {
    Ok(SupervisorSettings {
        runtime: runtime.to_string(),
        project_dir: config.project_root()?,
        backend_args: config.backend.args.clone(),
        viewer_script: config.viewer.script.clone(),
        pid_file: config.resolve(&config.backend.pid_file)?,
        ready_timeout: config.backend.ready_timeout(),
        poll_interval: config.backend.poll_interval(),
        shutdown_grace: config.backend.shutdown_grace(),
    })
}

fn monitor_for<H: HttpProbe>(config: &LauncherConfig, http: H) -> BackendMonitor<H> {
    BackendMonitor::new(http, config.backend.base_url(), config.backend.liveness_path.clone())
}

fn backend_result(state: &BackendState) -> ProbeResult {
    match state {
        BackendState::Attached => {
            ProbeResult::pass(ProbeKind::Http, "backend").with_detail("already running, attached")
        }
        BackendState::Started(tracked) => ProbeResult::pass(ProbeKind::Http, "backend")
            .with_detail(format!("started {} as pid {}", tracked.program, tracked.pid)),
    }
}

/// Start or attach to the backend, then hold it until `shutdown` resolves
///
/// An attached backend is left running and the command returns at once.
pub async fn run_start<R, H, S>(config: &LauncherConfig, runner: &R, http: H, shutdown: S) -> LauncherResult<CommandOutcome>
where
    R: CommandRunner,
    H: HttpProbe,
    S: Future<Output = ()>,
{
    let runtime = resolve_runtime(config, runner).await?;
    let mut supervisor = BackendSupervisor::new(monitor_for(config, http), supervisor_settings(config, &runtime.program)?);

    let state = supervisor.ensure_backend().await?;
    let mut report = CheckReport::new();
    let mut section = Section::with_results("Backend", vec![backend_result(&state)]);

    if let BackendState::Started(tracked) = &state {
        step_info!(
            CommandId::current(),
            "🔄 Backend pid {} running at {} (press Ctrl+C to stop)",
            tracked.pid,
            config.backend.base_url()
        );
        shutdown.await;
        logging::log_shutdown(CommandId::current(), "interrupt received");
        supervisor.shutdown().await?;
        section.note("Backend stopped");
    }

    report.push(section);
    Ok(CommandOutcome { report, failed: false })
}

/// How `stop` picks its target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopRequest {
    /// The recorded PID when there is one, name matching otherwise
    #[default]
    Auto,
    Pid(u32),
    /// Name matching even when a PID is recorded
    ByName,
}

/// Stop the backend by explicit PID, recorded PID, or name, then check the port
pub async fn run_stop<T, P>(
    config: &LauncherConfig,
    table: T,
    ports: P,
    request: StopRequest,
) -> LauncherResult<CommandOutcome>
where
    T: ProcessTable,
    P: PortProbe,
{
    let pid_file = config.resolve(&config.backend.pid_file)?;
    let mut notes = Vec::new();
    let target = match request {
        StopRequest::Pid(pid) => StopTarget::Explicit(pid),
        StopRequest::ByName => {
            if pid_file.exists() {
                notes.push(format!("Stopping by name; recorded pid in {} ignored", pid_file.display()));
            }
            StopTarget::ByName
        }
        StopRequest::Auto => match read_pid_file(&pid_file) {
            Some(pid) => StopTarget::Recorded(pid),
            None => StopTarget::ByName,
        },
    };

    let terminator = Terminator::new(
        table,
        ports,
        TerminatorSettings {
            executable_name: config.terminator.executable_name.clone(),
            owner_names: config.runtime.candidates(),
            port: config.backend.socket_addr(),
            grace_period: config.terminator.grace_period(),
            release_timeout: config.terminator.release_timeout(),
            poll_interval: config.terminator.poll_interval(),
        },
    );
    let termination = terminator.stop(target).await;

    if matches!(target, StopTarget::Recorded(_))
        && !matches!(termination.outcome, TerminationOutcome::Failed { .. })
    {
        remove_pid_file(&pid_file)?;
    }

    let mut section = termination.to_section();
    for note in notes {
        section.note(note);
    }
    let mut report = CheckReport::new();
    report.push(section);
    Ok(CommandOutcome { report, failed: false })
}

pub async fn run_screenshot<D, R>(config: &LauncherConfig, display: D, runner: R, file_name: Option<String>) -> LauncherResult<CommandOutcome>
where
    D: DisplaySource,
    R: CommandRunner,
{
    let settings = CaptureSettings {
        output_dir: config.resolve(&config.screenshot.output_dir)?,
        file_prefix: config.screenshot.file_prefix.clone(),
        file_name,
        settle_delay: std::time::Duration::from_secs(config.screenshot.delay_secs),
        focus_title: config.screenshot.focus_title.clone(),
    };

    let capture = ScreenshotCapturer::new(display, runner, settings).capture().await?;

    let mut report = CheckReport::new();
    report.push(Section::with_results("Screenshot", vec![capture.to_result()]));
    Ok(CommandOutcome { report, failed: false })
}

/// Ensure the backend, sweep its endpoints, run the viewer, stop what we started
///
/// Endpoint failures are reported but only a backend or viewer failure fails the command.
pub async fn run_launch<R, H>(config: &LauncherConfig, runner: &R, http: H, with_viewer: bool) -> LauncherResult<CommandOutcome>
where
    R: CommandRunner,
    H: HttpProbe,
{
    let mut report = CheckReport::new();

    let runtime = match resolve_runtime(config, runner).await {
        Ok(runtime) => runtime,
        Err(e) => {
            report.push(Section::with_results(
                "Backend",
                vec![ProbeResult::fail(ProbeKind::Runtime, "runtime").with_detail(e.to_string())],
            ));
            return Ok(CommandOutcome { report, failed: true });
        }
    };

    let mut supervisor = BackendSupervisor::new(monitor_for(config, http), supervisor_settings(config, &runtime.program)?);
    let state = match supervisor.ensure_backend().await {
        Ok(state) => state,
        Err(e) => {
            report.push(Section::with_results(
                "Backend",
                vec![ProbeResult::fail(ProbeKind::Http, "backend").with_detail(e.to_string())],
            ));
            return Ok(CommandOutcome { report, failed: true });
        }
    };
    report.push(Section::with_results("Backend", vec![backend_result(&state)]));

    let endpoints = supervisor.monitor().verify_endpoints(&config.backend.endpoints).await;
    report.push(Section::with_results("API Endpoints", endpoints));

    let mut failed = false;
    if with_viewer {
        let viewer = match supervisor.launch_viewer().await {
            Ok(true) => ProbeResult::pass(ProbeKind::File, config.viewer.script.display().to_string()),
            Ok(false) => {
                failed = true;
                ProbeResult::fail(ProbeKind::File, config.viewer.script.display().to_string())
                    .with_detail("viewer missing or exited with an error")
            }
            Err(e) => {
                failed = true;
                ProbeResult::fail(ProbeKind::File, config.viewer.script.display().to_string()).with_detail(e.to_string())
            }
        };
        report.push(Section::with_results("Viewer", vec![viewer]));
    }

    if supervisor.owns_backend() {
        supervisor.shutdown().await?;
    }

    Ok(CommandOutcome { report, failed })
}

/// Final readiness check against a running backend; not ready fails the command
pub async fn run_readiness<H: HttpProbe>(config: &LauncherConfig, http: H) -> LauncherResult<CommandOutcome> {
    let monitor = monitor_for(config, http);
    let mut report = CheckReport::new();

    if !monitor.is_up().await {
        step_warn!(CommandId::current(), "⚠️ Backend not reachable at {}", monitor.base_url());
        report.push(Section::with_results(
            "API Verification",
            vec![ProbeResult::fail(ProbeKind::Http, "backend reachable")
                .with_detail(format!("no answer from {}", monitor.url_for(&config.backend.liveness_path)))],
        ));
        return Ok(CommandOutcome { report, failed: true });
    }

    let ready = match ReadinessAssessor::new(&monitor, &config.readiness).assess().await {
        Ok(assessment) => {
            for section in assessment.to_sections() {
                report.push(section);
            }
            assessment.is_ready()
        }
        Err(e @ (LauncherError::Readiness { .. } | LauncherError::Http { .. })) => {
            report.push(Section::with_results(
                "API Verification",
                vec![ProbeResult::fail(ProbeKind::Readiness, "readiness data").with_detail(e.to_string())],
            ));
            false
        }
        Err(e) => return Err(e),
    };

    let mut verdict = Section::new("Final Assessment");
    verdict.push(ProbeResult::from_bool(ProbeKind::Readiness, "system ready", ready));
    verdict.note(if ready {
        "SYSTEM READY"
    } else {
        "SYSTEM NOT READY - ISSUES DETECTED"
    });
    report.push(verdict);

    Ok(CommandOutcome { report, failed: !ready })
}
