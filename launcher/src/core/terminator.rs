//! Backend shutdown and port-release check
//!
//! A tracked PID is preferred. Matching by executable name is the fallback
//! when no PID was recorded, and can hit unrelated processes that share the
//! interpreter name. A PID read back from the pid file is only signalled
//! while it still runs one of the backend's executable names.

use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::services::process_table::executable_matches;
use crate::traits::{PortProbe, ProcessTable};
use shared::{step_debug, step_info, step_warn, CommandId, ProbeKind, ProbeResult, Section};

/// What a stop request is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTarget {
    /// A PID the operator named; signalled as is
    Explicit(u32),
    /// A PID from the pid file, which may have been reused since it was written
    Recorded(u32),
    ByName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationStrategy {
    TrackedPid(u32),
    ByName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    Terminated { pids: Vec<u32> },
    NoneRunning,
    /// Some targets survived; `pids` lists the survivors
    Failed { pids: Vec<u32>, terminated: Vec<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Available,
    MayStillBeInUse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationReport {
    pub strategy: TerminationStrategy,
    pub outcome: TerminationOutcome,
    pub port: SocketAddr,
    pub port_status: PortStatus,
}

impl TerminationReport {
    /// Render as a report section; advisory, never fatal
    pub fn to_section(&self) -> Section {
        let mut section = Section::new("Stop Backend");
        let target = match &self.strategy {
            TerminationStrategy::TrackedPid(pid) => format!("tracked pid {pid}"),
            TerminationStrategy::ByName(name) => format!("processes named '{name}'"),
        };

        match &self.outcome {
            TerminationOutcome::Terminated { pids } => section.push(
                ProbeResult::pass(ProbeKind::Termination, format!("stop {target}"))
                    .with_detail(format!("terminated {}", join_pids(pids))),
            ),
            TerminationOutcome::NoneRunning => section.push(
                ProbeResult::pass(ProbeKind::Termination, format!("stop {target}"))
                    .with_detail("no processes were running"),
            ),
            TerminationOutcome::Failed { pids, terminated } => {
                let mut detail = format!("still running: {}", join_pids(pids));
                if !terminated.is_empty() {
                    detail.push_str(&format!("; terminated {}", join_pids(terminated)));
                }
                section.push(ProbeResult::fail(ProbeKind::Termination, format!("stop {target}")).with_detail(detail));
            }
        }

        match self.port_status {
            PortStatus::Available => section.push(
                ProbeResult::pass(ProbeKind::Port, format!("port {}", self.port.port())).with_detail("available"),
            ),
            PortStatus::MayStillBeInUse => section.push(
                ProbeResult::fail(ProbeKind::Port, format!("port {}", self.port.port()))
                    .with_detail("may still be in use"),
            ),
        }
        section
    }
}

fn join_pids(pids: &[u32]) -> String {
    pids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone)]
pub struct TerminatorSettings {
    pub executable_name: String,
    /// Further names a recorded PID may run under, e.g. the runtime fallback
    pub owner_names: Vec<String>,
    pub port: SocketAddr,
    /// How long a tracked process gets to exit after the polite signal
    pub grace_period: Duration,
    pub release_timeout: Duration,
    pub poll_interval: Duration,
}

pub struct Terminator<T, P> {
    table: T,
    ports: P,
    settings: TerminatorSettings,
}

impl<T: ProcessTable, P: PortProbe> Terminator<T, P> {
    pub fn new(table: T, ports: P, settings: TerminatorSettings) -> Self {
        Self { table, ports, settings }
    }

    /// Stop the targeted PID, or everything matching the name
    pub async fn stop(&self, target: StopTarget) -> TerminationReport {
        let (strategy, outcome) = match target {
            StopTarget::Explicit(pid) => (TerminationStrategy::TrackedPid(pid), self.stop_tracked(pid).await),
            StopTarget::Recorded(pid) => {
                let outcome = if self.runs_backend(pid) {
                    self.stop_tracked(pid).await
                } else {
                    TerminationOutcome::NoneRunning
                };
                (TerminationStrategy::TrackedPid(pid), outcome)
            }
            StopTarget::ByName => {
                let name = self.settings.executable_name.clone();
                let outcome = self.stop_by_name(&name).await;
                (TerminationStrategy::ByName(name), outcome)
            }
        };

        let port_status = self.wait_for_port_release().await;
        match port_status {
            PortStatus::Available => {
                step_info!(CommandId::current(), "🔓 Port {} is available", self.settings.port.port());
            }
            PortStatus::MayStillBeInUse => {
                step_warn!(
                    CommandId::current(),
                    "⚠️ Port {} may still be in use",
                    self.settings.port.port()
                );
            }
        }

        TerminationReport {
            strategy,
            outcome,
            port: self.settings.port,
            port_status,
        }
    }

    /// Whether a live `pid` still runs one of the backend's executable names
    fn runs_backend(&self, pid: u32) -> bool {
        if !self.table.is_alive(pid) {
            step_info!(CommandId::current(), "✅ Recorded process {} is not running", pid);
            return false;
        }
        let Some(name) = self.table.name_of(pid) else {
            return false;
        };

        let owned = std::iter::once(&self.settings.executable_name)
            .chain(&self.settings.owner_names)
            .any(|wanted| executable_matches(&name, wanted));
        if !owned {
            step_warn!(
                CommandId::current(),
                "⚠️ Recorded pid {} now belongs to '{}', treating the pid file as stale",
                pid,
                name
            );
        }
        owned
    }

    /// Polite signal, bounded wait, then force
    async fn stop_tracked(&self, pid: u32) -> TerminationOutcome {
        if !self.table.is_alive(pid) {
            step_info!(CommandId::current(), "✅ Tracked process {} is not running", pid);
            return TerminationOutcome::NoneRunning;
        }

        step_info!(CommandId::current(), "🔪 Terminating tracked process {}", pid);
        if self.table.terminate(pid) && self.wait_for_exit(pid, self.settings.grace_period).await {
            return TerminationOutcome::Terminated { pids: vec![pid] };
        }

        step_warn!(CommandId::current(), "🔨 Process {} didn't exit in time, killing", pid);
        self.table.kill(pid);
        if self.wait_for_exit(pid, self.settings.grace_period).await {
            TerminationOutcome::Terminated { pids: vec![pid] }
        } else {
            TerminationOutcome::Failed {
                pids: vec![pid],
                terminated: Vec::new(),
            }
        }
    }

    /// Forceful kill of every process with the executable name
    async fn stop_by_name(&self, name: &str) -> TerminationOutcome {
        let pids = self.table.find_by_name(name);
        if pids.is_empty() {
            step_info!(CommandId::current(), "✅ No '{}' processes were running", name);
            return TerminationOutcome::NoneRunning;
        }

        step_warn!(
            CommandId::current(),
            "🔪 Killing {} '{}' process(es) by name: {:?}",
            pids.len(),
            name,
            pids
        );
        for pid in &pids {
            if !self.table.kill(*pid) {
                step_debug!(CommandId::current(), "Kill request for {} was refused", pid);
            }
        }

        let mut terminated = Vec::new();
        let mut survivors = Vec::new();
        for pid in pids {
            if self.wait_for_exit(pid, self.settings.grace_period).await {
                terminated.push(pid);
            } else {
                survivors.push(pid);
            }
        }

        if survivors.is_empty() {
            TerminationOutcome::Terminated { pids: terminated }
        } else {
            TerminationOutcome::Failed {
                pids: survivors,
                terminated,
            }
        }
    }

    async fn wait_for_exit(&self, pid: u32, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if !self.table.is_alive(pid) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.settings.poll_interval).await;
        }
    }

    /// Poll until nothing listens on the port, bounded by the release timeout
    pub async fn wait_for_port_release(&self) -> PortStatus {
        let deadline = Instant::now() + self.settings.release_timeout;
        loop {
            if !self.ports.is_listening(self.settings.port).await {
                return PortStatus::Available;
            }
            if Instant::now() >= deadline {
                return PortStatus::MayStillBeInUse;
            }
            sleep(self.settings.poll_interval).await;
        }
    }
}
