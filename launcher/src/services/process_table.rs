//! Process table access through `sysinfo`
//!
//! Each call takes a fresh snapshot; nothing is cached between calls so a
//! PID seen here is only as current as the call that returned it.

use sysinfo::{Pid, ProcessStatus, Signal, System};

use crate::traits::ProcessTable;

#[derive(Debug, Clone, Default)]
pub struct RealProcessTable;

impl RealProcessTable {
    pub fn new() -> Self {
        Self
    }

    fn snapshot() -> System {
        let mut system = System::new();
        system.refresh_processes();
        system
    }
}

/// Case-insensitive executable match that ignores a trailing `.exe`
pub fn executable_matches(candidate: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stripped) => stripped.to_string(),
            None => lower,
        }
    }
    stem(candidate) == stem(wanted)
}

impl ProcessTable for RealProcessTable {
    fn find_by_name(&self, name: &str) -> Vec<u32> {
        let own_pid = std::process::id();
        let system = Self::snapshot();

        let mut pids: Vec<u32> = system
            .processes()
            .iter()
            .filter(|(_, process)| executable_matches(process.name(), name))
            .map(|(pid, _)| pid.as_u32())
            .filter(|pid| *pid != own_pid)
            .collect();
        pids.sort_unstable();
        pids
    }

    fn is_alive(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        if !system.refresh_process(pid) {
            return false;
        }
        // An exited but unreaped child still has a table entry
        system
            .process(pid)
            .map(|process| process.status() != ProcessStatus::Zombie)
            .unwrap_or(false)
    }

    fn name_of(&self, pid: u32) -> Option<String> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        if !system.refresh_process(pid) {
            return None;
        }
        system.process(pid).map(|process| process.name().to_string())
    }

    fn terminate(&self, pid: u32) -> bool {
        let system = Self::snapshot();
        match system.process(Pid::from_u32(pid)) {
            // Platforms without SIGTERM support get a plain kill
            Some(process) => process.kill_with(Signal::Term).unwrap_or_else(|| process.kill()),
            None => false,
        }
    }

    fn kill(&self, pid: u32) -> bool {
        let system = Self::snapshot();
        match system.process(Pid::from_u32(pid)) {
            Some(process) => process.kill(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_matches_ignores_case_and_exe_suffix() {
        assert!(executable_matches("python.exe", "python"));
        assert!(executable_matches("Python", "python.EXE"));
        assert!(!executable_matches("python3", "python"));
        assert!(!executable_matches("pythonw.exe", "python"));
    }

    #[test]
    fn test_find_by_name_nonexistent() {
        let table = RealProcessTable::new();
        assert!(table.find_by_name("nonexistent_process_12345").is_empty());
    }

    #[test]
    fn test_current_process_is_alive_but_never_listed() {
        let table = RealProcessTable::new();
        let own_pid = std::process::id();
        assert!(table.is_alive(own_pid));

        let exe = std::env::current_exe().unwrap();
        let own_name = exe.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!table.find_by_name(&own_name).contains(&own_pid));
    }

    #[test]
    fn test_unknown_pid_is_not_alive() {
        let table = RealProcessTable::new();
        assert!(!table.is_alive(u32::MAX - 1));
        assert_eq!(table.name_of(u32::MAX - 1), None);
        assert!(!table.kill(u32::MAX - 1));
    }
}
