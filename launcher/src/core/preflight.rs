//! Expected-file presence checks

use std::path::{Path, PathBuf};

use shared::{step_debug, CommandId, ProbeKind, ProbeResult};

/// Checks that files the launch depends on are on disk
///
/// Only reads metadata. A missing file, or one whose presence cannot be
/// determined, comes back as a failed result rather than an error.
#[derive(Debug, Clone)]
pub struct PreflightChecker {
    root: PathBuf,
}

impl PreflightChecker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// One result per path, in the order given
    pub fn check<P: AsRef<Path>>(&self, expected: &[P]) -> Vec<ProbeResult> {
        expected.iter().map(|path| self.check_one(path.as_ref())).collect()
    }

    pub fn check_one(&self, relative: &Path) -> ProbeResult {
        let name = relative.display().to_string();
        let full = self.root.join(relative);

        let result = match full.try_exists() {
            Ok(true) => ProbeResult::pass(ProbeKind::File, name),
            Ok(false) => ProbeResult::fail(ProbeKind::File, name)
                .with_detail(format!("not found at {}", full.display())),
            Err(e) => ProbeResult::fail(ProbeKind::File, name)
                .with_detail(format!("cannot check {}: {e}", full.display())),
        };

        step_debug!(CommandId::current(), "📁 {}", result);
        result
    }
}
