//! Probe results and the report they are collected into
//!
//! A probe result lives for one command run: it is produced, printed and
//! dropped. Failures are data here, never errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of check that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    File,
    Runtime,
    Import,
    Port,
    Http,
    Termination,
    Screenshot,
    Readiness,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::File => "file",
            ProbeKind::Runtime => "runtime",
            ProbeKind::Import => "import",
            ProbeKind::Port => "port",
            ProbeKind::Http => "http",
            ProbeKind::Termination => "termination",
            ProbeKind::Screenshot => "screenshot",
            ProbeKind::Readiness => "readiness",
        };
        f.write_str(name)
    }
}

/// Outcome of a single pass/fail check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub kind: ProbeKind,
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

impl ProbeResult {
    pub fn pass(kind: ProbeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    pub fn fail(kind: ProbeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            passed: false,
            detail: None,
        }
    }

    pub fn from_bool(kind: ProbeKind, name: impl Into<String>, passed: bool) -> Self {
        Self {
            kind,
            name: name.into(),
            passed,
            detail: None,
        }
    }

    /// Attach a human-readable detail (fluent API)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn tag(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag(), self.name)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// A titled group of results, printed under one header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub results: Vec<ProbeResult>,
    /// Advisory lines printed after the results
    pub notes: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            results: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_results(title: impl Into<String>, results: Vec<ProbeResult>) -> Self {
        Self {
            title: title.into(),
            results,
            notes: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Everything one command run printed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub sections: Vec<Section>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.sections.iter().flat_map(|s| s.results.iter())
    }

    pub fn passed_count(&self) -> usize {
        self.results().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results().filter(|r| !r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}
