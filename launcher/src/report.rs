//! Operator-facing PASS/FAIL output

use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

use shared::{CheckReport, ProbeResult, Section};

const RULE_WIDTH: usize = 50;

/// Writes headers, probe lines and a summary to any writer
pub struct ConsoleReporter<W> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    /// Stdout, colored unless `NO_COLOR` is set or stdout is not a terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = std::env::var_os("NO_COLOR").is_none() && out.is_terminal();
        Self { out, color }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        if self.color {
            writeln!(self.out, "{}", rule.cyan())?;
            writeln!(self.out, "{}", title.bold())?;
            writeln!(self.out, "{}", rule.cyan())
        } else {
            writeln!(self.out, "{rule}")?;
            writeln!(self.out, "{title}")?;
            writeln!(self.out, "{rule}")
        }
    }

    pub fn result(&mut self, result: &ProbeResult) -> io::Result<()> {
        let tag = format!("[{}]", result.tag());
        let tag = match (self.color, result.passed) {
            (false, _) => tag,
            (true, true) => tag.green().to_string(),
            (true, false) => tag.red().bold().to_string(),
        };
        match &result.detail {
            Some(detail) => writeln!(self.out, "{} {}: {}", tag, result.name, detail),
            None => writeln!(self.out, "{} {}", tag, result.name),
        }
    }

    pub fn note(&mut self, note: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "  {}", note.dimmed())
        } else {
            writeln!(self.out, "  {note}")
        }
    }

    pub fn section(&mut self, section: &Section) -> io::Result<()> {
        writeln!(self.out)?;
        self.header(&section.title)?;
        for result in &section.results {
            self.result(result)?;
        }
        for note in &section.notes {
            self.note(note)?;
        }
        Ok(())
    }

    /// Every section followed by the summary line
    pub fn report(&mut self, report: &CheckReport) -> io::Result<()> {
        for section in &report.sections {
            self.section(section)?;
        }
        self.summary(report)
    }

    pub fn summary(&mut self, report: &CheckReport) -> io::Result<()> {
        let line = format!("{} passed, {} failed", report.passed_count(), report.failed_count());
        writeln!(self.out)?;
        match (self.color, report.failed_count()) {
            (false, _) => writeln!(self.out, "{line}"),
            (true, 0) => writeln!(self.out, "{}", line.green().bold()),
            (true, _) => writeln!(self.out, "{}", line.yellow().bold()),
        }
    }

    /// Keep the window open until the operator presses Enter
    pub fn pause_for_operator<R: BufRead>(&mut self, input: &mut R) -> io::Result<()> {
        write!(self.out, "\nPress Enter to exit...")?;
        self.out.flush()?;
        let mut discard = String::new();
        input.read_line(&mut discard)?;
        Ok(())
    }
}
