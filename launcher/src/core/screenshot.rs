//! Primary-display screenshots for manual verification

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::{CommandRunner, DisplaySource, Invocation};
use shared::{step_debug, step_info, CommandId, ProbeKind, ProbeResult};

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Already resolved against the project root
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Fixed file name; a timestamped one is generated when unset
    pub file_name: Option<String>,
    pub settle_delay: Duration,
    pub focus_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl CaptureReport {
    pub fn to_result(&self) -> ProbeResult {
        ProbeResult::pass(ProbeKind::Screenshot, "capture primary display").with_detail(format!(
            "{}x{} saved to {}",
            self.width,
            self.height,
            self.path.display()
        ))
    }
}

pub struct ScreenshotCapturer<D, R> {
    display: D,
    runner: R,
    settings: CaptureSettings,
}

impl<D: DisplaySource, R: CommandRunner> ScreenshotCapturer<D, R> {
    pub fn new(display: D, runner: R, settings: CaptureSettings) -> Self {
        Self {
            display,
            runner,
            settings,
        }
    }

    /// Focus (best effort), settle, capture, save as PNG
    pub async fn capture(&self) -> LauncherResult<CaptureReport> {
        if let Some(title) = &self.settings.focus_title {
            self.focus_window(title).await;
        }

        if !self.settings.settle_delay.is_zero() {
            step_info!(
                CommandId::current(),
                "📸 Taking screenshot in {:?}",
                self.settings.settle_delay
            );
            sleep(self.settings.settle_delay).await;
        }

        let bounds = self.display.primary_bounds()?;
        let bitmap = self.display.capture_primary()?;
        if bitmap.dimensions() != (bounds.width, bounds.height) {
            return Err(LauncherError::capture(format!(
                "captured {}x{} but primary display reports {}x{}",
                bitmap.width(),
                bitmap.height(),
                bounds.width,
                bounds.height
            )));
        }

        std::fs::create_dir_all(&self.settings.output_dir)
            .map_err(|e| LauncherError::file_system("create directory", &self.settings.output_dir, e))?;
        let path = self.settings.output_dir.join(self.file_name());
        bitmap.save_with_format(&path, image::ImageFormat::Png)?;

        step_info!(CommandId::current(), "💾 Screenshot saved as {}", path.display());
        Ok(CaptureReport {
            path,
            width: bounds.width,
            height: bounds.height,
        })
    }

    pub fn file_name(&self) -> String {
        match &self.settings.file_name {
            Some(name) if Path::new(name).extension().is_some() => name.clone(),
            Some(name) => format!("{name}.png"),
            None => format!(
                "{}_{}.png",
                self.settings.file_prefix,
                Local::now().format("%Y%m%d_%H%M%S")
            ),
        }
    }

    /// Failures are logged and swallowed; the capture goes ahead regardless
    async fn focus_window(&self, title: &str) {
        let Some(invocation) = focus_invocation(title) else {
            step_debug!(CommandId::current(), "No window focus helper on this platform");
            return;
        };

        match self.runner.run(&invocation.timeout(Duration::from_secs(5))).await {
            Ok(output) if output.success() => {
                step_debug!(CommandId::current(), "🪟 Focused window matching '{}'", title);
                // Give the compositor a moment to raise the window
                sleep(Duration::from_millis(500)).await;
            }
            Ok(output) => {
                step_debug!(
                    CommandId::current(),
                    "Window focus for '{}' exited with {:?}",
                    title,
                    output.status
                );
            }
            Err(e) => {
                step_debug!(CommandId::current(), "Window focus for '{}' unavailable: {}", title, e);
            }
        }
    }
}

/// Platform helper that raises a window by title fragment
pub fn focus_invocation(title: &str) -> Option<Invocation> {
    if cfg!(target_os = "windows") {
        let escaped = title.replace('\'', "''");
        Some(Invocation::new("powershell").args([
            "-NoProfile".to_string(),
            "-Command".to_string(),
            format!("(New-Object -ComObject WScript.Shell).AppActivate('{escaped}')"),
        ]))
    } else if cfg!(target_os = "macos") {
        let escaped = title.replace('"', "\\\"");
        Some(Invocation::new("osascript").args([
            "-e".to_string(),
            format!("tell application \"{escaped}\" to activate"),
        ]))
    } else if cfg!(unix) {
        Some(Invocation::new("wmctrl").args(["-a", title]))
    } else {
        None
    }
}
