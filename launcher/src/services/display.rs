//! Primary-display capture
//!
//! The real backend uses `xcap` and is compiled only with the
//! `desktop-capture` feature; headless builds report a capture error.

use crate::error::{LauncherError, LauncherResult};
use crate::traits::{DisplayBounds, DisplaySource};

#[derive(Debug, Clone, Default)]
pub struct RealDisplaySource;

impl RealDisplaySource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "desktop-capture")]
impl RealDisplaySource {
    fn primary_monitor() -> LauncherResult<xcap::Monitor> {
        let monitors = xcap::Monitor::all().map_err(|e| LauncherError::capture(e.to_string()))?;
        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary() {
                return Ok(monitor);
            }
            fallback.get_or_insert(monitor);
        }
        fallback.ok_or_else(|| LauncherError::capture("no display found"))
    }
}

#[cfg(feature = "desktop-capture")]
impl DisplaySource for RealDisplaySource {
    fn primary_bounds(&self) -> LauncherResult<DisplayBounds> {
        let monitor = Self::primary_monitor()?;
        Ok(DisplayBounds {
            x: monitor.x(),
            y: monitor.y(),
            width: monitor.width(),
            height: monitor.height(),
        })
    }

    fn capture_primary(&self) -> LauncherResult<image::RgbaImage> {
        let monitor = Self::primary_monitor()?;
        let captured = monitor
            .capture_image()
            .map_err(|e| LauncherError::capture(e.to_string()))?;
        let (width, height) = captured.dimensions();
        image::RgbaImage::from_raw(width, height, captured.into_raw())
            .ok_or_else(|| LauncherError::capture("display returned a truncated bitmap"))
    }
}

#[cfg(not(feature = "desktop-capture"))]
impl DisplaySource for RealDisplaySource {
    fn primary_bounds(&self) -> LauncherResult<DisplayBounds> {
        Err(LauncherError::capture(
            "screen capture support not compiled in (enable the desktop-capture feature)",
        ))
    }

    fn capture_primary(&self) -> LauncherResult<image::RgbaImage> {
        Err(LauncherError::capture(
            "screen capture support not compiled in (enable the desktop-capture feature)",
        ))
    }
}

#[cfg(all(test, not(feature = "desktop-capture")))]
mod tests {
    use super::*;

    #[test]
    fn test_headless_build_reports_capture_error() {
        let display = RealDisplaySource::new();
        assert!(matches!(display.primary_bounds(), Err(LauncherError::Capture { .. })));
        assert!(matches!(display.capture_primary(), Err(LauncherError::Capture { .. })));
    }
}
