//! Launcher configuration
//!
//! Every value has a default matching the stock paper-trading project
//! layout. A `botops.toml` in the project directory (or `--config`)
//! overrides any subset of them; relative paths resolve against the
//! project directory at invocation time.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LauncherError, LauncherResult};

/// File name looked up in the project directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "botops.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Root of the trading project, resolved to the working directory when unset
    pub project_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
    pub preflight: PreflightConfig,
    pub imports: ImportConfig,
    pub backend: BackendConfig,
    pub terminator: TerminatorConfig,
    pub screenshot: ScreenshotConfig,
    pub readiness: ReadinessConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub primary: String,
    /// Tried exactly once when the primary name fails
    pub fallback: Option<String>,
    pub version_flag: String,
    pub command_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let fallback = if cfg!(windows) { "py" } else { "python3" };
        Self {
            primary: "python".to_string(),
            fallback: Some(fallback.to_string()),
            version_flag: "--version".to_string(),
            command_timeout_secs: 30,
        }
    }
}

impl RuntimeConfig {
    /// Candidate names in the order they are tried
    pub fn candidates(&self) -> Vec<String> {
        let mut names = vec![self.primary.clone()];
        if let Some(fallback) = &self.fallback {
            if fallback != &self.primary {
                names.push(fallback.clone());
            }
        }
        names
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    pub expected_files: Vec<PathBuf>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            expected_files: vec![
                PathBuf::from("comprehensive_trading_viewer.py"),
                PathBuf::from("api/simple_modular_routes.py"),
            ],
        }
    }
}

/// One importability check
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportSpec {
    pub name: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub sentinel: String,
    pub probes: Vec<ImportSpec>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sentinel: "IMPORT_OK".to_string(),
            probes: vec![
                ImportSpec {
                    name: "backend factory".to_string(),
                    statement: "from api.simple_modular_routes import create_simple_modular_app".to_string(),
                },
                ImportSpec {
                    name: "gui toolkit".to_string(),
                    statement: "import tkinter".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Arguments passed to the runtime to start the backend
    pub args: Vec<String>,
    /// Liveness endpoint, 200 means up
    pub liveness_path: String,
    /// Endpoints swept after startup
    pub endpoints: Vec<String>,
    pub ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    /// Where `start` records the PID it owns, relative to the project dir
    pub pid_file: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            args: vec!["-m".to_string(), "api.simple_modular_routes".to_string()],
            liveness_path: "/api/chart-data".to_string(),
            endpoints: ["/api/positions", "/api/trades", "/api/capital", "/api/strategies", "/api/signals"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            ready_timeout_secs: 30,
            poll_interval_ms: 1000,
            request_timeout_secs: 5,
            shutdown_grace_secs: 10,
            pid_file: PathBuf::from(".botops/backend.pid"),
        }
    }
}

impl BackendConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.socket_addr())
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerminatorConfig {
    /// Executable name matched when no tracked PID is known
    pub executable_name: String,
    pub grace_period_ms: u64,
    /// Upper bound on waiting for the backend port to be released
    pub release_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TerminatorConfig {
    fn default() -> Self {
        Self {
            executable_name: "python".to_string(),
            grace_period_ms: 2000,
            release_timeout_ms: 2000,
            poll_interval_ms: 200,
        }
    }
}

impl TerminatorConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.release_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Settle time before capture, lets earlier UI actions finish drawing
    pub delay_secs: u64,
    /// Window title fragment to bring forward first, best effort
    pub focus_title: Option<String>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("screenshots"),
            file_prefix: "screenshot".to_string(),
            delay_secs: 3,
            focus_title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub chart_path: String,
    pub health_path: String,
    /// Capital a freshly reset portfolio should report
    pub baseline_capital: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            chart_path: "/api/chart-data".to_string(),
            health_path: "/health".to_string(),
            baseline_capital: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub script: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from("comprehensive_trading_viewer.py"),
        }
    }
}

impl LauncherConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> LauncherResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from an explicit file, failing if it cannot be read
    pub fn from_file(path: &Path) -> LauncherResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LauncherError::file_system("read config", path, e))?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration the way the binary does
    ///
    /// An explicit path must exist. Otherwise `botops.toml` in the project
    /// directory is used when present, defaults when not.
    pub fn load(explicit: Option<&Path>, project_dir: Option<&Path>) -> LauncherResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let base = match project_dir {
                    Some(dir) => dir.to_path_buf(),
                    None => std::env::current_dir()?,
                };
                let candidate = base.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(dir) = project_dir {
            config.project_dir = Some(dir.to_path_buf());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LauncherResult<()> {
        if self.runtime.primary.trim().is_empty() {
            return Err(LauncherError::config("runtime.primary must not be empty"));
        }
        if matches!(&self.runtime.fallback, Some(name) if name.trim().is_empty()) {
            return Err(LauncherError::config("runtime.fallback must not be empty when set"));
        }
        if self.backend.port == 0 {
            return Err(LauncherError::config("backend.port must be non-zero"));
        }
        if self.backend.poll_interval_ms == 0 || self.terminator.poll_interval_ms == 0 {
            return Err(LauncherError::config("poll intervals must be non-zero"));
        }
        if self.terminator.executable_name.trim().is_empty() {
            return Err(LauncherError::config("terminator.executable_name must not be empty"));
        }
        if self.imports.sentinel.trim().is_empty() {
            return Err(LauncherError::config("imports.sentinel must not be empty"));
        }
        Ok(())
    }

    /// Project root, falling back to the current directory
    pub fn project_root(&self) -> LauncherResult<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: &Path) -> LauncherResult<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.project_root()?.join(path))
        }
    }
}
