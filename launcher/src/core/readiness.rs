//! Final readiness assessment of a running backend
//!
//! Reads the chart-data and health endpoints and decides whether the
//! paper-trading system is in a clean, consistent, fully connected state.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::config::ReadinessConfig;
use crate::core::monitor::BackendMonitor;
use crate::error::{LauncherError, LauncherResult};
use crate::traits::HttpProbe;
use shared::{step_info, step_warn, CommandId, ProbeKind, ProbeResult, Section};

/// Money values closer than this are treated as equal
pub const CENT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub cash_balance: f64,
    pub market_value: f64,
    pub total_pnl: f64,
}

impl PortfolioSummary {
    pub fn is_consistent(&self) -> bool {
        (self.total_value - (self.cash_balance + self.market_value)).abs() < CENT_TOLERANCE
    }

    pub fn matches_baseline(&self, baseline: f64) -> bool {
        approx_eq(self.total_value, baseline)
            && approx_eq(self.cash_balance, baseline)
            && approx_eq(self.market_value, 0.0)
            && approx_eq(self.total_pnl, 0.0)
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < CENT_TOLERANCE
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    portfolio_summary: PortfolioSummary,
    #[serde(default)]
    positions_data: serde_json::Value,
    #[serde(default)]
    data_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthData {
    components: HealthComponents,
}

#[derive(Debug, Deserialize)]
struct HealthComponents {
    #[serde(default)]
    providers: BTreeMap<String, ProviderHealth>,
}

#[derive(Debug, Deserialize)]
struct ProviderHealth {
    status: String,
}

/// Positions arrive as a list or as a symbol-keyed object depending on the backend version
fn count_positions(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) => items.len(),
        serde_json::Value::Object(map) => map.len(),
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessAssessment {
    pub summary: PortfolioSummary,
    pub open_positions: usize,
    pub data_status: String,
    pub math_consistent: bool,
    pub clean_baseline: bool,
    /// Provider name and reported status, sorted by name
    pub providers: Vec<(String, String)>,
    pub all_connected: bool,
}

impl ReadinessAssessment {
    /// Build an assessment from the raw chart-data and health bodies
    pub fn from_payloads(chart: &str, health: &str, baseline: f64) -> LauncherResult<Self> {
        let chart: Envelope<ChartData> = serde_json::from_str(chart)
            .map_err(|e| LauncherError::readiness(format!("malformed chart data: {e}")))?;
        let health: Envelope<HealthData> = serde_json::from_str(health)
            .map_err(|e| LauncherError::readiness(format!("malformed health data: {e}")))?;

        let summary = chart.data.portfolio_summary;
        let open_positions = count_positions(&chart.data.positions_data);
        let providers: Vec<(String, String)> = health
            .data
            .components
            .providers
            .into_iter()
            .map(|(name, provider)| (name, provider.status))
            .collect();
        let all_connected = providers.iter().all(|(_, status)| status == "connected");

        Ok(Self {
            summary,
            open_positions,
            data_status: chart.data.data_status.unwrap_or_else(|| "unknown".to_string()),
            math_consistent: summary.is_consistent(),
            clean_baseline: summary.matches_baseline(baseline) && open_positions == 0,
            providers,
            all_connected,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.math_consistent && self.clean_baseline && self.all_connected
    }

    pub fn to_sections(&self) -> Vec<Section> {
        let s = &self.summary;
        let mut api = Section::with_results(
            "API Verification",
            vec![
                ProbeResult::from_bool(ProbeKind::Readiness, "mathematical consistency", self.math_consistent)
                    .with_detail(format!(
                        "total {:.2} vs cash {:.2} + market {:.2}",
                        s.total_value, s.cash_balance, s.market_value
                    )),
                ProbeResult::from_bool(ProbeKind::Readiness, "clean baseline", self.clean_baseline)
                    .with_detail(format!("P&L {:.2}, {} open positions", s.total_pnl, self.open_positions)),
            ],
        );
        api.note(format!("Data status: {}", self.data_status));

        let mut health = Section::new("Health Verification");
        for (name, status) in &self.providers {
            health.push(
                ProbeResult::from_bool(ProbeKind::Readiness, name.clone(), status == "connected")
                    .with_detail(status.clone()),
            );
        }
        if self.providers.is_empty() {
            health.note("No providers reported");
        }

        vec![api, health]
    }
}

/// Runs the readiness stages against a live backend
pub struct ReadinessAssessor<'a, H> {
    monitor: &'a BackendMonitor<H>,
    config: &'a ReadinessConfig,
}

impl<'a, H: HttpProbe> ReadinessAssessor<'a, H> {
    pub fn new(monitor: &'a BackendMonitor<H>, config: &'a ReadinessConfig) -> Self {
        Self { monitor, config }
    }

    pub async fn assess(&self) -> LauncherResult<ReadinessAssessment> {
        let chart = self.fetch(&self.config.chart_path).await?;
        let health = self.fetch(&self.config.health_path).await?;

        let assessment = ReadinessAssessment::from_payloads(&chart, &health, self.config.baseline_capital)?;
        if assessment.is_ready() {
            step_info!(CommandId::current(), "✅ System ready");
        } else {
            step_warn!(
                CommandId::current(),
                "⚠️ System not ready: consistent={} baseline={} connected={}",
                assessment.math_consistent,
                assessment.clean_baseline,
                assessment.all_connected
            );
        }
        Ok(assessment)
    }

    async fn fetch(&self, path: &str) -> LauncherResult<String> {
        let url = self.monitor.url_for(path);
        let reply = self.monitor.http().get(&url).await?;
        if !reply.is_ok() {
            return Err(LauncherError::readiness(format!("{url} returned HTTP {}", reply.status)));
        }
        Ok(reply.body)
    }
}
