//! Canned backend payloads and project layouts

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const VIEWER_SCRIPT: &'static str = "comprehensive_trading_viewer.py";
    pub const BACKEND_MODULE: &'static str = "api/simple_modular_routes.py";

    /// Chart data of a freshly reset 500.00 portfolio
    pub fn clean_chart_data() -> String {
        Self::chart_data(500.0, 500.0, 0.0, 0.0, "[]")
    }

    /// Chart data after one trade left an open position
    pub fn traded_chart_data() -> String {
        Self::chart_data(512.5, 400.0, 112.5, 12.5, r#"[{"symbol":"AAPL","quantity":1}]"#)
    }

    pub fn chart_data(total: f64, cash: f64, market: f64, pnl: f64, positions: &str) -> String {
        format!(
            r#"{{"success":true,"data":{{"portfolio_summary":{{"total_value":{total},"cash_balance":{cash},"market_value":{market},"total_pnl":{pnl}}},"positions_data":{positions},"data_status":"live"}}}}"#
        )
    }

    pub fn health_all_connected() -> String {
        r#"{"success":true,"data":{"components":{"providers":{"market_data":{"status":"connected"},"execution":{"status":"connected"}}}}}"#.to_string()
    }

    pub fn health_one_disconnected() -> String {
        r#"{"success":true,"data":{"components":{"providers":{"market_data":{"status":"connected"},"execution":{"status":"disconnected"}}}}}"#.to_string()
    }
}
