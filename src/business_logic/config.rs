use std::env;
use std::path::PathBuf;

use crate::business_logic::presentation::{ChartView, Theme};

pub const ENV_BACKEND_URL: &str = "CHARTDESK_BACKEND_URL";
pub const ENV_BIND_ADDR: &str = "CHARTDESK_BIND_ADDR";
pub const ENV_VIEW: &str = "CHARTDESK_VIEW";
pub const ENV_THEME: &str = "CHARTDESK_THEME";
pub const ENV_LOG_DIR: &str = "CHARTDESK_LOG_DIR";

/// Configuration for a dashboard process
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the stock backend serving /plot, /analyze_stock and /api/moat-analysis
    pub backend_url: String,
    /// Address the session API listens on
    pub bind_addr: String,
    /// Compact dashboard chart or the detailed full-page chart
    pub view: ChartView,
    /// Color theme applied to every rendered chart
    pub theme: Theme,
    /// Minimum chart height in the detailed view (px)
    pub detailed_height: u32,
    /// Opacity applied to volume bars
    pub volume_opacity: f64,
    /// Capacity of the dashboard event channel
    pub event_capacity: usize,
    /// Directory for the rolling file log; stdout only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            view: ChartView::Compact,
            theme: Theme::Light,
            detailed_height: 600,
            volume_opacity: 0.8,
            event_capacity: 64,
            log_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `CHARTDESK_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            config.backend_url = url.trim_end_matches('/').to_string();
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(view) = lookup(ENV_VIEW) {
            match view.parse() {
                Ok(view) => config.view = view,
                Err(_) => tracing::warn!("Ignoring unknown {}={}", ENV_VIEW, view),
            }
        }
        if let Some(theme) = lookup(ENV_THEME) {
            match theme.parse() {
                Ok(theme) => config.theme = theme,
                Err(_) => tracing::warn!("Ignoring unknown {}={}", ENV_THEME, theme),
            }
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn from_lookup_keeps_defaults_without_overrides() {
        let config = DashboardConfig::from_lookup(|_| None);
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert_eq!(config.view, ChartView::Compact);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn from_lookup_applies_overrides_and_skips_bad_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_BACKEND_URL, "http://stocks.local:8080/"),
            (ENV_VIEW, "detailed"),
            (ENV_THEME, "neon"),
            (ENV_LOG_DIR, "/tmp/chartdesk"),
        ]);
        let config = DashboardConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url, "http://stocks.local:8080");
        assert_eq!(config.view, ChartView::Detailed);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/chartdesk")));
    }
}
