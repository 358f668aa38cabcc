use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::business_logic::controls::SettingsPanel;
use crate::business_logic::mode::{AnalysisMode, ChartClickMode, Indicator, IndicatorFlags};
use crate::models::analysis::{AnalysisSections, MoatSections};
use crate::models::annotation::{ChartPoint, ElliottPoint, TrendLine, XValue};
use crate::models::chart::{ChartDescription, ChartStatistics};

/// Everything the page needs to redraw its controls and annotation lists
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub mode: AnalysisMode,
    pub click_mode: ChartClickMode,
    pub visible_panel: Option<SettingsPanel>,
    pub indicators: IndicatorFlags,
    pub controls: BTreeMap<String, String>,
    pub trendlines: Vec<TrendLine>,
    pub pending_point: Option<ChartPoint>,
    pub custom_mas: Vec<u32>,
    pub moving_averages: Vec<u32>,
    pub elliott_points: Vec<ElliottPoint>,
    pub has_chart: bool,
}

/// Session view after a change, with the outcome of the chart refresh it triggered
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionUpdate {
    pub view: SessionView,
    pub chart: Option<RegionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FibSettings {
    pub manual_mode: bool,
    pub fib_high: String,
    pub show_extensions: bool,
    pub show_fib: bool,
}

/// Saved chart state carried from the dashboard to the detailed view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartStateSnapshot {
    pub ticker: String,
    pub period: String,
    pub mode: AnalysisMode,
    pub chart_mode: ChartClickMode,
    pub indicators: IndicatorFlags,
    pub moving_averages: Vec<u32>,
    /// Checked standard periods; absent in snapshots written before it existed
    #[serde(default)]
    pub standard_mas: Option<Vec<u32>>,
    pub custom_mas: Vec<u32>,
    pub elliott_points: Vec<ElliottPoint>,
    #[serde(default)]
    pub trendlines: Vec<TrendLine>,
    pub fib_settings: FibSettings,
    #[serde(default)]
    pub elliott_auto_waves: bool,
    #[serde(default)]
    pub elliott_fib_levels: bool,
    #[serde(default = "default_true")]
    pub extend_elliott_projections: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ControlsUpdate {
    /// Control id to new value, e.g. `{"ticker": "AAPL", "ma-20": "true"}`
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ModeRequest {
    pub mode: AnalysisMode,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IndicatorRequest {
    pub indicator: Indicator,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClickRequest {
    pub x: XValue,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomMaRequest {
    pub period: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MaPreset {
    None,
    Basic,
    Extended,
    DayTrading,
}

impl MaPreset {
    pub fn periods(self) -> &'static [u32] {
        match self {
            MaPreset::None => &[],
            MaPreset::Basic => &[20, 50],
            MaPreset::Extended => &[20, 50, 200],
            MaPreset::DayTrading => &[5, 10, 20],
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaPresetRequest {
    pub preset: MaPreset,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ElliottPointRequest {
    pub x: XValue,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RefreshQuery {
    /// Skip the statistics/financials payload
    #[serde(default = "default_true")]
    #[param(example = true, default = true)]
    pub chart_only: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnapshotSaved {
    pub key: String,
    /// Where the detailed view lives for this ticker and period
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    Loaded,
    /// A newer chart response was already applied
    Stale,
    Failed,
}

/// Outcome of one dashboard region after a load
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RegionStatus {
    pub status: RegionState,
    pub message: Option<String>,
}

impl RegionStatus {
    pub fn loaded() -> Self {
        Self {
            status: RegionState::Loaded,
            message: None,
        }
    }

    pub fn stale() -> Self {
        Self {
            status: RegionState::Stale,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RegionState::Failed,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardLoad {
    pub chart: RegionStatus,
    pub analysis: RegionStatus,
    pub moat: RegionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Chart,
    Stats,
    Analysis,
    Moat,
}

/// Pushed to the page over `/events`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    ChartRendered {
        seq: u64,
        chart_only: bool,
        chart: ChartDescription,
    },
    OverlayAdded {
        trendline_id: String,
        trace: Value,
    },
    StatsLoaded {
        stats: ChartStatistics,
    },
    AnalysisLoaded {
        ticker: String,
        executive_summary: Option<String>,
        sections: AnalysisSections,
        timestamp: Option<String>,
        is_cached: bool,
    },
    MoatLoaded {
        ticker: String,
        sections: MoatSections,
        timestamp: Option<String>,
        is_cached: bool,
    },
    RegionLoading {
        region: Region,
    },
    RegionReset {
        region: Region,
    },
    Error {
        region: Region,
        message: String,
    },
    SessionChanged {
        view: Box<SessionView>,
    },
}

impl DashboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::ChartRendered { .. } => "chart_rendered",
            DashboardEvent::OverlayAdded { .. } => "overlay_added",
            DashboardEvent::StatsLoaded { .. } => "stats_loaded",
            DashboardEvent::AnalysisLoaded { .. } => "analysis_loaded",
            DashboardEvent::MoatLoaded { .. } => "moat_loaded",
            DashboardEvent::RegionLoading { .. } => "region_loading",
            DashboardEvent::RegionReset { .. } => "region_reset",
            DashboardEvent::Error { .. } => "error",
            DashboardEvent::SessionChanged { .. } => "session_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_dashboard_buttons() {
        assert!(MaPreset::None.periods().is_empty());
        assert_eq!(MaPreset::Extended.periods(), &[20, 50, 200]);
        let preset: MaPresetRequest = serde_json::from_str(r#"{"preset":"day-trading"}"#).unwrap();
        assert_eq!(preset.preset, MaPreset::DayTrading);
    }

    #[test]
    fn region_status_serializes_with_message() {
        let failed = serde_json::to_value(RegionStatus::failed("boom")).unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["message"], "boom");

        let loaded = serde_json::to_value(RegionStatus::loaded()).unwrap();
        assert_eq!(loaded["status"], "loaded");
        assert!(loaded["message"].is_null());
    }

    #[test]
    fn events_are_tagged_by_type() {
        let event = DashboardEvent::Error {
            region: Region::Chart,
            message: "Chart Error: nope".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.name());
        assert_eq!(value["region"], "chart");
    }
}
