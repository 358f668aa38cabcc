use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard moving-average periods offered as checkboxes
pub const STANDARD_MA_PERIODS: [u32; 6] = [5, 10, 20, 50, 100, 200];

pub const CHECKED: &str = "true";
pub const UNCHECKED: &str = "false";

/// A named input on the dashboard page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ControlName {
    Ticker,
    Period,
    ManualFib,
    ShowExtensions,
    FibHigh,
    ShowFib,
    TrendlineTool,
    ElliottAutoWaves,
    ElliottFibLevels,
    ExtendElliottProjections,
    /// Checkbox for one of the standard periods
    MovingAverage(u32),
}

impl fmt::Display for ControlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlName::Ticker => f.write_str("ticker"),
            ControlName::Period => f.write_str("period"),
            ControlName::ManualFib => f.write_str("manualFibMode"),
            ControlName::ShowExtensions => f.write_str("showExtensions"),
            ControlName::FibHigh => f.write_str("fibHighValue"),
            ControlName::ShowFib => f.write_str("showFib"),
            ControlName::TrendlineTool => f.write_str("trendLineMode"),
            ControlName::ElliottAutoWaves => f.write_str("show-elliott-auto-waves"),
            ControlName::ElliottFibLevels => f.write_str("show-elliott-fib-levels"),
            ControlName::ExtendElliottProjections => f.write_str("extend-elliott-projections"),
            ControlName::MovingAverage(period) => write!(f, "ma-{period}"),
        }
    }
}

impl FromStr for ControlName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = match value {
            "ticker" => ControlName::Ticker,
            "period" => ControlName::Period,
            "manualFibMode" => ControlName::ManualFib,
            "showExtensions" => ControlName::ShowExtensions,
            "fibHighValue" => ControlName::FibHigh,
            "showFib" => ControlName::ShowFib,
            "trendLineMode" => ControlName::TrendlineTool,
            "show-elliott-auto-waves" => ControlName::ElliottAutoWaves,
            "show-elliott-fib-levels" => ControlName::ElliottFibLevels,
            "extend-elliott-projections" => ControlName::ExtendElliottProjections,
            other => {
                let period = other
                    .strip_prefix("ma-")
                    .and_then(|period| period.parse::<u32>().ok())
                    .filter(|period| STANDARD_MA_PERIODS.contains(period))
                    .ok_or_else(|| format!("unknown control: {other}"))?;
                ControlName::MovingAverage(period)
            }
        };
        Ok(name)
    }
}

impl TryFrom<String> for ControlName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ControlName> for String {
    fn from(name: ControlName) -> Self {
        name.to_string()
    }
}

/// Settings panel shown under the mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SettingsPanel {
    Fibonacci,
    Trendlines,
    Elliott,
}

/// Capability the core uses to reach the page's inputs
pub trait ControlSurface {
    fn read_control_value(&self, name: ControlName) -> Option<String>;

    fn set_control_value(&mut self, name: ControlName, value: String);

    /// Show `panel` and hide every other one; `None` hides them all
    fn show_panel(&mut self, panel: Option<SettingsPanel>);

    fn is_checked(&self, name: ControlName) -> bool {
        self.read_control_value(name).as_deref() == Some(CHECKED)
    }

    fn set_checked(&mut self, name: ControlName, checked: bool) {
        let value = if checked { CHECKED } else { UNCHECKED };
        self.set_control_value(name, value.to_string());
    }

    /// Trimmed text value, empty when unset
    fn read_text(&self, name: ControlName) -> String {
        self.read_control_value(name)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    /// Standard periods whose checkbox is checked
    fn checked_standard_mas(&self) -> Vec<u32> {
        STANDARD_MA_PERIODS
            .iter()
            .copied()
            .filter(|period| self.is_checked(ControlName::MovingAverage(*period)))
            .collect()
    }
}

/// In-process mirror of the page's controls, written by the browser
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    values: HashMap<ControlName, String>,
    visible_panel: Option<SettingsPanel>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        let mut panel = Self {
            values: HashMap::new(),
            visible_panel: Some(SettingsPanel::Fibonacci),
        };
        panel.set_control_value(ControlName::Period, "1Y".to_string());
        panel.set_control_value(ControlName::TrendlineTool, "off".to_string());
        panel.set_checked(ControlName::ShowFib, true);
        panel.set_checked(ControlName::ExtendElliottProjections, true);
        panel
    }
}

impl ControlPanel {
    pub fn visible_panel(&self) -> Option<SettingsPanel> {
        self.visible_panel
    }

    /// Every control value, sorted by name for stable output
    pub fn values(&self) -> Vec<(String, String)> {
        let mut values: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        values.sort();
        values
    }
}

impl ControlSurface for ControlPanel {
    fn read_control_value(&self, name: ControlName) -> Option<String> {
        self.values.get(&name).cloned()
    }

    fn set_control_value(&mut self, name: ControlName, value: String) {
        self.values.insert(name, value);
    }

    fn show_panel(&mut self, panel: Option<SettingsPanel>) {
        self.visible_panel = panel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_names_round_trip_through_page_ids() {
        for name in [
            ControlName::ManualFib,
            ControlName::TrendlineTool,
            ControlName::ElliottAutoWaves,
            ControlName::MovingAverage(50),
        ] {
            assert_eq!(name.to_string().parse::<ControlName>().unwrap(), name);
        }
    }

    #[test]
    fn unknown_and_non_standard_names_are_rejected() {
        assert!("ma-7".parse::<ControlName>().is_err());
        assert!("ma-x".parse::<ControlName>().is_err());
        assert!("showSomething".parse::<ControlName>().is_err());
    }

    #[test]
    fn defaults_match_initial_page_state() {
        let panel = ControlPanel::default();
        assert_eq!(panel.read_text(ControlName::Period), "1Y");
        assert_eq!(panel.visible_panel(), Some(SettingsPanel::Fibonacci));
        assert!(panel.is_checked(ControlName::ShowFib));
        assert!(!panel.is_checked(ControlName::ManualFib));
        assert_eq!(panel.read_text(ControlName::Ticker), "");
    }

    #[test]
    fn checked_standard_mas_reads_checkboxes() {
        let mut panel = ControlPanel::default();
        panel.set_checked(ControlName::MovingAverage(200), true);
        panel.set_checked(ControlName::MovingAverage(20), true);
        panel.set_checked(ControlName::MovingAverage(50), false);

        assert_eq!(panel.checked_standard_mas(), vec![20, 200]);
    }
}
