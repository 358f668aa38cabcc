use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::business_logic::annotations::{AnnotationStore, TrendlineOutcome};
use crate::business_logic::controls::{ControlName, ControlSurface, SettingsPanel};
use crate::models::annotation::{ChartPoint, TrendLine};

/// Mutually exclusive dashboard modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Fib,
    Trendlines,
    Elliott,
    Rsi,
    Macd,
    Ma,
    Volume,
    Candlestick,
}

/// What a click on the chart does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartClickMode {
    Fib,
    Trendlines,
    Elliott,
}

impl ChartClickMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartClickMode::Fib => "fib",
            ChartClickMode::Trendlines => "trendlines",
            ChartClickMode::Elliott => "elliott",
        }
    }
}

/// Indicators drawn as independent toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Rsi,
    Macd,
    Volume,
    Candlestick,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndicatorFlags {
    pub rsi: bool,
    pub macd: bool,
    pub volume: bool,
    pub candlestick: bool,
}

impl IndicatorFlags {
    pub fn get(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Rsi => self.rsi,
            Indicator::Macd => self.macd,
            Indicator::Volume => self.volume,
            Indicator::Candlestick => self.candlestick,
        }
    }

    pub fn set(&mut self, indicator: Indicator, enabled: bool) {
        match indicator {
            Indicator::Rsi => self.rsi = enabled,
            Indicator::Macd => self.macd = enabled,
            Indicator::Volume => self.volume = enabled,
            Indicator::Candlestick => self.candlestick = enabled,
        }
    }
}

impl AnalysisMode {
    /// Indicator-only modes have no click behavior of their own
    pub fn click_mode(self) -> ChartClickMode {
        match self {
            AnalysisMode::Trendlines => ChartClickMode::Trendlines,
            AnalysisMode::Elliott => ChartClickMode::Elliott,
            AnalysisMode::Fib
            | AnalysisMode::Rsi
            | AnalysisMode::Macd
            | AnalysisMode::Ma
            | AnalysisMode::Volume
            | AnalysisMode::Candlestick => ChartClickMode::Fib,
        }
    }

    pub fn panel(self) -> Option<SettingsPanel> {
        match self {
            AnalysisMode::Fib => Some(SettingsPanel::Fibonacci),
            AnalysisMode::Trendlines => Some(SettingsPanel::Trendlines),
            AnalysisMode::Elliott => Some(SettingsPanel::Elliott),
            _ => None,
        }
    }

    /// The indicator this mode flips when selected
    pub fn toggled_indicator(self) -> Option<Indicator> {
        match self {
            AnalysisMode::Rsi => Some(Indicator::Rsi),
            AnalysisMode::Macd => Some(Indicator::Macd),
            AnalysisMode::Volume => Some(Indicator::Volume),
            AnalysisMode::Candlestick => Some(Indicator::Candlestick),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisMode::Fib => "fib",
            AnalysisMode::Trendlines => "trendlines",
            AnalysisMode::Elliott => "elliott",
            AnalysisMode::Rsi => "rsi",
            AnalysisMode::Macd => "macd",
            AnalysisMode::Ma => "ma",
            AnalysisMode::Volume => "volume",
            AnalysisMode::Candlestick => "candlestick",
        };
        f.write_str(name)
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fib" => Ok(AnalysisMode::Fib),
            "trendlines" => Ok(AnalysisMode::Trendlines),
            "elliott" => Ok(AnalysisMode::Elliott),
            "rsi" => Ok(AnalysisMode::Rsi),
            "macd" => Ok(AnalysisMode::Macd),
            "ma" => Ok(AnalysisMode::Ma),
            "volume" => Ok(AnalysisMode::Volume),
            "candlestick" => Ok(AnalysisMode::Candlestick),
            other => Err(format!("unknown analysis mode: {other}")),
        }
    }
}

/// Sub-mode of the trendline tool, read from the `trendLineMode` select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendlineTool {
    Off,
    Horizontal,
    Point,
}

impl TrendlineTool {
    /// Unrecognized values behave like `off`
    pub fn parse(value: &str) -> Self {
        match value {
            "horizontal" => TrendlineTool::Horizontal,
            "point" => TrendlineTool::Point,
            _ => TrendlineTool::Off,
        }
    }
}

/// Result of a mode change
#[derive(Debug, Clone, PartialEq)]
pub struct ModeChange {
    pub mode: AnalysisMode,
    pub panel: Option<SettingsPanel>,
    pub toggled: Option<(Indicator, bool)>,
    pub refresh: bool,
}

/// Result of a chart click
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Nothing to do for this click
    Ignored,
    /// Fibonacci high moved; chart-only refresh needed
    FibHighSet(String),
    /// First point of a two-click line stored
    PendingPoint,
    /// Line drawn on the current chart without a refresh
    TrendlineAdded(TrendLine),
    /// Elliott point appended; chart-only refresh needed
    ElliottPointAdded(usize),
}

impl ClickOutcome {
    pub fn needs_refresh(&self) -> bool {
        matches!(
            self,
            ClickOutcome::FibHighSet(_) | ClickOutcome::ElliottPointAdded(_)
        )
    }
}

type ClickHandler =
    fn(&ChartPoint, &mut dyn ControlSurface, &mut AnnotationStore) -> ClickOutcome;

/// Selects the active mode and routes chart clicks
#[derive(Debug, Clone, PartialEq)]
pub struct ModeController {
    mode: AnalysisMode,
    indicators: IndicatorFlags,
}

impl Default for ModeController {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Fib,
            indicators: IndicatorFlags::default(),
        }
    }
}

impl ModeController {
    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn indicators(&self) -> IndicatorFlags {
        self.indicators
    }

    pub fn click_mode(&self) -> ChartClickMode {
        self.mode.click_mode()
    }

    /// Select `mode`. Re-selecting the active mode changes nothing.
    pub fn set_mode(&mut self, mode: AnalysisMode, surface: &mut dyn ControlSurface) -> ModeChange {
        if mode == self.mode {
            return ModeChange {
                mode,
                panel: mode.panel(),
                toggled: None,
                refresh: false,
            };
        }

        self.mode = mode;
        let panel = mode.panel();
        surface.show_panel(panel);

        let toggled = mode.toggled_indicator().map(|indicator| {
            let enabled = !self.indicators.get(indicator);
            self.indicators.set(indicator, enabled);
            (indicator, enabled)
        });

        tracing::debug!("Mode set to {} (toggled: {:?})", mode, toggled);

        ModeChange {
            mode,
            panel,
            toggled,
            refresh: true,
        }
    }

    /// Set one indicator directly; returns whether it changed
    pub fn set_indicator(&mut self, indicator: Indicator, enabled: bool) -> bool {
        if self.indicators.get(indicator) == enabled {
            return false;
        }
        self.indicators.set(indicator, enabled);
        true
    }

    /// Restore mode and indicators as a unit, without toggle side effects
    pub fn restore(&mut self, mode: AnalysisMode, indicators: IndicatorFlags, surface: &mut dyn ControlSurface) {
        self.mode = mode;
        self.indicators = indicators;
        surface.show_panel(mode.panel());
    }

    pub fn on_chart_click(
        &self,
        point: &ChartPoint,
        surface: &mut dyn ControlSurface,
        store: &mut AnnotationStore,
    ) -> ClickOutcome {
        let handler = click_handler(self.click_mode());
        handler(point, surface, store)
    }
}

fn click_handler(mode: ChartClickMode) -> ClickHandler {
    match mode {
        ChartClickMode::Fib => fibonacci_click,
        ChartClickMode::Trendlines => trendline_click,
        ChartClickMode::Elliott => elliott_click,
    }
}

fn fibonacci_click(
    point: &ChartPoint,
    surface: &mut dyn ControlSurface,
    _store: &mut AnnotationStore,
) -> ClickOutcome {
    if !surface.is_checked(ControlName::ManualFib) {
        return ClickOutcome::Ignored;
    }

    let high = format!("{:.2}", point.y);
    tracing::info!("Manual Fibonacci high set to {}", high);
    surface.set_control_value(ControlName::FibHigh, high.clone());
    ClickOutcome::FibHighSet(high)
}

fn trendline_click(
    point: &ChartPoint,
    surface: &mut dyn ControlSurface,
    store: &mut AnnotationStore,
) -> ClickOutcome {
    let tool = TrendlineTool::parse(&surface.read_text(ControlName::TrendlineTool));

    let outcome = match tool {
        TrendlineTool::Off => return ClickOutcome::Ignored,
        TrendlineTool::Horizontal => store.add_horizontal_trendline(point.y),
        TrendlineTool::Point => store.add_point_to_point_trendline(point.x.clone(), point.y),
    };

    match outcome {
        TrendlineOutcome::Created(line) => ClickOutcome::TrendlineAdded(line),
        TrendlineOutcome::Pending => ClickOutcome::PendingPoint,
        TrendlineOutcome::Skipped => ClickOutcome::Ignored,
    }
}

fn elliott_click(
    point: &ChartPoint,
    _surface: &mut dyn ControlSurface,
    store: &mut AnnotationStore,
) -> ClickOutcome {
    let count = store.add_elliott_point(point.x.clone(), point.y);
    ClickOutcome::ElliottPointAdded(count)
}
