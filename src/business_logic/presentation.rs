use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::models::chart::ChartDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// Chart embedded in the dashboard
    Compact,
    /// Full-page chart
    Detailed,
}

impl FromStr for ChartView {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(ChartView::Compact),
            "detailed" => Ok(ChartView::Detailed),
            other => Err(format!("unknown chart view: {other}")),
        }
    }
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartView::Compact => f.write_str("compact"),
            ChartView::Detailed => f.write_str("detailed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

struct Palette {
    text: &'static str,
    background: &'static str,
    up: &'static str,
    down: &'static str,
}

impl Theme {
    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                text: "#1f2937",
                background: "#ffffff",
                up: "#22c55e",
                down: "#ef4444",
            },
            Theme::Dark => Palette {
                text: "#e5e7eb",
                background: "#111827",
                up: "#4ade80",
                down: "#f87171",
            },
        }
    }
}

/// Presentation adjustments applied to every chart before it is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub view: ChartView,
    pub theme: Theme,
    pub detailed_height: u32,
    pub volume_opacity: f64,
}

impl Presentation {
    fn margin(&self) -> Value {
        match self.view {
            ChartView::Compact => json!({ "l": 40, "r": 20, "t": 40, "b": 40 }),
            ChartView::Detailed => json!({ "l": 60, "r": 60, "t": 60, "b": 60 }),
        }
    }

    /// Restyle `chart` in place. Series values are never touched.
    pub fn apply(&self, chart: &mut ChartDescription) {
        let palette = self.theme.palette();
        let layout = &mut chart.layout;

        layout.insert("font".to_string(), json!({ "color": palette.text }));
        layout.insert("plot_bgcolor".to_string(), json!(palette.background));
        layout.insert("paper_bgcolor".to_string(), json!(palette.background));
        layout.insert("margin".to_string(), self.margin());

        if self.view == ChartView::Detailed {
            let height = layout
                .get("height")
                .and_then(Value::as_u64)
                .unwrap_or(0)
                .max(u64::from(self.detailed_height));
            layout.insert("height".to_string(), json!(height));
        }

        for (key, axis) in layout.iter_mut() {
            if key.starts_with("xaxis") || key.starts_with("yaxis") {
                if let Some(axis) = axis.as_object_mut() {
                    axis.insert("showgrid".to_string(), json!(false));
                }
            }
        }

        for series in chart.data.iter_mut() {
            if let Some(series) = series.as_object_mut() {
                self.style_series(series, &palette);
            }
        }
    }

    fn style_series(&self, series: &mut Map<String, Value>, palette: &Palette) {
        match series.get("type").and_then(Value::as_str) {
            Some("candlestick") => {
                for (side, color) in [("increasing", palette.up), ("decreasing", palette.down)] {
                    series.insert(
                        side.to_string(),
                        json!({ "line": { "color": color }, "fillcolor": color }),
                    );
                }
            }
            Some("bar") if is_volume(series) => {
                series.insert("opacity".to_string(), json!(self.volume_opacity));
            }
            _ => {}
        }
    }
}

fn is_volume(series: &Map<String, Value>) -> bool {
    series
        .get("name")
        .and_then(Value::as_str)
        .map(|name| name.eq_ignore_ascii_case("volume"))
        .unwrap_or(false)
}
