use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::annotation::XValue;

/// Serialized chart as produced by the backend: a list of series plus a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub layout: Map<String, Value>,
    /// Fields the renderer does not interpret (frames, config)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartDescription {
    /// X values of the primary (first) series
    pub fn primary_x_values(&self) -> Vec<XValue> {
        self.data
            .first()
            .and_then(|series| series.get("x"))
            .and_then(|x| serde_json::from_value::<Vec<XValue>>(x.clone()).ok())
            .unwrap_or_default()
    }
}

/// Form body of `POST /plot`; every setting goes out on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlotRequest {
    #[validate(length(min = 1, message = "Please enter a valid ticker symbol"))]
    pub ticker: String,
    pub period: String,
    #[serde(rename = "chartMode")]
    pub chart_mode: String,
    #[serde(rename = "manualFib")]
    pub manual_fib: bool,
    #[serde(rename = "showExtensions")]
    pub show_extensions: bool,
    #[serde(rename = "fibHigh")]
    pub fib_high: String,
    #[serde(rename = "showFib")]
    pub show_fib: bool,
    /// Comma-joined ascending unique periods, empty when none
    #[serde(rename = "movingAverages")]
    pub moving_averages: String,
    /// JSON list of Elliott points, empty when none
    pub elliott_points: String,
    pub show_elliott_auto_waves: bool,
    pub show_elliott_fib_levels: bool,
    pub extend_elliott_projections: bool,
    #[serde(rename = "showRSI")]
    pub show_rsi: bool,
    #[serde(rename = "showMACD")]
    pub show_macd: bool,
    #[serde(rename = "showVolume")]
    pub show_volume: bool,
    #[serde(rename = "showCandlestick")]
    pub show_candlestick: bool,
    #[serde(rename = "includeFinancials")]
    pub include_financials: bool,
}

/// Response of `POST /plot`
#[derive(Debug, Clone, Deserialize)]
pub struct PlotResponse {
    /// JSON-encoded chart description
    pub graph: Option<String>,
    pub error: Option<String>,
    pub price: Option<Value>,
    pub financials: Option<Value>,
    #[serde(rename = "priceTarget")]
    pub price_target: Option<Value>,
}

/// Statistics payload routed to the stats region after a full refresh
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartStatistics {
    #[schema(value_type = Object)]
    pub price: Value,
    #[schema(value_type = Object)]
    pub financials: Value,
    #[schema(value_type = Object)]
    pub price_target: Value,
}

impl PlotResponse {
    pub fn statistics(&self) -> ChartStatistics {
        ChartStatistics {
            price: self.price.clone().unwrap_or(Value::Null),
            financials: self.financials.clone().unwrap_or(Value::Null),
            price_target: self.price_target.clone().unwrap_or(Value::Null),
        }
    }
}
