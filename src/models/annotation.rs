use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use utoipa::ToSchema;

/// X coordinate as the chart reports it: a date/category label or a number.
/// Numbers keep their JSON form so `3` goes back out as `3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum XValue {
    #[schema(value_type = f64)]
    Number(Number),
    Category(String),
}

impl From<&str> for XValue {
    fn from(value: &str) -> Self {
        XValue::Category(value.to_string())
    }
}

impl From<Number> for XValue {
    fn from(value: Number) -> Self {
        XValue::Number(value)
    }
}

impl From<i64> for XValue {
    fn from(value: i64) -> Self {
        XValue::Number(value.into())
    }
}

/// A clicked position on the price chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub x: XValue,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TrendLineKind {
    Horizontal,
    PointToPoint,
}

/// A user-drawn line replayed on top of every rendered chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrendLine {
    pub id: String,
    pub kind: TrendLineKind,
    #[schema(value_type = Vec<ChartPoint>)]
    pub endpoints: [ChartPoint; 2],
    pub color: String,
}

impl TrendLine {
    /// Label shown in the chart legend
    pub fn legend_name(&self) -> String {
        let number = self.id.rsplit('-').next().unwrap_or_default();
        match self.kind {
            TrendLineKind::Horizontal => format!("H-Line {number}"),
            TrendLineKind::PointToPoint => format!("Line {number}"),
        }
    }

    /// Overlay trace in the charting library's series format
    pub fn overlay_trace(&self) -> Result<Value, String> {
        let [start, end] = &self.endpoints;
        if !start.y.is_finite() || !end.y.is_finite() {
            return Err(format!("{} has a non-finite endpoint", self.id));
        }
        if self.color.trim().is_empty() {
            return Err(format!("{} has no color", self.id));
        }

        let mut line = json!({ "color": self.color, "width": 2 });
        if self.kind == TrendLineKind::Horizontal {
            line["dash"] = json!("dot");
        }

        Ok(json!({
            "x": [start.x, end.x],
            "y": [start.y, end.y],
            "mode": "lines",
            "line": line,
            "name": self.legend_name(),
            "hoverinfo": "none",
        }))
    }
}

/// A user-picked Elliott wave pivot; `y` keeps the 2-decimal text sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ElliottPoint {
    pub x: XValue,
    pub y: String,
}

impl ElliottPoint {
    pub fn new(x: XValue, y: f64) -> Self {
        Self {
            x,
            y: format!("{:.2}", y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: TrendLineKind, id: &str, y: f64) -> TrendLine {
        TrendLine {
            id: id.to_string(),
            kind,
            endpoints: [
                ChartPoint { x: "2024-01-02".into(), y },
                ChartPoint { x: "2024-06-28".into(), y },
            ],
            color: "#FF5733".to_string(),
        }
    }

    #[test]
    fn horizontal_trace_is_dotted() {
        let trace = line(TrendLineKind::Horizontal, "H-Line-3", 101.5)
            .overlay_trace()
            .unwrap();

        assert_eq!(trace["name"], "H-Line 3");
        assert_eq!(trace["line"]["dash"], "dot");
        assert_eq!(trace["x"][0], "2024-01-02");
        assert_eq!(trace["y"][1], 101.5);
    }

    #[test]
    fn point_to_point_trace_is_solid() {
        let trace = line(TrendLineKind::PointToPoint, "P2P-Line-1", 10.0)
            .overlay_trace()
            .unwrap();

        assert_eq!(trace["name"], "Line 1");
        assert!(trace["line"].get("dash").is_none());
    }

    #[test]
    fn malformed_line_has_no_trace() {
        let mut broken = line(TrendLineKind::Horizontal, "H-Line-1", f64::NAN);
        assert!(broken.overlay_trace().is_err());

        broken.endpoints[0].y = 1.0;
        broken.endpoints[1].y = 1.0;
        broken.color = String::new();
        assert!(broken.overlay_trace().is_err());
    }

    #[test]
    fn elliott_point_keeps_two_decimals() {
        let point = ElliottPoint::new("2024-03-01".into(), 100.0);
        assert_eq!(point.y, "100.00");
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"x":"2024-03-01","y":"100.00"}"#
        );
    }

    #[test]
    fn x_value_accepts_numbers_and_labels() {
        let values: Vec<XValue> = serde_json::from_str(r#"[3, "2024-01-02"]"#).unwrap();
        assert_eq!(values[0], XValue::from(3_i64));
        assert_eq!(values[1], XValue::Category("2024-01-02".to_string()));
    }

    #[test]
    fn numeric_x_keeps_its_json_form() {
        let points: Vec<ChartPoint> =
            serde_json::from_str(r#"[{"x":3,"y":1.0},{"x":2.5,"y":1.0}]"#).unwrap();

        let elliott: Vec<ElliottPoint> = points
            .into_iter()
            .map(|point| ElliottPoint::new(point.x, point.y))
            .collect();

        assert_eq!(
            serde_json::to_string(&elliott).unwrap(),
            r#"[{"x":3,"y":"1.00"},{"x":2.5,"y":"1.00"}]"#
        );
    }
}
