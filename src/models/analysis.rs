use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body of `POST /analyze_stock`
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_refresh: Option<bool>,
}

/// JSON body of `POST /api/moat-analysis`
#[derive(Debug, Clone, Serialize)]
pub struct MoatRequest {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_refresh: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisSections {
    pub bull_case: Option<String>,
    pub bear_case: Option<String>,
    pub analytical_reasoning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisData {
    pub ticker: Option<String>,
    pub duration: Option<f64>,
    pub search_calls: Option<u64>,
    pub executive_summary: Option<String>,
    pub sections: Option<AnalysisSections>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_cached: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<AnalysisData>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MoatSections {
    pub executive_summary: Option<String>,
    pub moat_analysis: Option<String>,
    pub market_positioning: Option<String>,
    pub competitive_landscape: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoatData {
    pub ticker: Option<String>,
    pub sections: Option<MoatSections>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_cached: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoatResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<MoatData>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_request_omits_force_refresh_by_default() {
        let body = serde_json::to_value(AnalysisRequest {
            ticker: "AAPL".to_string(),
            force_refresh: None,
        })
        .unwrap();
        assert!(body.get("force_refresh").is_none());
    }

    #[test]
    fn moat_response_parses_cached_payload() {
        let raw = r#"{
            "success": true,
            "data": {
                "ticker": "AAPL",
                "duration": 12.5,
                "sections": {"executive_summary": "Wide moat", "moat_analysis": "Brand"},
                "timestamp": "2026-10-01T12:00:00",
                "is_cached": true
            },
            "error": null
        }"#;
        let response: MoatResponse = serde_json::from_str(raw).unwrap();
        let data = response.data.unwrap();
        let sections = data.sections.unwrap();

        assert!(response.success);
        assert!(data.is_cached);
        assert_eq!(sections.executive_summary.as_deref(), Some("Wide moat"));
        assert!(sections.competitive_landscape.is_none());
    }

    #[test]
    fn analysis_failure_has_no_data() {
        let response: AnalysisResponse =
            serde_json::from_str(r#"{"success": false, "error": "Server error"}"#).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("Server error"));
    }
}
