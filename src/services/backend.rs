use crate::models::analysis::{AnalysisRequest, AnalysisResponse, MoatRequest, MoatResponse};
use crate::models::chart::{PlotRequest, PlotResponse};

/// HTTP client for the stock backend
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request a chart; the form carries every setting on every call
    pub async fn plot(&self, request: &PlotRequest) -> Result<PlotResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.url("/plot"))
            .form(request)
            .send()
            .await?
            .json::<PlotResponse>()
            .await?;

        Ok(response)
    }

    /// Run the AI bull/bear analysis for a ticker
    pub async fn analyze_stock(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.url("/analyze_stock"))
            .form(request)
            .send()
            .await?
            .json::<AnalysisResponse>()
            .await?;

        Ok(response)
    }

    /// Run the MOAT analysis for a ticker
    pub async fn moat_analysis(&self, request: &MoatRequest) -> Result<MoatResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.url("/api/moat-analysis"))
            .json(request)
            .send()
            .await?
            .json::<MoatResponse>()
            .await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = BackendClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.url("/plot"), "http://127.0.0.1:5000/plot");
    }
}
