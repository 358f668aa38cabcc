use crate::business_logic::controls::{ControlName, ControlSurface};
use crate::business_logic::params::EMPTY_TICKER_MESSAGE;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRequest, MoatRequest};
use crate::models::chart::{ChartDescription, ChartStatistics, PlotRequest};
use crate::models::session::{DashboardEvent, DashboardLoad, Region, RegionStatus};
use crate::services::backend::BackendClient;
use crate::services::renderer::ChartRenderer;
use crate::services::session::SharedSession;

pub const CHART_REQUEST_FAILED: &str = "Chart request failed. Please try again.";
pub const ANALYSIS_REQUEST_FAILED: &str =
    "Analysis request failed. Please check your connection and try again.";
pub const ANALYSIS_MALFORMED: &str = "Malformed API response";
pub const MOAT_FAILED: &str = "MOAT analysis failed";
pub const MOAT_CONNECT_FAILED: &str = "Failed to connect to MOAT analysis service";

/// Drives the chart, AI analysis and MOAT regions of the dashboard
#[derive(Clone)]
pub struct DashboardService {
    backend: BackendClient,
    renderer: ChartRenderer,
    session: SharedSession,
}

impl DashboardService {
    pub fn new(backend: BackendClient, renderer: ChartRenderer, session: SharedSession) -> Self {
        Self {
            backend,
            renderer,
            session,
        }
    }

    /// Fetch and draw the chart. A full refresh (`chart_only = false`) also
    /// routes the statistics payload to the stats region.
    pub async fn refresh_chart(&self, chart_only: bool) -> RegionStatus {
        match self.try_refresh_chart(chart_only).await {
            Ok(status) => status,
            Err(error) => {
                let status = self.fail(Region::Chart, error);
                if !chart_only {
                    self.session.publish(DashboardEvent::Error {
                        region: Region::Stats,
                        message: status.message.clone().unwrap_or_default(),
                    });
                }
                status
            }
        }
    }

    async fn try_refresh_chart(&self, chart_only: bool) -> Result<RegionStatus, AppError> {
        let (seq, request) = self.session.session.lock().await.next_request(!chart_only)?;

        tracing::info!(
            "Requesting chart for {} ({}, mode {}, chart_only {})",
            request.ticker,
            request.period,
            request.chart_mode,
            chart_only
        );
        self.session.publish(DashboardEvent::RegionLoading {
            region: Region::Chart,
        });
        if !chart_only {
            self.session.publish(DashboardEvent::RegionLoading {
                region: Region::Stats,
            });
        }

        let (chart, stats) = self.fetch_chart(&request).await?;

        let mut session = self.session.session.lock().await;
        let stats_current = !chart_only && session.accept_stats(seq);
        let chart = if session.accept_response(seq) {
            Some(self.renderer.render(&mut session, chart))
        } else {
            None
        };
        drop(session);

        let status = match chart {
            Some(chart) => {
                self.session.publish(DashboardEvent::ChartRendered {
                    seq,
                    chart_only,
                    chart,
                });
                RegionStatus::loaded()
            }
            None => {
                tracing::debug!("Discarding stale chart response {}", seq);
                RegionStatus::stale()
            }
        };
        if stats_current {
            self.session.publish(DashboardEvent::StatsLoaded { stats });
        }

        Ok(status)
    }

    async fn fetch_chart(
        &self,
        request: &PlotRequest,
    ) -> Result<(ChartDescription, ChartStatistics), AppError> {
        let response = self.backend.plot(request).await.map_err(|error| {
            tracing::error!("Chart request for {} failed: {}", request.ticker, error);
            AppError::Transport(CHART_REQUEST_FAILED.to_string())
        })?;

        if let Some(message) = &response.error {
            return Err(AppError::Backend(format!("Chart Error: {message}")));
        }

        let graph = response.graph.as_deref().ok_or_else(|| {
            tracing::error!("Chart response for {} has no graph", request.ticker);
            AppError::Transport(CHART_REQUEST_FAILED.to_string())
        })?;
        let chart = serde_json::from_str::<ChartDescription>(graph).map_err(|error| {
            tracing::error!("Chart response for {} is malformed: {}", request.ticker, error);
            AppError::Transport(CHART_REQUEST_FAILED.to_string())
        })?;

        Ok((chart, response.statistics()))
    }

    /// Load all three regions concurrently. A failure in one region never
    /// affects the others.
    pub async fn load_all(&self) -> DashboardLoad {
        let ticker = self
            .session
            .session
            .lock()
            .await
            .controls
            .read_text(ControlName::Ticker);

        if ticker.is_empty() {
            let status = self.fail(
                Region::Chart,
                AppError::Validation(EMPTY_TICKER_MESSAGE.to_string()),
            );
            return DashboardLoad {
                chart: status.clone(),
                analysis: status.clone(),
                moat: status,
            };
        }

        tracing::info!("Loading dashboard for {}", ticker);
        self.session.publish(DashboardEvent::RegionReset {
            region: Region::Analysis,
        });
        self.session.publish(DashboardEvent::RegionReset {
            region: Region::Moat,
        });

        let (chart, analysis, moat) = tokio::join!(
            self.refresh_chart(false),
            self.load_analysis(&ticker, false),
            self.load_moat(&ticker, false),
        );

        tracing::info!(
            "Dashboard for {} loaded (chart {:?}, analysis {:?}, moat {:?})",
            ticker,
            chart.status,
            analysis.status,
            moat.status
        );
        DashboardLoad {
            chart,
            analysis,
            moat,
        }
    }

    /// Re-run the AI analysis, bypassing the backend cache
    pub async fn refresh_analysis(&self) -> Result<RegionStatus, AppError> {
        let ticker = self.current_ticker().await?;
        Ok(self.load_analysis(&ticker, true).await)
    }

    /// Re-run the MOAT analysis, bypassing the backend cache
    pub async fn refresh_moat(&self) -> Result<RegionStatus, AppError> {
        let ticker = self.current_ticker().await?;
        Ok(self.load_moat(&ticker, true).await)
    }

    async fn current_ticker(&self) -> Result<String, AppError> {
        let ticker = self
            .session
            .session
            .lock()
            .await
            .controls
            .read_text(ControlName::Ticker);
        if ticker.is_empty() {
            return Err(AppError::Validation(EMPTY_TICKER_MESSAGE.to_string()));
        }
        Ok(ticker)
    }

    async fn load_analysis(&self, ticker: &str, force_refresh: bool) -> RegionStatus {
        self.session.publish(DashboardEvent::RegionLoading {
            region: Region::Analysis,
        });
        match self.try_load_analysis(ticker, force_refresh).await {
            Ok(event) => {
                self.session.publish(event);
                RegionStatus::loaded()
            }
            Err(error) => self.fail(Region::Analysis, error),
        }
    }

    async fn try_load_analysis(
        &self,
        ticker: &str,
        force_refresh: bool,
    ) -> Result<DashboardEvent, AppError> {
        let request = AnalysisRequest {
            ticker: ticker.to_string(),
            force_refresh: force_refresh.then_some(true),
        };
        let response = self.backend.analyze_stock(&request).await.map_err(|error| {
            tracing::error!("Analysis request for {} failed: {}", ticker, error);
            AppError::Transport(ANALYSIS_REQUEST_FAILED.to_string())
        })?;

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "Unknown error occurred".to_string());
            return Err(AppError::Backend(message));
        }

        let data = response
            .data
            .ok_or_else(|| AppError::Backend(ANALYSIS_MALFORMED.to_string()))?;
        let sections = data
            .sections
            .ok_or_else(|| AppError::Backend(ANALYSIS_MALFORMED.to_string()))?;

        tracing::info!(
            "Analysis for {} loaded (cached: {}, {:?}s, {:?} searches)",
            ticker,
            data.is_cached,
            data.duration,
            data.search_calls
        );
        Ok(DashboardEvent::AnalysisLoaded {
            ticker: data.ticker.unwrap_or_else(|| ticker.to_string()),
            executive_summary: data.executive_summary,
            sections,
            timestamp: data.timestamp,
            is_cached: data.is_cached,
        })
    }

    async fn load_moat(&self, ticker: &str, force_refresh: bool) -> RegionStatus {
        self.session.publish(DashboardEvent::RegionLoading {
            region: Region::Moat,
        });
        match self.try_load_moat(ticker, force_refresh).await {
            Ok(event) => {
                self.session.publish(event);
                RegionStatus::loaded()
            }
            Err(error) => self.fail(Region::Moat, error),
        }
    }

    async fn try_load_moat(
        &self,
        ticker: &str,
        force_refresh: bool,
    ) -> Result<DashboardEvent, AppError> {
        let request = MoatRequest {
            ticker: ticker.to_string(),
            force_refresh: force_refresh.then_some(true),
        };
        let response = self.backend.moat_analysis(&request).await.map_err(|error| {
            tracing::error!("MOAT request for {} failed: {}", ticker, error);
            AppError::Transport(MOAT_CONNECT_FAILED.to_string())
        })?;

        let data = match (response.success, response.data) {
            (true, Some(data)) => data,
            _ => {
                let message = response.error.unwrap_or_else(|| MOAT_FAILED.to_string());
                return Err(AppError::Backend(message));
            }
        };

        Ok(DashboardEvent::MoatLoaded {
            ticker: data.ticker.unwrap_or_else(|| ticker.to_string()),
            sections: data.sections.unwrap_or_default(),
            timestamp: data.timestamp,
            is_cached: data.is_cached,
        })
    }

    fn fail(&self, region: Region, error: AppError) -> RegionStatus {
        match &error {
            AppError::Validation(_) => tracing::info!("{:?} not loaded: {}", region, error),
            _ => tracing::warn!("{:?} failed: {}", region, error),
        }
        let message = error.user_message().to_string();
        self.session.publish(DashboardEvent::Error {
            region,
            message: message.clone(),
        });
        RegionStatus::failed(message)
    }
}
