use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{AppError, ErrorResponse};
use crate::models::session::{DashboardLoad, RefreshQuery, RegionStatus};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/chart/refresh",
    params(RefreshQuery),
    responses(
        (status = 200, description = "Outcome of the chart refresh", body = RegionStatus)
    )
)]
pub async fn refresh_chart(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RegionStatus>, AppError> {
    Ok(Json(state.dashboard.refresh_chart(query.chart_only).await))
}

#[utoipa::path(
    post,
    path = "/dashboard/load",
    responses(
        (status = 200, description = "Chart, analysis and MOAT loaded concurrently", body = DashboardLoad)
    )
)]
pub async fn load_dashboard(State(state): State<AppState>) -> Result<Json<DashboardLoad>, AppError> {
    Ok(Json(state.dashboard.load_all().await))
}

#[utoipa::path(
    post,
    path = "/dashboard/analysis/refresh",
    responses(
        (status = 200, description = "AI analysis re-run without the cache", body = RegionStatus),
        (status = 400, description = "No ticker entered", body = ErrorResponse)
    )
)]
pub async fn refresh_analysis(
    State(state): State<AppState>,
) -> Result<Json<RegionStatus>, AppError> {
    Ok(Json(state.dashboard.refresh_analysis().await?))
}

#[utoipa::path(
    post,
    path = "/dashboard/moat/refresh",
    responses(
        (status = 200, description = "MOAT analysis re-run without the cache", body = RegionStatus),
        (status = 400, description = "No ticker entered", body = ErrorResponse)
    )
)]
pub async fn refresh_moat(State(state): State<AppState>) -> Result<Json<RegionStatus>, AppError> {
    Ok(Json(state.dashboard.refresh_moat().await?))
}
