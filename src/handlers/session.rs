use axum::{
    extract::{Path, State},
    Json,
};

use crate::business_logic::controls::ControlName;
use crate::business_logic::mode::ClickOutcome;
use crate::business_logic::session::ControlEffect;
use crate::errors::{AppError, ErrorResponse};
use crate::models::session::{
    ChartStateSnapshot, ClickRequest, ControlsUpdate, CustomMaRequest, DashboardEvent,
    ElliottPointRequest, IndicatorRequest, MaPresetRequest, ModeRequest, SessionUpdate,
    SessionView, SnapshotSaved,
};
use crate::models::annotation::ChartPoint;
use crate::services::snapshot::{detailed_location, CHART_STATE_KEY};
use crate::state::AppState;

pub const SNAPSHOT_TICKER_MESSAGE: &str = "Please enter a ticker symbol first";

/// Publish the new view and run whatever refresh the change calls for
async fn finish(state: &AppState, effect: ControlEffect) -> Json<SessionUpdate> {
    state.session.publish_view().await;

    let chart = match effect {
        ControlEffect::None => None,
        ControlEffect::ChartRefresh => Some(state.dashboard.refresh_chart(true).await),
        ControlEffect::FullReload => Some(state.dashboard.load_all().await.chart),
    };

    let view = state.session.session.lock().await.view();
    Json(SessionUpdate { view, chart })
}

fn refresh_if(needed: bool) -> ControlEffect {
    if needed {
        ControlEffect::ChartRefresh
    } else {
        ControlEffect::None
    }
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current controls, mode and annotations", body = SessionView)
    )
)]
pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.session.session.lock().await.view()))
}

#[utoipa::path(
    put,
    path = "/session/controls",
    request_body = ControlsUpdate,
    responses(
        (status = 200, description = "Controls written", body = SessionUpdate),
        (status = 400, description = "Unknown control", body = ErrorResponse)
    )
)]
pub async fn update_controls(
    State(state): State<AppState>,
    Json(update): Json<ControlsUpdate>,
) -> Result<Json<SessionUpdate>, AppError> {
    let changes = update
        .values
        .into_iter()
        .map(|(name, value)| {
            let name = name.parse::<ControlName>().map_err(AppError::Validation)?;
            Ok((name, value))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let effect = {
        let mut session = state.session.session.lock().await;
        changes
            .into_iter()
            .map(|(name, value)| session.update_control(name, value))
            .max()
            .unwrap_or(ControlEffect::None)
    };

    Ok(finish(&state, effect).await)
}

#[utoipa::path(
    post,
    path = "/session/mode",
    request_body = ModeRequest,
    responses(
        (status = 200, description = "Mode selected", body = SessionUpdate)
    )
)]
pub async fn set_mode(
    State(state): State<AppState>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let change = state.session.session.lock().await.set_mode(request.mode);
    tracing::info!(
        "Mode {} selected (panel {:?}, toggled {:?})",
        change.mode,
        change.panel,
        change.toggled
    );
    Ok(finish(&state, refresh_if(change.refresh)).await)
}

#[utoipa::path(
    post,
    path = "/session/indicators",
    request_body = IndicatorRequest,
    responses(
        (status = 200, description = "Indicator set", body = SessionUpdate)
    )
)]
pub async fn set_indicator(
    State(state): State<AppState>,
    Json(request): Json<IndicatorRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let changed = state
        .session
        .session
        .lock()
        .await
        .set_indicator(request.indicator, request.enabled);
    Ok(finish(&state, refresh_if(changed)).await)
}

#[utoipa::path(
    post,
    path = "/session/click",
    request_body = ClickRequest,
    responses(
        (status = 200, description = "Click routed to the active mode", body = SessionUpdate)
    )
)]
pub async fn chart_click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let point = ChartPoint {
        x: request.x,
        y: request.y,
    };
    let outcome = state.session.session.lock().await.on_chart_click(&point);

    if let ClickOutcome::TrendlineAdded(line) = &outcome {
        match line.overlay_trace() {
            Ok(trace) => state.session.publish(DashboardEvent::OverlayAdded {
                trendline_id: line.id.clone(),
                trace,
            }),
            Err(error) => tracing::warn!("New trendline not drawn: {}", error),
        }
    }

    Ok(finish(&state, refresh_if(outcome.needs_refresh())).await)
}

#[utoipa::path(
    delete,
    path = "/session/trendlines",
    responses(
        (status = 200, description = "All trendlines removed", body = SessionUpdate)
    )
)]
pub async fn clear_trendlines(
    State(state): State<AppState>,
) -> Result<Json<SessionUpdate>, AppError> {
    let refresh = state.session.session.lock().await.clear_all_trendlines();
    Ok(finish(&state, refresh_if(refresh)).await)
}

#[utoipa::path(
    post,
    path = "/session/custom-mas",
    request_body = CustomMaRequest,
    responses(
        (status = 200, description = "Custom moving average added", body = SessionUpdate),
        (status = 400, description = "Out of range or duplicate period", body = ErrorResponse)
    )
)]
pub async fn add_custom_ma(
    State(state): State<AppState>,
    Json(request): Json<CustomMaRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    state
        .session
        .session
        .lock()
        .await
        .add_custom_ma(request.period)
        .map_err(|err| AppError::Validation(err.to_string()))?;
    Ok(finish(&state, ControlEffect::ChartRefresh).await)
}

#[utoipa::path(
    delete,
    path = "/session/custom-mas/{period}",
    params(("period" = u32, Path, description = "Custom moving-average period")),
    responses(
        (status = 200, description = "Custom moving average removed", body = SessionUpdate),
        (status = 404, description = "Period not in the custom list", body = ErrorResponse)
    )
)]
pub async fn remove_custom_ma(
    State(state): State<AppState>,
    Path(period): Path<u32>,
) -> Result<Json<SessionUpdate>, AppError> {
    if !state.session.session.lock().await.remove_custom_ma(period) {
        return Err(AppError::NotFound(format!(
            "No custom moving average with period {period}"
        )));
    }
    Ok(finish(&state, ControlEffect::ChartRefresh).await)
}

#[utoipa::path(
    post,
    path = "/session/ma-preset",
    request_body = MaPresetRequest,
    responses(
        (status = 200, description = "Standard moving averages replaced by the preset", body = SessionUpdate)
    )
)]
pub async fn apply_ma_preset(
    State(state): State<AppState>,
    Json(request): Json<MaPresetRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let refresh = state
        .session
        .session
        .lock()
        .await
        .apply_ma_preset(request.preset);
    Ok(finish(&state, refresh_if(refresh)).await)
}

#[utoipa::path(
    post,
    path = "/session/elliott-points",
    request_body = ElliottPointRequest,
    responses(
        (status = 200, description = "Elliott point appended", body = SessionUpdate)
    )
)]
pub async fn add_elliott_point(
    State(state): State<AppState>,
    Json(request): Json<ElliottPointRequest>,
) -> Result<Json<SessionUpdate>, AppError> {
    let refresh = state
        .session
        .session
        .lock()
        .await
        .add_elliott_point(request.x, request.y);
    Ok(finish(&state, refresh_if(refresh)).await)
}

#[utoipa::path(
    delete,
    path = "/session/elliott-points/{index}",
    params(("index" = usize, Path, description = "Zero-based position of the point")),
    responses(
        (status = 200, description = "Elliott point removed", body = SessionUpdate),
        (status = 404, description = "No point at that position", body = ErrorResponse)
    )
)]
pub async fn remove_elliott_point(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionUpdate>, AppError> {
    if !state.session.session.lock().await.remove_elliott_point_at(index) {
        return Err(AppError::NotFound(format!("No Elliott point at {index}")));
    }
    Ok(finish(&state, ControlEffect::ChartRefresh).await)
}

#[utoipa::path(
    delete,
    path = "/session/elliott-points",
    responses(
        (status = 200, description = "All Elliott points removed", body = SessionUpdate)
    )
)]
pub async fn clear_elliott_points(
    State(state): State<AppState>,
) -> Result<Json<SessionUpdate>, AppError> {
    let refresh = state.session.session.lock().await.clear_elliott_points();
    Ok(finish(&state, refresh_if(refresh)).await)
}

#[utoipa::path(
    post,
    path = "/session/snapshot",
    responses(
        (status = 200, description = "Chart state saved for the detailed view", body = SnapshotSaved),
        (status = 400, description = "No ticker entered", body = ErrorResponse)
    )
)]
pub async fn save_snapshot(State(state): State<AppState>) -> Result<Json<SnapshotSaved>, AppError> {
    let snapshot: ChartStateSnapshot = state.session.session.lock().await.snapshot();
    if snapshot.ticker.is_empty() {
        return Err(AppError::Validation(SNAPSHOT_TICKER_MESSAGE.to_string()));
    }

    state.snapshots.save_chart_state(&snapshot)?;
    tracing::info!("Saved chart state for {} ({})", snapshot.ticker, snapshot.period);

    Ok(Json(SnapshotSaved {
        key: CHART_STATE_KEY.to_string(),
        location: detailed_location(&snapshot.ticker, &snapshot.period),
    }))
}

#[utoipa::path(
    post,
    path = "/session/restore",
    responses(
        (status = 200, description = "Saved chart state applied", body = SessionUpdate),
        (status = 404, description = "Nothing saved", body = ErrorResponse)
    )
)]
pub async fn restore_snapshot(
    State(state): State<AppState>,
) -> Result<Json<SessionUpdate>, AppError> {
    let snapshot = state.snapshots.load_chart_state()?;
    tracing::info!("Restoring chart state for {}", snapshot.ticker);
    state.session.session.lock().await.restore(snapshot);
    Ok(finish(&state, ControlEffect::ChartRefresh).await)
}
