mod business_logic;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::business_logic::config::DashboardConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::stream::get_event_stream,
        handlers::session::get_session,
        handlers::session::update_controls,
        handlers::session::set_mode,
        handlers::session::set_indicator,
        handlers::session::chart_click,
        handlers::session::clear_trendlines,
        handlers::session::add_custom_ma,
        handlers::session::remove_custom_ma,
        handlers::session::apply_ma_preset,
        handlers::session::add_elliott_point,
        handlers::session::remove_elliott_point,
        handlers::session::clear_elliott_points,
        handlers::session::save_snapshot,
        handlers::session::restore_snapshot,
        handlers::dashboard::refresh_chart,
        handlers::dashboard::load_dashboard,
        handlers::dashboard::refresh_analysis,
        handlers::dashboard::refresh_moat
    ),
    components(schemas(
        errors::ErrorResponse,
        models::health::HealthResponse,
        models::session::SessionView,
        models::session::SessionUpdate,
        models::session::ControlsUpdate,
        models::session::ModeRequest,
        models::session::IndicatorRequest,
        models::session::ClickRequest,
        models::session::CustomMaRequest,
        models::session::MaPresetRequest,
        models::session::ElliottPointRequest,
        models::session::SnapshotSaved,
        models::session::RegionStatus,
        models::session::DashboardLoad
    ))
)]
struct ApiDoc;

/// Stdout logging plus a daily rolling file when a log directory is configured.
/// The returned guard flushes the file writer and must outlive the server.
fn init_tracing(config: &DashboardConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "chartdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chartdesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env();
    let _log_guard = init_tracing(&config);

    let bind_addr = config.bind_addr.clone();
    tracing::info!(
        "Using stock backend at {} ({} view, {:?} theme)",
        config.backend_url,
        config.view,
        config.theme
    );

    let state = AppState::new(config);
    let app = routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Server running on http://{}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
