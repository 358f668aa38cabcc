use std::sync::Arc;

use crate::business_logic::config::DashboardConfig;
use crate::business_logic::presentation::Presentation;
use crate::services::backend::BackendClient;
use crate::services::dashboard::DashboardService;
use crate::services::renderer::ChartRenderer;
use crate::services::session::{new_shared_session, SharedSession};
use crate::services::snapshot::{MemorySnapshotStore, SnapshotStore};

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub dashboard: DashboardService,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let session = new_shared_session(config.event_capacity);
        let renderer = ChartRenderer::new(Presentation {
            view: config.view,
            theme: config.theme,
            detailed_height: config.detailed_height,
            volume_opacity: config.volume_opacity,
        });
        let dashboard = DashboardService::new(
            BackendClient::new(config.backend_url.clone()),
            renderer,
            session.clone(),
        );

        Self {
            session,
            dashboard,
            snapshots: Arc::new(MemorySnapshotStore::default()),
            config: Arc::new(config),
        }
    }
}
