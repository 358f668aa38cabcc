use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::business_logic::session::ChartSession;
use crate::models::session::DashboardEvent;

#[derive(Debug)]
pub struct SessionInner {
    pub session: Mutex<ChartSession>,
    pub broadcaster: broadcast::Sender<DashboardEvent>,
}

pub type SharedSession = Arc<SessionInner>;

pub fn new_shared_session(event_capacity: usize) -> SharedSession {
    let (broadcaster, _receiver) = broadcast::channel(event_capacity.max(1));
    Arc::new(SessionInner {
        session: Mutex::new(ChartSession::default()),
        broadcaster,
    })
}

impl SessionInner {
    /// Push an event to every connected page; dropped when nobody listens
    pub fn publish(&self, event: DashboardEvent) {
        let name = event.name();
        if self.broadcaster.send(event).is_err() {
            tracing::debug!("No listeners for {} event", name);
        }
    }

    /// Publish the current session view
    pub async fn publish_view(&self) {
        let view = self.session.lock().await.view();
        self.publish(DashboardEvent::SessionChanged {
            view: Box::new(view),
        });
    }
}
