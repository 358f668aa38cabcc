use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::session::DashboardEvent;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "SSE stream of dashboard events, starting with the current session view", content_type = "text/event-stream")
    )
)]
pub async fn get_event_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.session.broadcaster.subscribe();
    let view = state.session.session.lock().await.view();
    let initial = DashboardEvent::SessionChanged {
        view: Box::new(view),
    };

    let initial_events = match dashboard_event(initial) {
        Some(event) => vec![Ok(event)],
        None => Vec::new(),
    };
    let initial_stream = tokio_stream::iter(initial_events);

    let broadcast_stream = BroadcastStream::new(rx).filter_map(|message| match message {
        Ok(event) => dashboard_event(event).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Event stream lagged, skipped {} events", skipped);
            None
        }
    });

    let stream = initial_stream.chain(broadcast_stream);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn dashboard_event(event: DashboardEvent) -> Option<Event> {
    let data = serde_json::to_string(&event).ok()?;
    Some(
        Event::default()
            .event(event.name())
            .id(chrono::Utc::now().timestamp_millis().to_string())
            .data(data),
    )
}
