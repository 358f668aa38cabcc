use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{dashboard, health, session, stream};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/events", get(stream::get_event_stream))
        .route("/session", get(session::get_session))
        .route("/session/controls", put(session::update_controls))
        .route("/session/mode", post(session::set_mode))
        .route("/session/indicators", post(session::set_indicator))
        .route("/session/click", post(session::chart_click))
        .route("/session/trendlines", delete(session::clear_trendlines))
        .route("/session/custom-mas", post(session::add_custom_ma))
        .route("/session/custom-mas/{period}", delete(session::remove_custom_ma))
        .route("/session/ma-preset", post(session::apply_ma_preset))
        .route(
            "/session/elliott-points",
            post(session::add_elliott_point).delete(session::clear_elliott_points),
        )
        .route(
            "/session/elliott-points/{index}",
            delete(session::remove_elliott_point),
        )
        .route("/session/snapshot", post(session::save_snapshot))
        .route("/session/restore", post(session::restore_snapshot))
        .route("/chart/refresh", post(dashboard::refresh_chart))
        .route("/dashboard/load", post(dashboard::load_dashboard))
        .route("/dashboard/analysis/refresh", post(dashboard::refresh_analysis))
        .route("/dashboard/moat/refresh", post(dashboard::refresh_moat))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::business_logic::config::DashboardConfig;
    use crate::services::dashboard::tests::{spawn_backend, FakeBackend};

    /// Serve the router against a fake backend; returns the API base URL
    async fn spawn_app(fake: FakeBackend) -> String {
        let backend_url = spawn_backend(fake).await;
        let config = DashboardConfig {
            backend_url,
            ..DashboardConfig::default()
        };
        let app = router(AppState::new(config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn put_controls(client: &reqwest::Client, api: &str, values: Value) -> reqwest::Response {
        client
            .put(format!("{api}/session/controls"))
            .json(&json!({ "values": values }))
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn elliott_scenario_over_http() {
        let fake = FakeBackend::default();
        let api = spawn_app(fake.clone()).await;
        let client = reqwest::Client::new();

        let empty = client.post(format!("{api}/chart/refresh")).send().await.unwrap();
        let empty: Value = empty.json().await.unwrap();
        assert_eq!(empty["status"], "failed");
        assert_eq!(empty["message"], "Please enter a valid ticker symbol");
        assert_eq!(fake.plot_count(), 0);

        put_controls(&client, &api, json!({ "ticker": "AAPL", "period": "1y" })).await;
        client
            .post(format!("{api}/session/mode"))
            .json(&json!({ "mode": "elliott" }))
            .send()
            .await
            .unwrap();
        let plots_before_clicks = fake.plot_count();

        for (x, y) in [("d1", 100.0), ("d2", 110.0)] {
            let update: Value = client
                .post(format!("{api}/session/click"))
                .json(&json!({ "x": x, "y": y }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(update["chart"]["status"], "loaded");
        }

        assert_eq!(fake.plot_count(), plots_before_clicks + 2);
        let form = fake.last_plot_form();
        assert_eq!(form["includeFinancials"], "false");
        assert_eq!(
            form["elliott_points"],
            r#"[{"x":"d1","y":"100.00"},{"x":"d2","y":"110.00"}]"#
        );

        let removed = client
            .delete(format!("{api}/session/elliott-points/0"))
            .send()
            .await
            .unwrap();
        assert!(removed.status().is_success());
        assert_eq!(fake.plot_count(), plots_before_clicks + 3);
        let form = fake.last_plot_form();
        assert_eq!(form["includeFinancials"], "false");
        assert_eq!(form["elliott_points"], r#"[{"x":"d2","y":"110.00"}]"#);

        let missing = client
            .delete(format!("{api}/session/elliott-points/5"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(fake.plot_count(), plots_before_clicks + 3);

        let cleared: Value = client
            .delete(format!("{api}/session/elliott-points"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(cleared["chart"]["status"], "loaded");
        assert_eq!(fake.plot_count(), plots_before_clicks + 4);
        let form = fake.last_plot_form();
        assert_eq!(form["includeFinancials"], "false");
        assert_eq!(form["elliott_points"], "");
    }

    #[tokio::test]
    async fn unknown_control_is_rejected() {
        let api = spawn_app(FakeBackend::default()).await;
        let client = reqwest::Client::new();

        let response = put_controls(&client, &api, json!({ "ma-7": "true" })).await;

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "unknown control: ma-7");
    }

    #[tokio::test]
    async fn custom_ma_validation_messages() {
        let fake = FakeBackend::default();
        let api = spawn_app(fake.clone()).await;
        let client = reqwest::Client::new();
        put_controls(&client, &api, json!({ "ticker": "AAPL" })).await;
        assert_eq!(fake.plot_count(), 0);

        for (period, status, message, plots) in [
            (0, 400, Some("Please enter a valid period between 1 and 500."), 0),
            (21, 200, None, 1),
            (21, 400, Some("This moving average period is already added."), 1),
        ] {
            let response = client
                .post(format!("{api}/session/custom-mas"))
                .json(&json!({ "period": period }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), status);
            if let Some(message) = message {
                let body: Value = response.json().await.unwrap();
                assert_eq!(body["message"], message);
            }
            assert_eq!(fake.plot_count(), plots);
        }
        assert_eq!(fake.last_plot_form()["movingAverages"], "21");

        let removed = client
            .delete(format!("{api}/session/custom-mas/21"))
            .send()
            .await
            .unwrap();
        assert!(removed.status().is_success());
        assert_eq!(fake.plot_count(), 2);
        let form = fake.last_plot_form();
        assert_eq!(form["includeFinancials"], "false");
        assert_eq!(form["movingAverages"], "");

        let missing = client
            .delete(format!("{api}/session/custom-mas/21"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(fake.plot_count(), 2);
    }

    #[tokio::test]
    async fn indicator_mode_switch_refreshes_chart_only() {
        let fake = FakeBackend::default();
        let api = spawn_app(fake.clone()).await;
        let client = reqwest::Client::new();
        put_controls(&client, &api, json!({ "ticker": "AAPL" })).await;

        let update: Value = client
            .post(format!("{api}/session/mode"))
            .json(&json!({ "mode": "rsi" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(update["chart"]["status"], "loaded");
        assert_eq!(update["view"]["indicators"]["rsi"], true);
        assert_eq!(fake.plot_count(), 1);
        let form = fake.last_plot_form();
        assert_eq!(form["includeFinancials"], "false");
        assert_eq!(form["showRSI"], "true");

        client
            .post(format!("{api}/session/mode"))
            .json(&json!({ "mode": "rsi" }))
            .send()
            .await
            .unwrap();
        assert_eq!(fake.plot_count(), 1);
    }

    #[tokio::test]
    async fn snapshot_requires_ticker_and_restores() {
        let fake = FakeBackend::default();
        let api = spawn_app(fake.clone()).await;
        let client = reqwest::Client::new();

        let rejected = client.post(format!("{api}/session/snapshot")).send().await.unwrap();
        assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);
        let nothing = client.post(format!("{api}/session/restore")).send().await.unwrap();
        assert_eq!(nothing.status(), reqwest::StatusCode::NOT_FOUND);

        put_controls(&client, &api, json!({ "ticker": "MSFT", "period": "6M" })).await;
        let saved: Value = client
            .post(format!("{api}/session/snapshot"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(saved["key"], "chartState");
        assert_eq!(saved["location"], "/detailed-graph/MSFT?period=6M");

        let restored: Value = client
            .post(format!("{api}/session/restore"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(restored["view"]["controls"]["ticker"], "MSFT");
        assert_eq!(restored["chart"]["status"], "loaded");
        assert_eq!(fake.last_plot_form()["ticker"], "MSFT");
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let api = spawn_app(FakeBackend::default()).await;
        let body: Value = reqwest::get(format!("{api}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
