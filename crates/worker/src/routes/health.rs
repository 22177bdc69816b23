//! Process liveness and broker/topic configuration reporting.

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` while the consume loop is live, `degraded` otherwise.
    pub status: &'static str,
    /// Service identifier.
    pub service: &'static str,
    /// Topics the consumer group is subscribed to.
    pub kafka_topics: Vec<String>,
    /// Configured broker addresses.
    pub kafka_brokers: Vec<String>,
    /// Consumer group identity.
    pub group_id: String,
}

/// GET /health — reports liveness and the current topic/broker
/// configuration.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let consuming = state.consuming.load(Ordering::SeqCst);
    let status = if consuming { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status,
        service: "notification-service",
        kafka_topics: state.topics.clone(),
        kafka_brokers: state.brokers.clone(),
        group_id: state.group_id.clone(),
    })
}

/// Mount the health route at root level.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{test_state, RecordingSender};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_configuration_and_status() {
        let state = test_state(Arc::new(RecordingSender::default()));
        let app = router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "notification-service");
        assert_eq!(body["kafka_topics"][0], "user-registered");
        assert_eq!(body["kafka_brokers"][0], "localhost:9092");
        assert_eq!(body["group_id"], "notification-service");
    }

    #[tokio::test]
    async fn health_degrades_when_consume_loop_is_down() {
        let state = test_state(Arc::new(RecordingSender::default()));
        state
            .consuming
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let app = router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], "degraded");
    }
}
