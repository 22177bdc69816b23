//! Manual verification endpoint for the email path.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use serde_json::json;

use microshop_core::envelope::EventPayload;
use microshop_notify::handler::NotificationHandler;
use microshop_notify::welcome::WelcomeEmailHandler;

use crate::state::AppState;

/// POST /test-email — send a welcome email to the configured test
/// recipient, exercising the real handler and SMTP path.
async fn send_test_email(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let handler = WelcomeEmailHandler::new(Arc::clone(&state.mailer));

    let mut payload = EventPayload::new();
    payload.insert("email".to_string(), json!(state.test_recipient));
    payload.insert("username".to_string(), json!("TestUser"));

    match handler.handle(&payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Test email sent successfully",
            })),
        ),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": error.to_string(),
            })),
        ),
    }
}

/// Mount the test-email route at root level.
pub fn router() -> Router<AppState> {
    Router::new().route("/test-email", post(send_test_email))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{test_state, RecordingSender};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_email_goes_to_the_configured_recipient() {
        let sender = Arc::new(RecordingSender::default());
        let state = test_state(Arc::clone(&sender));
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/test-email")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *sender.sent_to.lock().unwrap(),
            vec!["test@microshop.local".to_string()]
        );
    }
}
