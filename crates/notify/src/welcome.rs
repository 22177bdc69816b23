//! Welcome email for newly registered users (`user-registered` topic).

use std::sync::Arc;

use async_trait::async_trait;

use microshop_core::envelope::EventPayload;

use crate::email::EmailSender;
use crate::handler::{require_field, HandlerError, NotificationHandler};

/// Subject line for every welcome email.
const SUBJECT: &str = "Welcome to MicroShop! 🎉";

/// Sends a welcome email when a `user-registered` event arrives.
///
/// Requires `email` and `username` in the payload.
pub struct WelcomeEmailHandler {
    sender: Arc<dyn EmailSender>,
}

impl WelcomeEmailHandler {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl NotificationHandler for WelcomeEmailHandler {
    fn name(&self) -> &'static str {
        "welcome-email"
    }

    async fn handle(&self, payload: &EventPayload) -> Result<(), HandlerError> {
        let email = require_field(payload, "email")?;
        let username = require_field(payload, "username")?;

        let body = render_body(&username);

        self.sender
            .send(&email, SUBJECT, &body)
            .await
            .map_err(|e| HandlerError::Send {
                reason: e.to_string(),
            })?;

        tracing::info!(to = %email, username = %username, "Welcome email sent");
        Ok(())
    }
}

/// Render the HTML body greeting the user by name.
fn render_body(username: &str) -> String {
    format!(
        r#"<html>
<body>
    <h2>Welcome to MicroShop, {username}! 🎉</h2>
    <p>Thank you for joining our community! We're excited to have you on board.</p>
    <p>Your account has been successfully created and you can now:</p>
    <ul>
        <li>Browse our product catalog</li>
        <li>Place orders</li>
        <li>Track your order history</li>
        <li>Manage your profile</li>
    </ul>
    <p>If you have any questions, feel free to reach out to our support team.</p>
    <br>
    <p>Best regards,<br>The MicroShop Team</p>
</body>
</html>"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::test_support::RecordingSender;
    use assert_matches::assert_matches;

    fn payload(value: serde_json::Value) -> EventPayload {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("test payload must be an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn sends_welcome_email_for_valid_payload() {
        let sender = Arc::new(RecordingSender::default());
        let handler = WelcomeEmailHandler::new(Arc::clone(&sender) as Arc<dyn EmailSender>);

        let p = payload(serde_json::json!({"email": "a@x.com", "username": "alice"}));
        handler.handle(&p).await.expect("valid payload should send");

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, SUBJECT);
        assert!(sent[0].html_body.contains("alice"));
    }

    #[tokio::test]
    async fn missing_email_fails_before_any_send() {
        let sender = Arc::new(RecordingSender::default());
        let handler = WelcomeEmailHandler::new(Arc::clone(&sender) as Arc<dyn EmailSender>);

        let p = payload(serde_json::json!({"username": "alice"}));
        let err = handler.handle(&p).await.expect_err("must fail fast");

        assert_matches!(err, HandlerError::MissingField { field: "email" });
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn send_failure_surfaces_as_transient_error() {
        let sender = Arc::new(RecordingSender::failing(1));
        let handler = WelcomeEmailHandler::new(Arc::clone(&sender) as Arc<dyn EmailSender>);

        let p = payload(serde_json::json!({"email": "a@x.com", "username": "alice"}));
        let err = handler.handle(&p).await.expect_err("scripted send failure");

        assert_matches!(err, HandlerError::Send { .. });
        assert!(err.is_retriable());
    }
}
