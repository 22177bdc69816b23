//! The notification handler contract and payload field helpers.

use async_trait::async_trait;

use microshop_core::envelope::EventPayload;

// ---------------------------------------------------------------------------
// HandlerError
// ---------------------------------------------------------------------------

/// A failed handler invocation.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A minimum required field is absent (or empty). Permanent: the
    /// message can never succeed, so it is never retried.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// The external send attempt failed. Transient: the dispatcher may
    /// retry it under its bounded policy.
    #[error("send failed: {reason}")]
    Send { reason: String },
}

impl HandlerError {
    /// Whether the dispatcher's bounded retry wrapper applies.
    pub fn is_retriable(&self) -> bool {
        matches!(self, HandlerError::Send { .. })
    }
}

// ---------------------------------------------------------------------------
// NotificationHandler
// ---------------------------------------------------------------------------

/// A domain-specific, side-effecting consumer of one topic's payloads.
///
/// A handler validates its required fields before any side effect,
/// renders a message body from the payload, and performs exactly one
/// external send attempt. Retry policy belongs to the dispatcher, not
/// the handler, keeping handlers simple and testable in isolation.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Short name used in log context (e.g. `welcome-email`).
    fn name(&self) -> &'static str;

    /// Process one payload.
    async fn handle(&self, payload: &EventPayload) -> Result<(), HandlerError>;
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Extract a required field, rendered as text.
///
/// Strings are taken as-is; numbers and booleans are rendered with their
/// JSON representation (producers are not consistent about quoting
/// numeric ids). Absent, null, or empty-string values fail with
/// [`HandlerError::MissingField`].
pub fn require_field(payload: &EventPayload, field: &'static str) -> Result<String, HandlerError> {
    optional_field(payload, field).ok_or(HandlerError::MissingField { field })
}

/// Extract an optional field, rendered as text; `None` when absent,
/// null, empty, or not a scalar.
pub fn optional_field(payload: &EventPayload, field: &str) -> Option<String> {
    match payload.get(field)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
