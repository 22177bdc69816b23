//! The event envelope exchanged between producers and consumers.
//!
//! [`EventEnvelope`] is immutable once constructed; every poll of the
//! broker produces a fresh envelope. [`EventEnvelope::decode`] is the
//! single place a raw broker message becomes a typed envelope, so payload
//! deserialization failures are a distinct, inspectable error class
//! rather than a silent drop.

use serde::{Deserialize, Serialize};

use crate::error::ConsumeError;

/// The opaque per-topic payload: a JSON object mapping string keys to
/// scalar values. Schema is the producer's and handler's contract; the
/// pipeline never enforces it.
pub type EventPayload = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// EventEnvelope
// ---------------------------------------------------------------------------

/// A consumed domain event together with its broker-assigned position.
///
/// `partition` and `offset` are carried for log context and acknowledgment
/// bookkeeping only; business logic never inspects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Logical event stream this message arrived on (e.g. `user-registered`).
    pub topic: String,

    /// The deserialized key/value payload.
    pub payload: EventPayload,

    /// Broker-assigned partition within the topic.
    pub partition: i32,

    /// Broker-assigned offset within the partition.
    pub offset: i64,
}

impl EventEnvelope {
    /// Decode a raw broker message into an envelope.
    ///
    /// The wire format is a UTF-8 JSON object. An absent payload, invalid
    /// UTF-8/JSON, or a JSON value that is not an object all yield
    /// [`ConsumeError::Deserialization`] carrying the message position.
    pub fn decode(
        topic: &str,
        partition: i32,
        offset: i64,
        bytes: Option<&[u8]>,
    ) -> Result<Self, ConsumeError> {
        let deserialization = |reason: String| ConsumeError::Deserialization {
            topic: topic.to_string(),
            partition,
            offset,
            reason,
        };

        let bytes = bytes.ok_or_else(|| deserialization("empty payload".to_string()))?;

        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| deserialization(e.to_string()))?;

        let payload = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(deserialization(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            topic: topic.to_string(),
            payload,
            partition,
            offset,
        })
    }

    /// Look up a payload field as a string slice.
    ///
    /// Returns `None` when the field is absent or not a JSON string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }

    /// Best-effort identifying field for diagnostics: the first of
    /// `email`, `userEmail`, or `orderId` present in the payload.
    pub fn identity(&self) -> Option<&str> {
        self.str_field("email")
            .or_else(|| self.str_field("userEmail"))
            .or_else(|| self.str_field("orderId"))
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn payload_of(value: serde_json::Value) -> EventPayload {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("test payload must be an object, got {other}"),
        }
    }

    #[test]
    fn decode_valid_object() {
        let bytes = br#"{"email":"a@x.com","username":"alice"}"#;
        let envelope = EventEnvelope::decode("user-registered", 0, 7, Some(bytes))
            .expect("valid JSON object should decode");

        assert_eq!(envelope.topic, "user-registered");
        assert_eq!(envelope.partition, 0);
        assert_eq!(envelope.offset, 7);
        assert_eq!(envelope.str_field("email"), Some("a@x.com"));
        assert_eq!(envelope.str_field("username"), Some("alice"));
    }

    #[test]
    fn decode_round_trips_published_payload() {
        let original = payload_of(serde_json::json!({
            "userEmail": "b@x.com",
            "username": "bob",
            "orderId": "42",
            "total": "19.99",
        }));

        // Producer side serializes the payload map; consumer side decodes it.
        let bytes = serde_json::to_vec(&original).expect("payload serializes");
        let envelope = EventEnvelope::decode("order-created", 2, 100, Some(&bytes))
            .expect("round trip should decode");

        assert_eq!(envelope.payload, original);
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = EventEnvelope::decode("order-created", 1, 5, Some(b"not json"))
            .expect_err("garbage bytes must not decode");

        assert_matches!(
            err,
            ConsumeError::Deserialization { ref topic, partition: 1, offset: 5, .. }
                if topic == "order-created"
        );
    }

    #[test]
    fn decode_rejects_non_object_json() {
        let err = EventEnvelope::decode("order-created", 0, 0, Some(b"[1,2,3]"))
            .expect_err("a JSON array is not a valid payload");

        assert_matches!(err, ConsumeError::Deserialization { ref reason, .. }
            if reason.contains("array"));
    }

    #[test]
    fn decode_rejects_empty_payload() {
        let err = EventEnvelope::decode("user-registered", 0, 0, None)
            .expect_err("an empty message must not decode");

        assert_matches!(err, ConsumeError::Deserialization { ref reason, .. }
            if reason.contains("empty"));
    }

    #[test]
    fn identity_prefers_email_then_user_email_then_order_id() {
        let envelope = EventEnvelope {
            topic: "order-created".to_string(),
            payload: payload_of(serde_json::json!({"userEmail": "b@x.com", "orderId": "42"})),
            partition: 0,
            offset: 0,
        };
        assert_eq!(envelope.identity(), Some("b@x.com"));

        let envelope = EventEnvelope {
            topic: "order-created".to_string(),
            payload: payload_of(serde_json::json!({"orderId": "42"})),
            partition: 0,
            offset: 0,
        };
        assert_eq!(envelope.identity(), Some("42"));
    }

    #[test]
    fn str_field_ignores_non_string_values() {
        let envelope = EventEnvelope {
            topic: "order-created".to_string(),
            payload: payload_of(serde_json::json!({"quantity": 3})),
            partition: 0,
            offset: 0,
        };
        assert_eq!(envelope.str_field("quantity"), None);
    }
}
