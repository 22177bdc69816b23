//! Broker-side error taxonomy.

use crate::producer::ProducerState;

/// Failures establishing a broker connection or publishing an event.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// No broker connection could be established after exhausting the
    /// bounded retry policy. Fatal to the owning component; the process
    /// supervisor must see this.
    #[error("broker unavailable after {attempts} attempts: {reason}")]
    Unavailable { attempts: u32, reason: String },

    /// A single publish was rejected by the broker or timed out waiting
    /// for acknowledgment. Recoverable by the caller (retry the
    /// triggering request, or queue the event for later resend); never
    /// silently discarded.
    #[error("publish to topic `{topic}` failed: {reason}")]
    PublishFailed { topic: String, reason: String },

    /// A publish was attempted while the producer was not `Ready`.
    #[error("producer is not ready (state: {state:?})")]
    NotReady { state: ProducerState },

    /// The payload could not be serialized for the wire.
    #[error("payload for topic `{topic}` could not be serialized: {source}")]
    Serialize {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// A consumer subscription was misconfigured (e.g. empty topic set).
    #[error("invalid consumer configuration: {0}")]
    InvalidConfig(String),

    /// An error from the underlying Kafka client.
    #[error("Kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}
