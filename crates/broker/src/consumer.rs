//! Topic-scoped, at-least-once consumption under a named consumer group.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;

use microshop_core::config::ConsumerConfig;
use microshop_core::envelope::EventEnvelope;
use microshop_core::error::ConsumeError;
use microshop_core::stream::EventStream;

use crate::error::BrokerError;

// ---------------------------------------------------------------------------
// ConsumerState
// ---------------------------------------------------------------------------

/// Lifecycle of a consumer group membership.
///
/// Owned exclusively by the consume loop; no other component mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Disconnected,
    Subscribed,
    Polling,
    Closed,
}

// ---------------------------------------------------------------------------
// ConsumerGroup
// ---------------------------------------------------------------------------

/// A subscription to one or more topics under a named group identity.
///
/// Delivery contract (must be preserved): offsets auto-commit, so the
/// group's position advances per polled message **regardless of handler
/// outcome**. This is an explicit at-least-once guarantee — a crash
/// between poll and handler completion can cause redelivery, and a
/// handler failure does *not* cause redelivery. The trade-off favors
/// availability of the consume loop over strict delivery guarantees.
///
/// Messages within a single topic-partition arrive in broker order; no
/// ordering holds across topics or partitions.
pub struct ConsumerGroup {
    inner: StreamConsumer,
    topics: Vec<String>,
    group_id: String,
    state: ConsumerState,
}

impl std::fmt::Debug for ConsumerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerGroup")
            .field("topics", &self.topics)
            .field("group_id", &self.group_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ConsumerGroup {
    /// Join `config.group_id` for the configured topics.
    ///
    /// Fails with [`BrokerError::InvalidConfig`] for an empty topic set.
    /// The underlying client connects lazily; group join and partition
    /// assignment complete on the first poll.
    pub fn subscribe(config: &ConsumerConfig) -> Result<Self, BrokerError> {
        if config.topics.is_empty() {
            return Err(BrokerError::InvalidConfig(
                "at least one topic is required".to_string(),
            ));
        }
        if config.group_id.is_empty() {
            return Err(BrokerError::InvalidConfig(
                "a consumer group id is required".to_string(),
            ));
        }

        let inner: StreamConsumer = ClientConfig::new()
            .set("group.id", &config.group_id)
            .set("bootstrap.servers", config.brokers.join(","))
            .set("auto.offset.reset", config.offset_policy.as_str())
            .set("enable.auto.commit", "true")
            .create()?;

        let topic_refs: Vec<&str> = config.topics.iter().map(String::as_str).collect();
        inner.subscribe(&topic_refs)?;

        tracing::info!(
            group_id = %config.group_id,
            topics = %config.topics.join(","),
            offset_policy = config.offset_policy.as_str(),
            "Consumer group subscribed"
        );

        Ok(Self {
            inner,
            topics: config.topics.clone(),
            group_id: config.group_id.clone(),
            state: ConsumerState::Subscribed,
        })
    }

    /// Wait for the next message on any subscribed topic.
    ///
    /// Yields `None` once the group is closed; a closed group is never
    /// restartable (a fresh [`subscribe`](Self::subscribe) is required).
    pub async fn poll(&mut self) -> Option<Result<EventEnvelope, ConsumeError>> {
        if self.state == ConsumerState::Closed {
            return None;
        }
        self.state = ConsumerState::Polling;

        match self.inner.recv().await {
            Ok(message) => Some(EventEnvelope::decode(
                message.topic(),
                message.partition(),
                message.offset(),
                message.payload(),
            )),
            Err(error) => Some(Err(ConsumeError::Transport {
                reason: error.to_string(),
            })),
        }
    }

    /// Leave the group and release partition assignments.
    ///
    /// Idempotent: closing an already-closed group is a no-op.
    pub fn close(&mut self) {
        if self.state == ConsumerState::Closed {
            return;
        }

        self.inner.unsubscribe();
        self.state = ConsumerState::Closed;
        tracing::info!(group_id = %self.group_id, "Consumer group closed");
    }

    /// Subscribed topics (read-only, for health introspection).
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Group identity (read-only, for health introspection).
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConsumerState {
        self.state
    }
}

#[async_trait]
impl EventStream for ConsumerGroup {
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, ConsumeError>> {
        self.poll().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use microshop_core::config::OffsetPolicy;

    fn test_config(topics: &[&str]) -> ConsumerConfig {
        ConsumerConfig {
            brokers: vec!["localhost:1".to_string()],
            group_id: "notification-service".to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            offset_policy: OffsetPolicy::Earliest,
        }
    }

    #[test]
    fn subscribe_rejects_empty_topic_set() {
        let err = ConsumerGroup::subscribe(&test_config(&[]))
            .expect_err("empty topic set must be rejected");
        assert_matches!(err, BrokerError::InvalidConfig(_));
    }

    #[test]
    fn subscribe_rejects_empty_group_id() {
        let mut config = test_config(&["user-registered"]);
        config.group_id = String::new();

        let err =
            ConsumerGroup::subscribe(&config).expect_err("empty group id must be rejected");
        assert_matches!(err, BrokerError::InvalidConfig(_));
    }

    #[tokio::test]
    async fn subscribe_exposes_configuration_read_only() {
        let group = ConsumerGroup::subscribe(&test_config(&["user-registered", "order-created"]))
            .expect("lazy subscription");

        assert_eq!(group.topics(), ["user-registered", "order-created"]);
        assert_eq!(group.group_id(), "notification-service");
        assert_eq!(group.state(), ConsumerState::Subscribed);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_poll_after_close_yields_none() {
        let mut group =
            ConsumerGroup::subscribe(&test_config(&["user-registered"])).expect("lazy subscription");

        group.close();
        assert_eq!(group.state(), ConsumerState::Closed);

        group.close();
        assert_eq!(group.state(), ConsumerState::Closed);

        assert!(group.poll().await.is_none());
    }
}
