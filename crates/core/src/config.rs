//! Configuration for the broker-facing components.
//!
//! These structs are plain data: binaries load them from the environment
//! and pass them in; library code never reads the environment itself.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default number of connection attempts before giving up on the broker.
const DEFAULT_INIT_RETRIES: u32 = 10;

/// Default delay between connection attempts.
const DEFAULT_INIT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default time to wait for a broker acknowledgment of a publish.
const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// BrokerConfig (producer side)
// ---------------------------------------------------------------------------

/// Connection settings for an event producer.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker addresses as `host:port` entries, joined with commas on the
    /// wire.
    pub brokers: Vec<String>,
    /// Bounded retry policy for connection establishment.
    pub init_retry: RetryPolicy,
    /// How long a publish waits for broker acknowledgment before it is
    /// reported as failed.
    pub ack_timeout: Duration,
}

impl BrokerConfig {
    /// Create a config for the given broker list with default retry and
    /// acknowledgment settings (10 attempts, 5 s apart; 10 s ack timeout).
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            init_retry: RetryPolicy {
                max_attempts: DEFAULT_INIT_RETRIES,
                delay: DEFAULT_INIT_RETRY_DELAY,
            },
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// ConsumerConfig
// ---------------------------------------------------------------------------

/// Where a fresh consumer group starts reading when it has no committed
/// position for a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetPolicy {
    /// Replay all retained history. Used by the notification worker so no
    /// event is missed across restarts.
    #[default]
    Earliest,
    /// Start at the tail and only see new events.
    Latest,
}

impl OffsetPolicy {
    /// The `auto.offset.reset` value this policy maps to.
    pub fn as_str(self) -> &'static str {
        match self {
            OffsetPolicy::Earliest => "earliest",
            OffsetPolicy::Latest => "latest",
        }
    }
}

/// Settings for a topic-scoped consumer group subscription.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Broker addresses as `host:port` entries.
    pub brokers: Vec<String>,
    /// Consumer group identity; consumers sharing it share partition
    /// assignment and one logical read position per topic.
    pub group_id: String,
    /// Topics to subscribe to. Must be non-empty.
    pub topics: Vec<String>,
    /// Starting position for a group with no committed offsets.
    pub offset_policy: OffsetPolicy,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_policy_maps_to_kafka_values() {
        assert_eq!(OffsetPolicy::Earliest.as_str(), "earliest");
        assert_eq!(OffsetPolicy::Latest.as_str(), "latest");
        assert_eq!(OffsetPolicy::default(), OffsetPolicy::Earliest);
    }

    #[test]
    fn broker_config_defaults() {
        let config = BrokerConfig::new(vec!["localhost:9092".to_string()]);
        assert_eq!(config.init_retry.max_attempts, 10);
        assert_eq!(config.init_retry.delay, Duration::from_secs(5));
        assert_eq!(config.ack_timeout, Duration::from_secs(10));
    }
}
