//! Event publishing with an explicit connection lifecycle.
//!
//! [`EventProducer`] is an owned instance passed to (or shared by) every
//! caller that needs to publish — there is no global producer handle. It
//! is created once at process start, moved to `Ready` by
//! [`EventProducer::initialize`] under a bounded retry loop, and closed
//! exactly once on shutdown.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use microshop_core::config::BrokerConfig;
use microshop_core::envelope::EventPayload;
use microshop_core::retry::{self, RetryPolicy};

use crate::error::BrokerError;

/// Timeout for a single cluster metadata probe during initialization.
const METADATA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long `shutdown` waits for in-flight sends to flush.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// ProducerState
// ---------------------------------------------------------------------------

/// Lifecycle of a producer connection.
///
/// `Disconnected → Connecting → Ready → Closed`; publishing is only
/// permitted in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Disconnected,
    Connecting,
    Ready,
    Closed,
}

// ---------------------------------------------------------------------------
// EventProducer
// ---------------------------------------------------------------------------

/// Publishes event payloads to named topics with send-and-confirm
/// semantics: `publish` does not return until the broker has acknowledged
/// the message (or rejected it), so a caller knows the event is durably
/// queued before it reports success to its own caller.
pub struct EventProducer {
    inner: FutureProducer,
    brokers: Vec<String>,
    init_retry: RetryPolicy,
    ack_timeout: Duration,
    state: ProducerState,
}

impl EventProducer {
    /// Build the underlying client for the configured brokers.
    ///
    /// The client connects lazily; the returned producer is
    /// `Disconnected` until [`initialize`](Self::initialize) verifies the
    /// cluster is reachable.
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set(
                "message.timeout.ms",
                config.ack_timeout.as_millis().to_string(),
            )
            .create()?;

        Ok(Self {
            inner,
            brokers: config.brokers.clone(),
            init_retry: config.init_retry,
            ack_timeout: config.ack_timeout,
            state: ProducerState::Disconnected,
        })
    }

    /// Establish the broker connection, entering `Ready` on success.
    ///
    /// Probes cluster metadata under the configured bounded retry policy;
    /// every failed attempt is logged with its count. Exhausting the
    /// policy yields [`BrokerError::Unavailable`], which is fatal to the
    /// owning process (it cannot publish without a broker).
    pub async fn initialize(&mut self) -> Result<(), BrokerError> {
        self.state = ProducerState::Connecting;

        let result = retry::with_retries(self.init_retry, "broker connection", |_attempt| {
            let probe = self.inner.clone();
            async move {
                tokio::task::spawn_blocking(move || {
                    probe
                        .client()
                        .fetch_metadata(None, METADATA_PROBE_TIMEOUT)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .await
                .map_err(|join_error| join_error.to_string())?
            }
        })
        .await;

        match result {
            Ok(()) => {
                self.state = ProducerState::Ready;
                tracing::info!(brokers = %self.brokers.join(","), "Producer connected and ready");
                Ok(())
            }
            Err(reason) => {
                self.state = ProducerState::Disconnected;
                Err(BrokerError::Unavailable {
                    attempts: self.init_retry.max_attempts.max(1),
                    reason,
                })
            }
        }
    }

    /// Publish a payload to `topic` and wait for broker acknowledgment.
    ///
    /// Fails fast with [`BrokerError::NotReady`] unless the producer is
    /// `Ready`. A rejection or acknowledgment timeout surfaces as
    /// [`BrokerError::PublishFailed`]; the caller decides whether to roll
    /// back its own side effect.
    pub async fn publish(&self, topic: &str, payload: &EventPayload) -> Result<(), BrokerError> {
        if self.state != ProducerState::Ready {
            return Err(BrokerError::NotReady { state: self.state });
        }

        let bytes = serde_json::to_vec(payload).map_err(|source| BrokerError::Serialize {
            topic: topic.to_string(),
            source,
        })?;

        let record = FutureRecord::<(), [u8]>::to(topic).payload(bytes.as_slice());

        match self.inner.send(record, Timeout::After(self.ack_timeout)).await {
            Ok((partition, offset)) => {
                tracing::debug!(topic, partition, offset, "Event acknowledged by broker");
                Ok(())
            }
            Err((error, _message)) => Err(BrokerError::PublishFailed {
                topic: topic.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    /// Flush in-flight sends and transition to `Closed`.
    ///
    /// Idempotent: calling it on an already-closed producer is a no-op.
    pub fn shutdown(&mut self) {
        if self.state == ProducerState::Closed {
            return;
        }

        if let Err(error) = self.inner.flush(Timeout::After(FLUSH_TIMEOUT)) {
            tracing::warn!(error = %error, "Producer flush did not complete cleanly");
        }

        self.state = ProducerState::Closed;
        tracing::info!("Producer closed");
    }

    /// Current lifecycle state (read-only, for health introspection).
    pub fn state(&self) -> ProducerState {
        self.state
    }

    /// Configured broker addresses (read-only, for health introspection).
    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
