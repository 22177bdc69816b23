//! Per-message dispatch routing with failure isolation.
//!
//! [`Dispatcher::route`] selects exactly one handler by exact match on
//! the envelope's topic and invokes it. Its signature has no error type:
//! every handler failure is caught here, logged with enough context to
//! diagnose, and converted into a [`DispatchOutcome`]. One malformed or
//! undeliverable event can never halt consumption of subsequent events.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use microshop_core::envelope::EventEnvelope;

use crate::handler::{HandlerError, NotificationHandler};

// ---------------------------------------------------------------------------
// SendRetryPolicy
// ---------------------------------------------------------------------------

/// Default attempts for a transiently failing send.
const DEFAULT_SEND_ATTEMPTS: u32 = 3;

/// Default backoff between send attempts.
const DEFAULT_SEND_BACKOFF: Duration = Duration::from_secs(2);

/// Bounded retry applied to transient [`HandlerError::Send`] outcomes
/// only. Permanent failures (`MissingField`) are never retried.
#[derive(Debug, Clone, Copy)]
pub struct SendRetryPolicy {
    /// Total attempts per message (clamped to at least one).
    pub max_attempts: u32,
    /// Fixed backoff between attempts.
    pub backoff: Duration,
}

impl Default for SendRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SEND_ATTEMPTS,
            backoff: DEFAULT_SEND_BACKOFF,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// Result of routing one envelope. Never an unwound error.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The topic's handler processed the message.
    Handled,
    /// No handler is registered for the topic; the message was logged and
    /// dropped (forward-compatible with topics this consumer does not yet
    /// understand).
    NoHandler,
    /// The handler failed permanently (or exhausted the send retries).
    Failed(HandlerError),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Maps a consumed envelope's topic to a handler capability.
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn NotificationHandler>>,
    retry: SendRetryPolicy,
}

impl Dispatcher {
    pub fn new(retry: SendRetryPolicy) -> Self {
        Self {
            handlers: HashMap::new(),
            retry,
        }
    }

    /// Register `handler` for exact matches on `topic`, replacing any
    /// previous registration.
    pub fn register(
        mut self,
        topic: impl Into<String>,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        self.handlers.insert(topic.into(), handler);
        self
    }

    /// Topics with a registered handler.
    pub fn topics(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Route one envelope to its handler.
    ///
    /// Invokes exactly one handler (or none, for an unregistered topic).
    /// Transient send failures are retried under the configured policy;
    /// everything is logged and converted to an outcome here.
    pub async fn route(&self, envelope: &EventEnvelope) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(&envelope.topic) else {
            tracing::warn!(
                topic = %envelope.topic,
                partition = envelope.partition,
                offset = envelope.offset,
                "No handler registered for topic, dropping event"
            );
            return DispatchOutcome::NoHandler;
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match handler.handle(&envelope.payload).await {
                Ok(()) => {
                    tracing::info!(
                        topic = %envelope.topic,
                        handler = handler.name(),
                        subject = envelope.identity().unwrap_or("<unknown>"),
                        "Event processed"
                    );
                    return DispatchOutcome::Handled;
                }
                Err(error) if error.is_retriable() && attempt < max_attempts => {
                    tracing::warn!(
                        topic = %envelope.topic,
                        handler = handler.name(),
                        attempt,
                        max_attempts,
                        error = %error,
                        "Send failed, retrying after backoff"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        topic = %envelope.topic,
                        handler = handler.name(),
                        subject = envelope.identity().unwrap_or("<unknown>"),
                        payload = %serde_json::Value::Object(envelope.payload.clone()),
                        attempts = attempt,
                        error = %error,
                        "Failed to process event"
                    );
                    return DispatchOutcome::Failed(error);
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(SendRetryPolicy::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use microshop_core::envelope::EventPayload;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Handler that fails a scripted number of leading attempts with a
    /// transient send error, then succeeds.
    struct FlakyHandler {
        calls: AtomicU32,
        failures: u32,
    }

    impl FlakyHandler {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                failures,
            })
        }
    }

    #[async_trait]
    impl NotificationHandler for FlakyHandler {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn handle(&self, _payload: &EventPayload) -> Result<(), HandlerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(HandlerError::Send {
                    reason: "smtp unreachable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    /// Handler that always reports a missing field.
    struct MissingFieldHandler {
        calls: AtomicU32,
    }

    #[async_trait]
    impl NotificationHandler for MissingFieldHandler {
        fn name(&self) -> &'static str {
            "missing-field"
        }

        async fn handle(&self, _payload: &EventPayload) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(HandlerError::MissingField { field: "email" })
        }
    }

    fn envelope(topic: &str) -> EventEnvelope {
        EventEnvelope {
            topic: topic.to_string(),
            payload: EventPayload::new(),
            partition: 0,
            offset: 1,
        }
    }

    fn retry_policy(max_attempts: u32) -> SendRetryPolicy {
        SendRetryPolicy {
            max_attempts,
            backoff: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn routes_to_exactly_one_handler_by_exact_topic_match() {
        let registered = FlakyHandler::new(0);
        let other = FlakyHandler::new(0);
        let dispatcher = Dispatcher::default()
            .register("user-registered", Arc::clone(&registered) as _)
            .register("order-created", Arc::clone(&other) as _);

        let outcome = dispatcher.route(&envelope("user-registered")).await;

        assert_matches!(outcome, DispatchOutcome::Handled);
        assert_eq!(registered.calls.load(Ordering::SeqCst), 1);
        assert_eq!(other.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unregistered_topic_is_dropped_without_invocation() {
        let handler = FlakyHandler::new(0);
        let dispatcher =
            Dispatcher::default().register("user-registered", Arc::clone(&handler) as _);

        let outcome = dispatcher.route(&envelope("product-created")).await;

        assert_matches!(outcome, DispatchOutcome::NoHandler);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_send_failure_is_retried_until_success() {
        let handler = FlakyHandler::new(2);
        let dispatcher = Dispatcher::new(retry_policy(3))
            .register("user-registered", Arc::clone(&handler) as _);

        let outcome = dispatcher.route(&envelope("user-registered")).await;

        assert_matches!(outcome, DispatchOutcome::Handled);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn send_retries_are_bounded() {
        let handler = FlakyHandler::new(10);
        let dispatcher = Dispatcher::new(retry_policy(3))
            .register("user-registered", Arc::clone(&handler) as _);

        let outcome = dispatcher.route(&envelope("user-registered")).await;

        assert_matches!(outcome, DispatchOutcome::Failed(HandlerError::Send { .. }));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn missing_field_is_permanent_and_never_retried() {
        let handler = Arc::new(MissingFieldHandler {
            calls: AtomicU32::new(0),
        });
        let dispatcher = Dispatcher::new(retry_policy(5))
            .register("user-registered", Arc::clone(&handler) as _);

        let outcome = dispatcher.route(&envelope("user-registered")).await;

        assert_matches!(
            outcome,
            DispatchOutcome::Failed(HandlerError::MissingField { field: "email" })
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }
}
