//! The seam between a consumer group and the consume-dispatch loop.

use async_trait::async_trait;

use crate::envelope::EventEnvelope;
use crate::error::ConsumeError;

/// An at-least-once, effectively infinite source of event envelopes.
///
/// `ConsumerGroup` in the broker crate implements this over a Kafka
/// stream consumer; tests drive the pipeline loop with a scripted
/// implementation instead.
#[async_trait]
pub trait EventStream: Send {
    /// Wait for the next message.
    ///
    /// Yields `Some(Ok(envelope))` for a decodable message,
    /// `Some(Err(_))` for a message that could not be decoded or a
    /// transport-level poll failure, and `None` once the stream is closed.
    /// A closed stream never yields again; a fresh subscription is
    /// required.
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, ConsumeError>>;
}
