//! Kafka-facing side of the MicroShop notification pipeline.
//!
//! Wraps `rdkafka` behind the two capabilities the rest of the system
//! consumes:
//!
//! - [`EventProducer`] — publishes payloads to a topic with
//!   send-and-confirm semantics and an explicit connection lifecycle.
//! - [`ConsumerGroup`] — a topic-scoped, at-least-once subscription that
//!   yields [`microshop_core::EventEnvelope`]s and implements the
//!   [`microshop_core::EventStream`] seam.

pub mod consumer;
pub mod error;
pub mod producer;

pub use consumer::{ConsumerGroup, ConsumerState};
pub use error::BrokerError;
pub use producer::{EventProducer, ProducerState};
