//! MicroShop event pipeline building blocks.
//!
//! This crate holds the broker-agnostic pieces of the notification
//! pipeline:
//!
//! - [`EventEnvelope`] — the canonical (topic, payload) unit carried on
//!   the wire, plus its single deserialization point.
//! - [`topics`] — well-known topic name constants.
//! - [`config`] — configuration structs consumed by the broker crate.
//!   Loaded from the environment by binaries only; library code receives
//!   them as constructor parameters.
//! - [`EventStream`] — the trait seam between a consumer group and the
//!   consume-dispatch loop, so the loop can be driven by a scripted
//!   stream in tests.
//! - [`retry`] — bounded retry with a fixed delay, used for broker
//!   connection establishment.

pub mod config;
pub mod envelope;
pub mod error;
pub mod retry;
pub mod stream;
pub mod topics;

pub use config::{BrokerConfig, ConsumerConfig, OffsetPolicy};
pub use envelope::{EventEnvelope, EventPayload};
pub use error::ConsumeError;
pub use retry::RetryPolicy;
pub use stream::EventStream;
