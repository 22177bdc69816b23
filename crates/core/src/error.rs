//! Consume-side error taxonomy.
//!
//! Errors produced between the broker and the dispatcher. Broker-specific
//! failures (connection establishment, publish rejection) live in the
//! broker crate; handler failures live in the notify crate.

/// An error encountered while pulling the next message off the stream.
#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// A consumed message's payload could not be parsed.
    ///
    /// Under the at-least-once/auto-commit policy the offset has already
    /// advanced, so the loop logs this with full position context and
    /// moves on.
    #[error(
        "undecodable payload on topic `{topic}` (partition {partition}, offset {offset}): {reason}"
    )]
    Deserialization {
        topic: String,
        partition: i32,
        offset: i64,
        reason: String,
    },

    /// A broker-side poll failure (rebalance, broken connection, ...).
    ///
    /// Individually transient; the consume loop tolerates these up to a
    /// consecutive-error bound before handing control back to its
    /// supervisor.
    #[error("broker transport error: {reason}")]
    Transport { reason: String },
}
