//! The consume-dispatch loop.
//!
//! Blocks only at the stream; everything after a successful poll is
//! synchronous routing plus the handler's bounded send. Errors inside the
//! loop never unwind: undecodable messages are logged and skipped (their
//! offset has already advanced under auto-commit), and transient
//! transport errors are tolerated up to a consecutive-error bound, after
//! which the loop returns so a supervisor can rebuild the subscription
//! instead of leaving the process alive but silently not consuming.

use tokio_util::sync::CancellationToken;

use microshop_core::error::ConsumeError;
use microshop_core::stream::EventStream;

use crate::dispatcher::Dispatcher;

/// Consecutive transport failures tolerated before the loop gives up.
const MAX_CONSECUTIVE_TRANSPORT_ERRORS: u32 = 10;

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineExit {
    /// The cancellation token fired; clean shutdown.
    Cancelled,
    /// The stream reported end-of-stream (consumer closed).
    StreamClosed,
    /// Too many consecutive transport errors; the subscription should be
    /// rebuilt.
    TransportFailure,
}

/// Run the loop until cancellation, stream close, or transport failure.
pub async fn run<S: EventStream>(
    stream: &mut S,
    dispatcher: &Dispatcher,
    cancel: &CancellationToken,
) -> PipelineExit {
    let mut consecutive_transport_errors = 0u32;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Consume loop cancelled");
                return PipelineExit::Cancelled;
            }
            next = stream.next_event() => match next {
                None => {
                    tracing::info!("Event stream closed, consume loop exiting");
                    return PipelineExit::StreamClosed;
                }
                Some(Ok(envelope)) => {
                    consecutive_transport_errors = 0;
                    // All outcomes are logged inside `route`; the loop
                    // continues regardless of outcome.
                    let _ = dispatcher.route(&envelope).await;
                }
                Some(Err(error @ ConsumeError::Deserialization { .. })) => {
                    consecutive_transport_errors = 0;
                    tracing::error!(error = %error, "Skipping undecodable message");
                }
                Some(Err(ConsumeError::Transport { reason })) => {
                    consecutive_transport_errors += 1;
                    tracing::warn!(
                        consecutive = consecutive_transport_errors,
                        reason = %reason,
                        "Transport error while polling"
                    );
                    if consecutive_transport_errors >= MAX_CONSECUTIVE_TRANSPORT_ERRORS {
                        tracing::error!(
                            consecutive = consecutive_transport_errors,
                            "Too many consecutive transport errors, consume loop exiting"
                        );
                        return PipelineExit::TransportFailure;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
