//! Supervised consume loop.
//!
//! The original design here is a background thread that dies silently on
//! an unrecoverable broker error, leaving the process alive but not
//! consuming. Instead, the supervisor owns the ConsumerGroup lifecycle:
//! when the loop exits for any reason other than cancellation, it closes
//! the group and rebuilds the subscription after a capped exponential
//! backoff. Cancellation always wins over a pending backoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use microshop_broker::ConsumerGroup;
use microshop_core::config::ConsumerConfig;
use microshop_notify::{pipeline, Dispatcher, PipelineExit};

/// First restart delay after a loop exit.
const INITIAL_RESTART_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound on the restart delay.
const MAX_RESTART_BACKOFF: Duration = Duration::from_secs(60);

/// Run consume-dispatch loops until cancelled, re-subscribing on failure.
///
/// `consuming` is kept `true` exactly while a loop is live, for health
/// reporting.
pub async fn run(
    config: ConsumerConfig,
    dispatcher: Arc<Dispatcher>,
    consuming: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let mut backoff = INITIAL_RESTART_BACKOFF;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match ConsumerGroup::subscribe(&config) {
            Ok(mut group) => {
                consuming.store(true, Ordering::SeqCst);
                let started = tokio::time::Instant::now();
                let exit = pipeline::run(&mut group, &dispatcher, &cancel).await;
                consuming.store(false, Ordering::SeqCst);
                group.close();

                match exit {
                    PipelineExit::Cancelled => break,
                    PipelineExit::StreamClosed | PipelineExit::TransportFailure => {
                        tracing::error!(?exit, "Consume loop exited unexpectedly");
                        // A loop that stayed up for a while earns a fresh
                        // backoff ladder; a crash loop keeps climbing it.
                        if started.elapsed() >= MAX_RESTART_BACKOFF {
                            backoff = INITIAL_RESTART_BACKOFF;
                        }
                    }
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to subscribe consumer group");
            }
        }

        tracing::warn!(
            backoff_secs = backoff.as_secs(),
            "Restarting consumer after backoff"
        );
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(MAX_RESTART_BACKOFF);
    }

    consuming.store(false, Ordering::SeqCst);
    tracing::info!("Consumer supervisor stopped");
}
