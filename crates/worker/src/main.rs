//! MicroShop notification worker.
//!
//! Consumes domain events from Kafka and sends transactional email,
//! exposing a small HTTP surface for liveness and configuration
//! introspection.

mod config;
mod routes;
mod state;
mod supervisor;

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microshop_core::topics::{TOPIC_ORDER_CREATED, TOPIC_USER_REGISTERED};
use microshop_notify::email::{EmailSender, SmtpMailer};
use microshop_notify::{Dispatcher, OrderConfirmationHandler, WelcomeEmailHandler};

use config::WorkerConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "notification_worker=debug,microshop_notify=debug,microshop_broker=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        brokers = %config.consumer.brokers.join(","),
        group_id = %config.consumer.group_id,
        topics = %config.consumer.topics.join(","),
        "Loaded worker configuration"
    );

    // --- Mailer ---
    let email_config = config
        .email
        .clone()
        .expect("SMTP_HOST must be set for the notification worker");
    let mailer: Arc<dyn EmailSender> =
        Arc::new(SmtpMailer::new(email_config).expect("Failed to build SMTP transport"));

    // --- Dispatcher ---
    let dispatcher = Arc::new(
        Dispatcher::new(config.send_retry)
            .register(
                TOPIC_USER_REGISTERED,
                Arc::new(WelcomeEmailHandler::new(Arc::clone(&mailer))) as _,
            )
            .register(
                TOPIC_ORDER_CREATED,
                Arc::new(OrderConfirmationHandler::new(Arc::clone(&mailer))) as _,
            ),
    );

    // --- Supervised consume loop ---
    let consuming = Arc::new(AtomicBool::new(false));
    let cancel = tokio_util::sync::CancellationToken::new();
    let supervisor_handle = tokio::spawn(supervisor::run(
        config.consumer.clone(),
        Arc::clone(&dispatcher),
        Arc::clone(&consuming),
        cancel.clone(),
    ));
    tracing::info!("Notification consumer started");

    // --- App state ---
    let app_state = AppState {
        brokers: config.consumer.brokers.clone(),
        group_id: config.consumer.group_id.clone(),
        topics: config.consumer.topics.clone(),
        consuming: Arc::clone(&consuming),
        mailer,
        test_recipient: config.test_recipient.clone(),
    };

    // --- Router ---
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::test_email::router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting health server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Health server stopped, shutting down consumer");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), supervisor_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
