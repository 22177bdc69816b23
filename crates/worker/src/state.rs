//! Shared state for the worker's HTTP routes.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use microshop_notify::email::EmailSender;

/// Read-only view of the worker's configuration plus the live consume
/// flag, shared with the health/introspection routes.
#[derive(Clone)]
pub struct AppState {
    /// Configured broker addresses.
    pub brokers: Vec<String>,
    /// Consumer group identity.
    pub group_id: String,
    /// Subscribed topics.
    pub topics: Vec<String>,
    /// Whether the consume loop is currently running (set by the
    /// supervisor, read by `/health`).
    pub consuming: Arc<AtomicBool>,
    /// Send capability for the `/test-email` route.
    pub mailer: Arc<dyn EmailSender>,
    /// Recipient for test emails.
    pub test_recipient: String,
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
