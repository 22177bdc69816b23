//! Notification dispatch for consumed MicroShop events.
//!
//! - [`NotificationHandler`] — the per-topic handler contract: validate
//!   required fields, render a message, perform exactly one send attempt.
//! - [`Dispatcher`] — maps an envelope's topic to a handler and isolates
//!   handler failure from the consume loop.
//! - [`pipeline`] — the consume-dispatch loop run against any
//!   [`microshop_core::EventStream`].
//! - [`email`] — the SMTP mailer behind the handlers.
//! - [`WelcomeEmailHandler`] / [`OrderConfirmationHandler`] — the stock
//!   transactional email handlers.

pub mod dispatcher;
pub mod email;
pub mod handler;
pub mod order;
pub mod pipeline;
pub mod welcome;

pub use dispatcher::{DispatchOutcome, Dispatcher, SendRetryPolicy};
pub use email::{EmailConfig, EmailError, EmailSender, SmtpMailer};
pub use handler::{HandlerError, NotificationHandler};
pub use order::OrderConfirmationHandler;
pub use pipeline::PipelineExit;
pub use welcome::WelcomeEmailHandler;
