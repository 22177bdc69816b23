//! Worker configuration loaded from environment variables.
//!
//! This is the only place the process reads the environment; everything
//! downstream receives plain structs.

use std::time::Duration;

use microshop_core::config::{ConsumerConfig, OffsetPolicy};
use microshop_core::topics::{TOPIC_ORDER_CREATED, TOPIC_USER_REGISTERED};
use microshop_notify::dispatcher::SendRetryPolicy;
use microshop_notify::email::EmailConfig;

/// Configuration for the notification worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bind address for the health server (default: `0.0.0.0`).
    pub host: String,
    /// Bind port for the health server (default: `3000`).
    pub port: u16,
    /// Consumer group subscription settings.
    pub consumer: ConsumerConfig,
    /// Bounded retry for transient handler send failures.
    pub send_retry: SendRetryPolicy,
    /// SMTP settings; `None` when `SMTP_HOST` is not set.
    pub email: Option<EmailConfig>,
    /// Recipient for the `/test-email` endpoint.
    pub test_recipient: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `HOST`                    | `0.0.0.0`                        |
    /// | `PORT`                    | `3000`                           |
    /// | `KAFKA_BROKERS`           | `localhost:9092` (comma list)    |
    /// | `KAFKA_GROUP_ID`          | `notification-service`           |
    /// | `NOTIFY_TOPICS`           | `user-registered,order-created`  |
    /// | `KAFKA_OFFSET_RESET`      | `earliest`                       |
    /// | `SEND_RETRY_ATTEMPTS`     | `3`                              |
    /// | `SEND_RETRY_BACKOFF_SECS` | `2`                              |
    /// | `SMTP_HOST`               | — (email disabled when unset)    |
    /// | `SMTP_PORT`               | `587`                            |
    /// | `SMTP_FROM`               | `noreply@microshop.local`        |
    /// | `SMTP_USER`               | —                                |
    /// | `SMTP_PASSWORD`           | —                                |
    /// | `SMTP_SEND_TIMEOUT_SECS`  | `30`                             |
    /// | `TEST_EMAIL`              | `test@microshop.local`           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let brokers = csv_list(
            &std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".into()),
        );

        let group_id =
            std::env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "notification-service".into());

        let topics = csv_list(&std::env::var("NOTIFY_TOPICS").unwrap_or_else(|_| {
            format!("{TOPIC_USER_REGISTERED},{TOPIC_ORDER_CREATED}")
        }));

        let offset_policy = match std::env::var("KAFKA_OFFSET_RESET").as_deref() {
            Ok("latest") => OffsetPolicy::Latest,
            _ => OffsetPolicy::Earliest,
        };

        let send_attempts: u32 = std::env::var("SEND_RETRY_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("SEND_RETRY_ATTEMPTS must be a valid u32");

        let send_backoff_secs: u64 = std::env::var("SEND_RETRY_BACKOFF_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("SEND_RETRY_BACKOFF_SECS must be a valid u64");

        let email = std::env::var("SMTP_HOST").ok().map(|smtp_host| {
            let mut config = EmailConfig::new(
                smtp_host,
                std::env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@microshop.local".into()),
            );
            if let Some(port) = std::env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()) {
                config.smtp_port = port;
            }
            config.smtp_user = std::env::var("SMTP_USER").ok();
            config.smtp_password = std::env::var("SMTP_PASSWORD").ok();
            if let Some(secs) = std::env::var("SMTP_SEND_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
            {
                config.send_timeout = Duration::from_secs(secs);
            }
            config
        });

        let test_recipient =
            std::env::var("TEST_EMAIL").unwrap_or_else(|_| "test@microshop.local".into());

        Self {
            host,
            port,
            consumer: ConsumerConfig {
                brokers,
                group_id,
                topics,
                offset_policy,
            },
            send_retry: SendRetryPolicy {
                max_attempts: send_attempts,
                backoff: Duration::from_secs(send_backoff_secs),
            },
            email,
            test_recipient,
        }
    }
}

/// Split a comma-delimited list, trimming entries and dropping empties.
fn csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_list_trims_and_drops_empty_entries() {
        assert_eq!(
            csv_list("kafka-1:9092, kafka-2:9092 ,,"),
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()]
        );
    }
}
