//! Publish a single event to a topic from the command line.
//!
//! Useful for exercising the pipeline end to end without the producing
//! services:
//!
//! ```text
//! publish-event user-registered '{"email":"a@x.com","username":"alice"}'
//! ```
//!
//! Brokers come from `KAFKA_BROKERS` (default `localhost:9092`).

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microshop_broker::EventProducer;
use microshop_core::config::BrokerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "publish_event=info,microshop_broker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: publish-event <topic> <json-payload>";
    let topic = args.next().context(usage)?;
    let raw_payload = args.next().context(usage)?;

    let value: serde_json::Value =
        serde_json::from_str(&raw_payload).context("payload must be valid JSON")?;
    let serde_json::Value::Object(payload) = value else {
        bail!("payload must be a JSON object");
    };

    let brokers: Vec<String> = std::env::var("KAFKA_BROKERS")
        .unwrap_or_else(|_| "localhost:9092".into())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mut producer = EventProducer::new(&BrokerConfig::new(brokers))?;
    producer.initialize().await?;
    producer.publish(&topic, &payload).await?;
    producer.shutdown();

    tracing::info!(topic = %topic, "Event published and acknowledged");
    Ok(())
}
