//! The optional Pulsar mirror sink (§4.4/§10), grounded on
//! `original_source/pulsar_producer/pulsar_producer.py`. Only constructed
//! when `PULSAR_HOST`/`DOMAIN_TOPIC` are set in the environment; its absence
//! is not an error (§6).

use anyhow::{Context, Result};
use pulsar::{Producer, Pulsar, TokioExecutor};

use crate::config::BrokerConfig;

pub struct Broker {
    producer: Producer<TokioExecutor>,
}

impl Broker {
    pub async fn connect(cfg: &BrokerConfig) -> Result<Self> {
        let pulsar: Pulsar<TokioExecutor> = Pulsar::builder(cfg.service_url(), TokioExecutor)
            .build()
            .await
            .context("failed to connect to the Pulsar broker")?;
        let producer = pulsar
            .producer()
            .with_topic(cfg.topic.clone())
            .build()
            .await
            .context("failed to create the Pulsar producer")?;
        Ok(Self { producer })
    }

    /// Mirrors one enriched record as `"{id}\t{domain}"`, the simplest
    /// reading of the source's plain `producer.send(message.encode('utf-8'))`
    /// call (§9 Open Question: payload shape).
    pub async fn send(&mut self, id: i64, domain: &str) -> Result<()> {
        let payload = format!("{id}\t{domain}");
        self.producer
            .send(payload.into_bytes())
            .await
            .context("failed to send message to Pulsar")?
            .await
            .context("Pulsar broker did not acknowledge the message")?;
        Ok(())
    }
}
