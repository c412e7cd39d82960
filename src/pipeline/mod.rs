//! The pipeline supervisor: wires the bounded AB/BC/CD channels between
//! Stages A-E and drives graceful shutdown (§5), grounded on
//! `original_source/main.py`'s `asyncio.gather(process_a, ..., process_e)`
//! and on this codebase's own `runner.rs` for the tracing-subscriber /
//! cancellation-token shutdown shape.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::config::Config;
use crate::counters::Counters;
use crate::domain::{DomainBatch, EnrichedRecord, FilteredBatch};
use crate::enrich::{doh::DohClient, Enricher};
use crate::filter::FilterPipeline;
use crate::ingest;
use crate::observer::{self, QueueHandles};
use crate::sink::Sink;
use crate::store::Store;

pub async fn run(config: Config) -> Result<()> {
    let counters = Arc::new(Counters::new());
    let cancel = CancellationToken::new();

    let store = Store::connect(&config.db)
        .await
        .context("failed to connect to the relational store")?;
    sqlx::migrate!("./migrations")
        .run(store.pool())
        .await
        .context("failed to run database migrations")?;

    let broker = match &config.broker {
        Some(cfg) => Some(
            Broker::connect(cfg)
                .await
                .context("failed to connect to the Pulsar broker")?,
        ),
        None => None,
    };

    let (ab_tx, mut ab_rx) = mpsc::channel::<DomainBatch>(config.queues.ab);
    let (bc_tx, mut bc_rx) = mpsc::channel::<FilteredBatch>(config.queues.bc);
    let (cd_tx, mut cd_rx) = mpsc::channel::<EnrichedRecord>(config.queues.cd);

    let ingest_handle = ingest::spawn(
        config.certstream_url.clone(),
        config.cert_max_validity,
        config.reconnect.clone(),
        ab_tx.clone(),
        counters.clone(),
        cancel.clone(),
    );

    let filter_pipeline = Arc::new(FilterPipeline::new(store.clone()));
    let stage_b = {
        let counters = counters.clone();
        let cancel = cancel.clone();
        let bc_tx = bc_tx.clone();
        tokio::spawn(async move {
            loop {
                let batch = tokio::select! {
                    _ = cancel.cancelled() => break,
                    item = ab_rx.recv() => match item {
                        Some(batch) => batch,
                        None => break,
                    },
                };
                match filter_pipeline.process(batch).await {
                    Ok(filtered) if filtered.is_empty() => {}
                    Ok(filtered) => {
                        Counters::add(&counters.domains_filtered, filtered.len() as u64);
                        if bc_tx.send(filtered).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "stage B registry commit failed"),
                }
            }
        })
    };

    let doh = DohClient::new(config.doh_timeout).context("failed to build the DoH client")?;
    let enricher = Enricher::new(doh, config.doh_concurrency);
    let stage_c = {
        let counters = counters.clone();
        let cancel = cancel.clone();
        let cd_tx = cd_tx.clone();
        let batch_target = config.enrich_batch_size;
        tokio::spawn(async move {
            let mut batch: FilteredBatch = HashMap::new();
            loop {
                let item = tokio::select! {
                    _ = cancel.cancelled() => None,
                    item = bc_rx.recv() => item,
                };
                match item {
                    Some(filtered) => {
                        batch.extend(filtered);
                        if batch.len() >= batch_target {
                            let ready = std::mem::take(&mut batch);
                            enricher.enrich_batch(ready, &cd_tx, &counters).await;
                        }
                    }
                    None => {
                        if !batch.is_empty() {
                            enricher.enrich_batch(batch, &cd_tx, &counters).await;
                        }
                        break;
                    }
                }
            }
        })
    };

    let mut sink = Sink::new(store.clone(), broker);
    let stage_d = {
        let counters = counters.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                let record = tokio::select! {
                    _ = cancel.cancelled() => break,
                    item = cd_rx.recv() => match item {
                        Some(record) => record,
                        None => break,
                    },
                };
                sink.process(record, &counters).await;
            }
        })
    };

    let observer_handle = tokio::spawn(observer::run(
        counters.clone(),
        QueueHandles { ab: ab_tx, bc: bc_tx, cd: cd_tx },
        config.rolling_window_secs,
        cancel.clone(),
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, draining in-flight work");
        }
    }
    cancel.cancel();

    let (stage_b, stage_c, stage_d, _observer) =
        tokio::join!(stage_b, stage_c, stage_d, observer_handle);
    stage_b.context("stage B task panicked")?;
    stage_c.context("stage C task panicked")?;
    stage_d.context("stage D task panicked")?;

    tokio::task::spawn_blocking(move || ingest_handle.join())
        .await
        .context("failed to join the ingest thread")?
        .map_err(|_| anyhow::anyhow!("ingest thread panicked"))??;

    Ok(())
}
