//! Stage C: batches survivors from Stage B and resolves each one's A/NS
//! records under a bounded concurrency limit (§4.3), grounded on
//! `original_source/c_dns_multiplexer/c_dns_multiplexer.py`'s
//! `enrich_domains`/`process_and_enqueue`. The semaphore + `FuturesUnordered`
//! shape is the same one `concurrent.rs`'s `ConcurrentProbe` uses for
//! bounding concurrent HTTP work.

pub mod doh;

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc::Sender, Semaphore};

use crate::counters::Counters;
use crate::domain::{EnrichedRecord, FilteredBatch};
use doh::DohClient;

pub struct Enricher {
    doh: Arc<DohClient>,
    semaphore: Arc<Semaphore>,
}

impl Enricher {
    pub fn new(doh: DohClient, concurrency: usize) -> Self {
        Self {
            doh: Arc::new(doh),
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Resolves every domain in `batch` concurrently (bounded by the
    /// semaphore) and forwards each result to `cd_tx` as it completes, rather
    /// than waiting for the whole batch — matching the CD channel's
    /// per-record contract in §3.
    pub async fn enrich_batch(
        &self,
        batch: FilteredBatch,
        cd_tx: &Sender<EnrichedRecord>,
        counters: &Counters,
    ) {
        let batch_size = batch.len();
        let started = std::time::Instant::now();

        let mut pending = FuturesUnordered::new();
        for (domain, id) in batch {
            let doh = self.doh.clone();
            let semaphore = self.semaphore.clone();
            pending.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("enrichment semaphore is never closed");
                let (ips, ns) = doh.resolve(&domain).await;
                EnrichedRecord { id, domain, ips, ns }
            });
        }

        while let Some(record) = pending.next().await {
            Counters::inc(&counters.domains_enriched);
            if cd_tx.send(record).await.is_err() {
                tracing::warn!("CD channel closed, stopping mid-batch");
                return;
            }
        }

        tracing::debug!(
            batch_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enrichment batch complete"
        );
    }
}
