//! Stage D: persists each enriched record's IPs and nameservers, and
//! optionally mirrors it to the broker (§4.4), grounded on
//! `original_source/main.py::process_d`.

use crate::broker::Broker;
use crate::counters::Counters;
use crate::domain::EnrichedRecord;
use crate::store::Store;

pub struct Sink {
    store: Store,
    broker: Option<Broker>,
}

impl Sink {
    pub fn new(store: Store, broker: Option<Broker>) -> Self {
        Self { store, broker }
    }

    /// Persists one enriched record. IP/NS inserts that fail are logged and
    /// do not stop the pipeline (§4.4); a broker send failure is likewise
    /// logged, not fatal, since the broker is a best-effort mirror (§6).
    pub async fn process(&mut self, record: EnrichedRecord, counters: &Counters) {
        let ip_rows: Vec<(i64, String)> = record
            .ips
            .iter()
            .map(|ip| (record.id, ip.clone()))
            .collect();
        let ns_rows: Vec<(i64, String)> = record
            .ns
            .iter()
            .map(|ns| (record.id, ns.clone()))
            .collect();

        if !ip_rows.is_empty() {
            if let Err(e) = self.store.insert_domains_ip(&ip_rows).await {
                tracing::error!(domain = %record.domain, error = %e, "failed to persist IP records");
            }
        }
        if !ns_rows.is_empty() {
            if let Err(e) = self.store.insert_domains_ns(&ns_rows).await {
                tracing::error!(domain = %record.domain, error = %e, "failed to persist NS records");
            }
        }

        // §4.4 broker mirror: only for records that actually resolved an IP.
        if !ip_rows.is_empty() {
            if let Some(broker) = self.broker.as_mut() {
                if let Err(e) = broker.send(record.id, &record.domain).await {
                    tracing::warn!(domain = %record.domain, error = %e, "failed to mirror record to the broker");
                }
            }
        }

        Counters::inc(&counters.domains_sunk);
    }
}
