//! Stage A: the certstream firehose client (§4.1), grounded on
//! `original_source/a_certs_firehose/a_certs_firehose.py`.
//!
//! The firehose client is synchronous in the source, so here it runs on a
//! dedicated OS thread with a blocking `tungstenite` client and bridges into
//! the async pipeline with `Sender::try_send` — the same
//! blocking-thread-feeds-async-channel shape the spec calls for in §9's
//! design note, and the one `Throttle`/`ConcurrentProbe` use elsewhere in
//! this codebase to keep blocking work off the Tokio reactor.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tungstenite::Message;

use crate::config::ReconnectConfig;
use crate::counters::Counters;
use crate::domain::{CertEvent, CertstreamMessage, DomainBatch};

/// Spawns the firehose client on its own thread and returns its handle. The
/// handle resolves once the connection is cancelled or fails unrecoverably.
pub fn spawn(
    url: String,
    cert_max_validity: i64,
    reconnect: ReconnectConfig,
    tx: Sender<DomainBatch>,
    counters: Arc<Counters>,
    cancel: CancellationToken,
) -> thread::JoinHandle<Result<()>> {
    thread::Builder::new()
        .name("certstream-ingest".into())
        .spawn(move || run(&url, cert_max_validity, &reconnect, &tx, &counters, &cancel))
        .expect("failed to spawn the certstream ingest thread")
}

/// Reconnects with bounded exponential backoff (§4.1 Failures): the delay
/// doubles after each failure up to `max_delay`, and after `max_attempts`
/// consecutive failures the thread gives up and returns an error, which the
/// supervisor treats as fatal.
fn run(
    url: &str,
    cert_max_validity: i64,
    reconnect: &ReconnectConfig,
    tx: &Sender<DomainBatch>,
    counters: &Counters,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut attempt = 0u32;
    let mut delay = reconnect.base_delay;

    while !cancel.is_cancelled() {
        match connect_and_pump(url, cert_max_validity, tx, counters, cancel) {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempt += 1;
                if attempt >= reconnect.max_attempts {
                    return Err(e).context(format!(
                        "certstream reconnection abandoned after {attempt} attempts"
                    ));
                }
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = reconnect.max_attempts,
                    delay_secs = delay.as_secs(),
                    "certstream connection dropped, reconnecting"
                );
                thread::sleep(delay);
                delay = (delay * 2).min(reconnect.max_delay);
            }
        }
    }
    Ok(())
}

fn connect_and_pump(
    url: &str,
    cert_max_validity: i64,
    tx: &Sender<DomainBatch>,
    counters: &Counters,
    cancel: &CancellationToken,
) -> Result<()> {
    let (mut socket, _response) =
        tungstenite::connect(url).with_context(|| format!("failed to connect to {url}"))?;
    tracing::info!(url, "connected to certstream");

    while !cancel.is_cancelled() {
        let message = socket
            .read()
            .context("certstream websocket read failed")?;
        let Message::Text(text) = message else {
            continue;
        };

        let parsed: CertstreamMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "malformed certstream payload, skipping");
                Counters::inc(&counters.dropped_malformed);
                continue;
            }
        };

        // §4.1 step 1: every decoded message counts as received, whether or
        // not it turns out to carry a usable leaf_cert.
        Counters::inc(&counters.certs_received);

        let Some(event) = CertEvent::from_message(&parsed) else {
            Counters::inc(&counters.dropped_malformed);
            continue;
        };

        if event.validity_secs() >= cert_max_validity {
            Counters::inc(&counters.dropped_validity);
            continue;
        }
        if event.all_domains.is_empty() {
            continue;
        }

        match tx.try_send(event.all_domains) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                Counters::inc(&counters.dropped_ab_full);
                tracing::trace!("AB queue full, dropping this certificate's domains");
            }
            Err(TrySendError::Closed(_)) => return Ok(()),
        }
    }
    Ok(())
}
