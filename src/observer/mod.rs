//! Stage E: the rolling-window throughput report (§4.5), grounded on
//! `original_source/main.py::process_e`. The sampling cadence (1 Hz), the
//! history-trim-then-average order, and the "only print once the window has
//! fully elapsed" gate are all carried over exactly.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::counters::Counters;
use crate::domain::{DomainBatch, EnrichedRecord, FilteredBatch};

struct RollingHistory {
    window: usize,
    samples: VecDeque<u64>,
}

impl RollingHistory {
    fn new(window: usize) -> Self {
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    fn push(&mut self, sample: u64) {
        if self.samples.len() >= self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn average_per_sec(&self) -> f64 {
        self.samples.iter().sum::<u64>() as f64 / self.window as f64
    }
}

/// Queue occupancy snapshots, read via each channel's `Sender`.
pub struct QueueHandles {
    pub ab: mpsc::Sender<DomainBatch>,
    pub bc: mpsc::Sender<FilteredBatch>,
    pub cd: mpsc::Sender<EnrichedRecord>,
}

/// Runs until `cancel` fires, sampling the counters once a second and
/// printing a report every `rolling_window` seconds.
pub async fn run(
    counters: std::sync::Arc<Counters>,
    queues: QueueHandles,
    rolling_window_secs: u64,
    cancel: CancellationToken,
) {
    let window = rolling_window_secs.max(1) as usize;
    let mut cert_history = RollingHistory::new(window);
    let mut filtered_history = RollingHistory::new(window);
    let mut enriched_history = RollingHistory::new(window);
    let mut last_display = Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }

        cert_history.push(Counters::take(&counters.certs_received));
        filtered_history.push(Counters::take(&counters.domains_filtered));
        enriched_history.push(Counters::take(&counters.domains_enriched));

        if last_display.elapsed().as_secs() >= rolling_window_secs {
            tracing::info!(
                queue_ab_size = queues.ab.max_capacity() - queues.ab.capacity(),
                queue_bc_size = queues.bc.max_capacity() - queues.bc.capacity(),
                queue_cd_size = queues.cd.max_capacity() - queues.cd.capacity(),
                certs_per_sec_avg = format!("{:.2}", cert_history.average_per_sec()),
                filtered_per_sec_avg = format!("{:.2}", filtered_history.average_per_sec()),
                enriched_per_sec_avg = format!("{:.2}", enriched_history.average_per_sec()),
                dropped_malformed = counters.dropped_malformed.load(std::sync::atomic::Ordering::Relaxed),
                dropped_validity = counters.dropped_validity.load(std::sync::atomic::Ordering::Relaxed),
                dropped_ab_full = counters.dropped_ab_full.load(std::sync::atomic::Ordering::Relaxed),
                "pipeline throughput report",
            );
            last_display = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_history_trims_to_window() {
        let mut h = RollingHistory::new(3);
        for sample in [1, 2, 3, 4] {
            h.push(sample);
        }
        assert_eq!(h.samples, VecDeque::from([2, 3, 4]));
    }

    #[test]
    fn average_divides_by_the_full_window_not_sample_count() {
        let mut h = RollingHistory::new(5);
        h.push(10);
        // Only one sample so far, but the source always divides by the
        // configured window, matching `sum(history) / rolling_window`.
        assert_eq!(h.average_per_sec(), 2.0);
    }
}
