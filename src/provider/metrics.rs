//! Request counters kept by [`ProviderClient`](super::ProviderClient).

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct ProviderMetrics {
    requests: AtomicU64,
    failures: AtomicU64,
    busy_micros: AtomicU64,
}

impl ProviderMetrics {
    /// Counts one finished request, whatever its outcome.
    pub(crate) fn record(&self, elapsed: Duration, failed: bool) {
        self.requests.fetch_add(1, Relaxed);
        if failed {
            self.failures.fetch_add(1, Relaxed);
        }
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.busy_micros.fetch_add(micros, Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ProviderMetricsSnapshot {
        ProviderMetricsSnapshot {
            total_requests: self.requests.load(Relaxed),
            total_errors: self.failures.load(Relaxed),
            time_in_requests: Duration::from_micros(self.busy_micros.load(Relaxed)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProviderMetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    /// Wall time spent waiting on the provider, page delays excluded.
    pub time_in_requests: Duration,
}

impl ProviderMetricsSnapshot {
    pub fn average_latency_ms(&self) -> u64 {
        match self.total_requests {
            0 => 0,
            n => (self.time_in_requests / u32::try_from(n).unwrap_or(u32::MAX)).as_millis() as u64,
        }
    }
}
