use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to `info`.
/// Calling this function multiple times is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Rolling counters accumulated across every job of a run.
#[derive(Default, Debug)]
pub struct Telemetry {
    pages_fetched: AtomicU64,
    records_fetched: AtomicU64,
    duplicates_removed: AtomicU64,
    files_written: AtomicU64,
    provider_errors: AtomicU64,
}

impl Telemetry {
    pub fn record_page(&self, records: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.records_fetched
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn record_duplicates(&self, count: usize) {
        if count == 0 {
            return;
        }
        self.duplicates_removed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_file_written(&self) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_error(&self) {
        self.provider_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            records_fetched: self.records_fetched.load(Ordering::Relaxed),
            duplicates_removed: self.duplicates_removed.load(Ordering::Relaxed),
            files_written: self.files_written.load(Ordering::Relaxed),
            provider_errors: self.provider_errors.load(Ordering::Relaxed),
        }
    }

    pub fn files_written(&self) -> u64 {
        self.files_written.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub pages_fetched: u64,
    pub records_fetched: u64,
    pub duplicates_removed: u64,
    pub files_written: u64,
    pub provider_errors: u64,
}

impl TelemetrySnapshot {
    /// Counter deltas accumulated since `earlier`.
    pub fn since(&self, earlier: &TelemetrySnapshot) -> TelemetrySnapshot {
        TelemetrySnapshot {
            pages_fetched: self.pages_fetched.saturating_sub(earlier.pages_fetched),
            records_fetched: self.records_fetched.saturating_sub(earlier.records_fetched),
            duplicates_removed: self
                .duplicates_removed
                .saturating_sub(earlier.duplicates_removed),
            files_written: self.files_written.saturating_sub(earlier.files_written),
            provider_errors: self.provider_errors.saturating_sub(earlier.provider_errors),
        }
    }
}
