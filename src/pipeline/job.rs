use crate::pipeline::order::dedup_and_sort;
use crate::pipeline::paginator::Paginator;
use crate::provider::{Endpoint, PageSource};
use crate::runtime::error::SyncError;
use crate::runtime::telemetry::Telemetry;
use crate::store::{BlobStore, CatalogWriter};
use anyhow::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Maps one raw provider record, given its zero-based position in the provider's
/// listing, to the catalog's canonical shape.
pub type Normalizer<T> = Box<dyn Fn(Value, usize) -> Result<T, serde_json::Error> + Send + Sync>;

/// Catalog-specific step run after `all.json` and `count` are written.
pub trait PostProcess<T>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Writes any extra entries derived from the ordered catalog and returns how many
    /// were written.
    fn apply<'a>(
        &'a self,
        records: &'a [T],
        writer: &'a CatalogWriter<'a>,
    ) -> BoxFuture<'a, Result<usize>>;
}

/// Everything that distinguishes one catalog from another.
pub struct CatalogJob<T> {
    /// Directory name of the catalog root.
    pub catalog: &'static str,
    pub endpoint: Endpoint,
    pub normalize: Normalizer<T>,
    pub primary_key: fn(&T) -> &str,
    pub rank: Option<fn(&T) -> Option<u64>>,
    pub post_process: Option<Box<dyn PostProcess<T>>>,
}

/// Collaborators shared by every job of a run.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub source: &'a dyn PageSource,
    pub store: &'a dyn BlobStore,
    pub telemetry: &'a Telemetry,
    pub page_delay: Duration,
}

/// Outcome of a successful job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub catalog: &'static str,
    pub pages: u32,
    pub fetched: usize,
    pub duplicates_removed: usize,
    pub written: usize,
    pub extra_entries: usize,
}

/// Pages through the job's endpoint, normalizes every record, dedups and orders the
/// result, then persists it.
///
/// Any failure aborts the job. Files written before the failure are left in place.
pub async fn run_job<T>(job: &CatalogJob<T>, ctx: &JobContext<'_>) -> Result<SyncReport>
where
    T: Serialize + Sync,
{
    let mut paginator = Paginator::new(ctx.source, &job.endpoint, ctx.page_delay);
    let mut records = Vec::new();
    let mut pages = 0u32;

    loop {
        let batch = match paginator.next_batch().await {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(err) => {
                if matches!(err.downcast_ref::<SyncError>(), Some(SyncError::Provider { .. })) {
                    ctx.telemetry.record_provider_error();
                }
                return Err(err);
            }
        };
        pages += 1;
        ctx.telemetry.record_page(batch.records.len());

        records.reserve(batch.records.len());
        for (i, raw) in batch.records.into_iter().enumerate() {
            let position = batch.offset + i;
            let record = (job.normalize)(raw, position).map_err(|err| SyncError::InvalidRecord {
                catalog: job.catalog,
                position,
                reason: err.to_string(),
            })?;
            records.push(record);
        }
    }

    let fetched = records.len();
    let ordered = dedup_and_sort(records, job.primary_key, job.rank)?;
    ctx.telemetry.record_duplicates(ordered.duplicates_removed);
    if ordered.duplicates_removed > 0 {
        tracing::info!(
            catalog = job.catalog,
            duplicates = ordered.duplicates_removed,
            "duplicate records removed"
        );
    }

    let persist = |source: anyhow::Error| SyncError::Persist {
        catalog: job.catalog,
        source,
    };

    let writer = CatalogWriter::new(ctx.store, job.catalog, ctx.telemetry);
    writer.prepare().await.map_err(persist)?;
    writer
        .write_catalog(&ordered.records)
        .await
        .map_err(persist)?;

    let extra_entries = match &job.post_process {
        Some(step) => {
            let written = step
                .apply(&ordered.records, &writer)
                .await
                .map_err(persist)?;
            tracing::debug!(
                catalog = job.catalog,
                step = step.name(),
                written,
                "post-process finished"
            );
            written
        }
        None => 0,
    };

    Ok(SyncReport {
        catalog: job.catalog,
        pages,
        fetched,
        duplicates_removed: ordered.duplicates_removed,
        written: ordered.records.len(),
        extra_entries,
    })
}
