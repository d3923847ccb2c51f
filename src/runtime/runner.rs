use crate::catalog::coin::{self, PlatformDirectory};
use crate::catalog::{asset_platform, exchange, snapshot, CatalogKind};
use crate::pipeline::{run_job, JobContext, SyncReport};
use crate::provider::{ProviderClient, ProviderMetricsSnapshot};
use crate::runtime::config::SyncConfig;
use crate::runtime::error::{SyncError, SyncStage};
use crate::runtime::telemetry::Telemetry;
use crate::store::FsBlobStore;
use anyhow::Result;

/// Runs catalog jobs one after another against the configured provider and data
/// directory. The first failing job stops the run.
pub struct Runner {
    config: SyncConfig,
    client: ProviderClient,
    store: FsBlobStore,
    telemetry: Telemetry,
}

impl Runner {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let client = ProviderClient::from_config(&config)?;
        let store = FsBlobStore::new(config.data_dir());
        Ok(Self {
            config,
            client,
            store,
            telemetry: Telemetry::default(),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Counters accumulated over every job this runner has executed.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn provider_metrics(&self) -> ProviderMetricsSnapshot {
        self.client.metrics()
    }

    /// Synchronizes `catalogs` in order; an empty slice means every catalog.
    ///
    /// The credential is checked once for the whole run, before any request is made.
    pub async fn run(&self, catalogs: &[CatalogKind]) -> Result<Vec<SyncReport>> {
        let catalogs: &[CatalogKind] = if catalogs.is_empty() {
            &CatalogKind::ALL
        } else {
            catalogs
        };
        self.check_credentials(catalogs)?;

        let mut reports = Vec::with_capacity(catalogs.len());
        for &catalog in catalogs {
            let before = self.telemetry.snapshot();
            tracing::info!(%catalog, "catalog sync started");

            match self.run_catalog(catalog).await {
                Ok(report) => {
                    let delta = self.telemetry.snapshot().since(&before);
                    tracing::info!(
                        %catalog,
                        pages = delta.pages_fetched,
                        fetched = report.fetched,
                        duplicates = report.duplicates_removed,
                        written = report.written,
                        extra_entries = report.extra_entries,
                        files = delta.files_written,
                        "catalog sync finished"
                    );
                    reports.push(report);
                }
                Err(err) => {
                    let stage = SyncError::stage_of(&err);
                    tracing::error!(%catalog, %stage, error = %err, "catalog sync failed");
                    return Err(err.context(format!("{catalog} sync failed")));
                }
            }
        }

        let totals = self.telemetry.snapshot();
        let requests = self.client.metrics();
        tracing::info!(
            catalogs = reports.len(),
            pages = totals.pages_fetched,
            records = totals.records_fetched,
            files = totals.files_written,
            requests = requests.total_requests,
            request_errors = requests.total_errors,
            average_latency_ms = requests.average_latency_ms(),
            "sync run complete"
        );
        Ok(reports)
    }

    fn check_credentials(&self, catalogs: &[CatalogKind]) -> Result<()> {
        let Some(catalog) = catalogs.iter().find(|c| c.requires_credential()) else {
            return Ok(());
        };
        if let Err(err) = self.config.require_api_key() {
            tracing::error!(
                %catalog,
                stage = %SyncStage::Configure,
                error = %err,
                "catalog sync failed"
            );
            return Err(err);
        }
        Ok(())
    }

    async fn run_catalog(&self, catalog: CatalogKind) -> Result<SyncReport> {
        let ctx = JobContext {
            source: &self.client,
            store: &self.store,
            telemetry: &self.telemetry,
            page_delay: self.config.page_delay(),
        };

        match catalog {
            CatalogKind::Coins => {
                let directory = PlatformDirectory::fetch(&ctx).await?;
                run_job(&coin::job(directory), &ctx).await
            }
            CatalogKind::Exchanges => run_job(&exchange::job(), &ctx).await,
            CatalogKind::AssetPlatforms => run_job(&asset_platform::job(), &ctx).await,
            CatalogKind::CoinData => run_job(&snapshot::job(), &ctx).await,
        }
    }
}
