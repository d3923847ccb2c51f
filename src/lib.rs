pub mod catalog;
pub mod pipeline;
pub mod provider;
pub mod runtime;
pub mod store;

pub use catalog::asset_platform::AssetPlatformRecord;
pub use catalog::coin::{CoinRecord, PlatformDirectory, Platforms};
pub use catalog::exchange::ExchangeRecord;
pub use catalog::snapshot::CoinSnapshot;
pub use catalog::CatalogKind;
pub use pipeline::index::{resolve_symbol, CoinIndex};
pub use pipeline::{run_job, CatalogJob, JobContext, PostProcess, SyncReport};
pub use provider::{PageSource, ProviderClient, ProviderClientOptions};
pub use runtime::config::{SyncConfig, SyncConfigBuilder, SyncConfigParams};
pub use runtime::error::{SyncError, SyncStage};
pub use runtime::runner::Runner;
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
pub use store::{BlobKey, BlobStore, CatalogWriter, FsBlobStore};
