//! `coincache` command line: mirrors the requested catalogs into the data directory.

use anyhow::Result;
use clap::Parser;
use coincache::runtime::config::SyncConfigBuilder;
use coincache::{init_tracing, CatalogKind, Runner};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "coincache", version, about)]
struct Cli {
    /// Catalogs to synchronize, in order. Defaults to every catalog.
    #[arg(value_enum)]
    catalogs: Vec<CatalogKind>,

    /// Output directory; overrides DATA_FOLDER.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Pause before each page request in milliseconds; overrides COINCACHE_PAGE_DELAY_MS.
    #[arg(long)]
    page_delay_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut builder = SyncConfigBuilder::from_env()?;
    if let Some(dir) = cli.data_dir {
        builder = builder.data_dir(dir);
    }
    if let Some(millis) = cli.page_delay_ms {
        builder = builder.page_delay(Duration::from_millis(millis));
    }

    let runner = Runner::new(builder.build()?)?;
    runner.run(&cli.catalogs).await?;
    Ok(())
}
