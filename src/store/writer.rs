use crate::pipeline::index::{CoinIndex, ADDRESS_NAMESPACE, SYMBOL_NAMESPACE};
use crate::runtime::telemetry::Telemetry;
use crate::store::blob::{BlobKey, BlobStore};
use anyhow::{Context, Result};
use serde::Serialize;

/// Full ordered catalog, pretty-printed.
pub const CATALOG_FILE: &str = "all.json";
/// Record count as decimal text.
pub const COUNT_FILE: &str = "count";

/// Writes one catalog's files under its root key. Every write overwrites.
pub struct CatalogWriter<'a> {
    store: &'a dyn BlobStore,
    root: BlobKey,
    telemetry: &'a Telemetry,
}

impl<'a> CatalogWriter<'a> {
    pub fn new(store: &'a dyn BlobStore, catalog: &str, telemetry: &'a Telemetry) -> Self {
        Self {
            store,
            root: BlobKey::root(catalog),
            telemetry,
        }
    }

    pub fn root(&self) -> &BlobKey {
        &self.root
    }

    /// Creates the catalog root.
    pub async fn prepare(&self) -> Result<()> {
        self.store.create_dir_all(&self.root).await
    }

    /// Writes `all.json` and `count`.
    pub async fn write_catalog<T: Serialize>(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)
            .with_context(|| format!("failed to serialize {} catalog", self.root))?;
        self.put(&self.root.join(CATALOG_FILE), json).await?;
        self.put(&self.root.join(COUNT_FILE), records.len().to_string().into_bytes())
            .await?;

        tracing::info!(
            catalog = %self.root,
            records = records.len(),
            "all records written to {}/{CATALOG_FILE}",
            self.root
        );
        Ok(())
    }

    /// Creates (if needed) the namespace `segments` below the catalog root.
    pub async fn create_namespace(&self, segments: &[&str]) -> Result<BlobKey> {
        let key = segments
            .iter()
            .fold(self.root.clone(), |key, segment| key.join(*segment));
        self.store.create_dir_all(&key).await?;
        Ok(key)
    }

    /// Writes a single entry file inside an existing namespace.
    pub async fn write_entry(
        &self,
        namespace: &BlobKey,
        name: &str,
        contents: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.put(&namespace.join(name), contents.into()).await
    }

    /// Writes `s/<symbol>` and `a/<platform>/<address>` files, returning how many entries
    /// were written.
    pub async fn write_index(&self, index: &CoinIndex) -> Result<usize> {
        let symbols = self.create_namespace(&[SYMBOL_NAMESPACE]).await?;
        for (symbol, id) in index.symbols() {
            self.write_entry(&symbols, symbol, id.as_bytes()).await?;
        }

        self.create_namespace(&[ADDRESS_NAMESPACE]).await?;
        for (platform, addresses) in index.platforms() {
            let namespace = self
                .create_namespace(&[ADDRESS_NAMESPACE, platform.as_str()])
                .await?;
            for (address, id) in addresses {
                self.write_entry(&namespace, address, id.as_bytes()).await?;
            }
        }

        let written = index.symbols().len() + index.contract_count();
        tracing::info!(
            catalog = %self.root,
            symbols = index.symbols().len(),
            platforms = index.platforms().len(),
            contracts = index.contract_count(),
            "index links written"
        );
        Ok(written)
    }

    async fn put(&self, key: &BlobKey, contents: Vec<u8>) -> Result<()> {
        self.store.write(key, contents).await?;
        self.telemetry.record_file_written();
        Ok(())
    }
}
