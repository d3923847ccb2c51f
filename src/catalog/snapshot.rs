use crate::catalog::RawImage;
use crate::pipeline::index::is_eligible_key;
use crate::pipeline::{CatalogJob, PostProcess};
use crate::provider::endpoint;
use crate::store::{CatalogWriter, CATALOG_FILE, COUNT_FILE};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const CATALOG: &str = "coin-data";

/// Market snapshot of one coin. Numbers are kept as the provider wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_24h: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Deserialize)]
struct RawMarketSnapshot {
    id: String,
    #[serde(default)]
    image: Option<RawImage>,
    name: String,
    symbol: String,
    #[serde(default)]
    current_price: Option<Number>,
    #[serde(default)]
    market_cap: Option<Number>,
    #[serde(default)]
    total_volume: Option<Number>,
    #[serde(default)]
    price_change_percentage_24h: Option<Number>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl CoinSnapshot {
    pub fn primary_key(&self) -> &str {
        &self.id
    }
}

pub fn normalize(raw: Value) -> Result<CoinSnapshot, serde_json::Error> {
    let raw: RawMarketSnapshot = serde_json::from_value(raw)?;
    Ok(CoinSnapshot {
        id: raw.id,
        image: raw.image.and_then(RawImage::into_large),
        name: raw.name,
        symbol: raw.symbol,
        current_price: raw.current_price,
        market_cap: raw.market_cap,
        total_volume: raw.total_volume,
        price_change_percentage_24h: raw.price_change_percentage_24h,
        last_updated: raw.last_updated,
    })
}

/// Whether `id` can name its own snapshot file without clobbering the catalog files.
pub fn has_snapshot_file(id: &str) -> bool {
    is_eligible_key(id) && id != CATALOG_FILE && id != COUNT_FILE
}

/// Writes one pretty-printed `<id>` file per coin next to `all.json`.
struct SnapshotFiles;

impl PostProcess<CoinSnapshot> for SnapshotFiles {
    fn name(&self) -> &'static str {
        "snapshot files"
    }

    fn apply<'a>(
        &'a self,
        records: &'a [CoinSnapshot],
        writer: &'a CatalogWriter<'a>,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let mut written = 0;
            for snapshot in records {
                if !has_snapshot_file(&snapshot.id) {
                    tracing::debug!(id = %snapshot.id, "coin id cannot name a file; snapshot skipped");
                    continue;
                }
                let json = serde_json::to_vec_pretty(snapshot)
                    .with_context(|| format!("failed to serialize snapshot {}", snapshot.id))?;
                writer.write_entry(writer.root(), &snapshot.id, json).await?;
                written += 1;
            }
            Ok(written)
        })
    }
}

pub fn job() -> CatalogJob<CoinSnapshot> {
    CatalogJob {
        catalog: CATALOG,
        endpoint: endpoint::coins_markets(),
        normalize: Box::new(|raw: Value, _: usize| normalize(raw)),
        primary_key: CoinSnapshot::primary_key,
        rank: None,
        post_process: Some(Box::new(SnapshotFiles)),
    }
}
