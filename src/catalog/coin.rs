use crate::catalog::RawImage;
use crate::pipeline::index::CoinIndex;
use crate::pipeline::{CatalogJob, JobContext, Paginator, PostProcess};
use crate::provider::endpoint;
use crate::runtime::error::SyncError;
use crate::store::CatalogWriter;
use anyhow::Result;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const CATALOG: &str = "coins";

/// Asset-platform id → contract address, in provider order. A `None` or empty address
/// means the coin is listed on the platform without a known contract.
pub type Platforms = IndexMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub platforms: Platforms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u64>,
}

impl CoinRecord {
    pub fn primary_key(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> Option<u64> {
        self.market_cap_rank
    }

    pub fn has_platforms(&self) -> bool {
        !self.platforms.is_empty()
    }

    /// Whether the coin has a non-empty contract address on `platform`.
    pub fn is_deployed_on(&self, platform: &str) -> bool {
        matches!(self.platforms.get(platform), Some(Some(address)) if !address.is_empty())
    }
}

#[derive(Deserialize)]
struct RawCoinMarket {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    image: Option<RawImage>,
    #[serde(default)]
    market_cap_rank: Option<u64>,
}

#[derive(Deserialize)]
struct RawListedCoin {
    id: String,
    #[serde(default, deserialize_with = "nullable_platforms")]
    platforms: Platforms,
}

fn nullable_platforms<'de, D>(deserializer: D) -> Result<Platforms, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Platforms>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builds a [`CoinRecord`] from a `coins/markets` entry, attaching the platforms the
/// directory knows for its id.
pub fn normalize_market(
    raw: Value,
    directory: &PlatformDirectory,
) -> Result<CoinRecord, serde_json::Error> {
    let raw: RawCoinMarket = serde_json::from_value(raw)?;
    let platforms = directory.platforms_for(&raw.id);
    Ok(CoinRecord {
        image: raw.image.and_then(RawImage::into_large),
        platforms,
        id: raw.id,
        name: raw.name,
        symbol: raw.symbol,
        market_cap_rank: raw.market_cap_rank,
    })
}

/// Platform mappings of every listed coin, from `coins/list?include_platform=true`.
///
/// `coins/markets` does not carry platforms, so the coin job joins them in by id.
#[derive(Debug, Default, Clone)]
pub struct PlatformDirectory {
    platforms: HashMap<String, Platforms>,
}

impl PlatformDirectory {
    pub async fn fetch(ctx: &JobContext<'_>) -> Result<Self> {
        let endpoint = endpoint::coins_list();
        let mut paginator = Paginator::new(ctx.source, &endpoint, ctx.page_delay);
        let mut platforms = HashMap::new();

        while let Some(batch) = paginator.next_batch().await? {
            ctx.telemetry.record_page(batch.records.len());
            for (i, raw) in batch.records.into_iter().enumerate() {
                let listed: RawListedCoin =
                    serde_json::from_value(raw).map_err(|err| SyncError::InvalidRecord {
                        catalog: CATALOG,
                        position: batch.offset + i,
                        reason: err.to_string(),
                    })?;
                platforms.insert(listed.id, listed.platforms);
            }
        }

        tracing::info!(coins = platforms.len(), "platform directory loaded");
        Ok(Self { platforms })
    }

    /// Platforms listed for `id`; empty when the directory does not know the coin.
    pub fn platforms_for(&self, id: &str) -> Platforms {
        self.platforms.get(id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl FromIterator<(String, Platforms)> for PlatformDirectory {
    fn from_iter<I: IntoIterator<Item = (String, Platforms)>>(iter: I) -> Self {
        Self {
            platforms: iter.into_iter().collect(),
        }
    }
}

/// Writes the symbol and contract-address lookups.
struct CoinIndexStep;

impl PostProcess<CoinRecord> for CoinIndexStep {
    fn name(&self) -> &'static str {
        "coin index"
    }

    fn apply<'a>(
        &'a self,
        records: &'a [CoinRecord],
        writer: &'a CatalogWriter<'a>,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let index = CoinIndex::build(records);
            writer.write_index(&index).await
        })
    }
}

pub fn job(directory: PlatformDirectory) -> CatalogJob<CoinRecord> {
    CatalogJob {
        catalog: CATALOG,
        endpoint: endpoint::coins_markets(),
        normalize: Box::new(move |raw: Value, _: usize| normalize_market(raw, &directory)),
        primary_key: CoinRecord::primary_key,
        rank: Some(CoinRecord::rank),
        post_process: Some(Box::new(CoinIndexStep)),
    }
}
