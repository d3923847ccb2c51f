use crate::pipeline::CatalogJob;
use crate::provider::endpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CATALOG: &str = "asset-platforms";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPlatformRecord {
    /// Zero-based position in the provider's listing, kept across the id sort.
    pub index: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_identifier: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_coin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PlatformImage>,
}

#[derive(Deserialize)]
struct RawAssetPlatform {
    id: String,
    #[serde(default)]
    chain_identifier: Option<i64>,
    name: String,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    native_coin_id: Option<String>,
    #[serde(default)]
    image: Option<PlatformImage>,
}

impl AssetPlatformRecord {
    pub fn primary_key(&self) -> &str {
        &self.id
    }
}

pub fn normalize(raw: Value, position: usize) -> Result<AssetPlatformRecord, serde_json::Error> {
    let raw: RawAssetPlatform = serde_json::from_value(raw)?;
    Ok(AssetPlatformRecord {
        index: position,
        id: raw.id,
        chain_identifier: raw.chain_identifier,
        name: raw.name,
        shortname: raw.shortname,
        native_coin_id: raw.native_coin_id,
        image: raw.image,
    })
}

pub fn job() -> CatalogJob<AssetPlatformRecord> {
    CatalogJob {
        catalog: CATALOG,
        endpoint: endpoint::asset_platforms(),
        normalize: Box::new(normalize),
        primary_key: AssetPlatformRecord::primary_key,
        rank: None,
        post_process: None,
    }
}
