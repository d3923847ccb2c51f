use crate::pipeline::CatalogJob;
use crate::provider::endpoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CATALOG: &str = "exchanges";

/// An exchange as listed by `/exchanges`. Fields the provider sends beyond these are
/// dropped; `null` and absent optional fields are both omitted on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_established: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score_rank: Option<u64>,
}

impl ExchangeRecord {
    pub fn primary_key(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> Option<u64> {
        self.trust_score_rank
    }
}

pub fn normalize(raw: Value) -> Result<ExchangeRecord, serde_json::Error> {
    serde_json::from_value(raw)
}

pub fn job() -> CatalogJob<ExchangeRecord> {
    CatalogJob {
        catalog: CATALOG,
        endpoint: endpoint::exchanges(),
        normalize: Box::new(|raw: Value, _: usize| normalize(raw)),
        primary_key: ExchangeRecord::primary_key,
        rank: Some(ExchangeRecord::rank),
        post_process: None,
    }
}
