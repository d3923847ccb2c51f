//! Catalog record shapes, their normalizers, and the job definition for each
//! mirrored catalog.

pub mod asset_platform;
pub mod coin;
pub mod exchange;
pub mod snapshot;

use serde::Deserialize;
use std::fmt;

/// The catalogs that can be synchronized, in their default run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CatalogKind {
    Coins,
    Exchanges,
    AssetPlatforms,
    CoinData,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Coins,
        CatalogKind::Exchanges,
        CatalogKind::AssetPlatforms,
        CatalogKind::CoinData,
    ];

    /// Directory name of the catalog root under the data folder.
    pub fn dir_name(self) -> &'static str {
        match self {
            CatalogKind::Coins => coin::CATALOG,
            CatalogKind::Exchanges => exchange::CATALOG,
            CatalogKind::AssetPlatforms => asset_platform::CATALOG,
            CatalogKind::CoinData => snapshot::CATALOG,
        }
    }

    /// Whether the catalog reads an endpoint that needs the API credential.
    pub fn requires_credential(self) -> bool {
        matches!(self, CatalogKind::Coins | CatalogKind::CoinData)
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Image field as the provider sends it: either a bare URL or a set of resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawImage {
    Url(String),
    // Only `large` is kept; `thumb` and `small` are ignored.
    Sizes {
        #[serde(default)]
        large: Option<String>,
    },
}

impl RawImage {
    /// Reduces the image to its largest resolution URL.
    pub(crate) fn into_large(self) -> Option<String> {
        match self {
            RawImage::Url(url) => Some(url),
            RawImage::Sizes { large } => large,
        }
    }
}
