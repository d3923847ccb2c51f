//! Descriptors for the provider list endpoints the catalogs are mirrored from.

/// Query parameter carrying the API credential on authenticated endpoints.
pub const API_KEY_PARAM: &str = "x_cg_demo_api_key";

/// `coins/markets` caps `per_page` at 250.
pub const COINS_MARKETS_PAGE_SIZE: usize = 250;
pub const EXCHANGES_PAGE_SIZE: usize = 250;
pub const ASSET_PLATFORMS_PAGE_SIZE: usize = 1_000;

/// A list endpoint plus the fixed query it is always called with.
///
/// Endpoints with a page size are walked page by page; endpoints without one are
/// requested exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: &'static str,
    page_size: Option<usize>,
    query: Vec<(&'static str, String)>,
    authenticated: bool,
}

impl Endpoint {
    pub fn paged(path: &'static str, page_size: usize) -> Self {
        Self {
            path,
            page_size: Some(page_size),
            query: Vec::new(),
            authenticated: false,
        }
    }

    pub fn single(path: &'static str) -> Self {
        Self {
            path,
            page_size: None,
            query: Vec::new(),
            authenticated: false,
        }
    }

    pub fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    /// Marks the endpoint as requiring the API credential.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Query parameters for `page` (1-based), excluding the credential.
    pub fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut query = self.query.clone();
        if let Some(page_size) = self.page_size {
            query.push(("per_page", page_size.to_string()));
            query.push(("page", page.to_string()));
        }
        query
    }
}

/// <https://docs.coingecko.com/reference/coins-markets>
pub fn coins_markets() -> Endpoint {
    Endpoint::paged("coins/markets", COINS_MARKETS_PAGE_SIZE)
        .with_query("order", "market_cap_desc")
        .with_query("vs_currency", "usd")
        .authenticated()
}

/// <https://docs.coingecko.com/reference/coins-list>
pub fn coins_list() -> Endpoint {
    Endpoint::single("coins/list").with_query("include_platform", "true")
}

/// <https://docs.coingecko.com/reference/exchanges>
pub fn exchanges() -> Endpoint {
    Endpoint::paged("exchanges", EXCHANGES_PAGE_SIZE)
}

/// <https://docs.coingecko.com/reference/asset-platforms-list>
pub fn asset_platforms() -> Endpoint {
    Endpoint::paged("asset_platforms", ASSET_PLATFORMS_PAGE_SIZE)
}
