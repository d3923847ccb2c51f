//! Secondary lookups derived from the coin catalog: symbol → id and
//! (platform, contract address) → id.

use crate::catalog::coin::CoinRecord;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Namespace holding one file per indexed symbol.
pub const SYMBOL_NAMESPACE: &str = "s";
/// Namespace holding one directory per platform, one file per contract address.
pub const ADDRESS_NAMESPACE: &str = "a";
/// Platform favoured when several coins share a symbol.
pub const PREFERRED_PLATFORM: &str = "ethereum";

const MAX_SYMBOL_LEN: usize = 10;

/// Whether `key` can be used verbatim as a single path component.
pub fn is_eligible_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\'])
}

/// Symbols are indexed only when they are 1 to 10 ASCII letters or digits.
pub fn is_indexable_symbol(symbol: &str) -> bool {
    is_eligible_key(symbol)
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Picks the coin a shared symbol should point at.
///
/// Priority: the only coin without any platform, else the only coin deployed on
/// [`PREFERRED_PLATFORM`], else the shortest id (leftmost wins ties).
pub fn resolve_symbol<'a>(candidates: &[&'a CoinRecord]) -> Option<&'a str> {
    if let Some(coin) = exactly_one(
        candidates
            .iter()
            .copied()
            .filter(|coin| !coin.has_platforms()),
    ) {
        return Some(coin.id.as_str());
    }

    if let Some(coin) = exactly_one(
        candidates
            .iter()
            .copied()
            .filter(|coin| coin.is_deployed_on(PREFERRED_PLATFORM)),
    ) {
        return Some(coin.id.as_str());
    }

    candidates
        .iter()
        .copied()
        .fold(None::<&'a CoinRecord>, |best, coin| match best {
            Some(best) if best.id.chars().count() <= coin.id.chars().count() => Some(best),
            _ => Some(coin),
        })
        .map(|coin| coin.id.as_str())
}

fn exactly_one<I: Iterator>(mut iter: I) -> Option<I::Item> {
    match (iter.next(), iter.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Both coin lookups, ready to be persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoinIndex {
    symbols: BTreeMap<String, String>,
    platforms: BTreeMap<String, BTreeMap<String, String>>,
}

impl CoinIndex {
    /// Builds the index from a deduplicated, ordered coin catalog.
    ///
    /// Contract addresses are not arbitrated: when two coins list the same
    /// (platform, address) pair the later coin in catalog order wins.
    pub fn build(coins: &[CoinRecord]) -> Self {
        let mut by_symbol: IndexMap<&str, Vec<&CoinRecord>> = IndexMap::new();
        for coin in coins {
            by_symbol.entry(coin.symbol.as_str()).or_default().push(coin);
        }

        let symbols = by_symbol
            .into_iter()
            .filter(|(symbol, _)| is_indexable_symbol(symbol))
            .filter_map(|(symbol, candidates)| {
                resolve_symbol(&candidates).map(|id| (symbol.to_owned(), id.to_owned()))
            })
            .collect();

        let mut platforms: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for coin in coins {
            for (platform, address) in &coin.platforms {
                if !is_eligible_key(platform) {
                    continue;
                }
                let addresses = platforms.entry(platform.clone()).or_default();
                match address.as_deref() {
                    Some(address) if is_eligible_key(address) => {
                        addresses.insert(address.to_owned(), coin.id.clone());
                    }
                    _ => {}
                }
            }
        }

        Self { symbols, platforms }
    }

    pub fn symbol(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(String::as_str)
    }

    pub fn contract(&self, platform: &str, address: &str) -> Option<&str> {
        self.platforms
            .get(platform)
            .and_then(|addresses| addresses.get(address))
            .map(String::as_str)
    }

    pub fn symbols(&self) -> &BTreeMap<String, String> {
        &self.symbols
    }

    /// Every platform namespace, including platforms that ended up with no address.
    pub fn platforms(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.platforms
    }

    pub fn contract_count(&self) -> usize {
        self.platforms.values().map(BTreeMap::len).sum()
    }
}
