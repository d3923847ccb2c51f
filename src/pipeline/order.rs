use anyhow::{anyhow, Result};
use icu_collator::{Collator, CollatorOptions};
use std::collections::HashSet;

/// A catalog after the dedup/sort stage.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCatalog<T> {
    pub records: Vec<T>,
    pub duplicates_removed: usize,
}

/// Root-locale collator with default strength, the order ids are listed in.
fn root_collator() -> Result<Collator> {
    Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|err| anyhow!("failed to load root collation data: {err}"))
}

/// Imposes the catalog order and drops repeated primary keys.
///
/// Records are sorted by lowercased primary key under root-locale collation, where
/// punctuation sorts ahead of digits and letters. Then (when `rank` is given) they are
/// sorted stably by rank ascending with absent ranks last. Deduplication runs
/// on that final order, so the surviving copy of a repeated id is the one the ordering
/// favours, not the one the provider returned first. Key equality for deduplication is
/// case-sensitive.
pub fn dedup_and_sort<T, K, R>(
    records: Vec<T>,
    primary_key: K,
    rank: Option<R>,
) -> Result<OrderedCatalog<T>>
where
    K: Fn(&T) -> &str,
    R: Fn(&T) -> Option<u64>,
{
    let collator = root_collator()?;
    let mut keyed: Vec<(String, T)> = records
        .into_iter()
        .map(|record| (primary_key(&record).to_lowercase(), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| collator.compare(a, b));
    let mut records: Vec<T> = keyed.into_iter().map(|(_, record)| record).collect();

    if let Some(rank) = rank {
        records.sort_by_key(|record| {
            let rank = rank(record);
            (rank.is_none(), rank)
        });
    }

    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    records.retain(|record| seen.insert(primary_key(record).to_owned()));

    Ok(OrderedCatalog {
        duplicates_removed: before - records.len(),
        records,
    })
}
