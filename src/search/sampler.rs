//! Deduplicating round-robin sampling across keyword result lists

use crate::archive::SearchHit;
use std::collections::HashSet;
use std::hash::Hash;

/// Interleave `lists` one element per list per pass, keeping the first
/// occurrence of each key, until `limit` elements are taken or every list
/// is exhausted.
pub fn round_robin_unique<T, K, F>(lists: Vec<Vec<T>>, limit: usize, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut selected = Vec::new();
    if limit == 0 {
        return selected;
    }

    let mut seen = HashSet::new();
    let mut lists: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();

    loop {
        let mut advanced = false;
        for list in lists.iter_mut() {
            let Some(item) = list.next() else {
                continue;
            };
            advanced = true;
            if seen.insert(key(&item)) {
                selected.push(item);
                if selected.len() == limit {
                    return selected;
                }
            }
        }
        if !advanced {
            return selected;
        }
    }
}

/// Balanced, de-duplicated sample of per-keyword search hits
pub fn round_robin_sample(candidates: Vec<Vec<SearchHit>>, limit: usize) -> Vec<SearchHit> {
    round_robin_unique(candidates, limit, |hit| hit.identifier.clone())
}
