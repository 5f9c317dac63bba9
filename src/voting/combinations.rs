use std::collections::HashSet;

use crate::models::{Combination, ListError};

pub type Pair = (String, String);

/// Every `(ids[i], ids[j])` with `i < j`, in input order.
pub fn generate_all_pairs(item_ids: &[String]) -> Vec<Pair> {
    let n = item_ids.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, first) in item_ids.iter().enumerate() {
        for second in &item_ids[i + 1..] {
            pairs.push((first.clone(), second.clone()));
        }
    }
    pairs
}

#[derive(Debug, Clone, Default)]
pub struct Merge {
    /// Candidates not already present; these need to be persisted.
    pub to_insert: Vec<Combination>,
    /// `existing` followed by `to_insert`.
    pub merged: Vec<Combination>,
}

/// Turns candidate pairs into combinations of `list_id`, dropping every pair
/// that already exists (or repeats within `candidates`).
///
/// When items are added to a populated list, pass the pairs of the *full*
/// id sequence (old ids first, then the new ones): old x old pairs fall out
/// as duplicates while old x new and new x new pairs are kept.
pub fn deduplicate_and_merge(
    existing: &[Combination],
    candidates: Vec<Pair>,
    list_id: &str,
) -> Result<Merge, ListError> {
    let mut seen: HashSet<(String, String, String)> = existing
        .iter()
        .map(|c| {
            (
                c.list_id.clone(),
                c.first_item_id.clone(),
                c.second_item_id.clone(),
            )
        })
        .collect();

    let mut to_insert = Vec::new();
    for (first, second) in candidates {
        let candidate = Combination::new(list_id, &first, &second)?;
        if seen.insert((list_id.to_string(), first, second)) {
            to_insert.push(candidate);
        }
    }

    let mut merged = existing.to_vec();
    merged.extend(to_insert.iter().cloned());

    Ok(Merge { to_insert, merged })
}
