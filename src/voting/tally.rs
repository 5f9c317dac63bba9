use log::error;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::db::Store;
use crate::error::EngineError;
use crate::models::{Item, ListType, Vote};

/// Wins per item id across the given votes.
pub fn count_wins(votes: &[Vote]) -> BTreeMap<String, u64> {
    let mut wins: BTreeMap<String, u64> = BTreeMap::new();
    for vote in votes {
        *wins.entry(vote.winner_id.clone()).or_insert(0) += 1;
    }
    wins
}

/// Most votes first; equal counts fall back to ascending id.
pub fn by_votes_desc(a: &Item, b: &Item) -> Ordering {
    b.votes_count()
        .cmp(&a.votes_count())
        .then_with(|| a.id().cmp(b.id()))
}

pub fn sort_by_votes(items: &mut [Item]) {
    items.sort_by(by_votes_desc);
}

/// Attaches each item's win count and orders them. Every id in `wins` must
/// be present in `items`; items without wins are dropped.
pub fn rank(items: Vec<Item>, wins: &BTreeMap<String, u64>) -> Result<Vec<Item>, EngineError> {
    let mut ranked: Vec<Item> = items
        .into_iter()
        .filter_map(|mut item| {
            let count = *wins.get(item.id())?;
            item.set_votes_count(count);
            Some(item)
        })
        .collect();

    if ranked.len() != wins.len() {
        let missing: Vec<&str> = wins
            .keys()
            .filter(|id| !ranked.iter().any(|item| item.id() == id.as_str()))
            .map(String::as_str)
            .collect();
        return Err(EngineError::Integrity(format!(
            "winning items could not be resolved: {}",
            missing.join(", ")
        )));
    }

    sort_by_votes(&mut ranked);
    Ok(ranked)
}

pub async fn count_votes_for_list<S: Store + ?Sized>(store: &S, list_id: &str) -> Result<i64, EngineError> {
    store.count_votes_for_list(list_id).await
}

/// Ranking of the items of `list_id` that won at least one matchup.
pub async fn rank_items_by_votes<S: Store + ?Sized>(
    store: &S,
    list_id: &str,
    list_type: ListType,
) -> Result<Vec<Item>, EngineError> {
    let votes = store.votes_for_list(list_id).await?;
    let wins = count_wins(&votes);
    if wins.is_empty() {
        return Ok(Vec::new());
    }

    let winner_ids: Vec<String> = wins.keys().cloned().collect();
    let items = store.get_items_by_ids(list_type, &winner_ids).await?;

    rank(items, &wins).inspect_err(|e| {
        error!("Ranking for list {} failed: {}", list_id, e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Brand, Movie};

    fn movie(id: &str) -> Item {
        let mut movie = Movie::new(id.to_uppercase(), 2000, String::new(), format!("tt-{}", id));
        movie.id = id.to_string();
        movie.into()
    }

    fn vote(user: &str, combination: &str, winner: &str) -> Vote {
        Vote::new(user, combination, winner)
    }

    #[test]
    fn counts_wins_per_winner() {
        let votes = vec![vote("u1", "c1", "m1"), vote("u2", "c2", "m1"), vote("u3", "c3", "m2")];
        let wins = count_wins(&votes);

        assert_eq!(wins.get("m1"), Some(&2));
        assert_eq!(wins.get("m2"), Some(&1));
        assert_eq!(wins.get("m3"), None);
    }

    #[test]
    fn ranks_descending_and_excludes_items_without_wins() {
        let votes = vec![vote("u1", "c1", "m1"), vote("u2", "c2", "m1"), vote("u3", "c3", "m2")];
        let wins = count_wins(&votes);

        let ranked = rank(vec![movie("m3"), movie("m2"), movie("m1")], &wins).unwrap();
        let summary: Vec<(&str, i64)> = ranked.iter().map(|i| (i.id(), i.votes_count())).collect();

        assert_eq!(summary, vec![("m1", 2), ("m2", 1)]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let votes = vec![vote("u1", "c1", "m9"), vote("u1", "c2", "m2"), vote("u1", "c3", "m5")];
        let ranked = rank(vec![movie("m5"), movie("m9"), movie("m2")], &count_wins(&votes)).unwrap();
        let ids: Vec<&str> = ranked.iter().map(Item::id).collect();

        assert_eq!(ids, vec!["m2", "m5", "m9"]);
    }

    #[test]
    fn unresolved_winner_is_an_integrity_error() {
        let wins = count_wins(&[vote("u1", "c1", "ghost")]);
        let err = rank(vec![movie("m1")], &wins).unwrap_err();

        assert!(matches!(err, EngineError::Integrity(ref msg) if msg.contains("ghost")));
    }

    #[test]
    fn sorts_flat_rankings_by_cached_count() {
        let mut a = Brand::new("A".into(), String::new());
        a.id = "b-a".into();
        a.votes_count = 1;
        let mut b = Brand::new("B".into(), String::new());
        b.id = "b-b".into();
        b.votes_count = 4;
        let mut c = Brand::new("C".into(), String::new());
        c.id = "b-c".into();
        c.votes_count = 1;

        let mut items: Vec<Item> = vec![c.into(), a.into(), b.into()];
        sort_by_votes(&mut items);
        let ids: Vec<&str> = items.iter().map(Item::id).collect();

        assert_eq!(ids, vec!["b-b", "b-a", "b-c"]);
    }
}
