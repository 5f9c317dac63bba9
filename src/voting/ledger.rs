use log::info;

use crate::db::Store;
use crate::error::EngineError;
use crate::models::Vote;

pub async fn vote_already_registered<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    combination_id: &str,
) -> Result<bool, EngineError> {
    store.vote_exists(user_id, combination_id).await
}

/// Records `user_id`'s pick of `winner_id` for one combination of `list_id`.
///
/// The existence check only gives an early, friendly answer; the storage
/// unique key on `(user, combination)` is what actually rejects a racing
/// duplicate, and it surfaces as the same `Conflict`.
pub async fn create_vote<S: Store + ?Sized>(
    store: &S,
    list_id: &str,
    user_id: &str,
    combination_id: &str,
    winner_id: &str,
) -> Result<Vote, EngineError> {
    let list = match store.get_list_by_id(list_id).await? {
        Some(list) if list.active => list,
        _ => {
            return Err(EngineError::not_found(
                "ListNotFound",
                format!("list {} does not exist or is inactive", list_id),
            ));
        }
    };

    let combination = list.find_combination(combination_id).ok_or_else(|| {
        EngineError::not_found(
            "CombinationNotFound",
            format!("combination {} is not part of list {}", combination_id, list_id),
        )
    })?;

    if !combination.contains(winner_id) {
        return Err(EngineError::validation(
            "WinnerNotInCombination",
            format!(
                "winner {} is neither {} nor {}",
                winner_id, combination.first_item_id, combination.second_item_id
            ),
        ));
    }

    let winner = store
        .get_items_by_ids(list.list_type, &[winner_id.to_string()])
        .await?
        .into_iter()
        .next();
    match winner {
        Some(item) if item.is_active() => {}
        _ => {
            return Err(EngineError::not_found(
                "WinnerNotFound",
                format!("winner {} is not an active {}", winner_id, list.list_type),
            ));
        }
    }

    if vote_already_registered(store, user_id, combination_id).await? {
        return Err(EngineError::conflict(
            "VoteAlreadyRegistered",
            format!("user {} already voted on combination {}", user_id, combination_id),
        ));
    }

    let vote = Vote::new(user_id, combination_id, winner_id);
    store.create_vote(&vote, list.list_type).await?;
    info!(
        "User {} voted {} on combination {} of list {}",
        user_id, winner_id, combination_id, list_id
    );

    Ok(vote)
}
