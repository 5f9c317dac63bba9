use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{CreatedOutput, RequestContext, fail, require_admin, require_user, resolve_items};
use crate::db::Store;
use crate::error::{EngineError, ProblemDetails};
use crate::models::{Combination, List, ListType, Ranking, Vote};
use crate::voting::{deduplicate_and_merge, generate_all_pairs, tally};

const CREATE_LIST: &str = "CreateListUseCase";
const ADD_ITEMS: &str = "AddItemsListUseCase";
const GET_LIST: &str = "GetListUseCase";
const GET_LIST_FOR_USER: &str = "GetListForUserUseCase";
const GET_LISTS: &str = "GetListsUseCase";

const MIN_ITEMS: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListInput {
    pub name: String,
    #[serde(default)]
    pub cover: String,
    pub list_type: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemsInput {
    pub list_id: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddItemsOutput {
    pub success_message: String,
    pub added_items: usize,
    pub new_combinations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListDetailOutput {
    pub list: List,
    pub ranking: Ranking,
    pub number_of_votes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListForUserOutput {
    pub list: List,
    pub ranking: Ranking,
    pub number_of_votes: i64,
    pub votes: Vec<Vote>,
    pub voted_combinations: Vec<Combination>,
    pub unvoted_combinations: Vec<Combination>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListsOutput {
    pub lists: Vec<List>,
}

/// Extends `list.combinations` to cover every pair of its current items and
/// returns the combinations that were not there before.
fn extend_combinations(list: &mut List) -> Result<Vec<Combination>, EngineError> {
    let item_ids = list.item_ids()?;
    let merge = deduplicate_and_merge(&list.combinations, generate_all_pairs(&item_ids), &list.id)?;
    list.add_combinations(merge.to_insert.clone());
    Ok(merge.to_insert)
}

async fn load_active_list<S: Store + ?Sized>(store: &S, list_id: &str) -> Result<List, EngineError> {
    match store.get_list_by_id(list_id).await? {
        Some(list) if list.active => Ok(list),
        _ => Err(EngineError::not_found(
            "ListNotFound",
            format!("list {} does not exist or is inactive", list_id),
        )),
    }
}

async fn ranking_for<S: Store + ?Sized>(store: &S, list: &List) -> Result<(Ranking, i64), EngineError> {
    let number_of_votes = tally::count_votes_for_list(store, &list.id).await?;
    let ranked = tally::rank_items_by_votes(store, &list.id, list.list_type).await?;
    let ranking = list.format_ranking(ranked)?;
    Ok((ranking, number_of_votes))
}

pub async fn create_list<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    input: CreateListInput,
) -> Result<CreatedOutput, ProblemDetails> {
    let run = async {
        require_admin(ctx)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("InvalidListData", "list name is empty"));
        }
        let list_type: ListType = input.list_type.parse()?;

        let distinct: HashSet<&str> = input.items.iter().map(String::as_str).collect();
        if distinct.len() < MIN_ITEMS {
            return Err(EngineError::validation(
                "NotEnoughItems",
                format!("got {} distinct items, need at least {}", distinct.len(), MIN_ITEMS),
            ));
        }

        if store.list_exists_by_name(name).await? {
            return Err(EngineError::conflict(
                "ListAlreadyExists",
                format!("a list named '{}' already exists", name),
            ));
        }

        let items = resolve_items(store, list_type, &input.items).await?;

        let mut list = List::new(name.to_string(), input.cover.trim().to_string(), list_type);
        list.add_items(items)?;
        let combinations = extend_combinations(&mut list)?;

        store.create_list(&list).await?;
        info!(
            "List '{}' ({}) created with {} items and {} combinations",
            list.name,
            list.id,
            list.items.len(),
            combinations.len()
        );
        Ok::<_, EngineError>(list)
    };

    let list = run.await.map_err(|e| fail(ctx, CREATE_LIST, e))?;

    Ok(CreatedOutput {
        id: list.id,
        success_message: format!("List '{}' created successfully!", list.name),
    })
}

/// Grows a list and pairs the new items with every existing one.
///
/// Pairs are recomputed over the full id sequence (old ids, then new ones)
/// and deduplicated against the stored set, so old x new and new x new
/// matchups are created while existing ones are left alone.
pub async fn add_items_to_list<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    input: AddItemsInput,
) -> Result<AddItemsOutput, ProblemDetails> {
    let run = async {
        require_admin(ctx)?;

        if input.items.is_empty() {
            return Err(EngineError::validation("NoItemsProvided", "no item ids given"));
        }

        let mut list = load_active_list(store, &input.list_id).await?;
        let new_items = resolve_items(store, list.list_type, &input.items).await?;

        list.add_items(new_items.clone())?;
        let new_combinations = extend_combinations(&mut list)?;

        store
            .add_items_and_combinations(&list, &new_items, &new_combinations)
            .await?;
        info!(
            "Added {} items and {} combinations to list {}",
            new_items.len(),
            new_combinations.len(),
            list.id
        );

        Ok::<_, EngineError>(AddItemsOutput {
            success_message: "Items added successfully.".to_string(),
            added_items: new_items.len(),
            new_combinations: new_combinations.len(),
        })
    };

    run.await.map_err(|e| fail(ctx, ADD_ITEMS, e))
}

pub async fn get_list<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    list_id: &str,
) -> Result<ListDetailOutput, ProblemDetails> {
    let run = async {
        let list = load_active_list(store, list_id).await?;
        let (ranking, number_of_votes) = ranking_for(store, &list).await?;
        Ok::<_, EngineError>(ListDetailOutput {
            list,
            ranking,
            number_of_votes,
        })
    };

    run.await.map_err(|e| fail(ctx, GET_LIST, e))
}

/// List detail plus what the calling user has and has not voted on yet.
pub async fn get_list_for_user<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    list_id: &str,
) -> Result<ListForUserOutput, ProblemDetails> {
    let run = async {
        let user_id = require_user(ctx)?;
        let list = load_active_list(store, list_id).await?;
        let (ranking, number_of_votes) = ranking_for(store, &list).await?;
        let votes = store.votes_by_user_and_list(user_id, &list.id).await?;

        let voted: HashSet<&str> = votes.iter().map(|v| v.combination_id.as_str()).collect();
        let (voted_combinations, unvoted_combinations): (Vec<_>, Vec<_>) = list
            .combinations
            .iter()
            .cloned()
            .partition(|c| voted.contains(c.id.as_str()));

        Ok::<_, EngineError>(ListForUserOutput {
            ranking,
            number_of_votes,
            voted_combinations,
            unvoted_combinations,
            votes,
            list,
        })
    };

    run.await.map_err(|e| fail(ctx, GET_LIST_FOR_USER, e))
}

pub async fn get_lists<S: Store + ?Sized>(store: &S, ctx: &RequestContext) -> Result<ListsOutput, ProblemDetails> {
    store
        .get_lists()
        .await
        .map(|lists| ListsOutput { lists })
        .map_err(|e| fail(ctx, GET_LISTS, e))
}
