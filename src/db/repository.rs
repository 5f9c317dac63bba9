//! Storage contracts used by the voting engine.
//!
//! Implementations own every storage detail; no `sqlx` types cross these
//! signatures except through `EngineError::Storage`.

use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::{Combination, Item, List, ListType, Vote};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create_item(&self, item: &Item) -> Result<(), EngineError>;

    /// Items of `kind` whose id is in `ids`, in the order of `ids`. Unknown
    /// ids are skipped and repeated ids are returned once; callers compare
    /// lengths to detect missing items. Inactive items are included. Any
    /// number of ids is accepted.
    async fn get_items_by_ids(&self, kind: ListType, ids: &[String]) -> Result<Vec<Item>, EngineError>;

    /// Natural-key existence check: external catalog id for movies, name
    /// for brands.
    async fn item_exists(&self, kind: ListType, external_key: &str) -> Result<bool, EngineError>;

    async fn list_items_active(&self, kind: ListType) -> Result<Vec<Item>, EngineError>;
}

#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Full list with its items (resolved by list type, in stored order) and
    /// its combinations. `Ok(None)` when no such list exists.
    async fn get_list_by_id(&self, list_id: &str) -> Result<Option<List>, EngineError>;

    /// Persists the list, its items and its combinations atomically.
    async fn create_list(&self, list: &List) -> Result<(), EngineError>;

    /// Appends `new_items` (already pushed onto `list.items`) and
    /// `new_combinations` in one transaction.
    async fn add_items_and_combinations(
        &self,
        list: &List,
        new_items: &[Item],
        new_combinations: &[Combination],
    ) -> Result<(), EngineError>;

    async fn list_exists_by_name(&self, name: &str) -> Result<bool, EngineError>;

    async fn list_exists_by_id(&self, list_id: &str) -> Result<bool, EngineError>;

    /// Active lists without items or combinations.
    async fn get_lists(&self) -> Result<Vec<List>, EngineError>;

    async fn combinations_for_list(&self, list_id: &str) -> Result<Vec<Combination>, EngineError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Stores the vote and bumps the winner's cached `votes_count` in one
    /// transaction. A second vote for the same `(user, combination)` fails
    /// with `EngineError::Conflict`.
    async fn create_vote(&self, vote: &Vote, winner_kind: ListType) -> Result<(), EngineError>;

    async fn vote_exists(&self, user_id: &str, combination_id: &str) -> Result<bool, EngineError>;

    /// Active votes on any combination of `list_id`, oldest first.
    async fn votes_for_list(&self, list_id: &str) -> Result<Vec<Vote>, EngineError>;

    async fn count_votes_for_list(&self, list_id: &str) -> Result<i64, EngineError>;

    async fn votes_by_user_and_list(&self, user_id: &str, list_id: &str) -> Result<Vec<Vote>, EngineError>;
}

/// Everything the engine needs from storage.
pub trait Store: ItemRepository + ListRepository + VoteRepository {}

impl<T: ItemRepository + ListRepository + VoteRepository> Store for T {}
