//! Caller-facing operations. Each one takes the request context, runs to
//! completion and answers with either a payload or a localized problem.

mod items;
mod lists;
mod vote;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::Store;
use crate::error::{EngineError, ErrorKind, ProblemDetails};
use crate::messages::{self, Locale};
use crate::models::{Item, ListType};

pub use items::{CreateBrandInput, CreateMovieInput, RankingItemsOutput, create_brand, create_movie, show_ranking_items};
pub use lists::{
    AddItemsInput, AddItemsOutput, CreateListInput, ListDetailOutput, ListForUserOutput, ListsOutput, add_items_to_list,
    create_list, get_list, get_list_for_user, get_lists,
};
pub use vote::{CastVoteInput, cast_vote};

/// Who is calling. Authentication happens before this crate is reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub actor: Actor,
    pub locale: Locale,
}

impl RequestContext {
    pub fn new(actor: Actor, locale: Locale) -> Self {
        Self { actor, locale }
    }

    pub fn user(user_id: &str) -> Self {
        Self::new(
            Actor {
                user_id: user_id.to_string(),
                is_admin: false,
            },
            Locale::default(),
        )
    }

    pub fn admin(user_id: &str) -> Self {
        Self::new(
            Actor {
                user_id: user_id.to_string(),
                is_admin: true,
            },
            Locale::default(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOutput {
    pub id: String,
    pub success_message: String,
}

pub(crate) fn fail(ctx: &RequestContext, use_case: &str, err: EngineError) -> ProblemDetails {
    let kind = err.kind();
    if kind == ErrorKind::Internal {
        error!("{} failed for user '{}': {}", use_case, ctx.actor.user_id, err);
    } else {
        warn!("{} rejected for user '{}': {}", use_case, ctx.actor.user_id, err);
    }
    let mut problem = ProblemDetails::new(kind, messages::lookup(&ctx.locale, use_case, err.key()));
    if let Some(detail) = err.caller_detail() {
        problem.detail = format!("{} ({})", problem.detail, detail);
    }
    problem
}

pub(crate) fn require_admin(ctx: &RequestContext) -> Result<(), EngineError> {
    if ctx.actor.is_admin {
        Ok(())
    } else {
        Err(EngineError::forbidden(
            "AdminRequired",
            format!("user '{}' is not an administrator", ctx.actor.user_id),
        ))
    }
}

pub(crate) fn require_user(ctx: &RequestContext) -> Result<&str, EngineError> {
    let user_id = ctx.actor.user_id.trim();
    if user_id.is_empty() {
        Err(EngineError::validation("MissingUserID", "no user id on the request"))
    } else {
        Ok(user_id)
    }
}

/// Looks every id up, first as `kind` and then as the other kind, so that a
/// wrong-typed item reaches the list aggregate (and its type check) instead
/// of looking missing. Repeated ids are kept.
pub(crate) async fn resolve_items<S: Store + ?Sized>(
    store: &S,
    kind: ListType,
    ids: &[String],
) -> Result<Vec<Item>, EngineError> {
    let mut found: HashMap<String, Item> = store
        .get_items_by_ids(kind, ids)
        .await?
        .into_iter()
        .map(|item| (item.id().to_string(), item))
        .collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains_key(id.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        for item in store.get_items_by_ids(kind.other(), &missing).await? {
            found.insert(item.id().to_string(), item);
        }
    }

    ids.iter()
        .map(|id| match found.get(id) {
            Some(item) if item.is_active() => Ok(item.clone()),
            _ => Err(EngineError::not_found(
                "ItemsNotFound",
                format!("item {} does not exist or is inactive", id),
            )),
        })
        .collect()
}
