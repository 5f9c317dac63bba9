mod item;
mod list;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub use item::{Brand, Item, Movie};
pub use list::{List, ListError, Ranking};

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// Which item variant a list may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListType {
    Movie,
    Brand,
}

impl ListType {
    pub const ALL: [ListType; 2] = [ListType::Movie, ListType::Brand];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Movie => "MOVIE",
            ListType::Brand => "BRAND",
        }
    }

    pub fn other(&self) -> ListType {
        match self {
            ListType::Movie => ListType::Brand,
            ListType::Brand => ListType::Movie,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MOVIE" => Ok(ListType::Movie),
            "BRAND" => Ok(ListType::Brand),
            other => Err(ListError::InvalidListType(format!(
                "unknown list type '{}', expected one of MOVIE, BRAND",
                other
            ))),
        }
    }
}

/// One matchup between two items of the same list.
///
/// Equality ignores `id` and compares the owning list plus the stored
/// (ordered) pair, so `(A, B)` and `(B, A)` are different combinations.
/// The generator always emits pairs in list order, which keeps this safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combination {
    pub id: String,
    pub list_id: String,
    pub first_item_id: String,
    pub second_item_id: String,
}

impl Combination {
    pub fn new(list_id: &str, first_item_id: &str, second_item_id: &str) -> Result<Self, ListError> {
        if first_item_id == second_item_id {
            return Err(ListError::MalformedCombination(format!(
                "item {} cannot be paired with itself",
                first_item_id
            )));
        }
        if first_item_id.is_empty() || second_item_id.is_empty() {
            return Err(ListError::MalformedCombination(
                "combination items must have non-empty ids".to_string(),
            ));
        }

        Ok(Self {
            id: new_id(),
            list_id: list_id.to_string(),
            first_item_id: first_item_id.to_string(),
            second_item_id: second_item_id.to_string(),
        })
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.first_item_id == item_id || self.second_item_id == item_id
    }
}

impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        self.list_id == other.list_id
            && self.first_item_id == other.first_item_id
            && self.second_item_id == other.second_item_id
    }
}

impl Eq for Combination {}

/// A user's pick for one combination. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub combination_id: String,
    pub winner_id: String,
}

impl Vote {
    pub fn new(user_id: &str, combination_id: &str, winner_id: &str) -> Self {
        Self {
            id: new_id(),
            active: true,
            created_at: Utc::now(),
            deactivated_at: None,
            user_id: user_id.to_string(),
            combination_id: combination_id.to_string(),
            winner_id: winner_id.to_string(),
        }
    }
}
