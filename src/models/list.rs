use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::{Brand, Combination, Item, ListType, Movie, new_id};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("invalid list type: {0}")]
    InvalidListType(String),

    #[error("item {0} is already in the list")]
    ItemAlreadyInList(String),

    #[error("malformed combination: {0}")]
    MalformedCombination(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub name: String,
    pub cover: String,
    pub list_type: ListType,
    pub items: Vec<Item>,
    pub combinations: Vec<Combination>,
}

/// A ranking narrowed to the list's concrete item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ranking {
    Movies(Vec<Movie>),
    Brands(Vec<Brand>),
}

impl Ranking {
    pub fn from_items(list_type: ListType, items: Vec<Item>) -> Result<Self, ListError> {
        match list_type {
            ListType::Movie => items
                .into_iter()
                .map(|item| match item {
                    Item::Movie(movie) => Ok(movie),
                    other => Err(mismatch(list_type, &other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Ranking::Movies),
            ListType::Brand => items
                .into_iter()
                .map(|item| match item {
                    Item::Brand(brand) => Ok(brand),
                    other => Err(mismatch(list_type, &other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Ranking::Brands),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Ranking::Movies(movies) => movies.len(),
            Ranking::Brands(brands) => brands.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(id, votes_count)` in ranking order.
    pub fn entries(&self) -> Vec<(&str, i64)> {
        match self {
            Ranking::Movies(movies) => movies
                .iter()
                .map(|m| (m.id.as_str(), m.votes_count))
                .collect(),
            Ranking::Brands(brands) => brands
                .iter()
                .map(|b| (b.id.as_str(), b.votes_count))
                .collect(),
        }
    }
}

// Same fields as `Combination`'s equality
fn combination_key(c: &Combination) -> (String, String, String) {
    (c.list_id.clone(), c.first_item_id.clone(), c.second_item_id.clone())
}

fn mismatch(list_type: ListType, item: &Item) -> ListError {
    ListError::InvalidListType(format!(
        "item {} is a {} but the list holds {} items",
        item.id(),
        item.kind(),
        list_type
    ))
}

impl List {
    pub fn new(name: String, cover: String, list_type: ListType) -> Self {
        Self {
            id: new_id(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
            deactivated_at: None,
            name,
            cover,
            list_type,
            items: Vec::new(),
            combinations: Vec::new(),
        }
    }

    /// Appends `new_items` after checking every one of them; on error the
    /// list is left untouched.
    pub fn add_items(&mut self, new_items: Vec<Item>) -> Result<(), ListError> {
        let mut seen: HashSet<&str> = self.items.iter().map(|item| item.id()).collect();
        for item in &new_items {
            if item.kind() != self.list_type {
                return Err(mismatch(self.list_type, item));
            }
            if !seen.insert(item.id()) {
                return Err(ListError::ItemAlreadyInList(item.id().to_string()));
            }
        }

        self.items.extend(new_items);
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn item_ids(&self) -> Result<Vec<String>, ListError> {
        self.items
            .iter()
            .map(|item| {
                if item.kind() == self.list_type {
                    Ok(item.id().to_string())
                } else {
                    Err(mismatch(self.list_type, item))
                }
            })
            .collect()
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.id() == item_id)
    }

    /// Union of the current set with `combinations`. Returns how many were
    /// actually new.
    pub fn add_combinations(&mut self, combinations: Vec<Combination>) -> usize {
        let mut present: HashSet<(String, String, String)> =
            self.combinations.iter().map(combination_key).collect();
        let mut added = 0;
        for combination in combinations {
            if present.insert(combination_key(&combination)) {
                self.combinations.push(combination);
                added += 1;
            }
        }
        added
    }

    pub fn find_combination(&self, combination_id: &str) -> Option<&Combination> {
        self.combinations.iter().find(|c| c.id == combination_id)
    }

    pub fn format_ranking(&self, ranked_items: Vec<Item>) -> Result<Ranking, ListError> {
        Ranking::from_items(self.list_type, ranked_items)
    }
}
