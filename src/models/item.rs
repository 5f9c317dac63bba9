use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListType, new_id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub name: String,
    pub year: i64,
    pub poster: String,
    pub external_id: String,
    pub votes_count: i64,
}

impl Movie {
    pub fn new(name: String, year: i64, poster: String, external_id: String) -> Self {
        Self {
            id: new_id(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
            deactivated_at: None,
            name,
            year,
            poster,
            external_id,
            votes_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub name: String,
    pub logo: String,
    pub votes_count: i64,
}

impl Brand {
    pub fn new(name: String, logo: String) -> Self {
        Self {
            id: new_id(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
            deactivated_at: None,
            name,
            logo,
            votes_count: 0,
        }
    }
}

/// Anything that can sit in a list and win a matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Movie(Movie),
    Brand(Brand),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Movie(movie) => &movie.id,
            Item::Brand(brand) => &brand.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Movie(movie) => &movie.name,
            Item::Brand(brand) => &brand.name,
        }
    }

    pub fn kind(&self) -> ListType {
        match self {
            Item::Movie(_) => ListType::Movie,
            Item::Brand(_) => ListType::Brand,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Item::Movie(movie) => movie.active,
            Item::Brand(brand) => brand.active,
        }
    }

    pub fn votes_count(&self) -> i64 {
        match self {
            Item::Movie(movie) => movie.votes_count,
            Item::Brand(brand) => brand.votes_count,
        }
    }

    // Only the tally writes this; counts come from counting votes and are never negative.
    pub(crate) fn set_votes_count(&mut self, count: u64) {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        match self {
            Item::Movie(movie) => movie.votes_count = count,
            Item::Brand(brand) => brand.votes_count = count,
        }
    }
}

impl From<Movie> for Item {
    fn from(movie: Movie) -> Self {
        Item::Movie(movie)
    }
}

impl From<Brand> for Item {
    fn from(brand: Brand) -> Self {
        Item::Brand(brand)
    }
}
