use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::collections::{HashMap, HashSet};

use super::{
    Database, ItemRepository, MAX_BINDS_PER_QUERY, is_unique_violation, items_table, parse_optional_timestamp, parse_timestamp,
    placeholders,
};
use crate::error::EngineError;
use crate::models::{Brand, Item, ListType, Movie};

const MOVIE_COLUMNS: &str =
    "id, active, created_at, updated_at, deactivated_at, name, year, poster, external_id, votes_count";
const BRAND_COLUMNS: &str =
    "id, active, created_at, updated_at, deactivated_at, name, logo, votes_count";

fn columns(kind: ListType) -> &'static str {
    match kind {
        ListType::Movie => MOVIE_COLUMNS,
        ListType::Brand => BRAND_COLUMNS,
    }
}

pub(super) fn item_from_row(kind: ListType, row: &SqliteRow) -> Result<Item, EngineError> {
    let id: String = row.try_get("id")?;
    let active: bool = row.try_get("active")?;
    let created_at = parse_timestamp(&row.try_get::<String, _>("created_at")?)?;
    let updated_at = parse_optional_timestamp(row.try_get("updated_at")?)?;
    let deactivated_at = parse_optional_timestamp(row.try_get("deactivated_at")?)?;
    let name: String = row.try_get("name")?;
    let votes_count: i64 = row.try_get("votes_count")?;

    let item = match kind {
        ListType::Movie => Item::Movie(Movie {
            id,
            active,
            created_at,
            updated_at,
            deactivated_at,
            name,
            year: row.try_get("year")?,
            poster: row.try_get("poster")?,
            external_id: row.try_get("external_id")?,
            votes_count,
        }),
        ListType::Brand => Item::Brand(Brand {
            id,
            active,
            created_at,
            updated_at,
            deactivated_at,
            name,
            logo: row.try_get("logo")?,
            votes_count,
        }),
    };
    Ok(item)
}

#[async_trait]
impl ItemRepository for Database {
    async fn create_item(&self, item: &Item) -> Result<(), EngineError> {
        let result = match item {
            Item::Movie(movie) => {
                sqlx::query(
                    r#"
                    INSERT INTO movies (id, active, created_at, updated_at, deactivated_at, name, year, poster, external_id, votes_count)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&movie.id)
                .bind(movie.active)
                .bind(movie.created_at.to_rfc3339())
                .bind(movie.updated_at.map(|dt| dt.to_rfc3339()))
                .bind(movie.deactivated_at.map(|dt| dt.to_rfc3339()))
                .bind(&movie.name)
                .bind(movie.year)
                .bind(&movie.poster)
                .bind(&movie.external_id)
                .bind(movie.votes_count)
                .execute(&self.pool)
                .await
            }
            Item::Brand(brand) => {
                sqlx::query(
                    r#"
                    INSERT INTO brands (id, active, created_at, updated_at, deactivated_at, name, logo, votes_count)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&brand.id)
                .bind(brand.active)
                .bind(brand.created_at.to_rfc3339())
                .bind(brand.updated_at.map(|dt| dt.to_rfc3339()))
                .bind(brand.deactivated_at.map(|dt| dt.to_rfc3339()))
                .bind(&brand.name)
                .bind(&brand.logo)
                .bind(brand.votes_count)
                .execute(&self.pool)
                .await
            }
        };

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(match item.kind() {
                ListType::Movie => EngineError::conflict(
                    "MovieAlreadyExists",
                    format!("movie '{}' already exists", item.name()),
                ),
                ListType::Brand => EngineError::conflict(
                    "BrandAlreadyExists",
                    format!("brand '{}' already exists", item.name()),
                ),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_items_by_ids(&self, kind: ListType, ids: &[String]) -> Result<Vec<Item>, EngineError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut unique = HashSet::new();
        let distinct: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| unique.insert(*id))
            .collect();

        let mut by_id: HashMap<String, Item> = HashMap::with_capacity(distinct.len());
        for chunk in distinct.chunks(MAX_BINDS_PER_QUERY) {
            let sql = format!(
                "SELECT {} FROM {} WHERE id IN ({})",
                columns(kind),
                items_table(kind),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            for row in query.fetch_all(&self.pool).await? {
                let item = item_from_row(kind, &row)?;
                by_id.insert(item.id().to_string(), item);
            }
        }

        // Keep the caller's order
        let items = distinct
            .into_iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(items)
    }

    async fn item_exists(&self, kind: ListType, external_key: &str) -> Result<bool, EngineError> {
        let sql = match kind {
            ListType::Movie => "SELECT 1 FROM movies WHERE external_id = ?",
            ListType::Brand => "SELECT 1 FROM brands WHERE name = ?",
        };
        let exists = sqlx::query(sql)
            .bind(external_key)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn list_items_active(&self, kind: ListType) -> Result<Vec<Item>, EngineError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE active = TRUE ORDER BY created_at",
            columns(kind),
            items_table(kind)
        );
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| item_from_row(kind, row))
            .collect()
    }
}
