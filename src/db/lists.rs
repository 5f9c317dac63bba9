use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{Database, ItemRepository, ListRepository, is_unique_violation, parse_optional_timestamp, parse_timestamp};
use crate::error::EngineError;
use crate::models::{Combination, Item, List, ListType};

fn list_from_row(row: &SqliteRow) -> Result<List, EngineError> {
    let list_type: String = row.try_get("list_type")?;
    let list_type = list_type
        .parse::<ListType>()
        .map_err(|e| EngineError::Integrity(e.to_string()))?;

    Ok(List {
        id: row.try_get("id")?,
        active: row.try_get("active")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_optional_timestamp(row.try_get("updated_at")?)?,
        deactivated_at: parse_optional_timestamp(row.try_get("deactivated_at")?)?,
        name: row.try_get("name")?,
        cover: row.try_get("cover")?,
        list_type,
        items: Vec::new(),
        combinations: Vec::new(),
    })
}

fn combination_from_row(row: &SqliteRow) -> Result<Combination, EngineError> {
    Ok(Combination {
        id: row.try_get("id")?,
        list_id: row.try_get("list_id")?,
        first_item_id: row.try_get("first_item_id")?,
        second_item_id: row.try_get("second_item_id")?,
    })
}

async fn insert_list_items(
    tx: &mut Transaction<'_, Sqlite>,
    list_id: &str,
    items: &[Item],
    first_position: usize,
) -> Result<(), EngineError> {
    let now = Utc::now().to_rfc3339();
    for (offset, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO list_items (list_id, item_id, position, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(list_id)
        .bind(item.id())
        .bind((first_position + offset) as i64)
        .bind(&now)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::conflict(
                    "ItemAlreadyInList",
                    format!("item {} is already in list {}", item.id(), list_id),
                )
            } else {
                e.into()
            }
        })?;
    }
    Ok(())
}

async fn insert_combinations(
    tx: &mut Transaction<'_, Sqlite>,
    combinations: &[Combination],
) -> Result<(), EngineError> {
    for combination in combinations {
        sqlx::query(
            r#"
            INSERT INTO combinations (id, list_id, first_item_id, second_item_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&combination.id)
        .bind(&combination.list_id)
        .bind(&combination.first_item_id)
        .bind(&combination.second_item_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::conflict(
                    "CombinationAlreadyExists",
                    format!(
                        "combination ({}, {}) already exists in list {}",
                        combination.first_item_id, combination.second_item_id, combination.list_id
                    ),
                )
            } else {
                e.into()
            }
        })?;
    }
    Ok(())
}

#[async_trait]
impl ListRepository for Database {
    async fn get_list_by_id(&self, list_id: &str) -> Result<Option<List>, EngineError> {
        let row = sqlx::query(
            r#"
            SELECT id, active, created_at, updated_at, deactivated_at, name, cover, list_type
            FROM lists
            WHERE id = ?
            "#,
        )
        .bind(list_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut list = list_from_row(&row)?;

        let item_ids: Vec<String> = sqlx::query(
            r#"
            SELECT item_id
            FROM list_items
            WHERE list_id = ?
            ORDER BY position
            "#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| row.try_get::<String, _>("item_id"))
        .collect::<Result<_, _>>()?;

        let items = self.get_items_by_ids(list.list_type, &item_ids).await?;
        if items.len() != item_ids.len() {
            return Err(EngineError::Integrity(format!(
                "list {} references {} items but only {} could be resolved as {}",
                list_id,
                item_ids.len(),
                items.len(),
                list.list_type
            )));
        }
        list.items = items;
        list.combinations = self.combinations_for_list(list_id).await?;

        Ok(Some(list))
    }

    async fn create_list(&self, list: &List) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO lists (id, active, created_at, updated_at, deactivated_at, name, cover, list_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&list.id)
        .bind(list.active)
        .bind(list.created_at.to_rfc3339())
        .bind(list.updated_at.map(|dt| dt.to_rfc3339()))
        .bind(list.deactivated_at.map(|dt| dt.to_rfc3339()))
        .bind(&list.name)
        .bind(&list.cover)
        .bind(list.list_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::conflict(
                    "ListAlreadyExists",
                    format!("a list named '{}' already exists", list.name),
                )
            } else {
                e.into()
            }
        })?;

        insert_list_items(&mut tx, &list.id, &list.items, 0).await?;
        insert_combinations(&mut tx, &list.combinations).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn add_items_and_combinations(
        &self,
        list: &List,
        new_items: &[Item],
        new_combinations: &[Combination],
    ) -> Result<(), EngineError> {
        let first_position = list.items.len().saturating_sub(new_items.len());
        let updated_at = list.updated_at.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;

        insert_list_items(&mut tx, &list.id, new_items, first_position).await?;
        insert_combinations(&mut tx, new_combinations).await?;

        sqlx::query("UPDATE lists SET updated_at = ? WHERE id = ?")
            .bind(updated_at.to_rfc3339())
            .bind(&list.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_exists_by_name(&self, name: &str) -> Result<bool, EngineError> {
        let exists = sqlx::query("SELECT 1 FROM lists WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn list_exists_by_id(&self, list_id: &str) -> Result<bool, EngineError> {
        let exists = sqlx::query("SELECT 1 FROM lists WHERE id = ?")
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn get_lists(&self) -> Result<Vec<List>, EngineError> {
        sqlx::query(
            r#"
            SELECT id, active, created_at, updated_at, deactivated_at, name, cover, list_type
            FROM lists
            WHERE active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(list_from_row)
        .collect()
    }

    async fn combinations_for_list(&self, list_id: &str) -> Result<Vec<Combination>, EngineError> {
        sqlx::query(
            r#"
            SELECT id, list_id, first_item_id, second_item_id
            FROM combinations
            WHERE list_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(combination_from_row)
        .collect()
    }
}
