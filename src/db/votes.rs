use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::{Database, VoteRepository, is_unique_violation, items_table, parse_optional_timestamp, parse_timestamp};
use crate::error::EngineError;
use crate::models::{ListType, Vote};

fn vote_from_row(row: &SqliteRow) -> Result<Vote, EngineError> {
    Ok(Vote {
        id: row.try_get("id")?,
        active: row.try_get("active")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        deactivated_at: parse_optional_timestamp(row.try_get("deactivated_at")?)?,
        user_id: row.try_get("user_id")?,
        combination_id: row.try_get("combination_id")?,
        winner_id: row.try_get("winner_id")?,
    })
}

#[async_trait]
impl VoteRepository for Database {
    async fn create_vote(&self, vote: &Vote, winner_kind: ListType) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO votes (id, active, created_at, deactivated_at, user_id, combination_id, winner_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vote.id)
        .bind(vote.active)
        .bind(vote.created_at.to_rfc3339())
        .bind(vote.deactivated_at.map(|dt| dt.to_rfc3339()))
        .bind(&vote.user_id)
        .bind(&vote.combination_id)
        .bind(&vote.winner_id)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            // Dropping `tx` rolls back
            if is_unique_violation(&e) {
                warn!(
                    "Rejected duplicate vote by user {} on combination {}",
                    vote.user_id, vote.combination_id
                );
                return Err(EngineError::conflict(
                    "VoteAlreadyRegistered",
                    format!(
                        "user {} already voted on combination {}",
                        vote.user_id, vote.combination_id
                    ),
                ));
            }
            return Err(e.into());
        }

        let sql = format!(
            "UPDATE {} SET votes_count = votes_count + 1, updated_at = ? WHERE id = ?",
            items_table(winner_kind)
        );
        let updated = sqlx::query(&sql)
            .bind(Utc::now().to_rfc3339())
            .bind(&vote.winner_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(EngineError::not_found(
                "WinnerNotFound",
                format!("winner {} is not a stored {}", vote.winner_id, winner_kind),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn vote_exists(&self, user_id: &str, combination_id: &str) -> Result<bool, EngineError> {
        let exists = sqlx::query("SELECT 1 FROM votes WHERE user_id = ? AND combination_id = ?")
            .bind(user_id)
            .bind(combination_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        Ok(exists)
    }

    async fn votes_for_list(&self, list_id: &str) -> Result<Vec<Vote>, EngineError> {
        sqlx::query(
            r#"
            SELECT votes.id, votes.active, votes.created_at, votes.deactivated_at,
                   votes.user_id, votes.combination_id, votes.winner_id
            FROM votes
            JOIN combinations ON votes.combination_id = combinations.id
            WHERE combinations.list_id = ? AND votes.active = TRUE
            ORDER BY votes.rowid
            "#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(vote_from_row)
        .collect()
    }

    async fn count_votes_for_list(&self, list_id: &str) -> Result<i64, EngineError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM votes
            JOIN combinations ON votes.combination_id = combinations.id
            WHERE combinations.list_id = ? AND votes.active = TRUE
            "#,
        )
        .bind(list_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn votes_by_user_and_list(&self, user_id: &str, list_id: &str) -> Result<Vec<Vote>, EngineError> {
        sqlx::query(
            r#"
            SELECT votes.id, votes.active, votes.created_at, votes.deactivated_at,
                   votes.user_id, votes.combination_id, votes.winner_id
            FROM votes
            JOIN combinations ON votes.combination_id = combinations.id
            WHERE combinations.list_id = ? AND votes.user_id = ? AND votes.active = TRUE
            ORDER BY votes.rowid
            "#,
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(vote_from_row)
        .collect()
    }
}
