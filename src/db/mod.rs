mod items;
mod lists;
mod repository;
mod votes;

use chrono::{DateTime, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;
use crate::error::EngineError;
use crate::models::ListType;

pub use repository::{ItemRepository, ListRepository, Store, VoteRepository};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, EngineError> {
        Self::connect(&config.database_url, config.max_connections).await
    }

    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, EngineError> {
        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database is its own database, so
        // pin the pool to one connection that never gets recycled.
        let in_memory = db_url.contains(":memory:") || db_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        Self::init_schema(&pool).await?;
        info!("Connected to database at {}", db_url);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id TEXT PRIMARY KEY,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                deactivated_at TEXT,
                name TEXT NOT NULL,
                year INTEGER NOT NULL,
                poster TEXT NOT NULL,
                external_id TEXT NOT NULL UNIQUE,
                votes_count INTEGER NOT NULL DEFAULT 0 CHECK (votes_count >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS brands (
                id TEXT PRIMARY KEY,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                deactivated_at TEXT,
                name TEXT NOT NULL UNIQUE,
                logo TEXT NOT NULL,
                votes_count INTEGER NOT NULL DEFAULT 0 CHECK (votes_count >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lists (
                id TEXT PRIMARY KEY,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                deactivated_at TEXT,
                name TEXT NOT NULL UNIQUE,
                cover TEXT NOT NULL,
                list_type TEXT NOT NULL CHECK (list_type IN ('MOVIE', 'BRAND'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS list_items (
                list_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (list_id, item_id),
                FOREIGN KEY (list_id) REFERENCES lists(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS combinations (
                id TEXT PRIMARY KEY,
                list_id TEXT NOT NULL,
                first_item_id TEXT NOT NULL,
                second_item_id TEXT NOT NULL,
                CHECK (first_item_id <> second_item_id),
                UNIQUE (list_id, first_item_id, second_item_id),
                FOREIGN KEY (list_id) REFERENCES lists(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // The UNIQUE key is what enforces one vote per user and combination.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id TEXT PRIMARY KEY,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                deactivated_at TEXT,
                user_id TEXT NOT NULL,
                combination_id TEXT NOT NULL,
                winner_id TEXT NOT NULL,
                UNIQUE (user_id, combination_id),
                FOREIGN KEY (combination_id) REFERENCES combinations(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn items_table(kind: ListType) -> &'static str {
    match kind {
        ListType::Movie => "movies",
        ListType::Brand => "brands",
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EngineError::Integrity(format!("failed to parse timestamp '{}': {}", raw, e)))
}

fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>, EngineError> {
    raw.as_deref().map(parse_timestamp).transpose()
}

/// Upper bound on `?` binds in one statement. SQLite rejects more than 32766.
const MAX_BINDS_PER_QUERY: usize = 500;

/// `?, ?, ?` for an `IN (...)` clause over `n` binds.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_through_rfc3339() {
        let now = Utc::now();
        let parsed = parse_timestamp(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
        assert!(parse_timestamp("yesterday").is_err());
        assert_eq!(parse_optional_timestamp(None).unwrap(), None);
    }

    #[test]
    fn builds_placeholders() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(1), "?");
    }
}
