#![allow(dead_code)]

use tempfile::TempDir;
use you_choose::db::{Database, ListRepository};
use you_choose::handlers::{self, CastVoteInput, CreateBrandInput, CreateListInput, CreateMovieInput, RequestContext};
use you_choose::models::{Combination, List};

pub async fn memory_db() -> Database {
    Database::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

/// On-disk database served by `max_connections` connections. The database
/// lives as long as the returned directory.
pub async fn file_db(max_connections: u32) -> (TempDir, Database) {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("you_choose.db").display());
    let db = Database::connect(&url, max_connections)
        .await
        .expect("file database");
    (dir, db)
}

/// Soft-deletes one row of `table` (`movies`, `brands` or `lists`).
pub async fn deactivate(db: &Database, table: &str, id: &str) {
    let sql = format!("UPDATE {} SET active = FALSE WHERE id = ?", table);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(db.pool())
        .await
        .expect("deactivate row");
    assert_eq!(result.rows_affected(), 1, "no {} row with id {}", table, id);
}

pub fn admin() -> RequestContext {
    RequestContext::admin("admin-1")
}

pub fn user(id: &str) -> RequestContext {
    RequestContext::user(id)
}

pub async fn movie(db: &Database, name: &str) -> String {
    handlers::create_movie(
        db,
        &admin(),
        CreateMovieInput {
            name: name.to_string(),
            year: 2001,
            poster: format!("{}.jpg", name),
            external_id: format!("tt-{}", name),
        },
    )
    .await
    .expect("movie created")
    .id
}

pub async fn brand(db: &Database, name: &str) -> String {
    handlers::create_brand(
        db,
        &admin(),
        CreateBrandInput {
            name: name.to_string(),
            logo: format!("{}.svg", name),
        },
    )
    .await
    .expect("brand created")
    .id
}

pub async fn list(db: &Database, name: &str, list_type: &str, items: &[String]) -> String {
    handlers::create_list(
        db,
        &admin(),
        CreateListInput {
            name: name.to_string(),
            cover: "cover.png".to_string(),
            list_type: list_type.to_string(),
            items: items.to_vec(),
        },
    )
    .await
    .expect("list created")
    .id
}

pub async fn load(db: &Database, list_id: &str) -> List {
    db.get_list_by_id(list_id)
        .await
        .expect("list query")
        .expect("list exists")
}

pub fn pair_of(list: &List, first: &str, second: &str) -> Combination {
    list.combinations
        .iter()
        .find(|c| c.first_item_id == first && c.second_item_id == second)
        .cloned()
        .unwrap_or_else(|| panic!("no combination ({}, {})", first, second))
}

pub fn pairs(list: &List) -> Vec<(String, String)> {
    list.combinations
        .iter()
        .map(|c| (c.first_item_id.clone(), c.second_item_id.clone()))
        .collect()
}

pub fn vote_input(list_id: &str, combination: &Combination, winner_id: &str) -> CastVoteInput {
    CastVoteInput {
        list_id: list_id.to_string(),
        combination_id: combination.id.clone(),
        winner_id: winner_id.to_string(),
    }
}
