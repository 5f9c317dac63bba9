mod common;

use common::{admin, list, load, memory_db, movie, pair_of, user, vote_input};
use you_choose::db::ItemRepository;
use you_choose::handlers::{self, AddItemsInput};
use you_choose::models::ListType;

// 260 items make 33670 combinations, more than SQLite accepts as binds in
// one statement.
const ITEMS: usize = 260;

async fn movies(db: &you_choose::Database, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(movie(db, &format!("m{:03}", i)).await);
    }
    ids
}

#[tokio::test]
async fn ranking_works_past_the_bind_limit() {
    let db = memory_db().await;
    let ids = movies(&db, ITEMS).await;
    let list_id = list(&db, "Everything", "MOVIE", &ids).await;

    let detail = handlers::get_list(&db, &user("u1"), &list_id).await.unwrap();
    assert_eq!(detail.number_of_votes, 0);
    assert!(detail.ranking.is_empty());
    assert_eq!(detail.list.items.len(), ITEMS);
    assert_eq!(detail.list.combinations.len(), ITEMS * (ITEMS - 1) / 2);

    let first = pair_of(&detail.list, &ids[0], &ids[ITEMS - 1]);
    let last = pair_of(&detail.list, &ids[ITEMS - 2], &ids[ITEMS - 1]);
    handlers::cast_vote(&db, &user("u1"), vote_input(&list_id, &first, &ids[ITEMS - 1]))
        .await
        .unwrap();
    handlers::cast_vote(&db, &user("u1"), vote_input(&list_id, &last, &ids[ITEMS - 1]))
        .await
        .unwrap();

    let detail = handlers::get_list(&db, &user("u2"), &list_id).await.unwrap();
    assert_eq!(detail.number_of_votes, 2);
    assert_eq!(detail.ranking.entries(), vec![(ids[ITEMS - 1].as_str(), 2)]);

    let mine = handlers::get_list_for_user(&db, &user("u1"), &list_id).await.unwrap();
    assert_eq!(mine.voted_combinations.len(), 2);
    assert_eq!(mine.unvoted_combinations.len(), ITEMS * (ITEMS - 1) / 2 - 2);
}

#[tokio::test]
async fn growing_a_large_list_adds_only_the_new_pairs() {
    let db = memory_db().await;
    let ids = movies(&db, ITEMS + 1).await;
    let (old, new) = ids.split_at(ITEMS);
    let list_id = list(&db, "Almost everything", "MOVIE", old).await;

    let output = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: list_id.clone(),
            items: new.to_vec(),
        },
    )
    .await
    .unwrap();
    assert_eq!(output.new_combinations, ITEMS);

    let stored = load(&db, &list_id).await;
    assert_eq!(stored.combinations.len(), (ITEMS + 1) * ITEMS / 2);
}

#[tokio::test]
async fn item_lookup_accepts_more_ids_than_one_statement_can_bind() {
    let db = memory_db().await;
    let ids = movies(&db, 3).await;

    let mut wanted: Vec<String> = (0..40_000).map(|i| format!("missing-{}", i)).collect();
    wanted.insert(0, ids[2].clone());
    wanted.insert(20_000, ids[0].clone());
    wanted.push(ids[1].clone());
    wanted.push(ids[2].clone());

    let found = db.get_items_by_ids(ListType::Movie, &wanted).await.unwrap();
    let found: Vec<&str> = found.iter().map(|item| item.id()).collect();

    assert_eq!(found, vec![ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);
}
