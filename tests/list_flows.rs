mod common;

use common::{admin, brand, list, load, memory_db, movie, pairs, user};
use you_choose::handlers::{self, AddItemsInput, CreateListInput, CreateMovieInput};
use you_choose::messages::Locale;
use you_choose::models::ListType;

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

#[tokio::test]
async fn new_list_gets_every_pair_in_item_order() {
    let db = memory_db().await;
    let a = movie(&db, "a").await;
    let b = movie(&db, "b").await;
    let c = movie(&db, "c").await;

    let id = list(&db, "Three", "MOVIE", &[a.clone(), b.clone(), c.clone()]).await;
    let stored = load(&db, &id).await;

    assert_eq!(stored.list_type, ListType::Movie);
    assert_eq!(stored.item_ids().unwrap(), vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(
        pairs(&stored),
        vec![pair(&a, &b), pair(&a, &c), pair(&b, &c)]
    );
}

#[tokio::test]
async fn adding_an_item_pairs_it_with_existing_ones_only() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;
    let m3 = movie(&db, "m3").await;
    let m4 = movie(&db, "m4").await;
    let id = list(&db, "Growing", "MOVIE", &[m1.clone(), m2.clone(), m3.clone()]).await;
    let before = load(&db, &id).await;

    let output = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: id.clone(),
            items: vec![m4.clone()],
        },
    )
    .await
    .unwrap();
    assert_eq!(output.added_items, 1);
    assert_eq!(output.new_combinations, 3);

    let after = load(&db, &id).await;
    assert_eq!(after.combinations.len(), 6);
    for old in &before.combinations {
        let kept = after
            .combinations
            .iter()
            .find(|c| c.id == old.id)
            .expect("old combination kept");
        assert_eq!(kept, old);
    }
    for existing in [&m1, &m2, &m3] {
        assert!(pairs(&after).contains(&pair(existing, &m4)));
    }
}

#[tokio::test]
async fn adding_several_items_pairs_them_with_each_other_too() {
    let db = memory_db().await;
    let a = brand(&db, "a").await;
    let b = brand(&db, "b").await;
    let c = brand(&db, "c").await;
    let d = brand(&db, "d").await;
    let id = list(&db, "Logos", "BRAND", &[a.clone(), b.clone()]).await;

    let output = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: id.clone(),
            items: vec![c.clone(), d.clone()],
        },
    )
    .await
    .unwrap();
    assert_eq!(output.new_combinations, 5);

    let after = load(&db, &id).await;
    assert_eq!(
        pairs(&after),
        vec![
            pair(&a, &b),
            pair(&a, &c),
            pair(&a, &d),
            pair(&b, &c),
            pair(&b, &d),
            pair(&c, &d),
        ]
    );
}

#[tokio::test]
async fn wrong_typed_item_is_rejected_and_list_is_untouched() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;
    let nike = brand(&db, "nike").await;
    let id = list(&db, "Films", "MOVIE", &[m1, m2]).await;

    let problem = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: id.clone(),
            items: vec![nike],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 400);
    assert_eq!(problem.title, "Invalid list type");

    let after = load(&db, &id).await;
    assert_eq!(after.items.len(), 2);
    assert_eq!(after.combinations.len(), 1);
}

#[tokio::test]
async fn item_already_in_list_conflicts() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;
    let m3 = movie(&db, "m3").await;
    let id = list(&db, "Films", "MOVIE", &[m1.clone(), m2]).await;

    let problem = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: id.clone(),
            items: vec![m3, m1],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 409);
    assert_eq!(problem.title, "Item already in list");

    // All or nothing: m3 was not added either
    assert_eq!(load(&db, &id).await.items.len(), 2);
}

#[tokio::test]
async fn unknown_items_and_lists_are_not_found() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;
    let id = list(&db, "Films", "MOVIE", &[m1, m2]).await;

    let problem = handlers::add_items_to_list(
        &db,
        &admin(),
        AddItemsInput {
            list_id: id,
            items: vec!["ghost".to_string()],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 404);
    assert_eq!(problem.title, "Items not found");
    assert!(problem.detail.contains("ghost"));

    let problem = handlers::get_list(&db, &user("u1"), "missing").await.unwrap_err();
    assert_eq!(problem.status, 404);
}

#[tokio::test]
async fn empty_additions_are_rejected() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;
    let id = list(&db, "Films", "MOVIE", &[m1, m2]).await;

    let problem = handlers::add_items_to_list(&db, &admin(), AddItemsInput { list_id: id, items: vec![] })
        .await
        .unwrap_err();
    assert_eq!(problem.status, 400);
    assert_eq!(problem.title, "No items provided");
}

#[tokio::test]
async fn list_needs_two_distinct_items_and_a_unique_name() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;

    let input = |name: &str, items: Vec<String>| CreateListInput {
        name: name.to_string(),
        cover: String::new(),
        list_type: "MOVIE".to_string(),
        items,
    };

    let problem = handlers::create_list(&db, &admin(), input("Solo", vec![m1.clone(), m1.clone()]))
        .await
        .unwrap_err();
    assert_eq!(problem.status, 400);
    assert!(problem
        .detail
        .starts_with("You must provide at least two items to create a list."));

    handlers::create_list(&db, &admin(), input("Duo", vec![m1.clone(), m2.clone()]))
        .await
        .unwrap();
    let problem = handlers::create_list(&db, &admin(), input("Duo", vec![m1, m2]))
        .await
        .unwrap_err();
    assert_eq!(problem.status, 409);

    let lists = handlers::get_lists(&db, &user("u1")).await.unwrap();
    assert_eq!(lists.lists.len(), 1);
}

#[tokio::test]
async fn unknown_list_type_is_a_validation_problem() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;

    let mut ctx = admin();
    ctx.locale = Locale::parse("es-ES").unwrap();
    let problem = handlers::create_list(
        &db,
        &ctx,
        CreateListInput {
            name: "Series".to_string(),
            cover: String::new(),
            list_type: "SERIES".to_string(),
            items: vec![m1, m2],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 400);
    assert_eq!(problem.title, "Tipo de lista no válido");
}

#[tokio::test]
async fn only_admins_create_catalog_entries_and_lists() {
    let db = memory_db().await;
    let m1 = movie(&db, "m1").await;
    let m2 = movie(&db, "m2").await;

    let problem = handlers::create_movie(
        &db,
        &user("u1"),
        CreateMovieInput {
            name: "Heat".to_string(),
            year: 1995,
            poster: String::new(),
            external_id: "tt0113277".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 403);

    let problem = handlers::create_list(
        &db,
        &user("u1"),
        CreateListInput {
            name: "Mine".to_string(),
            cover: String::new(),
            list_type: "MOVIE".to_string(),
            items: vec![m1, m2],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 403);
    assert_eq!(problem.title, "Forbidden");
}

#[tokio::test]
async fn duplicate_external_id_conflicts() {
    let db = memory_db().await;
    movie(&db, "heat").await;

    let problem = handlers::create_movie(
        &db,
        &admin(),
        CreateMovieInput {
            name: "Heat (remaster)".to_string(),
            year: 1995,
            poster: String::new(),
            external_id: "tt-heat".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(problem.status, 409);
    assert_eq!(problem.title, "Movie already exists");
}
