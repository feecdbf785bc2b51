use foodgram_sdk::actions::*;
use foodgram_sdk::error::Error;
use foodgram_sdk::form::RecipeForm;
use foodgram_sdk::schema::{Id, MeasurementUnit, TagColor};
use foodgram_sdk::{setup, SHOPPING_LIST_TITLE};
use foodgram_sdk::shopping::{DocumentRenderer, PlainTextRenderer};

use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};

async fn test_pool() -> Pool<Sqlite> {
    let pool = setup::connect_pool("sqlite::memory:").await.unwrap();
    setup::init_schema(&pool).await.unwrap();
    pool
}

async fn seed_user(name: &str, pool: &Pool<Sqlite>) -> Id {
    register_user(
        &format!("{name}@example.com"),
        name,
        "Test",
        "User",
        pool,
    )
    .await
    .unwrap()
}

fn payload(name: &str, ingredients: &[(Id, i64)], tags: &[Id]) -> Value {
    let entries: Vec<Value> = ingredients
        .iter()
        .map(|(id, amount)| json!({ "id": id, "amount": amount }))
        .collect();

    json!({
        "name": name,
        "image": format!("images/{name}.png"),
        "text": "test recipe",
        "cooking_time": 10,
        "ingredients": entries,
        "tags": tags
    })
}

async fn seed_recipe(author: Id, name: &str, ingredients: &[(Id, i64)], pool: &Pool<Sqlite>) -> Id {
    let form = RecipeForm::from_value(&payload(name, ingredients, &[])).unwrap();
    create_recipe(author, &form, pool).await.unwrap()
}

#[tokio::test]
async fn favoriting_twice_reports_already_exists() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;

    add_to_favorites(recipe, user, &pool).await.unwrap();
    let err = add_to_favorites(recipe, user, &pool).await.unwrap_err();

    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(err.error_key(), "already_exists");
    assert_eq!(
        list_members(Relation::Favorites, user, &pool).await.unwrap(),
        vec![recipe]
    );
}

#[tokio::test]
async fn unfavoriting_an_absent_recipe_reports_not_present() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;

    let err = remove_from_favorites(recipe, user, &pool).await.unwrap_err();

    assert!(matches!(err, Error::NotPresent(_)));
    assert!(list_members(Relation::Favorites, user, &pool)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn cart_toggle_roundtrip() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;

    add_to_cart(recipe, user, &pool).await.unwrap();
    assert!(is_in_cart(recipe, user, &pool).await.unwrap());

    let err = add_to_cart(recipe, user, &pool).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    remove_from_cart(recipe, user, &pool).await.unwrap();
    assert!(!is_in_cart(recipe, user, &pool).await.unwrap());

    let err = remove_from_cart(recipe, user, &pool).await.unwrap_err();
    assert!(matches!(err, Error::NotPresent(_)));
}

#[tokio::test]
async fn favoriting_a_missing_recipe_is_not_found() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;

    let err = add_to_favorites(999, user, &pool).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;

    let err = subscribe(user, user, &pool).await.unwrap_err();

    assert!(matches!(err, Error::InvalidTarget(_)));
    assert!(list_members(Relation::Follows, user, &pool)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn follow_toggle_roundtrip() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let author = seed_user("bob", &pool).await;

    subscribe(user, author, &pool).await.unwrap();
    assert!(is_subscribed(user, author, &pool).await.unwrap());

    let err = subscribe(user, author, &pool).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    unsubscribe(user, author, &pool).await.unwrap();
    let err = unsubscribe(user, author, &pool).await.unwrap_err();
    assert!(matches!(err, Error::NotPresent(_)));
}

#[tokio::test]
async fn concurrent_adds_have_exactly_one_winner() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            add_to_cart(recipe, user, &pool).await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(Error::AlreadyExists(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(
        list_members(Relation::Cart, user, &pool).await.unwrap(),
        vec![recipe]
    );
}

#[tokio::test]
async fn shopping_list_sums_one_product_across_recipes() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    let bread = seed_recipe(user, "bread", &[(flour, 2)], &pool).await;
    let cake = seed_recipe(user, "cake", &[(flour, 3)], &pool).await;

    add_to_cart(bread, user, &pool).await.unwrap();
    add_to_cart(cake, user, &pool).await.unwrap();

    let report = shopping_list(user, &pool).await.unwrap();

    assert_eq!(report, vec!["1) Flour — 5 kg"]);
}

#[tokio::test]
async fn shopping_list_keeps_first_seen_product_order() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let sugar = create_product("Sugar", MeasurementUnit::Gram, &pool)
        .await
        .unwrap();
    let salt = create_product("Salt", MeasurementUnit::Gram, &pool)
        .await
        .unwrap();

    let first = seed_recipe(user, "first", &[(sugar, 1), (salt, 2)], &pool).await;
    let second = seed_recipe(user, "second", &[(sugar, 4)], &pool).await;

    add_to_cart(first, user, &pool).await.unwrap();
    add_to_cart(second, user, &pool).await.unwrap();

    let report = shopping_list(user, &pool).await.unwrap();

    assert_eq!(report, vec!["1) Sugar — 5 g", "2) Salt — 2 g"]);
}

#[tokio::test]
async fn empty_cart_yields_empty_report() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;

    let report = shopping_list(user, &pool).await.unwrap();

    assert!(report.is_empty());

    let document = PlainTextRenderer.render(SHOPPING_LIST_TITLE, &report);
    assert_eq!(document, b"Shopping list\n\n");
}

#[tokio::test]
async fn rejected_payload_persists_no_recipe() {
    let pool = test_pool().await;
    let _user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    let mut data = payload("bread", &[(flour, 1)], &[]);
    data["cooking_time"] = json!(0);

    assert!(matches!(
        RecipeForm::from_value(&data),
        Err(Error::Validation(_))
    ));
    assert!(list_recipes(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn equal_ingredient_pairs_reuse_one_line() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    let bread = seed_recipe(user, "bread", &[(flour, 2)], &pool).await;
    let cake = seed_recipe(user, "cake", &[(flour, 2)], &pool).await;

    let bread_lines = list_recipe_ingredients(bread, &pool).await.unwrap();
    let cake_lines = list_recipe_ingredients(cake, &pool).await.unwrap();

    assert_eq!(bread_lines.len(), 1);
    assert_eq!(bread_lines[0].id, cake_lines[0].id);
    assert_eq!(bread_lines[0].amount, 2);
}

#[tokio::test]
async fn unknown_product_in_payload_is_not_found() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;

    let form = RecipeForm::from_value(&payload("bread", &[(42, 1)], &[])).unwrap();
    let err = create_recipe(user, &form, &pool).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(list_recipes(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_replaces_ingredients_and_tags() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let sugar = create_product("Sugar", MeasurementUnit::Gram, &pool)
        .await
        .unwrap();
    let breakfast = create_tag("Breakfast", TagColor::Green, "breakfast", &pool)
        .await
        .unwrap();

    let recipe = seed_recipe(user, "bread", &[(flour, 2)], &pool).await;

    let form =
        RecipeForm::from_value(&payload("sweet bread", &[(sugar, 9)], &[breakfast])).unwrap();
    update_recipe(recipe, user, &form, &pool).await.unwrap();

    let updated = get_recipe(recipe, &pool).await.unwrap().unwrap();
    assert_eq!(updated.name, "sweet bread");

    let lines = list_recipe_ingredients(recipe, &pool).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name, "Sugar");
    assert_eq!(lines[0].amount, 9);

    let tags = list_recipe_tags(recipe, &pool).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].slug, "breakfast");
}

#[tokio::test]
async fn only_the_author_may_mutate_a_recipe() {
    let pool = test_pool().await;
    let author = seed_user("alice", &pool).await;
    let intruder = seed_user("bob", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(author, "bread", &[(flour, 1)], &pool).await;

    let form = RecipeForm::from_value(&payload("stolen", &[(flour, 1)], &[])).unwrap();
    let err = update_recipe(recipe, intruder, &form, &pool)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    let err = delete_recipe(recipe, intruder, &pool).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn deleting_a_recipe_clears_membership_rows() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let recipe = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;

    add_to_cart(recipe, user, &pool).await.unwrap();
    add_to_favorites(recipe, user, &pool).await.unwrap();

    delete_recipe(recipe, user, &pool).await.unwrap();

    assert!(get_recipe(recipe, &pool).await.unwrap().is_none());
    assert!(!is_in_cart(recipe, user, &pool).await.unwrap());
    assert!(!is_favorite(recipe, user, &pool).await.unwrap());
}

#[tokio::test]
async fn fetch_recipes_filters_through_membership_tables() {
    let pool = test_pool().await;
    let alice = seed_user("alice", &pool).await;
    let bob = seed_user("bob", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    let bread = seed_recipe(alice, "bread", &[(flour, 1)], &pool).await;
    let cake = seed_recipe(bob, "cake", &[(flour, 2)], &pool).await;

    add_to_favorites(cake, alice, &pool).await.unwrap();
    add_to_cart(bread, alice, &pool).await.unwrap();

    let favorites = fetch_recipes(
        &RecipeFilter {
            is_favorited: Some(alice),
            ..Default::default()
        },
        0,
        &pool,
    )
    .await
    .unwrap();
    assert_eq!(favorites.rows.len(), 1);
    assert_eq!(favorites.rows[0].id, cake);

    let in_cart = fetch_recipes(
        &RecipeFilter {
            is_in_shopping_cart: Some(alice),
            ..Default::default()
        },
        0,
        &pool,
    )
    .await
    .unwrap();
    assert_eq!(in_cart.rows.len(), 1);
    assert_eq!(in_cart.rows[0].id, bread);

    let by_author = fetch_recipes(
        &RecipeFilter {
            author: Some(bob),
            ..Default::default()
        },
        0,
        &pool,
    )
    .await
    .unwrap();
    assert_eq!(by_author.rows.len(), 1);
    assert_eq!(by_author.rows[0].id, cake);
}

#[tokio::test]
async fn fetch_recipes_filters_by_tag_slug() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    let breakfast = create_tag("Breakfast", TagColor::Green, "breakfast", &pool)
        .await
        .unwrap();

    let form = RecipeForm::from_value(&payload("bread", &[(flour, 1)], &[breakfast])).unwrap();
    let tagged = create_recipe(user, &form, &pool).await.unwrap();
    let _plain = seed_recipe(user, "cake", &[(flour, 2)], &pool).await;

    let page = fetch_recipes(
        &RecipeFilter {
            tags: vec![String::from("breakfast")],
            ..Default::default()
        },
        0,
        &pool,
    )
    .await
    .unwrap();

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].id, tagged);
}

#[tokio::test]
async fn favorites_page_lists_recipes_in_favoriting_order() {
    let pool = test_pool().await;
    let user = seed_user("alice", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    let bread = seed_recipe(user, "bread", &[(flour, 1)], &pool).await;
    let cake = seed_recipe(user, "cake", &[(flour, 2)], &pool).await;

    add_to_favorites(cake, user, &pool).await.unwrap();
    add_to_favorites(bread, user, &pool).await.unwrap();

    let page = fetch_favorites(user, 0, &pool).await.unwrap();

    assert_eq!(page.total_rows, 2);
    assert_eq!(page.rows[0].id, cake);
    assert_eq!(page.rows[1].id, bread);
    assert_eq!(page.next_offset, 0);
    assert_eq!(page.prev_offset, 0);
}

#[tokio::test]
async fn product_search_matches_name_fragments() {
    let pool = test_pool().await;
    create_product("Wheat flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    create_product("Rye flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();
    create_product("Sugar", MeasurementUnit::Gram, &pool)
        .await
        .unwrap();

    let hits = search_products("flour", &pool).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].name, "Rye flour");
    assert_eq!(hits[1].name, "Wheat flour");

    assert!(search_products("pepper", &pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_reported() {
    let pool = test_pool().await;
    seed_user("alice", &pool).await;

    let err = register_user("alice@example.com", "alice", "Test", "User", &pool)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyExists(_)));
}

#[tokio::test]
async fn subscriptions_list_follows_in_order_with_recipe_counts() {
    let pool = test_pool().await;
    let alice = seed_user("alice", &pool).await;
    let bob = seed_user("bob", &pool).await;
    let carol = seed_user("carol", &pool).await;
    let flour = create_product("Flour", MeasurementUnit::Kilogram, &pool)
        .await
        .unwrap();

    seed_recipe(carol, "bread", &[(flour, 1)], &pool).await;
    seed_recipe(carol, "cake", &[(flour, 2)], &pool).await;

    subscribe(alice, bob, &pool).await.unwrap();
    subscribe(alice, carol, &pool).await.unwrap();

    let page = fetch_subscriptions(alice, 0, &pool).await.unwrap();

    assert_eq!(page.total_rows, 2);
    assert_eq!(page.rows[0].username, "bob");
    assert_eq!(page.rows[0].recipes_count, 0);
    assert_eq!(page.rows[1].username, "carol");
    assert_eq!(page.rows[1].recipes_count, 2);
}
