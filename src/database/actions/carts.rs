use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{CartIngredientRow, Id, Recipe};
use crate::shopping::{consolidate, format_report};

use super::memberships::{add_member, contains_member, remove_member, Relation};
use super::recipes::get_recipe;

pub async fn add_to_cart(recipe_id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if get_recipe(recipe_id, pool).await?.is_none() {
        return Err(Error::NotFound("recipe"));
    }

    if !add_member(Relation::Cart, user_id, recipe_id, pool).await? {
        return Err(Error::AlreadyExists("recipe is already in the cart"));
    }

    Ok(())
}

pub async fn remove_from_cart(recipe_id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if !remove_member(Relation::Cart, user_id, recipe_id, pool).await? {
        return Err(Error::NotPresent("recipe is not in the cart"));
    }

    Ok(())
}

pub async fn is_in_cart(recipe_id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    contains_member(Relation::Cart, user_id, recipe_id, pool).await
}

pub async fn list_cart(user_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as(
        "
        SELECT r.*
        FROM cart_recipes c
        INNER JOIN recipes r ON r.id = c.recipe_id
        WHERE c.user_id = ?
        ORDER BY c.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every ingredient occurrence across the cart's recipes, walked in cart
/// order so consolidation sees a stable first-seen sequence. One read, one
/// snapshot.
pub async fn list_cart_ingredients(
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<CartIngredientRow>, Error> {
    let rows: Vec<CartIngredientRow> = sqlx::query_as(
        "
        SELECT il.product_id AS product_id, p.name AS name,
               p.measurement_unit AS measurement_unit, il.amount AS amount
        FROM cart_recipes c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredient_lines il ON il.id = ri.ingredient_id
        INNER JOIN products p ON p.id = il.product_id
        WHERE c.user_id = ?
        ORDER BY c.id, ri.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The consolidated, numbered shopping report for one user's cart. An empty
/// cart produces an empty report.
pub async fn shopping_list(user_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<String>, Error> {
    let rows = list_cart_ingredients(user_id, pool).await?;

    Ok(format_report(&consolidate(rows)))
}
