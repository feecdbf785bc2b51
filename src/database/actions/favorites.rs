use sqlx::{Pool, Sqlite};

use crate::constants::RECIPE_COUNT_PER_PAGE;
use crate::error::Error;
use crate::pagination::PageContext;
use crate::schema::{Id, RecipeRow};

use super::memberships::{add_member, contains_member, remove_member, Relation};
use super::recipes::get_recipe;

/// Marks a recipe as a favorite. Favoriting twice is reported back to the
/// user, not absorbed.
pub async fn add_to_favorites(recipe_id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if get_recipe(recipe_id, pool).await?.is_none() {
        return Err(Error::NotFound("recipe"));
    }

    if !add_member(Relation::Favorites, user_id, recipe_id, pool).await? {
        return Err(Error::AlreadyExists("recipe is already in favorites"));
    }

    Ok(())
}

pub async fn remove_from_favorites(
    recipe_id: Id,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    if !remove_member(Relation::Favorites, user_id, recipe_id, pool).await? {
        return Err(Error::NotPresent("recipe is not in favorites"));
    }

    Ok(())
}

pub async fn is_favorite(recipe_id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    contains_member(Relation::Favorites, user_id, recipe_id, pool).await
}

pub async fn fetch_favorites(
    user_id: Id,
    offset: i64,
    pool: &Pool<Sqlite>,
) -> Result<PageContext<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(
        "
        SELECT r.*, COUNT(*) OVER () AS count
        FROM favorite_recipes f
        INNER JOIN recipes r ON r.id = f.recipe_id
        WHERE f.user_id = ?
        ORDER BY f.id
        LIMIT ? OFFSET ?
    ",
    )
    .bind(user_id)
    .bind(RECIPE_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total_count = rows.first().map(|row| row.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);

    Ok(page)
}
