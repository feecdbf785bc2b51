use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::constants::RECIPE_COUNT_PER_PAGE;
use crate::error::Error;
use crate::form::RecipeForm;
use crate::pagination::PageContext;
use crate::schema::{Id, Recipe, RecipeIngredient, RecipeRow};

use super::{ensure_tags_exist, get_user_by_id, resolve_ingredient_lines};

/// Listing filters from the query surface. The membership flags carry the
/// viewer's id and resolve through the relation tables, not the recipe table.
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    pub author: Option<Id>,
    pub tags: Vec<String>,
    pub is_favorited: Option<Id>,
    pub is_in_shopping_cart: Option<Id>,
}

pub async fn get_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Fetches a recipe for mutation. Only the author may change or delete it.
pub async fn get_recipe_mut(id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<Recipe, Error> {
    match get_recipe(id, pool).await? {
        Some(recipe) => {
            if recipe.author_id != user_id {
                return Err(Error::Unauthorized);
            }
            Ok(recipe)
        }
        None => Err(Error::NotFound("recipe")),
    }
}

pub async fn list_recipes(pool: &Pool<Sqlite>) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as("SELECT * FROM recipes ORDER BY created_at, id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    offset: i64,
    pool: &Pool<Sqlite>,
) -> Result<PageContext<RecipeRow>, Error> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT r.*, COUNT(*) OVER () AS count FROM recipes r WHERE 1 = 1",
    );

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }
    if !filter.tags.is_empty() {
        query.push(
            " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN (",
        );
        let mut separated = query.separated(", ");
        for slug in &filter.tags {
            separated.push_bind(slug.clone());
        }
        query.push("))");
    }
    if let Some(user_id) = filter.is_favorited {
        query
            .push(" AND r.id IN (SELECT recipe_id FROM favorite_recipes WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if let Some(user_id) = filter.is_in_shopping_cart {
        query
            .push(" AND r.id IN (SELECT recipe_id FROM cart_recipes WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    query
        .push(" ORDER BY r.created_at, r.id LIMIT ")
        .push_bind(RECIPE_COUNT_PER_PAGE)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(pool).await?;

    let total_count = rows.first().map(|row| row.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);
    Ok(page)
}

/// Persists a validated payload: the recipe row plus its ingredient and tag
/// associations, atomically.
pub async fn create_recipe(
    author_id: Id,
    form: &RecipeForm,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    if get_user_by_id(author_id, pool).await?.is_none() {
        return Err(Error::NotFound("user"));
    }

    let line_ids = resolve_ingredient_lines(&form.ingredients, pool).await?;
    ensure_tags_exist(&form.tags, pool).await?;

    let mut tr = pool.begin().await?;

    let recipe: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, description, cooking_time)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&form.name)
    .bind(&form.image)
    .bind(&form.text)
    .bind(form.cooking_time)
    .fetch_one(&mut *tr)
    .await?;

    let recipe_id = recipe.0;

    for line_id in &line_ids {
        sqlx::query("INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(line_id)
            .execute(&mut *tr)
            .await?;
    }
    for tag_id in &form.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *tr)
            .await?;
    }

    tr.commit().await?;

    Ok(recipe_id)
}

/// Rewrites a recipe from a validated payload, replacing both association
/// sets the way a full update submits them.
pub async fn update_recipe(
    id: Id,
    user_id: Id,
    form: &RecipeForm,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    get_recipe_mut(id, user_id, pool).await?;

    let line_ids = resolve_ingredient_lines(&form.ingredients, pool).await?;
    ensure_tags_exist(&form.tags, pool).await?;

    let mut tr = pool.begin().await?;

    sqlx::query("UPDATE recipes SET name = ?, image = ?, description = ?, cooking_time = ? WHERE id = ?")
        .bind(&form.name)
        .bind(&form.image)
        .bind(&form.text)
        .bind(form.cooking_time)
        .bind(id)
        .execute(&mut *tr)
        .await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tr)
        .await?;
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    for line_id in &line_ids {
        sqlx::query("INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES (?, ?)")
            .bind(id)
            .bind(line_id)
            .execute(&mut *tr)
            .await?;
    }
    for tag_id in &form.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(id)
            .bind(tag_id)
            .execute(&mut *tr)
            .await?;
    }

    tr.commit().await?;

    Ok(())
}

/// Deletes a recipe together with its associations and any membership rows
/// still pointing at it.
pub async fn delete_recipe(id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    get_recipe_mut(id, user_id, pool).await?;

    let mut tr = pool.begin().await?;

    for table in [
        "favorite_recipes",
        "cart_recipes",
        "recipe_ingredients",
        "recipe_tags",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE recipe_id = ?"))
            .bind(id)
            .execute(&mut *tr)
            .await?;
    }

    sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(&mut *tr)
        .await?;

    tr.commit().await?;

    Ok(())
}

/// Ingredient lines of one recipe joined with their products, in the order
/// they were attached.
pub async fn list_recipe_ingredients(
    recipe_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT il.id AS id, p.name AS name, p.measurement_unit AS measurement_unit, il.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredient_lines il ON il.id = ri.ingredient_id
        INNER JOIN products p ON p.id = il.product_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
