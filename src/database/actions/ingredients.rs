use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::form::IngredientEntry;
use crate::schema::{Id, IngredientLine};

use super::get_product;

/// Looks up the line for `(product, amount)`, creating it when the exact pair
/// was never used before. Lines are shared by value across recipes; the
/// constrained insert keeps concurrent first uses from minting duplicates.
pub async fn get_or_create_ingredient_line(
    product_id: Id,
    amount: i64,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    if get_product(product_id, pool).await?.is_none() {
        return Err(Error::NotFound("product"));
    }

    sqlx::query("INSERT INTO ingredient_lines (product_id, amount) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(product_id)
        .bind(amount)
        .execute(pool)
        .await?;

    let row: (Id,) =
        sqlx::query_as("SELECT id FROM ingredient_lines WHERE product_id = ? AND amount = ?")
            .bind(product_id)
            .bind(amount)
            .fetch_one(pool)
            .await?;

    Ok(row.0)
}

/// Maps a validated payload's ingredient entries to line ids.
pub async fn resolve_ingredient_lines(
    entries: &[IngredientEntry],
    pool: &Pool<Sqlite>,
) -> Result<Vec<Id>, Error> {
    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        ids.push(get_or_create_ingredient_line(entry.product_id, entry.amount, pool).await?);
    }

    Ok(ids)
}

pub async fn get_ingredient_line(
    id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Option<IngredientLine>, Error> {
    let row: Option<IngredientLine> =
        sqlx::query_as("SELECT * FROM ingredient_lines WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row)
}
