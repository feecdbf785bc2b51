use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, Tag, TagColor};

pub async fn create_tag(
    name: &str,
    color: TagColor,
    slug: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "INSERT INTO tags (name, color, slug) VALUES (?, ?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(color.hex())
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(row.0),
        None => Err(Error::AlreadyExists("tag already exists")),
    }
}

pub async fn get_tag(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn find_tag(slug: &str, pool: &Pool<Sqlite>) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.0))
}

pub async fn list_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn list_recipe_tags(recipe_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.*
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = ?
        ORDER BY rt.id
        ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fails with `NotFound` when any referenced tag is missing.
pub async fn ensure_tags_exist(ids: &[Id], pool: &Pool<Sqlite>) -> Result<(), Error> {
    for id in ids {
        if get_tag(*id, pool).await?.is_none() {
            return Err(Error::NotFound("tag"));
        }
    }

    Ok(())
}
