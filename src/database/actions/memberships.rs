use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::Id;

/// The three owner-to-member relations backed by one table each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Favorites,
    Cart,
    Follows,
}

impl Relation {
    pub fn table(self) -> &'static str {
        match self {
            Relation::Favorites => "favorite_recipes",
            Relation::Cart => "cart_recipes",
            Relation::Follows => "user_follows",
        }
    }

    pub fn member_column(self) -> &'static str {
        match self {
            Relation::Favorites | Relation::Cart => "recipe_id",
            Relation::Follows => "author_id",
        }
    }
}

/// Lists an owner's members in insertion order. An owner that never touched
/// the relation gets an empty list, not an error.
pub async fn list_members(
    relation: Relation,
    owner_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Id>, Error> {
    let rows: Vec<(Id,)> = sqlx::query_as(&format!(
        "SELECT {member} FROM {table} WHERE user_id = ? ORDER BY id",
        member = relation.member_column(),
        table = relation.table(),
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.0).collect())
}

pub async fn contains_member(
    relation: Relation,
    owner_id: Id,
    member_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let row: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT id FROM {table} WHERE user_id = ? AND {member} = ?",
        table = relation.table(),
        member = relation.member_column(),
    ))
    .bind(owner_id)
    .bind(member_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Inserts the membership row in one constrained statement. Returns whether
/// the row is new; a concurrent duplicate add loses on the unique key instead
/// of racing a separate existence check.
pub async fn add_member(
    relation: Relation,
    owner_id: Id,
    member_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let result = sqlx::query(&format!(
        "INSERT INTO {table} (user_id, {member}) VALUES (?, ?) ON CONFLICT DO NOTHING",
        table = relation.table(),
        member = relation.member_column(),
    ))
    .bind(owner_id)
    .bind(member_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes the membership row. Returns whether a row was actually there.
pub async fn remove_member(
    relation: Relation,
    owner_id: Id,
    member_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE user_id = ? AND {member} = ?",
        table = relation.table(),
        member = relation.member_column(),
    ))
    .bind(owner_id)
    .bind(member_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
