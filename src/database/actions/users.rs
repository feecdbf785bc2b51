use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, User};

/// Creates an account. Email and username are both unique.
pub async fn register_user(
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name)
        VALUES (?, ?, ?, ?)
        ON CONFLICT DO NOTHING RETURNING id;
    ",
    )
    .bind(email)
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(row.0),
        None => Err(Error::AlreadyExists(
            "user with this email or username already exists",
        )),
    }
}

pub async fn get_user(username: &str, pool: &Pool<Sqlite>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(user_id: Id, pool: &Pool<Sqlite>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
