use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use super::error::Error;

/// Reads `DATABASE_URL`, falling back to a throwaway in-memory database.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| String::from("sqlite::memory:"))
}

/// Opens the connection pool.
///
/// The pool is capped at one connection: an in-memory SQLite database lives
/// and dies with its connection, and a single writer sidesteps SQLITE_BUSY
/// on the mutation paths.
pub async fn connect_pool(url: &str) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    log::trace!("> Connected to {url}");

    Ok(pool)
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        measurement_unit TEXT NOT NULL,
        UNIQUE (name, measurement_unit)
    )",
    "CREATE TABLE IF NOT EXISTS ingredient_lines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL REFERENCES products (id),
        amount INTEGER NOT NULL CHECK (amount > 0),
        UNIQUE (product_id, amount)
    )",
    "CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        slug TEXT NOT NULL,
        UNIQUE (name, color, slug)
    )",
    "CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL REFERENCES users (id),
        name TEXT NOT NULL,
        image TEXT NOT NULL,
        description TEXT NOT NULL,
        cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS recipe_ingredients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        ingredient_id INTEGER NOT NULL REFERENCES ingredient_lines (id),
        UNIQUE (recipe_id, ingredient_id)
    )",
    "CREATE TABLE IF NOT EXISTS recipe_tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        tag_id INTEGER NOT NULL REFERENCES tags (id),
        UNIQUE (recipe_id, tag_id)
    )",
    "CREATE TABLE IF NOT EXISTS favorite_recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users (id),
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        UNIQUE (user_id, recipe_id)
    )",
    "CREATE TABLE IF NOT EXISTS cart_recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users (id),
        recipe_id INTEGER NOT NULL REFERENCES recipes (id),
        UNIQUE (user_id, recipe_id)
    )",
    "CREATE TABLE IF NOT EXISTS user_follows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users (id),
        author_id INTEGER NOT NULL REFERENCES users (id),
        UNIQUE (user_id, author_id)
    )",
];

/// Creates every table the SDK relies on. Safe to call repeatedly.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_an_in_memory_database() {
        std::env::remove_var("DATABASE_URL");

        let url = database_url();
        assert_eq!(url, "sqlite::memory:");

        let pool = connect_pool(&url).await.unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
    }
}
