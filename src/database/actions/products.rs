use sqlx::{Pool, Sqlite};

use crate::error::Error;
use crate::schema::{Id, MeasurementUnit, Product};

/// Adds a catalog entry. The `(name, measurement_unit)` pair is unique.
pub async fn create_product(
    name: &str,
    measurement_unit: MeasurementUnit,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let row: Option<(Id,)> = sqlx::query_as(
        "INSERT INTO products (name, measurement_unit) VALUES (?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(row.0),
        None => Err(Error::AlreadyExists(
            "product with this name and unit already exists",
        )),
    }
}

pub async fn get_product(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Product>, Error> {
    let row: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn find_product(name: &str, pool: &Pool<Sqlite>) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM products WHERE LOWER(name) = LOWER(?)")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.0))
}

/// Name-contains catalog search used by the ingredient picker.
pub async fn search_products(search: &str, pool: &Pool<Sqlite>) -> Result<Vec<Product>, Error> {
    let rows: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE name LIKE ? ORDER BY name")
            .bind(format!("%{search}%"))
            .fetch_all(pool)
            .await?;

    Ok(rows)
}

pub async fn list_products(pool: &Pool<Sqlite>) -> Result<Vec<Product>, Error> {
    let rows: Vec<Product> = sqlx::query_as("SELECT * FROM products ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
