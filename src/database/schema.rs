use std::fmt::{self, Display};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TypeError;

pub type Id = i64;

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Eq, Ord, Hash, Deserialize,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    Kilogram,
    Gram,
    Liter,
    Milliliter,
    Glass,
    Teaspoon,
    Tablespoon,
}

impl TryFrom<Value> for MeasurementUnit {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => match value {
                "kilogram" => Ok(Self::Kilogram),
                "gram" => Ok(Self::Gram),
                "liter" => Ok(Self::Liter),
                "milliliter" => Ok(Self::Milliliter),
                "glass" => Ok(Self::Glass),
                "teaspoon" => Ok(Self::Teaspoon),
                "tablespoon" => Ok(Self::Tablespoon),
                _ => Err(TypeError::new("Invalid variant")),
            },
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

impl Display for MeasurementUnit {
    /* abbreviation used on shopping list rows */
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            MeasurementUnit::Kilogram => "kg",
            MeasurementUnit::Gram => "g",
            MeasurementUnit::Liter => "l",
            MeasurementUnit::Milliliter => "ml",
            MeasurementUnit::Glass => "glass",
            MeasurementUnit::Teaspoon => "tsp",
            MeasurementUnit::Tablespoon => "tbsp",
        };
        write!(f, "{unit}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Eq, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagColor {
    Blue,
    Coral,
    Violet,
    Green,
}

impl TagColor {
    pub fn hex(self) -> &'static str {
        match self {
            TagColor::Blue => "#34568B",
            TagColor::Coral => "#FF6F61",
            TagColor::Violet => "#6B5B95",
            TagColor::Green => "#88B04B",
        }
    }
}

impl TryFrom<Value> for TagColor {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => match value {
                "blue" => Ok(Self::Blue),
                "coral" => Ok(Self::Coral),
                "violet" => Ok(Self::Violet),
                "green" => Ok(Self::Green),
                _ => Err(TypeError::new("Invalid variant")),
            },
            None => Err(TypeError::new("Failed to parse value as string")),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Product {
    pub id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
}

/// One `(product, amount)` pairing. Rows are shared between recipes and
/// deduplicated by value, never mutated after creation.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct IngredientLine {
    pub id: Id,
    pub product_id: Id,
    pub amount: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub description: String,
    pub cooking_time: i64,
    pub created_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeRow {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub description: String,
    pub cooking_time: i64,
    pub created_at: NaiveDateTime,

    pub count: i64,
}

/// Ingredient line joined with its product, as presented on a recipe page.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeIngredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
    pub amount: i64,
}

/// Followed author with their recipe count, for the subscriptions listing.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct FollowedAuthorRow {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,

    pub recipes_count: i64,
    pub count: i64,
}

/// One ingredient occurrence pulled out of a cart walk, before consolidation.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct CartIngredientRow {
    pub product_id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_abbreviate_on_shopping_rows() {
        assert_eq!(MeasurementUnit::Kilogram.to_string(), "kg");
        assert_eq!(MeasurementUnit::Milliliter.to_string(), "ml");
        assert_eq!(MeasurementUnit::Glass.to_string(), "glass");
        assert_eq!(MeasurementUnit::Teaspoon.to_string(), "tsp");
    }

    #[test]
    fn tag_palette_is_fixed() {
        assert_eq!(TagColor::Blue.hex(), "#34568B");
        assert_eq!(TagColor::Coral.hex(), "#FF6F61");
        assert_eq!(TagColor::Violet.hex(), "#6B5B95");
        assert_eq!(TagColor::Green.hex(), "#88B04B");
    }
}
