use std::collections::HashSet;

use serde_json::Value;

use super::error::{Error, ValidationError};

/// Accepts JSON numbers and numeric strings, the way form-encoded clients
/// submit them.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn require_str(data: &Value, key: &'static str, errors: &mut Vec<ValidationError>) -> String {
    match data.get(key).and_then(Value::as_str) {
        Some(v) => v.to_string(),
        None => {
            errors.push(ValidationError::MissingField(key));
            String::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientEntry {
    pub product_id: i64,
    pub amount: i64,
}

/// A recipe create/update payload that passed validation.
#[derive(Debug, Clone)]
pub struct RecipeForm {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<i64>,
}

impl RecipeForm {
    /// Runs the whole rule list over the raw payload and collects every
    /// failure into one `Error::Validation`.
    pub fn from_value(data: &Value) -> Result<Self, Error> {
        let mut errors: Vec<ValidationError> = Vec::new();

        let name = require_str(data, "name", &mut errors);
        let image = require_str(data, "image", &mut errors);
        let text = require_str(data, "text", &mut errors);

        let cooking_time = match data.get("cooking_time").map(parse_int) {
            Some(Some(v)) if v >= 1 => v,
            _ => {
                errors.push(ValidationError::InvalidCookingTime);
                0
            }
        };

        let mut ingredients: Vec<IngredientEntry> = Vec::new();
        let mut product_ids: Vec<i64> = Vec::new();
        match data.get("ingredients").and_then(Value::as_array) {
            Some(entries) => {
                for entry in entries {
                    let product_id = entry.get("id").and_then(parse_int);
                    if product_id.is_none() {
                        errors.push(ValidationError::InvalidIngredientId);
                    }

                    let amount = match entry.get("amount").map(parse_int) {
                        Some(Some(v)) if v >= 1 => Some(v),
                        _ => {
                            errors.push(ValidationError::InvalidIngredientAmount);
                            None
                        }
                    };

                    if let Some(product_id) = product_id {
                        product_ids.push(product_id);
                        if let Some(amount) = amount {
                            ingredients.push(IngredientEntry { product_id, amount });
                        }
                    }
                }

                let unique: HashSet<&i64> = product_ids.iter().collect();
                if product_ids.len() > unique.len() {
                    errors.push(ValidationError::DuplicateIngredient);
                }
            }
            None => errors.push(ValidationError::MissingField("ingredients")),
        }

        let mut tags: Vec<i64> = Vec::new();
        match data.get("tags").and_then(Value::as_array) {
            Some(entries) => {
                // Tag ids must be actual integers, not numeric strings.
                for entry in entries {
                    match entry.as_i64() {
                        Some(id) => tags.push(id),
                        None => errors.push(ValidationError::InvalidTagId),
                    }
                }

                let unique: HashSet<&i64> = tags.iter().collect();
                if tags.len() > unique.len() {
                    errors.push(ValidationError::DuplicateTag);
                }
            }
            None => errors.push(ValidationError::MissingField("tags")),
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(Self {
            name,
            image,
            text,
            cooking_time,
            ingredients,
            tags,
        })
    }
}
