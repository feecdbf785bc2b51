use std::collections::HashMap;

use serde::Serialize;

use super::schema::{CartIngredientRow, Id, MeasurementUnit};

/// One consolidated shopping list entry: a product with the summed amount of
/// every line referencing it across the cart.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingItem {
    pub product_id: Id,
    pub name: String,
    pub measurement_unit: MeasurementUnit,
    pub total: i64,
}

/// Folds a cart walk into one entry per product, in first-seen order.
///
/// Each line's own amount is added once per occurrence. A cart holding lines
/// (Sugar, 2) and (Sugar, 5) yields Sugar with total 7 regardless of which
/// recipes the lines came from. No serving-size scaling is applied; the line
/// amount is the whole contribution.
pub fn consolidate(rows: Vec<CartIngredientRow>) -> Vec<ShoppingItem> {
    let mut index: HashMap<Id, usize> = HashMap::new();
    let mut items: Vec<ShoppingItem> = Vec::new();

    for row in rows {
        match index.get(&row.product_id) {
            Some(i) => items[*i].total += row.amount,
            None => {
                index.insert(row.product_id, items.len());
                items.push(ShoppingItem {
                    product_id: row.product_id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    total: row.amount,
                });
            }
        }
    }

    items
}

/// Renders the numbered report lines, e.g. `1) Sugar — 5 kg`.
pub fn format_report(items: &[ShoppingItem]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(n, item)| {
            format!(
                "{}) {} — {} {}",
                n + 1,
                item.name,
                item.total,
                item.measurement_unit
            )
        })
        .collect()
}

/// Boundary to the external document renderer: a title and the report lines
/// go in, an opaque downloadable blob comes out.
pub trait DocumentRenderer {
    fn render(&self, title: &str, lines: &[String]) -> Vec<u8>;
}

/// Fallback renderer producing a plain-text document.
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, title: &str, lines: &[String]) -> Vec<u8> {
        let mut document = String::with_capacity(title.len() + lines.len() * 32);
        document.push_str(title);
        document.push_str("\n\n");
        for line in lines {
            document.push_str(line);
            document.push('\n');
        }

        document.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product_id: Id, name: &str, unit: MeasurementUnit, amount: i64) -> CartIngredientRow {
        CartIngredientRow {
            product_id,
            name: name.to_string(),
            measurement_unit: unit,
            amount,
        }
    }

    #[test]
    fn sums_lines_per_product() {
        let items = consolidate(vec![
            row(1, "Flour", MeasurementUnit::Kilogram, 2),
            row(1, "Flour", MeasurementUnit::Kilogram, 3),
        ]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total, 5);
        assert_eq!(format_report(&items), vec!["1) Flour — 5 kg"]);
    }

    #[test]
    fn keeps_first_seen_product_order() {
        let items = consolidate(vec![
            row(1, "Sugar", MeasurementUnit::Gram, 1),
            row(2, "Salt", MeasurementUnit::Gram, 2),
            row(1, "Sugar", MeasurementUnit::Gram, 4),
        ]);

        assert_eq!(
            format_report(&items),
            vec!["1) Sugar — 5 g", "2) Salt — 2 g"]
        );
    }

    #[test]
    fn empty_cart_gives_empty_report() {
        let items = consolidate(vec![]);

        assert!(items.is_empty());
        assert!(format_report(&items).is_empty());
    }

    #[test]
    fn plain_text_renderer_emits_title_and_lines() {
        let lines = vec![String::from("1) Salt — 2 g")];
        let blob = PlainTextRenderer.render("Shopping list", &lines);

        let text = String::from_utf8(blob).unwrap();
        assert!(text.starts_with("Shopping list\n\n"));
        assert!(text.ends_with("1) Salt — 2 g\n"));
    }
}
