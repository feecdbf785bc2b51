pub const RECIPE_COUNT_PER_PAGE: i64 = 6;
pub const FOLLOW_COUNT_PER_PAGE: i64 = 6;
pub const PRODUCT_COUNT_PER_PAGE: i64 = 100;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.pdf";
pub const SHOPPING_LIST_TITLE: &str = "Shopping list";
