pub mod carts;
pub mod favorites;
pub mod follows;
pub mod ingredients;
pub mod memberships;
pub mod products;
pub mod recipes;
pub mod tags;
pub mod users;

pub use carts::*;
pub use favorites::*;
pub use follows::*;
pub use ingredients::*;
pub use memberships::*;
pub use products::*;
pub use recipes::*;
pub use tags::*;
pub use users::*;
