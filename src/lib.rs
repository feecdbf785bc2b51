mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod pagination;
    pub mod schema;
    pub mod setup;
    pub mod shopping;
}
mod constants;

pub use constants::*;
pub use database::*;
