//! CLI command implementations.

pub mod products;
pub mod search;
pub mod sites;

pub use products::ProductsCommand;
pub use search::SearchCommand;
pub use sites::list_sites;
