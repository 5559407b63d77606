//! Service layer for the pokemon catalog.
//! - Keeps the catalog in memory and mirrors it to a JSON file.
//! - Reuses entity definitions and validation from the `models` crate.
//! - Exposes the catalog behind the `CatalogStore` trait.

pub mod errors;
pub mod catalog;
pub mod pagination;
pub mod storage;
pub mod file;
