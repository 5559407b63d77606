//! File-backed stores.

pub mod pokemon_store;
