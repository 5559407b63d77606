//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores that keep a whole collection in
//! memory and mirror it to a JSON file on every write.

pub mod json_list_store;
