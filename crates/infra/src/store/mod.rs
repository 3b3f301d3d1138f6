//! Durable store adapters.

pub mod json_file;

pub use json_file::{JsonFileMaterialStore, JsonFileOrderStore, JsonFileStore};
