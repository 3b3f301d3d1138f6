//! Infrastructure layer: durable adapters behind the ledger and queue store traits.

pub mod store;

pub use store::{JsonFileMaterialStore, JsonFileOrderStore, JsonFileStore};
