//! `craftledger-core`: domain foundation building blocks.
//!
//! Errors, identifiers and quantity rules shared by the catalog, ledger and
//! build queue crates. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod quantity;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::BatchId;
pub use quantity::{apply_delta, parse_quantity, validate_quantity};
