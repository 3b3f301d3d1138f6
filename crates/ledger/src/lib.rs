//! Inventory ledger: per-material on-hand and required quantities.
//!
//! The ledger is the single source of truth for quantities. Every mutation
//! goes through one primitive (`adjust_material` / `apply_batch`) that clamps
//! both quantities at zero.

pub mod ledger;
pub mod material;
pub mod store;

pub use ledger::{InventoryLedger, LedgerError};
pub use material::{Material, MaterialDelta};
pub use store::{InMemoryMaterialStore, MaterialStore};
