//! Recipe catalog and requirement expansion.
//!
//! The catalog is read-only once loaded. Expansion is a pure function over it:
//! no IO, no ledger access.

pub mod catalog;
pub mod expander;
pub mod info;

pub use catalog::{Catalog, CatalogError, Component, Recipe};
pub use expander::{expand, Requirement, RequirementSet, MAX_TOTAL};
pub use info::{MaterialInfo, MaterialInfoTable};
