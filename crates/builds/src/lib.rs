//! Build queue: pending build orders and their ledger demand.
//!
//! Lifecycle per order: none → pending (`commit`) → retired (`complete`).

pub mod order;
pub mod queue;
pub mod store;

pub use order::{BuildEntry, BuildOrder};
pub use queue::{BuildQueue, QueueError, ReversalPolicy};
pub use store::{InMemoryOrderStore, OrderStore};
