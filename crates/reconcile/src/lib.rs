//! Reconciliation: display-ready status derived from a ledger snapshot.
//!
//! Everything here is a pure function of its inputs; nothing is stored.

pub mod analysis;
pub mod status;
pub mod unify;
pub mod view;

pub use analysis::{analyze_build, BuildAnalysis};
pub use status::{classify, percentage, Status};
pub use unify::{merge_sources, partition_sources, reconcile, Source, SourcedRecord, UnifiedMaterial};
pub use view::{DashboardStats, MaterialFilter};
