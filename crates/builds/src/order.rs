use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use craftledger_catalog::RequirementSet;
use craftledger_core::{BatchId, Entity};

/// One requested row of a batch: `quantity` units of `item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEntry {
    pub item: String,
    pub quantity: u64,
}

impl BuildEntry {
    pub fn new(item: impl Into<String>, quantity: u64) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// A committed, not yet completed build batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub batch_id: BatchId,
    pub entries: Vec<BuildEntry>,
    pub created_at: DateTime<Utc>,
    /// Requirements as committed. Only recorded under `ReversalPolicy::Snapshot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<RequirementSet>,
}

impl Entity for BuildOrder {
    type Key = BatchId;

    fn key(&self) -> BatchId {
        self.batch_id
    }
}
