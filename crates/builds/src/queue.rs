//! Build queue orchestration: expansion → ledger deltas → order record.
//!
//! ```text
//! commit(entries)
//!   1. validate + expand every entry (pure; failures leave no trace)
//!   2. mint a batch id
//!   3. persist the order
//!   4. apply +required for every expanded material (one ledger batch)
//!      └─ on failure: delete the order again
//!
//! complete(batch_id)
//!   1. load the order (absent → OrderNotFound, nothing changes)
//!   2. derive requirements (the stored snapshot if any, else re-expand)
//!   3. delete the order
//!   4. apply -have/-required for every material (one ledger batch)
//!      └─ on failure: put the order back
//! ```
//!
//! The queue never holds the ledger; callers pass the ledger handle into each
//! operation and are responsible for serializing calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use craftledger_catalog::{expand, Catalog, RequirementSet};
use craftledger_core::{validate_quantity, BatchId, DomainError, StoreError};
use craftledger_ledger::{InventoryLedger, LedgerError, MaterialDelta, MaterialStore};

use crate::order::{BuildEntry, BuildOrder};
use crate::store::OrderStore;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LedgerError> for QueueError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Domain(e) => QueueError::Domain(e),
            LedgerError::Store(e) => QueueError::Store(e),
        }
    }
}

/// How `commit` records an order's demand, and so what `complete` retires.
///
/// An order that carries a snapshot is always retired from that snapshot,
/// whatever policy the completing queue runs under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversalPolicy {
    /// Store no snapshot; completion re-expands the order's entries against
    /// the catalog at that time.
    ///
    /// If the catalog changed since commit, the retired quantities follow the
    /// new recipes, not the ones that were committed.
    #[default]
    Reexpand,
    /// Store the committed requirement set in the order and retire exactly that.
    Snapshot,
}

/// Pending build orders and their ledger demand.
pub struct BuildQueue<O>
where
    O: OrderStore,
{
    orders: O,
    catalog: Arc<Catalog>,
    policy: ReversalPolicy,
    clock: fn() -> DateTime<Utc>,
    last_issued: Option<BatchId>,
}

impl<O> BuildQueue<O>
where
    O: OrderStore,
{
    pub fn new(orders: O, catalog: Arc<Catalog>) -> Self {
        Self {
            orders,
            catalog,
            policy: ReversalPolicy::default(),
            clock: Utc::now,
            last_issued: None,
        }
    }

    pub fn with_policy(mut self, policy: ReversalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the wall clock used to mint batch ids.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Commit a single-item build. See [`BuildQueue::commit_batch`].
    pub fn commit<M: MaterialStore>(
        &mut self,
        ledger: &InventoryLedger<M>,
        item: &str,
        quantity: i64,
    ) -> Result<BatchId, QueueError> {
        self.commit_batch(ledger, &[(item.to_string(), quantity)])
    }

    /// Commit several `(item, quantity)` rows under one batch id.
    ///
    /// Rows with a blank item name are skipped; at least one row must remain.
    /// Every quantity must be positive. Registers demand only: each expanded
    /// material gets `+quantity` required and nothing on hand.
    pub fn commit_batch<M: MaterialStore>(
        &mut self,
        ledger: &InventoryLedger<M>,
        rows: &[(String, i64)],
    ) -> Result<BatchId, QueueError> {
        let mut entries = Vec::new();
        for (item, quantity) in rows {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let quantity = validate_quantity(*quantity)?;
            entries.push(BuildEntry::new(item, quantity));
        }
        if entries.is_empty() {
            return Err(DomainError::validation("a build needs at least one item").into());
        }

        let requirements = self.expand_entries(&entries)?;
        let deltas = requirements
            .iter()
            .map(|r| MaterialDelta::require(&r.material, r.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        let batch_id = self.mint_batch_id()?;
        let order = BuildOrder {
            batch_id,
            entries,
            created_at: (self.clock)(),
            snapshot: match self.policy {
                ReversalPolicy::Snapshot => Some(requirements),
                ReversalPolicy::Reexpand => None,
            },
        };
        let entry_count = order.entries.len();
        self.orders.put(order)?;

        if let Err(err) = ledger.apply_batch(&deltas) {
            if let Err(rollback) = self.orders.delete(batch_id) {
                tracing::error!(batch_id = %batch_id, error = %rollback, "failed to roll back order");
            }
            return Err(err.into());
        }

        tracing::info!(
            batch_id = %batch_id,
            entries = entry_count,
            materials = deltas.len(),
            "build committed"
        );
        Ok(batch_id)
    }

    /// Complete a pending order: retire its demand on both sides and remove it.
    ///
    /// An unknown batch id yields `OrderNotFound` and changes nothing.
    pub fn complete<M: MaterialStore>(
        &mut self,
        ledger: &InventoryLedger<M>,
        batch_id: BatchId,
    ) -> Result<RequirementSet, QueueError> {
        let Some(order) = self.orders.get(batch_id)? else {
            tracing::warn!(batch_id = %batch_id, "complete requested for unknown order");
            return Err(DomainError::order_not_found(batch_id).into());
        };

        let requirements = self.requirements_for(&order)?;
        let deltas = requirements
            .iter()
            .map(|r| MaterialDelta::retire(&r.material, r.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        self.orders.delete(batch_id)?;
        if let Err(err) = ledger.apply_batch(&deltas) {
            if let Err(rollback) = self.orders.put(order) {
                tracing::error!(batch_id = %batch_id, error = %rollback, "failed to restore order");
            }
            return Err(err.into());
        }

        tracing::info!(batch_id = %batch_id, materials = deltas.len(), "build completed");
        Ok(requirements)
    }

    pub fn get(&self, batch_id: BatchId) -> Result<Option<BuildOrder>, QueueError> {
        Ok(self.orders.get(batch_id)?)
    }

    /// Pending orders, oldest batch first.
    pub fn list(&self) -> Result<Vec<BuildOrder>, QueueError> {
        Ok(self.orders.list()?)
    }

    /// Requirements an order would retire on completion: its snapshot when it
    /// has one, otherwise a fresh expansion of its entries.
    pub fn requirements_for(&self, order: &BuildOrder) -> Result<RequirementSet, QueueError> {
        match &order.snapshot {
            Some(snapshot) => Ok(snapshot.clone()),
            None => self.expand_entries(&order.entries),
        }
    }

    /// Combined material demand of every pending order.
    pub fn pending_demand(&self) -> Result<RequirementSet, QueueError> {
        let mut total = RequirementSet::new();
        for order in self.orders.list()? {
            total.merge(&self.requirements_for(&order)?);
        }
        Ok(total)
    }

    fn expand_entries(&self, entries: &[BuildEntry]) -> Result<RequirementSet, QueueError> {
        let mut total = RequirementSet::new();
        for entry in entries {
            total.merge(&expand(&entry.item, entry.quantity, &self.catalog)?);
        }
        Ok(total)
    }

    fn mint_batch_id(&mut self) -> Result<BatchId, QueueError> {
        if self.last_issued.is_none() {
            self.last_issued = self.orders.list()?.last().map(|o| o.batch_id);
        }
        let id = BatchId::next_after(self.last_issued, (self.clock)());
        self.last_issued = Some(id);
        Ok(id)
    }
}
