//! `Workshop`: the single entry point surrounding UI/CLI code calls.
//!
//! Ledger and build queue sit behind one mutex. Every public call (reads
//! included) holds it for its whole duration, so a multi-material commit or
//! completion is never observed half-applied.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use craftledger_builds::{BuildOrder, BuildQueue, OrderStore, QueueError, ReversalPolicy};
use craftledger_catalog::{expand, Catalog, MaterialInfoTable, RequirementSet};
use craftledger_core::{validate_quantity, BatchId, DomainError, StoreError};
use craftledger_ledger::{InventoryLedger, LedgerError, Material, MaterialStore};
use craftledger_reconcile::{
    analyze_build, reconcile, BuildAnalysis, DashboardStats, MaterialFilter, UnifiedMaterial,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::OrderNotFound(_)))
    }
}

impl From<QueueError> for ServiceError {
    fn from(value: QueueError) -> Self {
        match value {
            QueueError::Domain(e) => ServiceError::Domain(e),
            QueueError::Store(e) => ServiceError::Store(e),
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Domain(e) => ServiceError::Domain(e),
            LedgerError::Store(e) => ServiceError::Store(e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkshopOptions {
    /// Factory material table used to tag provenance in reconciliation.
    pub material_info: MaterialInfoTable,
    pub reversal: ReversalPolicy,
}

struct State<M, O>
where
    M: MaterialStore,
    O: OrderStore,
{
    ledger: InventoryLedger<M>,
    queue: BuildQueue<O>,
}

pub struct Workshop<M, O>
where
    M: MaterialStore,
    O: OrderStore,
{
    state: Mutex<State<M, O>>,
    catalog: Arc<Catalog>,
    material_info: MaterialInfoTable,
}

impl<M, O> Workshop<M, O>
where
    M: MaterialStore,
    O: OrderStore,
{
    pub fn new(materials: M, orders: O, catalog: Arc<Catalog>) -> Self {
        Self::with_options(materials, orders, catalog, WorkshopOptions::default())
    }

    pub fn with_options(materials: M, orders: O, catalog: Arc<Catalog>, options: WorkshopOptions) -> Self {
        let queue = BuildQueue::new(orders, catalog.clone()).with_policy(options.reversal);
        Self {
            state: Mutex::new(State {
                ledger: InventoryLedger::new(materials),
                queue,
            }),
            catalog,
            material_info: options.material_info,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<M, O>>, ServiceError> {
        self.state.lock().map_err(|_| StoreError::Poisoned.into())
    }

    /// Direct adjustment from outside the build lifecycle (e.g. shop purchases).
    pub fn add_direct_quantity(
        &self,
        material: &str,
        have_delta: i64,
        required_delta: i64,
    ) -> Result<Material, ServiceError> {
        let state = self.lock()?;
        let m = state.ledger.adjust_material(material, have_delta, required_delta)?;
        tracing::info!(material = %m.name, have_delta, required_delta, "direct quantity applied");
        Ok(m)
    }

    pub fn commit_build(&self, item: &str, quantity: i64) -> Result<BatchId, ServiceError> {
        let mut state = self.lock()?;
        let State { ledger, queue } = &mut *state;
        Ok(queue.commit(ledger, item, quantity)?)
    }

    pub fn commit_batch(&self, rows: &[(String, i64)]) -> Result<BatchId, ServiceError> {
        let mut state = self.lock()?;
        let State { ledger, queue } = &mut *state;
        Ok(queue.commit_batch(ledger, rows)?)
    }

    /// Retire an order's demand. Returns the requirements that were reversed.
    pub fn complete_build(&self, batch_id: BatchId) -> Result<RequirementSet, ServiceError> {
        let mut state = self.lock()?;
        let State { ledger, queue } = &mut *state;
        Ok(queue.complete(ledger, batch_id)?)
    }

    /// Unified, status-annotated material rows, ascending by name.
    pub fn reconcile(&self) -> Result<Vec<UnifiedMaterial>, ServiceError> {
        let materials = self.materials()?;
        Ok(reconcile(&materials, &self.material_info))
    }

    pub fn reconcile_filtered(&self, filter: &MaterialFilter) -> Result<Vec<UnifiedMaterial>, ServiceError> {
        Ok(filter.apply(&self.reconcile()?))
    }

    pub fn dashboard(&self) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats::from_rows(&self.reconcile()?))
    }

    pub fn materials(&self) -> Result<Vec<Material>, ServiceError> {
        let state = self.lock()?;
        Ok(state.ledger.get_all()?)
    }

    pub fn orders(&self) -> Result<Vec<BuildOrder>, ServiceError> {
        let state = self.lock()?;
        Ok(state.queue.list()?)
    }

    /// Completion of one pending order against current on-hand quantities.
    pub fn analyze_order(&self, batch_id: BatchId) -> Result<BuildAnalysis, ServiceError> {
        let state = self.lock()?;
        let order = state
            .queue
            .get(batch_id)?
            .ok_or_else(|| DomainError::order_not_found(batch_id))?;
        let requirements = state.queue.requirements_for(&order)?;
        let materials = state.ledger.get_all()?;
        Ok(analyze_build(&requirements, &materials))
    }

    /// Combined material demand of all pending orders.
    pub fn pending_demand(&self) -> Result<RequirementSet, ServiceError> {
        let state = self.lock()?;
        Ok(state.queue.pending_demand()?)
    }

    /// Expansion preview; touches no state.
    pub fn expand(&self, item: &str, quantity: i64) -> Result<RequirementSet, ServiceError> {
        let quantity = validate_quantity(quantity)?;
        Ok(expand(item, quantity, &self.catalog)?)
    }
}
