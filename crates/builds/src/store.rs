//! Persistent order store abstraction.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use craftledger_core::{BatchId, StoreError};

use crate::order::BuildOrder;

/// Key/value store for pending build orders, keyed by batch id.
pub trait OrderStore: Send + Sync {
    fn get(&self, batch_id: BatchId) -> Result<Option<BuildOrder>, StoreError>;

    fn put(&self, order: BuildOrder) -> Result<(), StoreError>;

    /// Remove an order. Returns whether it existed.
    fn delete(&self, batch_id: BatchId) -> Result<bool, StoreError>;

    /// All orders, ascending by batch id.
    fn list(&self) -> Result<Vec<BuildOrder>, StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn get(&self, batch_id: BatchId) -> Result<Option<BuildOrder>, StoreError> {
        (**self).get(batch_id)
    }

    fn put(&self, order: BuildOrder) -> Result<(), StoreError> {
        (**self).put(order)
    }

    fn delete(&self, batch_id: BatchId) -> Result<bool, StoreError> {
        (**self).delete(batch_id)
    }

    fn list(&self) -> Result<Vec<BuildOrder>, StoreError> {
        (**self).list()
    }
}

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<BTreeMap<BatchId, BuildOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, batch_id: BatchId) -> Result<Option<BuildOrder>, StoreError> {
        let orders = self.orders.read()?;
        Ok(orders.get(&batch_id).cloned())
    }

    fn put(&self, order: BuildOrder) -> Result<(), StoreError> {
        let mut orders = self.orders.write()?;
        orders.insert(order.batch_id, order);
        Ok(())
    }

    fn delete(&self, batch_id: BatchId) -> Result<bool, StoreError> {
        let mut orders = self.orders.write()?;
        Ok(orders.remove(&batch_id).is_some())
    }

    fn list(&self) -> Result<Vec<BuildOrder>, StoreError> {
        let orders = self.orders.read()?;
        Ok(orders.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::BuildEntry;
    use chrono::Utc;

    fn order(millis: i64) -> BuildOrder {
        BuildOrder {
            batch_id: BatchId::from_millis(millis),
            entries: vec![BuildEntry::new("Wall", 1)],
            created_at: Utc::now(),
            snapshot: None,
        }
    }

    #[test]
    fn list_is_ordered_by_batch_id() {
        let store = InMemoryOrderStore::new();
        store.put(order(30)).unwrap();
        store.put(order(10)).unwrap();
        store.put(order(20)).unwrap();

        let ids: Vec<i64> = store.list().unwrap().iter().map(|o| o.batch_id.as_millis()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn delete_reports_existence() {
        let store = InMemoryOrderStore::new();
        store.put(order(1)).unwrap();
        assert!(store.delete(BatchId::from_millis(1)).unwrap());
        assert!(!store.delete(BatchId::from_millis(1)).unwrap());
        assert!(store.get(BatchId::from_millis(1)).unwrap().is_none());
    }
}
