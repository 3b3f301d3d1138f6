//! Inventory ledger over an injected [`MaterialStore`].

use std::collections::BTreeMap;

use thiserror::Error;

use craftledger_core::{DomainError, StoreError};

use crate::material::{Material, MaterialDelta};
use crate::store::MaterialStore;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authoritative per-material quantities.
///
/// Both quantities are floored at zero after every mutation. The floor is a
/// lossy policy, not an error: when a subtraction would go negative the excess
/// is discarded, so replaying the opposite delta afterwards does not restore
/// the earlier value.
#[derive(Debug)]
pub struct InventoryLedger<S>
where
    S: MaterialStore,
{
    store: S,
}

impl<S> InventoryLedger<S>
where
    S: MaterialStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adjust one material, creating it at zero if absent. Returns the stored record.
    pub fn adjust_material(
        &self,
        name: &str,
        have_delta: i64,
        required_delta: i64,
    ) -> Result<Material, LedgerError> {
        let mut written = self.apply_batch(&[MaterialDelta::new(name, have_delta, required_delta)])?;
        // One delta in, one record out.
        written
            .pop()
            .ok_or_else(|| StoreError::Storage("adjustment produced no record".into()).into())
    }

    /// Apply several deltas as one unit.
    ///
    /// All touched materials are read and recomputed first, then written with a
    /// single `put_many`. Deltas for the same material apply in order, exactly as
    /// consecutive `adjust_material` calls would. Returns the written records in
    /// name order.
    pub fn apply_batch(&self, deltas: &[MaterialDelta]) -> Result<Vec<Material>, LedgerError> {
        let mut staged: BTreeMap<String, Material> = BTreeMap::new();

        for delta in deltas {
            let name = delta.material.trim();
            if name.is_empty() {
                return Err(DomainError::validation("material name cannot be empty").into());
            }

            if !staged.contains_key(name) {
                let current = self.store.get(name)?.unwrap_or_else(|| Material::empty(name));
                staged.insert(name.to_string(), current);
            }
            let Some(material) = staged.get_mut(name) else {
                continue;
            };

            let (have_lost, required_lost) = material.apply(delta);
            if have_lost > 0 || required_lost > 0 {
                tracing::warn!(
                    material = %name,
                    have_lost,
                    required_lost,
                    "quantity clamped at zero; excess discarded"
                );
            }
            tracing::debug!(
                material = %name,
                have_delta = delta.have,
                required_delta = delta.required,
                have = material.have_qty,
                required = material.required_qty,
                "material adjusted"
            );
        }

        let written: Vec<Material> = staged.into_values().collect();
        self.store.put_many(written.clone())?;
        Ok(written)
    }

    pub fn get(&self, name: &str) -> Result<Option<Material>, LedgerError> {
        Ok(self.store.get(name)?)
    }

    /// Every material, ascending by name.
    pub fn get_all(&self) -> Result<Vec<Material>, LedgerError> {
        let mut all = self.store.list()?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMaterialStore;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ledger() -> InventoryLedger<InMemoryMaterialStore> {
        InventoryLedger::new(InMemoryMaterialStore::new())
    }

    #[test]
    fn adjust_creates_missing_material() {
        let ledger = ledger();
        let m = ledger.adjust_material("Brick", 2, 5).unwrap();
        assert_eq!(m, Material { name: "Brick".into(), have_qty: 2, required_qty: 5 });
        assert_eq!(ledger.get("Brick").unwrap(), Some(m));
    }

    #[test]
    fn negative_adjustment_floors_at_zero() {
        let ledger = ledger();
        ledger.adjust_material("Brick", 3, 1).unwrap();
        let m = ledger.adjust_material("Brick", -10, -10).unwrap();
        assert_eq!((m.have_qty, m.required_qty), (0, 0));

        // Clamping is lossy: the reverse delta does not bring the old values back.
        let m = ledger.adjust_material("Brick", 10, 10).unwrap();
        assert_eq!((m.have_qty, m.required_qty), (10, 10));
    }

    #[test]
    fn zeroed_material_stays_addressable() {
        let ledger = ledger();
        ledger.adjust_material("Nail", 0, 4).unwrap();
        ledger.adjust_material("Nail", 0, -4).unwrap();
        assert_eq!(ledger.get_all().unwrap(), vec![Material::empty("Nail")]);
    }

    #[test]
    fn names_are_trimmed_and_empty_rejected() {
        let ledger = ledger();
        ledger.adjust_material("  Wood ", 1, 0).unwrap();
        assert!(ledger.get("Wood").unwrap().is_some());

        let err = ledger.adjust_material("   ", 1, 0).unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn get_all_is_sorted_by_name() {
        let ledger = ledger();
        for name in ["Wood", "Brick", "Mortar"] {
            ledger.adjust_material(name, 1, 1).unwrap();
        }
        let names: Vec<String> = ledger.get_all().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Brick", "Mortar", "Wood"]);
    }

    #[test]
    fn batch_applies_repeated_material_in_order() {
        let ledger = ledger();
        let written = ledger
            .apply_batch(&[
                MaterialDelta::new("Brick", 0, 5),
                MaterialDelta::new("Mortar", 0, 1),
                MaterialDelta::new("Brick", 0, -8),
                MaterialDelta::new("Brick", 0, 2),
            ])
            .unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(ledger.get("Brick").unwrap().unwrap().required_qty, 2);
        assert_eq!(ledger.get("Mortar").unwrap().unwrap().required_qty, 1);
    }

    /// Store whose batch write always fails, to check nothing leaks out.
    #[derive(Default)]
    struct FailingStore {
        inner: InMemoryMaterialStore,
        put_many_calls: AtomicUsize,
    }

    impl MaterialStore for FailingStore {
        fn get(&self, name: &str) -> Result<Option<Material>, StoreError> {
            self.inner.get(name)
        }

        fn put(&self, material: Material) -> Result<(), StoreError> {
            self.inner.put(material)
        }

        fn put_many(&self, _materials: Vec<Material>) -> Result<(), StoreError> {
            self.put_many_calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Storage("disk full".into()))
        }

        fn list(&self) -> Result<Vec<Material>, StoreError> {
            self.inner.list()
        }
    }

    #[test]
    fn failed_batch_write_leaves_ledger_untouched() {
        let store = FailingStore::default();
        store.put(Material { name: "Brick".into(), have_qty: 1, required_qty: 1 }).unwrap();
        let ledger = InventoryLedger::new(store);

        let err = ledger
            .apply_batch(&[
                MaterialDelta::require("Brick", 4).unwrap(),
                MaterialDelta::require("Mortar", 1).unwrap(),
            ])
            .unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Storage(_))));
        assert_eq!(ledger.store().put_many_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            ledger.get_all().unwrap(),
            vec![Material { name: "Brick".into(), have_qty: 1, required_qty: 1 }]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: +(h, r) then -(h, r) restores the prior state exactly.
        #[test]
        fn adjustment_then_negation_restores_state(
            have in 0u64..10_000,
            required in 0u64..10_000,
            h in 0i64..10_000,
            r in 0i64..10_000
        ) {
            let ledger = ledger();
            ledger.adjust_material("M", have as i64, required as i64).unwrap();
            let delta = MaterialDelta::new("M", h, r);
            ledger.apply_batch(std::slice::from_ref(&delta)).unwrap();
            let written = ledger.apply_batch(&[delta.negated()]).unwrap();
            prop_assert_eq!((written[0].have_qty, written[0].required_qty), (have, required));
        }

        /// Property: quantities never go negative, whatever the delta sequence.
        #[test]
        fn quantities_floor_at_zero(
            deltas in prop::collection::vec((-1_000i64..1_000, -1_000i64..1_000), 1..20)
        ) {
            let ledger = ledger();
            let mut have: i64 = 0;
            let mut required: i64 = 0;
            for (dh, dr) in deltas {
                have = (have + dh).max(0);
                required = (required + dr).max(0);
                let m = ledger.adjust_material("M", dh, dr).unwrap();
                prop_assert_eq!(m.have_qty as i64, have);
                prop_assert_eq!(m.required_qty as i64, required);
            }
        }
    }
}
