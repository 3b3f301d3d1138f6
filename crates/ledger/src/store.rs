//! Persistent ledger store abstraction.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use craftledger_core::StoreError;

use crate::material::Material;

/// Key/value store for ledger materials, keyed by material name.
///
/// The ledger is agnostic to the storage technology behind this trait.
pub trait MaterialStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<Material>, StoreError>;

    fn put(&self, material: Material) -> Result<(), StoreError>;

    /// Write several materials as one unit.
    ///
    /// The default writes one by one; implementations that can commit a batch
    /// atomically should override it.
    fn put_many(&self, materials: Vec<Material>) -> Result<(), StoreError> {
        for m in materials {
            self.put(m)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Material>, StoreError>;
}

impl<S> MaterialStore for Arc<S>
where
    S: MaterialStore + ?Sized,
{
    fn get(&self, name: &str) -> Result<Option<Material>, StoreError> {
        (**self).get(name)
    }

    fn put(&self, material: Material) -> Result<(), StoreError> {
        (**self).put(material)
    }

    fn put_many(&self, materials: Vec<Material>) -> Result<(), StoreError> {
        (**self).put_many(materials)
    }

    fn list(&self) -> Result<Vec<Material>, StoreError> {
        (**self).list()
    }
}

/// In-memory material store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMaterialStore {
    inner: RwLock<BTreeMap<String, Material>>,
}

impl InMemoryMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MaterialStore for InMemoryMaterialStore {
    fn get(&self, name: &str) -> Result<Option<Material>, StoreError> {
        let map = self.inner.read()?;
        Ok(map.get(name).cloned())
    }

    fn put(&self, material: Material) -> Result<(), StoreError> {
        let mut map = self.inner.write()?;
        map.insert(material.name.clone(), material);
        Ok(())
    }

    fn put_many(&self, materials: Vec<Material>) -> Result<(), StoreError> {
        let mut map = self.inner.write()?;
        for m in materials {
            map.insert(m.name.clone(), m);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<Material>, StoreError> {
        let map = self.inner.read()?;
        Ok(map.values().cloned().collect())
    }
}
