//! JSON-file backed stores.
//!
//! Each store keeps its records in memory and mirrors them to one JSON file.
//! Every write replaces the whole file via write-to-temp + rename, so a batch
//! either lands completely or not at all, and the in-memory copy only changes
//! after the file write succeeded.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

use craftledger_builds::{BuildOrder, OrderStore};
use craftledger_core::{BatchId, Entity, StoreError};
use craftledger_ledger::{Material, MaterialStore};

pub type JsonFileMaterialStore = JsonFileStore<Material>;
pub type JsonFileOrderStore = JsonFileStore<BuildOrder>;

#[derive(Debug)]
pub struct JsonFileStore<E>
where
    E: Entity,
{
    path: PathBuf,
    records: RwLock<BTreeMap<E::Key, E>>,
}

impl<E> JsonFileStore<E>
where
    E: Entity + Clone + Serialize + DeserializeOwned,
{
    /// Open (or lazily create) the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => {
                let rows: Vec<E> = serde_json::from_slice(&bytes)?;
                rows.into_iter().map(|r| (r.key(), r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), records = records.len(), "json store opened");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn values(&self) -> Result<Vec<E>, StoreError> {
        let records = self.records.read()?;
        Ok(records.values().cloned().collect())
    }

    /// Apply `change` to a copy of the records, persist it, then publish it.
    fn update<R>(&self, change: impl FnOnce(&mut BTreeMap<E::Key, E>) -> R) -> Result<R, StoreError> {
        let mut records = self.records.write()?;
        let mut next = records.clone();
        let out = change(&mut next);
        persist(&self.path, &next)?;
        *records = next;
        Ok(out)
    }
}

fn persist<K, E>(path: &Path, records: &BTreeMap<K, E>) -> Result<(), StoreError>
where
    E: Serialize,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let rows: Vec<&E> = records.values().collect();
    let bytes = serde_json::to_vec_pretty(&rows)?;

    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl MaterialStore for JsonFileStore<Material> {
    fn get(&self, name: &str) -> Result<Option<Material>, StoreError> {
        let records = self.records.read()?;
        Ok(records.get(name).cloned())
    }

    fn put(&self, material: Material) -> Result<(), StoreError> {
        self.update(|records| {
            records.insert(material.key(), material);
        })
    }

    fn put_many(&self, materials: Vec<Material>) -> Result<(), StoreError> {
        self.update(|records| {
            for m in materials {
                records.insert(m.key(), m);
            }
        })
    }

    fn list(&self) -> Result<Vec<Material>, StoreError> {
        self.values()
    }
}

impl OrderStore for JsonFileStore<BuildOrder> {
    fn get(&self, batch_id: BatchId) -> Result<Option<BuildOrder>, StoreError> {
        let records = self.records.read()?;
        Ok(records.get(&batch_id).cloned())
    }

    fn put(&self, order: BuildOrder) -> Result<(), StoreError> {
        self.update(|records| {
            records.insert(order.key(), order);
        })
    }

    fn delete(&self, batch_id: BatchId) -> Result<bool, StoreError> {
        // Skip the rewrite when there is nothing to remove.
        if !self.records.read()?.contains_key(&batch_id) {
            return Ok(false);
        }
        self.update(|records| records.remove(&batch_id).is_some())
    }

    fn list(&self) -> Result<Vec<BuildOrder>, StoreError> {
        self.values()
    }
}
