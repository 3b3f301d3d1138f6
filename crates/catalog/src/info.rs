//! Factory material info table.
//!
//! Rows describe materials produced in the factory (unlock level, production
//! time). A ledger material listed here is factory-sourced; anything else is
//! treated as bought in the shop.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// Name used by the spreadsheet header row that export tools leave in the data.
const HEADER_ROW_NAME: &str = "Material";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub material_name: String,
    #[serde(default)]
    pub unlocked_at: Option<String>,
    #[serde(default)]
    pub production_time: Option<String>,
    #[serde(default)]
    pub used_in: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialInfoTable {
    rows: BTreeMap<String, MaterialInfo>,
}

impl MaterialInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = MaterialInfo>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|r| {
                let name = r.material_name.trim();
                !name.is_empty() && name != HEADER_ROW_NAME
            })
            .map(|r| (r.material_name.trim().to_string(), r))
            .collect();
        Self { rows }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let rows: Vec<MaterialInfo> = serde_json::from_str(json)?;
        Ok(Self::from_rows(rows))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, material: &str) -> Option<&MaterialInfo> {
        self.rows.get(material)
    }

    pub fn contains(&self, material: &str) -> bool {
        self.rows.contains_key(material)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
