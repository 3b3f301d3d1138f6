//! Provenance merge: one row per material name, whatever its sources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use craftledger_catalog::MaterialInfoTable;
use craftledger_ledger::Material;

use crate::status::{classify, percentage, Status};

/// Where a material's on-hand quantity comes from. Display grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Factory,
    Shop,
}

impl core::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "factory" => Ok(Source::Factory),
            "shop" => Ok(Source::Shop),
            other => Err(format!("unknown source '{other}' (expected factory or shop)")),
        }
    }
}

/// A material's quantities as reported by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedRecord {
    pub name: String,
    pub have_qty: u64,
    pub required_qty: u64,
    pub source: Source,
    #[serde(default)]
    pub production_time: Option<String>,
    #[serde(default)]
    pub unlocked_at: Option<String>,
}

impl SourcedRecord {
    pub fn new(name: impl Into<String>, have_qty: u64, required_qty: u64, source: Source) -> Self {
        Self {
            name: name.into(),
            have_qty,
            required_qty,
            source,
            production_time: None,
            unlocked_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedMaterial {
    pub name: String,
    pub have_qty: u64,
    pub required_qty: u64,
    /// Distinct sources in first-seen order.
    pub sources: Vec<Source>,
    pub production_time: Option<String>,
    pub unlocked_at: Option<String>,
    pub status: Status,
    pub percentage: u8,
}

/// Merge records from two sources into one row per name, ascending by name.
///
/// Quantities are summed across sources and the status is recomputed from the
/// summed totals.
pub fn merge_sources(a: &[SourcedRecord], b: &[SourcedRecord]) -> Vec<UnifiedMaterial> {
    let mut merged: BTreeMap<&str, UnifiedMaterial> = BTreeMap::new();

    for record in a.iter().chain(b.iter()) {
        let row = merged.entry(record.name.as_str()).or_insert_with(|| UnifiedMaterial {
            name: record.name.clone(),
            have_qty: 0,
            required_qty: 0,
            sources: Vec::new(),
            production_time: None,
            unlocked_at: None,
            status: Status::Complete,
            percentage: 0,
        });

        row.have_qty = row.have_qty.saturating_add(record.have_qty);
        row.required_qty = row.required_qty.saturating_add(record.required_qty);
        if !row.sources.contains(&record.source) {
            row.sources.push(record.source);
        }
        if row.production_time.is_none() {
            row.production_time = record.production_time.clone();
        }
        if row.unlocked_at.is_none() {
            row.unlocked_at = record.unlocked_at.clone();
        }
    }

    merged
        .into_values()
        .map(|mut row| {
            row.status = classify(row.have_qty, row.required_qty);
            row.percentage = percentage(row.have_qty, row.required_qty);
            row
        })
        .collect()
}

/// Split ledger rows by provenance: materials listed in the factory info table
/// are factory-sourced (and carry its production details), the rest are shop items.
pub fn partition_sources(
    materials: &[Material],
    info: &MaterialInfoTable,
) -> (Vec<SourcedRecord>, Vec<SourcedRecord>) {
    let mut factory = Vec::new();
    let mut shop = Vec::new();

    for m in materials {
        match info.get(&m.name) {
            Some(row) => factory.push(SourcedRecord {
                production_time: row.production_time.clone(),
                unlocked_at: row.unlocked_at.clone(),
                ..SourcedRecord::new(m.name.clone(), m.have_qty, m.required_qty, Source::Factory)
            }),
            None => shop.push(SourcedRecord::new(
                m.name.clone(),
                m.have_qty,
                m.required_qty,
                Source::Shop,
            )),
        }
    }

    (factory, shop)
}

/// Ledger snapshot → unified, status-annotated rows.
pub fn reconcile(materials: &[Material], info: &MaterialInfoTable) -> Vec<UnifiedMaterial> {
    let (factory, shop) = partition_sources(materials, info);
    merge_sources(&factory, &shop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftledger_catalog::MaterialInfo;

    #[test]
    fn same_name_from_two_sources_becomes_one_row() {
        let a = vec![SourcedRecord::new("Metal", 2, 5, Source::Factory)];
        let b = vec![SourcedRecord::new("Metal", 1, 0, Source::Shop)];

        let unified = merge_sources(&a, &b);
        assert_eq!(unified.len(), 1);
        let metal = &unified[0];
        assert_eq!((metal.have_qty, metal.required_qty), (3, 5));
        assert_eq!(metal.status, Status::Partial);
        assert_eq!(metal.percentage, 60);
        assert_eq!(metal.sources, vec![Source::Factory, Source::Shop]);
    }

    #[test]
    fn output_is_sorted_and_sources_deduplicated() {
        let a = vec![
            SourcedRecord::new("Wood", 1, 1, Source::Factory),
            SourcedRecord::new("Wood", 1, 1, Source::Factory),
        ];
        let b = vec![SourcedRecord::new("Brick", 0, 4, Source::Shop)];

        let unified = merge_sources(&a, &b);
        let names: Vec<&str> = unified.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Brick", "Wood"]);
        assert_eq!(unified[0].status, Status::Needed);
        assert_eq!(unified[1].sources, vec![Source::Factory]);
        assert_eq!((unified[1].have_qty, unified[1].required_qty), (2, 2));
    }

    #[test]
    fn partition_uses_info_table_membership() {
        let info = MaterialInfoTable::from_rows([MaterialInfo {
            material_name: "Metal".into(),
            unlocked_at: Some("1".into()),
            production_time: Some("1m".into()),
            used_in: None,
        }]);
        let materials = vec![
            Material { name: "Hammer".into(), have_qty: 0, required_qty: 2 },
            Material { name: "Metal".into(), have_qty: 4, required_qty: 4 },
        ];

        let unified = reconcile(&materials, &info);
        assert_eq!(unified[0].name, "Hammer");
        assert_eq!(unified[0].sources, vec![Source::Shop]);
        assert_eq!(unified[0].production_time, None);
        assert_eq!(unified[1].sources, vec![Source::Factory]);
        assert_eq!(unified[1].production_time.as_deref(), Some("1m"));
        assert_eq!(unified[1].status, Status::Complete);
        assert_eq!(unified[1].percentage, 100);
    }

    #[test]
    fn unified_material_serializes_lowercase_tags() {
        let unified = merge_sources(&[SourcedRecord::new("Nail", 0, 3, Source::Shop)], &[]);
        let json = serde_json::to_value(&unified[0]).unwrap();
        assert_eq!(json["status"], "needed");
        assert_eq!(json["sources"], serde_json::json!(["shop"]));
    }
}
