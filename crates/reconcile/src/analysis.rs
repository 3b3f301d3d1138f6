//! Per-build completion: how many of a build's materials are already on hand.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use craftledger_catalog::RequirementSet;
use craftledger_ledger::Material;

use crate::status::percentage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAnalysis {
    pub total_materials: usize,
    /// Materials whose on-hand quantity covers what this build needs.
    pub available_materials: usize,
    pub missing_materials: usize,
    pub completion_percentage: u8,
}

/// Compare a build's expanded requirements against ledger on-hand quantities.
///
/// Materials absent from the ledger count as zero on hand.
pub fn analyze_build(requirements: &RequirementSet, materials: &[Material]) -> BuildAnalysis {
    let on_hand: HashMap<&str, u64> = materials.iter().map(|m| (m.name.as_str(), m.have_qty)).collect();

    let total_materials = requirements.len();
    let available_materials = requirements
        .iter()
        .filter(|r| on_hand.get(r.material.as_str()).copied().unwrap_or(0) >= r.quantity)
        .count();

    BuildAnalysis {
        total_materials,
        available_materials,
        missing_materials: total_materials - available_materials,
        completion_percentage: percentage(available_materials as u64, total_materials as u64),
    }
}
