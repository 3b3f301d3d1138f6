//! Dashboard helpers over unified rows: filtering and status counts.

use serde::{Deserialize, Serialize};

use crate::status::Status;
use crate::unify::{Source, UnifiedMaterial};

/// Optional filters, combined with AND. An empty filter keeps every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialFilter {
    /// Case-insensitive substring of the material name.
    pub search: Option<String>,
    pub source: Option<Source>,
    pub status: Option<Status>,
}

impl MaterialFilter {
    pub fn matches(&self, row: &UnifiedMaterial) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !row.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(source) = self.source {
            if !row.sources.contains(&source) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if row.status != status {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[UnifiedMaterial]) -> Vec<UnifiedMaterial> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub complete: usize,
    pub partial: usize,
    pub needed: usize,
}

impl DashboardStats {
    pub fn from_rows(rows: &[UnifiedMaterial]) -> Self {
        rows.iter().fold(Self::default(), |mut stats, row| {
            stats.total += 1;
            match row.status {
                Status::Complete => stats.complete += 1,
                Status::Partial => stats.partial += 1,
                Status::Needed => stats.needed += 1,
            }
            stats
        })
    }
}
