use serde::{Deserialize, Serialize};

use craftledger_core::{apply_delta, DomainError, DomainResult, Entity};

/// Ledger record for one material. Created on first reference, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub have_qty: u64,
    pub required_qty: u64,
}

impl Material {
    /// Zero-valued record for a material seen for the first time.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            have_qty: 0,
            required_qty: 0,
        }
    }

    /// Apply a delta in place, returning the discarded (clamped) excess as
    /// `(have_lost, required_lost)`.
    pub fn apply(&mut self, delta: &MaterialDelta) -> (u64, u64) {
        let (have, have_lost) = apply_delta(self.have_qty, delta.have);
        let (required, required_lost) = apply_delta(self.required_qty, delta.required);
        self.have_qty = have;
        self.required_qty = required;
        (have_lost, required_lost)
    }
}

impl Entity for Material {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Signed change to one material's quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDelta {
    pub material: String,
    pub have: i64,
    pub required: i64,
}

impl MaterialDelta {
    pub fn new(material: impl Into<String>, have: i64, required: i64) -> Self {
        Self {
            material: material.into(),
            have,
            required,
        }
    }

    /// Demand registered by a build commit: required only, nothing is had yet.
    ///
    /// Quantities above `i64::MAX` are rejected with `InvalidQuantity`.
    pub fn require(material: impl Into<String>, quantity: u64) -> DomainResult<Self> {
        let material = material.into();
        let q = to_signed(&material, quantity)?;
        Ok(Self::new(material, 0, q))
    }

    /// Symmetric retirement when a build completes: both sides drop.
    pub fn retire(material: impl Into<String>, quantity: u64) -> DomainResult<Self> {
        let material = material.into();
        let q = to_signed(&material, quantity)?;
        Ok(Self::new(material, -q, -q))
    }

    /// The exact negation of this delta.
    pub fn negated(&self) -> Self {
        Self::new(
            self.material.clone(),
            self.have.saturating_neg(),
            self.required.saturating_neg(),
        )
    }
}

fn to_signed(material: &str, quantity: u64) -> DomainResult<i64> {
    i64::try_from(quantity).map_err(|_| {
        DomainError::invalid_quantity(format!("{material}: quantity {quantity} exceeds {}", i64::MAX))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_clamped_excess() {
        let mut m = Material { name: "Brick".into(), have_qty: 2, required_qty: 10 };
        let lost = m.apply(&MaterialDelta::retire("Brick", 5).unwrap());
        assert_eq!((m.have_qty, m.required_qty), (0, 5));
        assert_eq!(lost, (3, 0));
    }

    #[test]
    fn require_only_touches_required() {
        let mut m = Material::empty("Mortar");
        m.apply(&MaterialDelta::require("Mortar", 4).unwrap());
        assert_eq!((m.have_qty, m.required_qty), (0, 4));
    }

    #[test]
    fn quantities_past_signed_range_are_rejected() {
        let too_big = i64::MAX as u64 + 1;
        assert!(matches!(MaterialDelta::require("Brick", too_big), Err(DomainError::InvalidQuantity(_))));
        assert!(matches!(MaterialDelta::retire("Brick", too_big), Err(DomainError::InvalidQuantity(_))));

        let max = MaterialDelta::retire("Brick", i64::MAX as u64).unwrap();
        assert_eq!((max.have, max.required), (-i64::MAX, -i64::MAX));
    }
}
