//! Requirement expansion: flatten "N units of X" into per-material totals.
//!
//! Depth-first over the recipe graph. Every visited node (the requested item,
//! intermediates and leaves) contributes its multiplier to its own total, so an
//! intermediate is demanded in its own right as well as through its components.
//! Paths that reach the same material accumulate.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use craftledger_core::{DomainError, DomainResult};

use crate::catalog::{Catalog, Recipe};

/// Totals closer than this to an integer are treated as that integer before
/// rounding up (absorbs float noise from fractional ratios).
const SNAP_EPSILON: f64 = 1e-9;

/// Total quantity of one material demanded by an expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub material: String,
    pub quantity: u64,
}

/// Flattened material demand, in first-visit (catalog declaration) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Requirement>", into = "Vec<Requirement>")]
pub struct RequirementSet {
    entries: Vec<Requirement>,
    index: HashMap<String, usize>,
}

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to `material`, appending it if unseen.
    pub fn add(&mut self, material: &str, quantity: u64) {
        match self.index.get(material) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.quantity = entry.quantity.saturating_add(quantity);
            }
            None => {
                self.index.insert(material.to_string(), self.entries.len());
                self.entries.push(Requirement {
                    material: material.to_string(),
                    quantity,
                });
            }
        }
    }

    /// Sum another set into this one, keeping this set's order first.
    pub fn merge(&mut self, other: &RequirementSet) {
        for r in &other.entries {
            self.add(&r.material, r.quantity);
        }
    }

    pub fn get(&self, material: &str) -> Option<u64> {
        self.index.get(material).map(|&i| self.entries[i].quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Requirement>> for RequirementSet {
    fn from(entries: Vec<Requirement>) -> Self {
        let mut set = RequirementSet::new();
        for r in entries {
            set.add(&r.material, r.quantity);
        }
        set
    }
}

impl From<RequirementSet> for Vec<Requirement> {
    fn from(set: RequirementSet) -> Self {
        set.entries
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Largest total an expansion reports. Ledger deltas are signed 64-bit.
pub const MAX_TOTAL: u64 = i64::MAX as u64;

/// Fractional totals above 2^53 no longer resolve whole units in an `f64`.
const MAX_FRACTIONAL_WHOLE: u128 = 1 << 53;
const MAX_FRACTIONAL_TOTAL: f64 = MAX_FRACTIONAL_WHOLE as f64;

/// Units of a node per requested root unit.
///
/// Stays an exact integer while every ratio on the path is whole; the first
/// fractional ratio switches the rest of that path to `f64`.
#[derive(Debug, Clone, Copy)]
enum Multiplier {
    Whole(u128),
    Fractional(f64),
}

impl Multiplier {
    fn scale(self, per_unit: f64, material: &str) -> DomainResult<Self> {
        match self {
            Multiplier::Whole(m) if per_unit.fract() == 0.0 && per_unit < u64::MAX as f64 => m
                .checked_mul(per_unit as u128)
                .map(Multiplier::Whole)
                .ok_or_else(|| too_large(material)),
            Multiplier::Whole(m) if m > MAX_FRACTIONAL_WHOLE => Err(too_large(material)),
            Multiplier::Whole(m) => Ok(Multiplier::Fractional(m as f64 * per_unit)),
            Multiplier::Fractional(m) => Ok(Multiplier::Fractional(m * per_unit)),
        }
    }
}

#[derive(Debug, Default)]
struct Total {
    whole: u128,
    fractional: f64,
}

/// Per-material totals, rounded up once at the end.
#[derive(Default)]
struct Accumulator {
    totals: Vec<(String, Total)>,
    index: HashMap<String, usize>,
}

impl Accumulator {
    fn add(&mut self, material: &str, quantity: Multiplier) -> DomainResult<()> {
        let i = match self.index.get(material) {
            Some(&i) => i,
            None => {
                self.index.insert(material.to_string(), self.totals.len());
                self.totals.push((material.to_string(), Total::default()));
                self.totals.len() - 1
            }
        };
        let total = &mut self.totals[i].1;
        match quantity {
            Multiplier::Whole(q) => {
                total.whole = total
                    .whole
                    .checked_add(q)
                    .filter(|w| *w <= u128::from(MAX_TOTAL))
                    .ok_or_else(|| too_large(material))?;
            }
            Multiplier::Fractional(q) => total.fractional += q,
        }
        Ok(())
    }

    fn finish(self) -> DomainResult<RequirementSet> {
        let mut set = RequirementSet::new();
        for (material, total) in self.totals {
            if !total.fractional.is_finite() || total.fractional > MAX_FRACTIONAL_TOTAL {
                return Err(too_large(&material));
            }
            let quantity = total.whole + u128::from(round_up(total.fractional));
            let quantity = u64::try_from(quantity)
                .ok()
                .filter(|q| *q <= MAX_TOTAL)
                .ok_or_else(|| too_large(&material))?;
            set.add(&material, quantity);
        }
        Ok(set)
    }
}

fn too_large(material: &str) -> DomainError {
    DomainError::invalid_quantity(format!("total for {material} exceeds {MAX_TOTAL}"))
}

/// Round a non-negative fractional total up to whole units. Callers bound it
/// by `MAX_FRACTIONAL_TOTAL`.
fn round_up(total: f64) -> u64 {
    let nearest = total.round();
    let rounded = if (total - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        total.ceil()
    };
    rounded as u64
}

struct Frame<'a> {
    item: &'a str,
    recipe: &'a Recipe,
    multiplier: Multiplier,
    next: usize,
}

/// Expand `quantity` units of `item` against `catalog`.
///
/// Fails with `InvalidQuantity` for a zero quantity or a total above
/// [`MAX_TOTAL`], and with `CycleDetected` when an item reappears on its own
/// ancestor path. Paths with only whole ratios are summed exactly. The traversal uses an
/// explicit stack, so deep catalogs cannot overflow the call stack.
pub fn expand<'a>(item: &'a str, quantity: u64, catalog: &'a Catalog) -> DomainResult<RequirementSet> {
    if quantity == 0 {
        return Err(DomainError::invalid_quantity("build quantity must be positive"));
    }
    let item = item.trim();
    if item.is_empty() {
        return Err(DomainError::validation("item name cannot be empty"));
    }

    let mut acc = Accumulator::default();
    let mut on_path: HashSet<&'a str> = HashSet::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    let root = Multiplier::Whole(u128::from(quantity));
    acc.add(item, root)?;
    if let Some(recipe) = catalog.recipe(item) {
        on_path.insert(item);
        stack.push(Frame {
            item,
            recipe,
            multiplier: root,
            next: 0,
        });
    }

    while let Some(frame) = stack.last_mut() {
        let recipe: &'a Recipe = frame.recipe;
        let Some(component) = recipe.components().get(frame.next) else {
            on_path.remove(frame.item);
            stack.pop();
            continue;
        };
        frame.next += 1;

        let name = component.item.as_str();
        if on_path.contains(name) {
            tracing::warn!(item = %name, root = %item, "recipe cycle detected");
            return Err(DomainError::cycle(name));
        }

        let multiplier = frame.multiplier.scale(component.per_unit, name)?;
        acc.add(name, multiplier)?;
        if let Some(child) = catalog.recipe(name) {
            on_path.insert(name);
            stack.push(Frame {
                item: name,
                recipe: child,
                multiplier,
                next: 0,
            });
        }
    }

    let set = acc.finish()?;
    tracing::debug!(item = %item, quantity, materials = set.len(), "expanded requirements");
    Ok(set)
}
