//! Quantity rules: positive requests, clamped stored values.

use crate::error::{DomainError, DomainResult};

/// Validate a requested quantity (build size, per-unit ratio, ...).
///
/// Quantities arrive as signed integers from callers; zero and negatives are rejected.
pub fn validate_quantity(quantity: i64) -> DomainResult<u64> {
    if quantity <= 0 {
        return Err(DomainError::invalid_quantity(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(quantity as u64)
}

/// Parse a user-supplied quantity string ("12"), rejecting fractions,
/// non-numbers and non-positive values.
pub fn parse_quantity(raw: &str) -> DomainResult<u64> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(q) => validate_quantity(q),
        Err(_) if raw.parse::<f64>().is_ok() => Err(DomainError::invalid_quantity(format!(
            "quantity must be a whole number, got {raw}"
        ))),
        Err(_) => Err(DomainError::invalid_quantity(format!("not a number: {raw:?}"))),
    }
}

/// Apply a signed delta to a stored quantity, flooring at zero.
///
/// Returns the new value and the part of a negative delta that was discarded.
/// Clamping is lossy: reversing the same delta later does not restore the
/// discarded excess.
pub fn apply_delta(current: u64, delta: i64) -> (u64, u64) {
    if delta >= 0 {
        (current.saturating_add(delta as u64), 0)
    } else {
        let magnitude = delta.unsigned_abs();
        if magnitude > current {
            (0, magnitude - current)
        } else {
            (current - magnitude, 0)
        }
    }
}
