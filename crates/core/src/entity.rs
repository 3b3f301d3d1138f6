//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stores key their records by `Entity::key`, so a record keeps its identity
/// across updates (a material stays addressable after its quantities drop to zero).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Key: Clone + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn key(&self) -> Self::Key;
}
