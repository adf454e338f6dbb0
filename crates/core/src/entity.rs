//! Entity trait: records the backend identifies by a numeric key.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Whether the backend has soft-deleted this record.
    fn is_deleted(&self) -> bool {
        false
    }
}
