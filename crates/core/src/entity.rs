//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Persistence adapters key records by [`Entity::id`] and use
/// [`Entity::KIND`] when reporting missing or duplicate records.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Human-readable entity kind (e.g. "product"), used in error messages.
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
