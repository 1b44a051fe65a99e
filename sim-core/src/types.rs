/// Identifier for a branch in a [`crate::branch::BranchSet`].
///
/// This is an index into the branch arena, and is only meaningful within
/// the lifetime of a given `Tree` instance. Branches are never removed,
/// so an id stays valid once handed out.
pub type BranchId = usize;

/// Exact-value key for a branch position.
///
/// Two positions map to the same key only when both coordinates compare
/// equal as `f64` values. See [`crate::vector::Vector2Ext::position_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey(pub [u64; 2]);
