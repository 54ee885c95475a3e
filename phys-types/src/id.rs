//! Externally assigned entity identifiers.

use crate::WorldError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caller-assigned identifier for a body or ghost volume.
///
/// The world reports collisions and ray hits in terms of these values rather
/// than internal object handles, so an embedder can keep using whatever
/// numbering scheme it already has for its entities.
///
/// Two raw values are out of band and rejected at every creation boundary:
///
/// - `0` means "unassigned" inside the registries and must never be a real
///   entity identifier.
/// - `-1` is [`EntityId::NONE`], the "no hit" / "no identity" sentinel
///   returned by queries.
///
/// Reserving both by construction removes the ambiguity of an id that is
/// simultaneously a legitimate entity and the miss sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(pub i64);

impl EntityId {
    /// Sentinel distinct from any valid identifier ("no hit", "no identity").
    pub const NONE: Self = Self(-1);

    /// Reserved "unassigned" value; never a valid identifier.
    pub const RESERVED: Self = Self(0);

    /// Create an identifier from a raw value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whether this value may be assigned to an entity.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        self.0 != Self::RESERVED.0 && self.0 != Self::NONE.0
    }

    /// Reject the reserved values at a creation boundary.
    pub fn ensure_assignable(self) -> crate::Result<()> {
        if self.is_assignable() {
            Ok(())
        } else {
            Err(WorldError::ReservedIdentifier(self.0))
        }
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
