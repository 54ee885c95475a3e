//! Per-step collision event pairs.
//!
//! The world reports two structurally different kinds of contact on two
//! separate channels: persistent rigid/rigid contacts ([`ContactPair`],
//! returned by the step call) and ghost/rigid overlaps ([`GhostOverlap`],
//! retained on the world and polled separately). Keeping the channels apart
//! spares every frame a tagged-union decode for consumers that only care
//! about one kind.

use crate::EntityId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rigid/rigid persistent-contact pair, reported once per step.
///
/// The pair is unordered: which participant lands in `first` depends on
/// manifold enumeration order, so consumers should use [`matches`] or
/// [`involves`] rather than comparing fields positionally.
///
/// [`matches`]: ContactPair::matches
/// [`involves`]: ContactPair::involves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPair {
    /// Identifier of one participant.
    pub first: EntityId,
    /// Identifier of the other participant.
    pub second: EntityId,
}

impl ContactPair {
    /// Create a contact pair.
    #[must_use]
    pub const fn new(first: EntityId, second: EntityId) -> Self {
        Self { first, second }
    }

    /// Whether the given identifier is one of the two participants.
    #[must_use]
    pub fn involves(&self, id: EntityId) -> bool {
        self.first == id || self.second == id
    }

    /// Order-insensitive comparison against a pair of identifiers.
    #[must_use]
    pub fn matches(&self, a: EntityId, b: EntityId) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// A ghost-volume/rigid-body overlap, reported once per step.
///
/// Unlike [`ContactPair`] the roles here are fixed: `ghost` is always the
/// sensor, `body` the solid object inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GhostOverlap {
    /// Identifier of the ghost volume.
    pub ghost: EntityId,
    /// Identifier of the overlapped solid body.
    pub body: EntityId,
}

impl GhostOverlap {
    /// Create a ghost overlap event.
    #[must_use]
    pub const fn new(ghost: EntityId, body: EntityId) -> Self {
        Self { ghost, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_pair_matching_is_order_insensitive() {
        let pair = ContactPair::new(EntityId::new(3), EntityId::new(7));
        assert!(pair.matches(EntityId::new(7), EntityId::new(3)));
        assert!(pair.matches(EntityId::new(3), EntityId::new(7)));
        assert!(!pair.matches(EntityId::new(3), EntityId::new(8)));
        assert!(pair.involves(EntityId::new(7)));
        assert!(!pair.involves(EntityId::new(1)));
    }
}
