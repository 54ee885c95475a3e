//! Generational registries for world-owned entities.
//!
//! Bodies and ghost volumes live in [`Arena`]s and are addressed by
//! [`Handle`]s. A handle pairs a slot index with a generation counter; the
//! slot is reusable after removal, but a stale handle from before the reuse
//! carries the old generation and is rejected instead of silently resolving
//! to the new occupant. This makes double-removal and use-after-remove
//! explicit `Err` paths rather than undefined lookups.

use phys_types::{EntityId, WorldError};

/// Raw slot address plus generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index, for diagnostics.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// Entities that carry a caller-assigned identifier.
pub trait Identified {
    /// The identifier assigned at creation time.
    fn id(&self) -> EntityId;
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

/// Generational arena of world entities.
///
/// Insertion returns a [`Handle`]; removal bumps the slot generation and
/// pushes the slot onto a free list for reuse.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    kind: &'static str,
}

impl<T: Identified> Arena<T> {
    /// Create an empty arena. `kind` names the registry in errors.
    #[must_use]
    pub const fn new(kind: &'static str) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            kind,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an entry, reusing a freed slot when one is available.
    pub fn insert(&mut self, entry: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return Handle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        Handle {
            index,
            generation: 0,
        }
    }

    /// Remove an entry, invalidating the handle.
    ///
    /// A handle that was already removed, or that refers to a reused slot,
    /// returns [`WorldError::StaleHandle`].
    pub fn remove(&mut self, handle: Handle) -> Result<T, WorldError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(WorldError::StaleHandle {
                kind: self.kind,
                index: handle.index,
            })?;
        let entry = slot.entry.take().ok_or(WorldError::StaleHandle {
            kind: self.kind,
            index: handle.index,
        })?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Ok(entry)
    }

    /// Resolve a handle to a shared reference.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Resolve a handle to a mutable reference.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Find the entry carrying the given identifier.
    ///
    /// The reserved "unassigned" value never matches, so a caller probing
    /// with it sees an empty registry rather than a phantom entity.
    #[must_use]
    pub fn lookup(&self, id: EntityId) -> Option<&T> {
        if !id.is_assignable() {
            return None;
        }
        self.iter().find(|entry| entry.id() == id)
    }

    /// Find the handle of the entry carrying the given identifier.
    #[must_use]
    pub fn lookup_handle(&self, id: EntityId) -> Option<Handle> {
        if !id.is_assignable() {
            return None;
        }
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let entry = slot.entry.as_ref()?;
            (entry.id() == id).then(|| Handle {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Snapshot the handles of all live entries, in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .map(|(index, slot)| Handle {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    /// Iterate over live entries.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.entry.as_ref())
    }

    /// Iterate over live entries mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut())
    }

    /// Resolve two distinct handles to mutable references at once.
    ///
    /// Used by the contact resolver, which needs simultaneous mutable access
    /// to both participants. Slots are split at the higher index so the two
    /// borrows are provably disjoint.
    pub fn get2_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a.index == b.index {
            return None;
        }
        let (first, second, swap) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let (left, right) = self.slots.split_at_mut(second.index as usize);
        let lo = left.get_mut(first.index as usize)?;
        let hi = right.first_mut()?;
        if lo.generation != first.generation || hi.generation != second.generation {
            return None;
        }
        let lo = lo.entry.as_mut()?;
        let hi = hi.entry.as_mut()?;
        if swap {
            Some((hi, lo))
        } else {
            Some((lo, hi))
        }
    }
}

/// Handle to a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) Handle);

/// Handle to a ghost volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GhostHandle(pub(crate) Handle);

impl BodyHandle {
    /// Slot index, for diagnostics.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0.index()
    }
}

impl GhostHandle {
    /// Slot index, for diagnostics.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0.index()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry(EntityId);

    impl Identified for Entry {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let mut arena = Arena::new("test");
        let h = arena.insert(Entry(EntityId::new(5)));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(h).unwrap().0, EntityId::new(5));

        let removed = arena.remove(h).unwrap();
        assert_eq!(removed.0, EntityId::new(5));
        assert!(arena.is_empty());
        assert!(arena.get(h).is_none());
    }

    #[test]
    fn test_double_remove_is_stale() {
        let mut arena = Arena::new("body");
        let h = arena.insert(Entry(EntityId::new(1)));
        arena.remove(h).unwrap();
        let err = arena.remove(h).unwrap_err();
        assert_eq!(err, WorldError::stale_handle("body", 0));
    }

    #[test]
    fn test_stale_handle_does_not_see_slot_reuse() {
        let mut arena = Arena::new("test");
        let h1 = arena.insert(Entry(EntityId::new(1)));
        arena.remove(h1).unwrap();

        // The freed slot is reused with a bumped generation.
        let h2 = arena.insert(Entry(EntityId::new(2)));
        assert_eq!(h1.index(), h2.index());
        assert!(arena.get(h1).is_none());
        assert_eq!(arena.get(h2).unwrap().0, EntityId::new(2));
    }

    #[test]
    fn test_lookup_ignores_reserved_id() {
        let mut arena = Arena::new("test");
        arena.insert(Entry(EntityId::new(7)));
        assert!(arena.lookup(EntityId::new(7)).is_some());
        assert!(arena.lookup(EntityId::RESERVED).is_none());
        assert!(arena.lookup(EntityId::NONE).is_none());
        assert!(arena.lookup(EntityId::new(8)).is_none());
    }

    #[test]
    fn test_get2_mut_disjoint_borrows() {
        let mut arena = Arena::new("test");
        let a = arena.insert(Entry(EntityId::new(1)));
        let b = arena.insert(Entry(EntityId::new(2)));
        let (ea, eb) = arena.get2_mut(a, b).unwrap();
        std::mem::swap(&mut ea.0, &mut eb.0);
        assert_eq!(arena.get(a).unwrap().0, EntityId::new(2));
        assert_eq!(arena.get(b).unwrap().0, EntityId::new(1));

        assert!(arena.get2_mut(a, a).is_none());
    }
}
