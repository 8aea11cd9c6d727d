//! Generational arena and weak handle sets
//!
//! The resolver keeps entities, containers and type nodes in arenas and
//! hands out [`ArenaId`] handles. Releasing a slot bumps its generation, so
//! every handle issued before the release becomes stale and lookups through
//! it report "absent". [`WeakSet`] builds on this: it stores handles without
//! keeping their values alive and skips stale entries on iteration.

use super::id_types::ArenaId;
use std::marker::PhantomData;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slab of values addressed by generation-checked handles
#[derive(Debug)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _id: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }

    /// Store a value and return its handle
    pub fn alloc(&mut self, value: T) -> I {
        self.alloc_with(|_| value)
    }

    /// Store a value that needs to know its own handle
    pub fn alloc_with(&mut self, make: impl FnOnce(I) -> T) -> I {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let id = I::from_parts(index, slot.generation);
            slot.value = Some(make(id));
            return id;
        }

        let index = self.slots.len() as u32;
        let id = I::from_parts(index, 0);
        self.slots.push(Slot {
            generation: 0,
            value: Some(make(id)),
        });
        id
    }

    /// Release a value; every outstanding handle to it becomes stale
    pub fn remove(&mut self, id: I) -> Option<T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live values with their handles
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (I::from_parts(index as u32, slot.generation), value))
        })
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Set of handles that does not keep its members alive
///
/// Members are checked against the owning arena on every read; released
/// members are skipped and dropped on the next [`WeakSet::prune`].
#[derive(Debug, Clone)]
pub struct WeakSet<I: ArenaId> {
    members: Vec<I>,
}

impl<I: ArenaId> WeakSet<I> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Insert a handle; returns false if it was already present
    pub fn insert(&mut self, id: I) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    pub fn remove(&mut self, id: I) -> bool {
        match self.members.iter().position(|&member| member == id) {
            Some(pos) => {
                self.members.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Forget every member that is no longer live in `arena`
    pub fn prune<T>(&mut self, arena: &Arena<I, T>) {
        self.members.retain(|&id| arena.contains(id));
    }

    /// Live members, in insertion order (modulo removals)
    pub fn iter<'a, T>(&'a self, arena: &'a Arena<I, T>) -> impl Iterator<Item = I> + 'a {
        self.members
            .iter()
            .copied()
            .filter(move |&id| arena.contains(id))
    }

    /// Number of stored handles, including stale ones not yet pruned
    pub fn raw_len(&self) -> usize {
        self.members.len()
    }
}

impl<I: ArenaId> Default for WeakSet<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::id_types::EntityId;

    #[test]
    fn test_alloc_and_get() {
        let mut arena: Arena<EntityId, &str> = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");

        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena: Arena<EntityId, u32> = Arena::new();
        let first = arena.alloc(1);
        assert_eq!(arena.remove(first), Some(1));

        let second = arena.alloc(2);
        assert_eq!(first.index(), second.index());
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&2));
        assert_eq!(arena.remove(first), None);
    }

    #[test]
    fn test_alloc_with_sees_own_id() {
        let mut arena: Arena<EntityId, EntityId> = Arena::new();
        let id = arena.alloc_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
    }

    #[test]
    fn test_weak_set_skips_released() {
        let mut arena: Arena<EntityId, u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);

        let mut set = WeakSet::new();
        assert!(set.insert(a));
        assert!(set.insert(b));
        assert!(!set.insert(a));

        arena.remove(a);
        // Reusing the slot must not resurrect the old member.
        let c = arena.alloc(3);
        assert_eq!(c.index(), a.index());

        assert_eq!(set.iter(&arena).collect::<Vec<_>>(), vec![b]);
        assert_eq!(set.raw_len(), 2);
        set.prune(&arena);
        assert_eq!(set.raw_len(), 1);
    }
}
