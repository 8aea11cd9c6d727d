//! Handle types for resolver arenas
//!
//! Every arena-owned value is referenced through a lightweight handle made
//! of a slot index and a generation. Handles of different kinds cannot be
//! mixed up, and a handle whose slot was released (and possibly reused)
//! never aliases the new occupant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait implemented by every arena handle
pub trait ArenaId: Copy + Eq + std::hash::Hash + fmt::Debug {
    /// Build a handle from its slot index and generation
    fn from_parts(index: u32, generation: u32) -> Self;

    /// Slot index inside the owning arena
    fn index(self) -> u32;

    /// Generation of the slot at the time the handle was issued
    fn generation(self) -> u32;
}

macro_rules! define_arena_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Get the raw slot index of this handle
            pub const fn as_raw(self) -> u32 {
                self.index
            }
        }

        impl ArenaId for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}v{})", stringify!($name), self.index, self.generation)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.index)
            }
        }
    };
}

define_arena_id! {
    /// Unique identifier for a declared entity (type, function, variable,
    /// thread marker or package)
    EntityId
}

define_arena_id! {
    /// Unique identifier for a symbol container (package or type members)
    ContainerId
}

define_arena_id! {
    /// Unique identifier for a node of the inheritance graph
    TypeNodeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_compare_generation() {
        let a = EntityId::from_parts(3, 0);
        let b = EntityId::from_parts(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(a.as_raw(), 3);
    }

    #[test]
    fn test_display() {
        let id = TypeNodeId::from_parts(7, 2);
        assert_eq!(id.to_string(), "TypeNodeId(7)");
        assert_eq!(format!("{:?}", id), "TypeNodeId(7v2)");
    }
}
