//! Entities, the containers that hold them and their storage

pub mod arena;
pub mod container;
pub mod entity;
pub mod id_types;
pub mod overload;

pub use arena::{Arena, WeakSet};
pub use container::{
    loader, Iter, LoadOutcome, LoadState, Loader, NameObserver, SymbolContainer,
};
pub use entity::{DeclKind, Declaration, Entity, EntityKind};
pub use id_types::{ArenaId, ContainerId, EntityId, TypeNodeId};
pub use overload::{Overload, OverloadSet, Template};
