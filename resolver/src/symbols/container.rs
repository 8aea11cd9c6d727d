//! Symbol containers
//!
//! A [`SymbolContainer`] is the scope half of a package or type: a table
//! from simple name to [`OverloadSet`], a load state and an optional
//! [`Loader`] that fills the table on demand. Lookups that need the
//! loader or templates are driven by the [`Resolver`]; this module owns the
//! table, the state machine and the weak observer list.

use super::id_types::{ContainerId, EntityId};
use super::overload::OverloadSet;
use super::entity::Declaration;
use crate::names::NamePart;
use crate::resolver::Resolver;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Progress of filling a container from its loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Nothing (or only individually requested names) loaded yet
    Unloaded,
    /// A full load is running further up the call stack
    Loading,
    /// Everything the loader can provide is present
    Loaded,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
        };
        write!(f, "{}", name)
    }
}

/// What a loader reports back
#[derive(Debug)]
pub enum LoadOutcome {
    /// Everything requested has been added
    Done,
    /// The loader cannot run yet (bootstrap not finished); retry later
    NotYetReady,
    /// Declarations for the resolver to add; more may follow later
    Partial(Vec<Declaration>),
}

/// Source of a container's content
///
/// `request` is `Some(part)` for a targeted load of one name and `None` for
/// a full load. A loader may add entities directly through `resolver`, or
/// return them in [`LoadOutcome::Partial`].
pub trait Loader {
    fn load(
        &mut self,
        resolver: &mut Resolver,
        container: ContainerId,
        request: Option<&NamePart>,
    ) -> LoadOutcome;
}

impl<F> Loader for F
where
    F: FnMut(&mut Resolver, ContainerId, Option<&NamePart>) -> LoadOutcome,
{
    fn load(
        &mut self,
        resolver: &mut Resolver,
        container: ContainerId,
        request: Option<&NamePart>,
    ) -> LoadOutcome {
        self(resolver, container, request)
    }
}

/// Pin a closure to the [`Loader`] signature so its argument types infer
pub fn loader<F>(f: F) -> F
where
    F: FnMut(&mut Resolver, ContainerId, Option<&NamePart>) -> LoadOutcome,
{
    f
}

/// Listener notified whenever an entity is added to a watched container
pub trait NameObserver {
    fn entity_added(&self, resolver: &Resolver, container: ContainerId, entity: EntityId);
}

type NameTable = IndexMap<String, OverloadSet, FxBuildHasher>;

/// Scope holding overload sets by simple name
pub struct SymbolContainer {
    entity: EntityId,
    /// Created on first insertion
    table: Option<NameTable>,
    state: LoadState,
    loader: Option<Box<dyn Loader>>,
    observers: Vec<Weak<dyn NameObserver>>,
}

impl SymbolContainer {
    pub fn new(entity: EntityId, loader: Option<Box<dyn Loader>>) -> Self {
        Self {
            entity,
            table: None,
            state: LoadState::Unloaded,
            loader,
            observers: Vec::new(),
        }
    }

    /// Entity this container is the scope of
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LoadState) {
        self.state = state;
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Take the loader out for the duration of a call into it. While it is
    /// out, nested load requests for this container find no loader.
    pub(crate) fn take_loader(&mut self) -> Option<Box<dyn Loader>> {
        self.loader.take()
    }

    pub(crate) fn restore_loader(&mut self, loader: Box<dyn Loader>) {
        self.loader = Some(loader);
    }

    pub fn overloads(&self, name: &str) -> Option<&OverloadSet> {
        self.table.as_ref()?.get(name)
    }

    /// Overload set for `name`, creating the table and the set as needed
    pub(crate) fn overloads_mut(&mut self, name: &str) -> &mut OverloadSet {
        let table = self.table.get_or_insert_with(NameTable::default);
        if !table.contains_key(name) {
            table.insert(name.to_string(), OverloadSet::new());
        }
        &mut table[name]
    }

    /// `(name, overloads)` pairs in insertion order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.table.as_ref().map(|table| table.iter()),
        }
    }

    /// Every concrete entity, templates excluded
    pub fn content(&self) -> Vec<EntityId> {
        self.iter()
            .flat_map(|(_, overloads)| overloads.entities())
            .collect()
    }

    /// Number of distinct simple names
    pub fn name_count(&self) -> usize {
        self.table.as_ref().map_or(0, |table| table.len())
    }

    pub fn watch<O: NameObserver + 'static>(&mut self, observer: &Rc<O>) {
        let weak: Weak<O> = Rc::downgrade(observer);
        let weak: Weak<dyn NameObserver> = weak;
        self.observers.push(weak);
    }

    pub fn unwatch<O: NameObserver + 'static>(&mut self, observer: &Rc<O>) {
        let target = Rc::as_ptr(observer) as *const ();
        self.observers
            .retain(|weak| weak.as_ptr() as *const () != target);
    }

    /// Observers still alive; dead ones are dropped from the list
    pub(crate) fn live_observers(&mut self) -> Vec<Rc<dyn NameObserver>> {
        self.observers.retain(|weak| weak.strong_count() > 0);
        self.observers.iter().filter_map(Weak::upgrade).collect()
    }

    /// Number of registered observers, including dead ones not yet dropped
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for SymbolContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolContainer")
            .field("entity", &self.entity)
            .field("state", &self.state)
            .field("names", &self.name_count())
            .field("lazy", &self.loader.is_some())
            .finish()
    }
}

/// Iterator over a container's overload sets
pub struct Iter<'a> {
    inner: Option<indexmap::map::Iter<'a, String, OverloadSet>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a OverloadSet);

    fn next(&mut self) -> Option<Self::Item> {
        let (name, overloads) = self.inner.as_mut()?.next()?;
        Some((name.as_str(), overloads))
    }
}
