//! Resolver session
//!
//! The [`Resolver`] is the context handle a compilation driver threads
//! through every call. It owns the arenas of entities, containers and type
//! nodes plus the root package, so several independent sessions can live
//! in one process.
//!
//! Lookups follow a two-tier lazy strategy. A miss in a container that is
//! not fully loaded first asks the loader for just the requested name and
//! only then falls back to a full load:
//!
//! ```text
//! find(pkg, "Foo")
//!   try_find                 table + overload resolution
//!   load_name(pkg, "Foo")    loader(Some("Foo"))
//!   try_find
//!   force_load(pkg)          loader(None), Unloaded -> Loading -> Loaded
//!   try_find
//! ```

use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::hierarchy::TypeHierarchy;
use crate::names::{NameCodec, NamePart, Params, QualifiedName, TypeSignature};
use crate::symbols::{
    Arena, ContainerId, DeclKind, Declaration, Entity, EntityId, EntityKind, Iter, LoadOutcome,
    LoadState, NameObserver, SymbolContainer, Template, TypeNodeId,
};
use diagnostics::{DiagnosticSink, SourceLocation};
use log::{debug, trace, warn};
use std::borrow::Cow;
use std::rc::Rc;

/// Name resolution session
pub struct Resolver {
    entities: Arena<EntityId, Entity>,
    containers: Arena<ContainerId, SymbolContainer>,
    hierarchy: TypeHierarchy,
    root: ContainerId,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let mut entities = Arena::new();
        let mut containers = Arena::new();
        let mut root = None;
        entities.alloc_with(|id| {
            let container = containers.alloc(SymbolContainer::new(id, None));
            root = Some(container);
            Entity {
                name: String::new(),
                params: Params::new(),
                kind: EntityKind::Package(container),
                owner: None,
                location: SourceLocation::unknown(),
            }
        });

        Self {
            entities,
            containers,
            hierarchy: TypeHierarchy::new(config.max_hierarchy_depth),
            root: root.unwrap_or_else(|| unreachable!("root container allocated above")),
            config,
        }
    }

    /// Root package of this session
    pub fn root(&self) -> ContainerId {
        self.root
    }

    pub fn root_entity(&self) -> EntityId {
        self.container_ref(self.root).entity()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn container(&self, id: ContainerId) -> Option<&SymbolContainer> {
        self.containers.get(id)
    }

    /// Scope held by `entity` (packages and types)
    pub fn scope_of(&self, entity: EntityId) -> Option<ContainerId> {
        self.entities.get(entity)?.container()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn entity_ref(&self, id: EntityId) -> &Entity {
        self.entities
            .get(id)
            .unwrap_or_else(|| panic!("entity {:?} was released", id))
    }

    fn container_ref(&self, id: ContainerId) -> &SymbolContainer {
        self.containers
            .get(id)
            .unwrap_or_else(|| panic!("container {:?} was released", id))
    }

    fn container_mut(&mut self, id: ContainerId) -> &mut SymbolContainer {
        self.containers
            .get_mut(id)
            .unwrap_or_else(|| panic!("container {:?} was released", id))
    }

    /// Create an unowned entity from `decl`
    pub fn declare(&mut self, decl: Declaration) -> ResolveResult<EntityId> {
        let Declaration {
            name,
            params,
            kind,
            location,
        } = decl;

        let make = |kind: EntityKind| Entity {
            name,
            params,
            kind,
            owner: None,
            location,
        };

        let id = match kind {
            DeclKind::Type { super_type } => {
                let parent = super_type.map(|s| self.type_node(s)).transpose()?;
                let hierarchy = &mut self.hierarchy;
                let containers = &mut self.containers;
                let id = self.entities.alloc_with(|id| {
                    make(EntityKind::Type {
                        node: hierarchy.create(id),
                        members: containers.alloc(SymbolContainer::new(id, None)),
                    })
                });

                if let Some(parent) = parent {
                    let node = self.type_node(id)?;
                    if let Err(err) = self.hierarchy.set_super(node, Some(parent)) {
                        self.discard(id);
                        return Err(err);
                    }
                }
                id
            }
            DeclKind::Function { result } => self.entities.alloc(make(EntityKind::Function { result })),
            DeclKind::Variable { ty } => self.entities.alloc(make(EntityKind::Variable { ty })),
            DeclKind::ThreadMarker => self.entities.alloc(make(EntityKind::ThreadMarker)),
            DeclKind::Package { loader } => {
                let containers = &mut self.containers;
                self.entities.alloc_with(|id| {
                    make(EntityKind::Package(
                        containers.alloc(SymbolContainer::new(id, loader)),
                    ))
                })
            }
        };

        trace!("declared {} {:?}", self.entity_ref(id).kind, id);
        Ok(id)
    }

    /// Insert `entity` into `container` under its simple name.
    ///
    /// Fails if the container already holds an entity with the same name
    /// and signature, or if `entity` was inserted somewhere before.
    pub fn add(&mut self, container: ContainerId, entity: EntityId) -> ResolveResult<()> {
        let ent = self.entity_ref(entity);
        if let Some(owner) = ent.owner {
            return Err(ResolveError::AlreadyOwned { entity, owner });
        }
        let name = ent.name.clone();
        let params = ent.params.clone();
        let location = ent.location;

        if let Err(existing) = self.container_mut(container).overloads_mut(&name).add(params, entity) {
            return Err(ResolveError::DuplicateDefinition {
                previous: self.entity_ref(existing).location,
                name,
                existing,
                location,
            });
        }

        if let Some(ent) = self.entities.get_mut(entity) {
            ent.owner = Some(container);
        }
        self.notify_added(container, entity);
        Ok(())
    }

    /// Declare and insert in one step; nothing is left behind on failure
    pub fn define(&mut self, container: ContainerId, decl: Declaration) -> ResolveResult<EntityId> {
        let entity = self.declare(decl)?;
        if let Err(err) = self.add(container, entity) {
            self.discard(entity);
            return Err(err);
        }
        Ok(entity)
    }

    /// Define each declaration of a compilation unit in `container`.
    ///
    /// Failures are reported to `sink` and the remaining declarations are
    /// still defined. Returns the entities that were defined.
    pub fn define_reporting(
        &mut self,
        container: ContainerId,
        decls: impl IntoIterator<Item = Declaration>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<EntityId> {
        let mut defined = Vec::new();
        for decl in decls {
            match self.define(container, decl) {
                Ok(entity) => defined.push(entity),
                Err(err) => {
                    debug!("reporting {}", err);
                    err.report(sink);
                }
            }
        }
        defined
    }

    /// Register a template under its name; never fails
    pub fn add_template(&mut self, container: ContainerId, template: Rc<dyn Template>) {
        let name = template.name().to_string();
        self.container_mut(container)
            .overloads_mut(&name)
            .add_template(template);
    }

    fn notify_added(&mut self, container: ContainerId, entity: EntityId) {
        let observers = self.container_mut(container).live_observers();
        for observer in observers {
            observer.entity_added(self, container, entity);
        }
    }

    /// Notify `observer` of every entity added to `container` while the
    /// observer is alive
    pub fn watch<O: NameObserver + 'static>(&mut self, container: ContainerId, observer: &Rc<O>) {
        self.container_mut(container).watch(observer);
    }

    pub fn unwatch<O: NameObserver + 'static>(&mut self, container: ContainerId, observer: &Rc<O>) {
        self.container_mut(container).unwatch(observer);
    }

    /// Every concrete entity in `container`, in unspecified order
    pub fn content(&self, container: ContainerId) -> Vec<EntityId> {
        self.container_ref(container).content()
    }

    /// `(name, overloads)` pairs of `container`
    pub fn iter(&self, container: ContainerId) -> Iter<'_> {
        self.container_ref(container).iter()
    }

    pub fn load_state(&self, container: ContainerId) -> LoadState {
        self.container_ref(container).state()
    }

    /// Load everything the container's loader can provide.
    ///
    /// Returns immediately when the container is already loaded or is being
    /// loaded further up the stack.
    pub fn force_load(&mut self, container: ContainerId) -> ResolveResult<()> {
        let entity = self.container_ref(container).entity();
        match self.container_ref(container).state() {
            LoadState::Loaded => return Ok(()),
            LoadState::Loading => {
                trace!("ignoring re-entrant load of {}", self.display_path(entity));
                return Ok(());
            }
            LoadState::Unloaded => {}
        }

        let Some(mut loader) = self.container_mut(container).take_loader() else {
            self.container_mut(container).set_state(LoadState::Loaded);
            return Ok(());
        };

        debug!("loading {}", self.display_path(entity));
        self.container_mut(container).set_state(LoadState::Loading);
        let outcome = loader.load(self, container, None);
        self.container_mut(container).restore_loader(loader);

        match outcome {
            LoadOutcome::Done => {
                self.container_mut(container).set_state(LoadState::Loaded);
                debug!("loaded {}", self.display_path(entity));
            }
            LoadOutcome::NotYetReady => {
                self.container_mut(container).set_state(LoadState::Unloaded);
                debug!("loader of {} is not ready yet", self.display_path(entity));
            }
            LoadOutcome::Partial(decls) => {
                self.container_mut(container).set_state(LoadState::Unloaded);
                self.define_all(container, decls)?;
            }
        }
        Ok(())
    }

    /// Ask the loader for the single name `part`
    fn load_name(&mut self, container: ContainerId, part: &NamePart) -> ResolveResult<()> {
        if !self.config.targeted_loads {
            return Ok(());
        }
        let Some(mut loader) = self.container_mut(container).take_loader() else {
            return Ok(());
        };

        trace!("targeted load of '{}'", part);
        let outcome = loader.load(self, container, Some(part));
        self.container_mut(container).restore_loader(loader);

        match outcome {
            LoadOutcome::Done | LoadOutcome::NotYetReady => Ok(()),
            LoadOutcome::Partial(decls) => self.define_all(container, decls),
        }
    }

    fn define_all(&mut self, container: ContainerId, decls: Vec<Declaration>) -> ResolveResult<()> {
        for decl in decls {
            let name = decl.name.clone();
            if let Err(err) = self.define(container, decl) {
                warn!("loader produced an unusable declaration '{}': {}", name, err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Turn a recursive part into a simple one by resolving its nested
    /// names from `scope`. `None` if a nested name does not resolve.
    pub fn simplify<'p>(
        &mut self,
        scope: ContainerId,
        part: &'p NamePart,
    ) -> ResolveResult<Option<Cow<'p, NamePart>>> {
        let NamePart::Recursive { text, nested } = part else {
            return Ok(Some(Cow::Borrowed(part)));
        };

        let mut params = Params::new();
        for name in nested {
            match self.lookup(scope, name)? {
                Some(entity) => params.push(TypeSignature::value(entity)),
                None => return Ok(None),
            }
        }
        Ok(Some(Cow::Owned(NamePart::Simple {
            text: text.clone(),
            params,
        })))
    }

    /// Look `part` up among what `container` already holds, without loading
    pub fn try_find(&mut self, container: ContainerId, part: &NamePart) -> ResolveResult<Option<EntityId>> {
        match self.simplify(container, part)? {
            Some(simple) => self.resolve_part(container, &simple),
            None => Ok(None),
        }
    }

    fn resolve_part(&mut self, container: ContainerId, part: &NamePart) -> ResolveResult<Option<EntityId>> {
        self.resolve_overload(container, part.text(), part.params(), SourceLocation::unknown())
    }

    /// Find `part` in `container`, loading on demand
    pub fn find(&mut self, container: ContainerId, part: &NamePart) -> ResolveResult<Option<EntityId>> {
        let Some(part) = self.simplify(container, part)? else {
            return Ok(None);
        };

        if let Some(found) = self.resolve_part(container, &part)? {
            return Ok(Some(found));
        }
        if self.load_state(container) == LoadState::Loaded {
            return Ok(None);
        }

        self.load_name(container, &part)?;
        if let Some(found) = self.resolve_part(container, &part)? {
            return Ok(Some(found));
        }

        self.force_load(container)?;
        self.resolve_part(container, &part)
    }

    /// Select the entity named `name` whose signature is `params`,
    /// instantiating a template when no declared entity matches.
    pub fn resolve_overload(
        &mut self,
        container: ContainerId,
        name: &str,
        params: &[TypeSignature],
        location: SourceLocation,
    ) -> ResolveResult<Option<EntityId>> {
        let Some(overloads) = self.container_ref(container).overloads(name) else {
            return Ok(None);
        };
        if let Some(found) = overloads.find_exact(params) {
            return Ok(Some(found));
        }
        if !overloads.has_templates() {
            return Ok(None);
        }

        let templates: Vec<Rc<dyn Template>> = overloads.templates().to_vec();
        let mut generated: Vec<Declaration> = templates
            .iter()
            .filter_map(|template| template.generate(self, params))
            .collect();

        if generated.len() > 1 {
            return Err(ResolveError::AmbiguousTemplate {
                name: name.to_string(),
                candidates: generated.len(),
                location,
            });
        }
        let Some(mut decl) = generated.pop() else {
            return Ok(None);
        };

        decl.name = name.to_string();
        decl.params = params.iter().copied().collect();
        // Unmemoized instances are left unowned and releasable
        let entity = self.declare(decl)?;
        if self.config.memoize_templates {
            if let Err(err) = self.add(container, entity) {
                self.discard(entity);
                return Err(err);
            }
        }

        debug!("instantiated template {}", self.display_path(entity));
        Ok(Some(entity))
    }

    /// Walk a multi-part name starting in `scope`
    pub fn find_name(&mut self, scope: ContainerId, name: &QualifiedName) -> ResolveResult<Option<EntityId>> {
        let mut current = scope;
        let mut found = self.container_ref(scope).entity();

        for (i, part) in name.iter().enumerate() {
            if i > 0 {
                match self.entity_ref(found).container() {
                    Some(next) => current = next,
                    None => return Ok(None),
                }
            }
            match self.find(current, part)? {
                Some(entity) => found = entity,
                None => return Ok(None),
            }
        }
        Ok(Some(found))
    }

    /// Resolve `name` from `scope`, then from each enclosing scope up to
    /// the root
    pub fn lookup(&mut self, scope: ContainerId, name: &QualifiedName) -> ResolveResult<Option<EntityId>> {
        let mut current = Some(scope);
        while let Some(container) = current {
            if let Some(found) = self.find_name(container, name)? {
                return Ok(Some(found));
            }
            let entity = self.container_ref(container).entity();
            current = self.entities.get(entity).and_then(|e| e.owner);
        }
        Ok(None)
    }

    /// [`require`](Self::require) that hands a failure to `sink` instead of
    /// returning it
    pub fn require_reporting(
        &mut self,
        scope: ContainerId,
        name: &QualifiedName,
        location: SourceLocation,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<EntityId> {
        match self.require(scope, name, location) {
            Ok(entity) => Some(entity),
            Err(err) => {
                err.report(sink);
                None
            }
        }
    }

    /// [`lookup`](Self::lookup) that reports absence as an error at `location`
    pub fn require(
        &mut self,
        scope: ContainerId,
        name: &QualifiedName,
        location: SourceLocation,
    ) -> ResolveResult<EntityId> {
        self.lookup(scope, name)?
            .ok_or_else(|| ResolveError::LookupFailure {
                name: name.to_string(),
                location,
            })
    }

    /// Find a member of type `ty` or of the closest ancestor declaring it
    pub fn find_member(&mut self, ty: EntityId, part: &NamePart) -> ResolveResult<Option<EntityId>> {
        let node = self.type_node(ty)?;
        let chain: Vec<EntityId> = match self.hierarchy.ancestors(node) {
            Some(ancestors) => ancestors.iter().map(|&n| self.hierarchy.owner(n)).collect(),
            None => vec![ty],
        };

        for owner in chain.into_iter().rev() {
            let Some(members) = self.scope_of(owner) else {
                continue;
            };
            if let Some(found) = self.find(members, part)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Name of `entity` relative to the root package
    pub fn path_of(&self, entity: EntityId) -> QualifiedName {
        let root = self.root_entity();
        let mut parts = Vec::new();
        let mut current = Some(entity);

        while let Some(id) = current {
            if id == root {
                break;
            }
            let Some(ent) = self.entities.get(id) else {
                break;
            };
            parts.push(ent.part());
            current = ent
                .owner
                .and_then(|owner| self.containers.get(owner))
                .map(|container| container.entity());
        }

        parts.reverse();
        QualifiedName::from_parts(parts)
    }

    /// Human-readable path with parameter types spelled out by name
    pub fn display_path(&self, entity: EntityId) -> String {
        let path = self.path_of(entity);
        if path.is_root() {
            return "<root>".to_string();
        }

        let parts: Vec<String> = path
            .iter()
            .map(|part| {
                let params = part.params();
                if params.is_empty() {
                    return part.text().to_string();
                }
                let rendered: Vec<String> = params
                    .iter()
                    .map(|param| {
                        let target = match param.entity {
                            Some(entity) => self.display_path(entity),
                            None => "void".to_string(),
                        };
                        if param.is_reference {
                            format!("&{}", target)
                        } else {
                            target
                        }
                    })
                    .collect();
                format!("{}({})", part.text(), rendered.join(", "))
            })
            .collect();
        parts.join(".")
    }

    /// Mangled form of `name`
    pub fn encode_name(&self, name: &QualifiedName) -> String {
        NameCodec::encode(self, name)
    }

    /// Entity named by the mangled string `encoded`, relative to `scope`
    pub fn decode_name(&mut self, scope: ContainerId, encoded: &str) -> ResolveResult<EntityId> {
        NameCodec::decode(self, scope, encoded)
    }

    /// Inheritance node of a type entity
    pub fn type_node(&self, ty: EntityId) -> ResolveResult<TypeNodeId> {
        self.entities
            .get(ty)
            .and_then(Entity::type_node)
            .ok_or(ResolveError::NotAType { entity: ty })
    }

    /// Link `ty` under `parent`; `None` makes it a resolved root type
    pub fn set_super(&mut self, ty: EntityId, parent: Option<EntityId>) -> ResolveResult<bool> {
        let node = self.type_node(ty)?;
        let parent = parent.map(|p| self.type_node(p)).transpose()?;
        self.hierarchy.set_super(node, parent)
    }

    pub fn clear_super(&mut self, ty: EntityId) -> ResolveResult<bool> {
        let node = self.type_node(ty)?;
        Ok(self.hierarchy.clear_super(node))
    }

    pub fn super_type(&self, ty: EntityId) -> ResolveResult<Option<EntityId>> {
        let node = self.type_node(ty)?;
        Ok(self.hierarchy.super_of(node).map(|n| self.hierarchy.owner(n)))
    }

    /// True if `ty` is `other` or a subtype of it; false for non-types
    pub fn is_a(&self, ty: EntityId, other: EntityId) -> bool {
        match (self.type_node(ty), self.type_node(other)) {
            (Ok(a), Ok(b)) => self.hierarchy.is_a(a, b),
            _ => false,
        }
    }

    pub fn distance(&self, ty: EntityId, other: EntityId) -> Option<u32> {
        let a = self.type_node(ty).ok()?;
        let b = self.type_node(other).ok()?;
        self.hierarchy.distance(a, b)
    }

    pub fn common_ancestor(&self, a: EntityId, b: EntityId) -> Option<EntityId> {
        let a = self.type_node(a).ok()?;
        let b = self.type_node(b).ok()?;
        self.hierarchy
            .common_ancestor(a, b)
            .map(|n| self.hierarchy.owner(n))
    }

    /// Live direct subtypes of `ty`
    pub fn subtypes(&self, ty: EntityId) -> Vec<EntityId> {
        match self.type_node(ty) {
            Ok(node) => self
                .hierarchy
                .children(node)
                .map(|n| self.hierarchy.owner(n))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Release an entity the memory manager found unreachable.
    ///
    /// Entities held by a container, the root package and types with live
    /// subtypes are still reachable; they are kept and `false` is returned.
    pub fn release(&mut self, entity: EntityId) -> bool {
        let Some(ent) = self.entities.get(entity) else {
            return false;
        };
        if ent.owner.is_some() || entity == self.root_entity() {
            return false;
        }
        if let EntityKind::Type { node, .. } = ent.kind {
            if !self.hierarchy.remove(node) {
                return false;
            }
        }
        self.discard(entity);
        true
    }

    /// Free an entity and whatever it owns, without reachability checks
    fn discard(&mut self, entity: EntityId) {
        let Some(ent) = self.entities.remove(entity) else {
            return;
        };
        match ent.kind {
            EntityKind::Type { node, members } => {
                self.hierarchy.remove(node);
                self.containers.remove(members);
            }
            EntityKind::Package(container) => {
                self.containers.remove(container);
            }
            _ => {}
        }
        trace!("released {:?}", entity);
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
