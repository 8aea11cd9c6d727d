//! Inheritance graph with flattened ancestor chains
//!
//! Each type entity owns a [`TypeNode`] holding the full path from its
//! ultimate root down to itself. Subtype and distance queries index into
//! that path instead of walking superclass links:
//!
//! ```text
//! Object <- Shape <- Circle      Circle.ancestors = [Object, Shape, Circle]
//! is_a(Circle, Shape)            ancestors[len(Shape) - 1] == Shape
//! distance(Circle, Object)       3 - 1 = 2
//! ```
//!
//! Relinking a node recomputes its path and pushes the new prefix to every
//! live descendant. Child sets are weak: a released subtype is skipped and
//! never kept alive by its parent.

use crate::error::ResolveError;
use crate::symbols::{Arena, EntityId, TypeNodeId, WeakSet};
use std::collections::VecDeque;
use tracing::debug;

/// Inheritance record for one type
#[derive(Debug, Clone)]
pub struct TypeNode {
    owner: EntityId,
    super_type: Option<TypeNodeId>,
    /// Path root..=self; `None` while no superclass has been declared
    ancestors: Option<Vec<TypeNodeId>>,
    children: WeakSet<TypeNodeId>,
}

impl TypeNode {
    /// Type entity this node belongs to
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn super_type(&self) -> Option<TypeNodeId> {
        self.super_type
    }

    /// Flattened path, or `None` when absent
    pub fn ancestors(&self) -> Option<&[TypeNodeId]> {
        self.ancestors.as_deref()
    }
}

/// Arena of type nodes plus the relinking and query operations
#[derive(Debug)]
pub struct TypeHierarchy {
    nodes: Arena<TypeNodeId, TypeNode>,
    max_depth: usize,
}

impl TypeHierarchy {
    pub fn new(max_depth: usize) -> Self {
        Self {
            nodes: Arena::new(),
            max_depth,
        }
    }

    /// Create the node of a new type; its ancestors start out absent
    pub fn create(&mut self, owner: EntityId) -> TypeNodeId {
        self.nodes.alloc(TypeNode {
            owner,
            super_type: None,
            ancestors: None,
            children: WeakSet::new(),
        })
    }

    pub fn get(&self, id: TypeNodeId) -> Option<&TypeNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: TypeNodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: TypeNodeId) -> &TypeNode {
        self.nodes
            .get(id)
            .unwrap_or_else(|| panic!("type node {:?} was released", id))
    }

    fn node_mut(&mut self, id: TypeNodeId) -> &mut TypeNode {
        self.nodes
            .get_mut(id)
            .unwrap_or_else(|| panic!("type node {:?} was released", id))
    }

    /// Length of the effective chain; an absent chain counts as `[id]`
    fn chain_len(&self, id: TypeNodeId) -> usize {
        self.node(id).ancestors.as_ref().map_or(1, Vec::len)
    }

    fn chain_at(&self, id: TypeNodeId, index: usize) -> TypeNodeId {
        match &self.node(id).ancestors {
            Some(ancestors) => ancestors[index],
            None => id,
        }
    }

    fn chain(&self, id: TypeNodeId) -> Vec<TypeNodeId> {
        match &self.node(id).ancestors {
            Some(ancestors) => ancestors.clone(),
            None => vec![id],
        }
    }

    pub fn owner(&self, id: TypeNodeId) -> EntityId {
        self.node(id).owner
    }

    pub fn super_of(&self, id: TypeNodeId) -> Option<TypeNodeId> {
        self.node(id).super_type
    }

    pub fn ancestors(&self, id: TypeNodeId) -> Option<&[TypeNodeId]> {
        self.node(id).ancestors()
    }

    /// Number of inheritance steps between `id` and its root
    pub fn depth(&self, id: TypeNodeId) -> usize {
        self.chain_len(id) - 1
    }

    /// Link `id` under `parent` (`None` makes it a resolved root).
    ///
    /// Returns `Ok(false)` when nothing changed.
    pub fn set_super(
        &mut self,
        id: TypeNodeId,
        parent: Option<TypeNodeId>,
    ) -> Result<bool, ResolveError> {
        let node = self.node(id);
        if node.super_type == parent && (parent.is_some() || node.ancestors.is_some()) {
            return Ok(false);
        }

        if let Some(parent) = parent {
            if self.is_a(parent, id) {
                return Err(ResolveError::CyclicInheritance {
                    child: self.owner(id),
                    parent: self.owner(parent),
                });
            }
            let depth = self.chain_len(parent) + self.subtree_height(id);
            if depth > self.max_depth {
                return Err(ResolveError::HierarchyTooDeep {
                    depth,
                    limit: self.max_depth,
                });
            }
        }

        debug!(
            "relinking {:?}: {:?} -> {:?}",
            id,
            self.node(id).super_type,
            parent
        );
        self.relink(id, parent);
        let ancestors = match parent {
            Some(parent) => {
                let mut chain = self.chain(parent);
                chain.push(id);
                chain
            }
            None => vec![id],
        };
        self.node_mut(id).ancestors = Some(ancestors);
        self.propagate(id);
        Ok(true)
    }

    /// Drop the superclass link; the ancestors become absent again.
    ///
    /// Returns false when the node was already in that state.
    pub fn clear_super(&mut self, id: TypeNodeId) -> bool {
        let node = self.node(id);
        if node.super_type.is_none() && node.ancestors.is_none() {
            return false;
        }

        debug!("clearing superclass of {:?}", id);
        self.relink(id, None);
        self.node_mut(id).ancestors = None;
        self.propagate(id);
        true
    }

    /// Move `id` from its old parent's child set to the new one's
    fn relink(&mut self, id: TypeNodeId, parent: Option<TypeNodeId>) {
        if let Some(old) = self.node(id).super_type {
            if let Some(old_node) = self.nodes.get_mut(old) {
                old_node.children.remove(id);
            }
        }

        if let Some(parent) = parent {
            let mut children = std::mem::take(&mut self.node_mut(parent).children);
            children.prune(&self.nodes);
            children.insert(id);
            self.node_mut(parent).children = children;
        }

        self.node_mut(id).super_type = parent;
    }

    /// Recompute the chains of every live descendant of `id`
    fn propagate(&mut self, id: TypeNodeId) {
        let mut queue: VecDeque<TypeNodeId> = self.children(id).collect();
        let mut updated = 0usize;

        while let Some(child) = queue.pop_front() {
            let parent = self.node(child).super_type.unwrap_or(id);
            let mut chain = self.chain(parent);
            chain.push(child);
            self.node_mut(child).ancestors = Some(chain);
            updated += 1;
            queue.extend(self.children(child));
        }

        if updated > 0 {
            debug!("propagated new ancestors of {:?} to {} descendants", id, updated);
        }
    }

    /// Longest path from `id` down to a live descendant
    fn subtree_height(&self, id: TypeNodeId) -> usize {
        let base = self.chain_len(id);
        self.descendants(id)
            .into_iter()
            .map(|d| self.chain_len(d) - base)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// True if `id` is `other` or inherits from it
    pub fn is_a(&self, id: TypeNodeId, other: TypeNodeId) -> bool {
        let len = self.chain_len(id);
        let other_len = self.chain_len(other);
        len >= other_len && self.chain_at(id, other_len - 1) == other
    }

    /// Inheritance steps from `id` up to `other`, if `id` is an `other`
    pub fn distance(&self, id: TypeNodeId, other: TypeNodeId) -> Option<u32> {
        if !self.is_a(id, other) {
            return None;
        }
        Some((self.chain_len(id) - self.chain_len(other)) as u32)
    }

    /// Closest type both `a` and `b` inherit from
    pub fn common_ancestor(&self, a: TypeNodeId, b: TypeNodeId) -> Option<TypeNodeId> {
        let shared = self.chain_len(a).min(self.chain_len(b));
        let mut common = None;
        for i in 0..shared {
            let candidate = self.chain_at(a, i);
            if candidate != self.chain_at(b, i) {
                break;
            }
            common = Some(candidate);
        }
        common
    }

    /// Live direct subtypes
    pub fn children(&self, id: TypeNodeId) -> impl Iterator<Item = TypeNodeId> + '_ {
        self.node(id).children.iter(&self.nodes)
    }

    /// Live subtypes at any depth, breadth first
    pub fn descendants(&self, id: TypeNodeId) -> Vec<TypeNodeId> {
        let mut found = Vec::new();
        let mut queue: VecDeque<TypeNodeId> = self.children(id).collect();
        while let Some(next) = queue.pop_front() {
            found.push(next);
            queue.extend(self.children(next));
        }
        found
    }

    /// Release a node the memory manager found unreachable.
    ///
    /// Subtypes hold their superclass strongly, so a node with live
    /// children is never released; `false` is returned instead. The parent's
    /// child set is not touched: the entry goes stale and is skipped.
    pub fn remove(&mut self, id: TypeNodeId) -> bool {
        if !self.nodes.contains(id) || self.children(id).next().is_some() {
            return false;
        }
        self.nodes.remove(id).is_some()
    }
}
