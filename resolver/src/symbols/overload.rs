//! Overload sets
//!
//! Every simple name inside a container maps to one [`OverloadSet`]: the
//! concrete entities sharing that name, keyed by parameter signature, and
//! the templates able to generate further entities on request. Selection is
//! by exact signature; templates are consulted only when no concrete entity
//! matches (see `Resolver::resolve_overload`).

use super::entity::Declaration;
use super::id_types::EntityId;
use crate::names::{Params, TypeSignature};
use crate::resolver::Resolver;
use std::fmt;
use std::rc::Rc;

/// Generator of entities for parameter lists not declared explicitly
pub trait Template {
    /// Simple name of the entities this template produces
    fn name(&self) -> &str;

    /// Produce a declaration for `params`, or `None` if the template does
    /// not apply to them.
    fn generate(&self, resolver: &Resolver, params: &[TypeSignature]) -> Option<Declaration>;
}

/// One concrete entity in a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub params: Params,
    pub entity: EntityId,
}

/// All entities and templates sharing one simple name
#[derive(Default, Clone)]
pub struct OverloadSet {
    items: Vec<Overload>,
    templates: Vec<Rc<dyn Template>>,
}

impl OverloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity under `params`; on a signature clash returns the
    /// entity already holding it.
    pub fn add(&mut self, params: Params, entity: EntityId) -> Result<(), EntityId> {
        if let Some(existing) = self.find_exact(&params) {
            return Err(existing);
        }
        self.items.push(Overload { params, entity });
        Ok(())
    }

    pub fn add_template(&mut self, template: Rc<dyn Template>) {
        self.templates.push(template);
    }

    /// Entity whose signature is structurally equal to `params`
    pub fn find_exact(&self, params: &[TypeSignature]) -> Option<EntityId> {
        self.items
            .iter()
            .find(|item| item.params.as_slice() == params)
            .map(|item| item.entity)
    }

    pub fn items(&self) -> &[Overload] {
        &self.items
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.iter().map(|item| item.entity)
    }

    pub fn templates(&self) -> &[Rc<dyn Template>] {
        &self.templates
    }

    pub fn has_templates(&self) -> bool {
        !self.templates.is_empty()
    }

    /// Number of concrete entities
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the set holds neither entities nor templates
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.templates.is_empty()
    }
}

impl fmt::Debug for OverloadSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverloadSet")
            .field("items", &self.items)
            .field(
                "templates",
                &self.templates.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
