//! Declared entities
//!
//! An [`Entity`] is anything a container can hold: types, functions,
//! variables, thread markers and packages. Entities are created from a
//! [`Declaration`], which is what loaders, templates and the compilation
//! driver hand to the resolver.

use super::container::Loader;
use super::id_types::{ContainerId, EntityId, TypeNodeId};
use crate::names::{NamePart, Params, TypeSignature};
use diagnostics::SourceLocation;
use std::fmt;

/// The kind of entity, with the kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Type with its inheritance node and member scope
    Type {
        node: TypeNodeId,
        members: ContainerId,
    },
    /// Function or method
    Function { result: TypeSignature },
    /// Variable or field
    Variable { ty: TypeSignature },
    /// Marker naming a thread that code can be bound to
    ThreadMarker,
    /// Package (a scope that may be loaded lazily)
    Package(ContainerId),
}

impl EntityKind {
    pub fn is_type(self) -> bool {
        matches!(self, EntityKind::Type { .. })
    }

    /// Scope held by this entity, if it is one
    pub fn container(self) -> Option<ContainerId> {
        match self {
            EntityKind::Type { members, .. } => Some(members),
            EntityKind::Package(container) => Some(container),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Type { .. } => "type",
            EntityKind::Function { .. } => "function",
            EntityKind::Variable { .. } => "variable",
            EntityKind::ThreadMarker => "thread",
            EntityKind::Package(_) => "package",
        };
        write!(f, "{}", name)
    }
}

/// Complete entity information
#[derive(Debug, Clone)]
pub struct Entity {
    /// Simple name (last segment of the entity's path)
    pub name: String,
    /// Parameter signature used for overload selection
    pub params: Params,
    pub kind: EntityKind,
    /// Container the entity was inserted into; set exactly once
    pub owner: Option<ContainerId>,
    /// Where the entity is declared
    pub location: SourceLocation,
}

impl Entity {
    /// The name part that finds this entity inside its owner
    pub fn part(&self) -> NamePart {
        NamePart::Simple {
            text: self.name.clone(),
            params: self.params.clone(),
        }
    }

    pub fn is_type(&self) -> bool {
        self.kind.is_type()
    }

    pub fn container(&self) -> Option<ContainerId> {
        self.kind.container()
    }

    /// Inheritance node, for types
    pub fn type_node(&self) -> Option<TypeNodeId> {
        match self.kind {
            EntityKind::Type { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// What to create when a declaration is materialized
pub enum DeclKind {
    /// A type; `super_type: None` leaves the superclass undeclared
    Type { super_type: Option<EntityId> },
    Function { result: TypeSignature },
    Variable { ty: TypeSignature },
    ThreadMarker,
    /// A package, optionally populated on demand by `loader`
    Package { loader: Option<Box<dyn Loader>> },
}

impl fmt::Debug for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Type { super_type } => f
                .debug_struct("Type")
                .field("super_type", super_type)
                .finish(),
            DeclKind::Function { result } => {
                f.debug_struct("Function").field("result", result).finish()
            }
            DeclKind::Variable { ty } => f.debug_struct("Variable").field("ty", ty).finish(),
            DeclKind::ThreadMarker => write!(f, "ThreadMarker"),
            DeclKind::Package { loader } => f
                .debug_struct("Package")
                .field("lazy", &loader.is_some())
                .finish(),
        }
    }
}

/// Description of an entity to create
#[derive(Debug)]
pub struct Declaration {
    pub name: String,
    pub params: Params,
    pub kind: DeclKind,
    pub location: SourceLocation,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
            kind,
            location: SourceLocation::unknown(),
        }
    }

    /// Type declaration without a declared superclass
    pub fn type_decl(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Type { super_type: None })
    }

    /// Type declaration extending `super_type`
    pub fn subtype(name: impl Into<String>, super_type: EntityId) -> Self {
        Self::new(
            name,
            DeclKind::Type {
                super_type: Some(super_type),
            },
        )
    }

    pub fn function(name: impl Into<String>, result: TypeSignature) -> Self {
        Self::new(name, DeclKind::Function { result })
    }

    pub fn variable(name: impl Into<String>, ty: TypeSignature) -> Self {
        Self::new(name, DeclKind::Variable { ty })
    }

    pub fn thread(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::ThreadMarker)
    }

    /// Package that is complete as soon as it is created
    pub fn package(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Package { loader: None })
    }

    /// Package populated on demand
    pub fn lazy_package(name: impl Into<String>, loader: impl Loader + 'static) -> Self {
        Self::new(
            name,
            DeclKind::Package {
                loader: Some(Box::new(loader)),
            },
        )
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = TypeSignature>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}
