//! Name resolution and type hierarchy for the compiler front end
//!
//! Every declared entity (type, function, variable, thread marker, package)
//! lives in a [`Resolver`] session and is addressed by a generational
//! [`EntityId`]. Entities are grouped into lazily loaded containers,
//! overloaded by parameter signature and, for types, linked into a single
//! inheritance hierarchy with flattened ancestor chains.
//!
//! ```
//! use resolver::names::parse_simple_name;
//! use resolver::symbols::Declaration;
//! use resolver::Resolver;
//!
//! let mut resolver = Resolver::new();
//! let root = resolver.root();
//! let core = resolver.define(root, Declaration::package("core")).unwrap();
//! let scope = resolver.scope_of(core).unwrap();
//! let object = resolver.define(scope, Declaration::type_decl("Object")).unwrap();
//! let string = resolver.define(scope, Declaration::subtype("String", object)).unwrap();
//!
//! let found = resolver.lookup(root, &parse_simple_name("core.String")).unwrap();
//! assert_eq!(found, Some(string));
//! assert!(resolver.is_a(string, object));
//! ```

pub mod config;
pub mod error;
pub mod error_codes;
pub mod hierarchy;
pub mod logging;
pub mod names;
pub mod resolver;
pub mod symbols;

pub use config::ResolverConfig;
pub use diagnostics::SourceLocation;
pub use error::{ResolveError, ResolveResult};
pub use names::{NameCodec, NamePart, QualifiedName, TypeSignature};
pub use resolver::Resolver;
pub use symbols::{ContainerId, Declaration, EntityId, TypeNodeId};
