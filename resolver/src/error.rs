//! Resolution errors
//!
//! Every user-source error is a recoverable [`ResolveError`] returned to the
//! compilation driver, which attaches it to its diagnostics and carries on
//! with other units. Re-entrant loads are not errors.

use crate::error_codes::format_error_code;
use crate::symbols::{ContainerId, EntityId};
use diagnostics::resolution::ResolutionDiagnostics;
use diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticSink, SourceLocation};
use std::fmt;

/// Errors that can occur while declaring, resolving or decoding names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Same simple name and signature declared twice in one container
    DuplicateDefinition {
        name: String,
        existing: EntityId,
        location: SourceLocation,
        previous: SourceLocation,
    },
    /// Entity already inserted into a container
    AlreadyOwned {
        entity: EntityId,
        owner: ContainerId,
    },
    /// More than one template can instantiate the requested signature
    AmbiguousTemplate {
        name: String,
        candidates: usize,
        location: SourceLocation,
    },
    /// Name not found after a full load attempt
    LookupFailure {
        name: String,
        location: SourceLocation,
    },
    /// Mangled name violates the encoding grammar
    InvalidEncoding {
        encoded: String,
        position: usize,
        reason: &'static str,
    },
    /// Superclass or inheritance query target is not a type
    NotAType { entity: EntityId },
    /// Relinking would make a type inherit from itself
    CyclicInheritance { child: EntityId, parent: EntityId },
    /// Relinking would exceed the configured chain length
    HierarchyTooDeep { depth: usize, limit: usize },
}

impl ResolveError {
    /// Numeric code registered in [`crate::error_codes`]
    pub fn code(&self) -> u16 {
        match self {
            ResolveError::LookupFailure { .. } => 2001,
            ResolveError::NotAType { .. } => 2101,
            ResolveError::CyclicInheritance { .. } => 2102,
            ResolveError::HierarchyTooDeep { .. } => 2103,
            ResolveError::DuplicateDefinition { .. } => 2201,
            ResolveError::AlreadyOwned { .. } => 2202,
            ResolveError::AmbiguousTemplate { .. } => 2301,
            ResolveError::InvalidEncoding { .. } => 2401,
        }
    }

    /// Source location the error is reported at, if it carries one
    pub fn location(&self) -> SourceLocation {
        match self {
            ResolveError::DuplicateDefinition { location, .. }
            | ResolveError::AmbiguousTemplate { location, .. }
            | ResolveError::LookupFailure { location, .. } => *location,
            _ => SourceLocation::unknown(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::DuplicateDefinition {
                name,
                location,
                previous,
                ..
            } => ResolutionDiagnostics::duplicate_definition(*location, name, *previous),
            ResolveError::AmbiguousTemplate {
                name,
                candidates,
                location,
            } => ResolutionDiagnostics::ambiguous_template(*location, name, *candidates),
            ResolveError::LookupFailure { name, location } => {
                ResolutionDiagnostics::unresolved_name(*location, name)
            }
            ResolveError::InvalidEncoding {
                position, reason, ..
            } => ResolutionDiagnostics::invalid_encoding(*position, reason),
            other => DiagnosticBuilder::error(other.to_string(), SourceLocation::unknown())
                .code(format_error_code(other.code()))
                .build(),
        }
    }

    /// Hand the error's diagnostic to `sink`
    pub fn report(&self, sink: &mut dyn DiagnosticSink) {
        sink.report(self.to_diagnostic());
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::DuplicateDefinition { name, existing, .. } => {
                write!(f, "'{}' is already defined as {}", name, existing)
            }
            ResolveError::AlreadyOwned { entity, owner } => {
                write!(f, "{} already belongs to {}", entity, owner)
            }
            ResolveError::AmbiguousTemplate {
                name, candidates, ..
            } => {
                write!(f, "{} templates named '{}' match the request", candidates, name)
            }
            ResolveError::LookupFailure { name, .. } => write!(f, "cannot find '{}'", name),
            ResolveError::InvalidEncoding {
                encoded,
                position,
                reason,
            } => write!(
                f,
                "invalid mangled name {:?} at offset {}: {}",
                encoded, position, reason
            ),
            ResolveError::NotAType { entity } => write!(f, "{} is not a type", entity),
            ResolveError::CyclicInheritance { child, parent } => {
                write!(f, "{} cannot inherit from its own subtype {}", child, parent)
            }
            ResolveError::HierarchyTooDeep { depth, limit } => {
                write!(f, "inheritance chain of length {} exceeds the limit of {}", depth, limit)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

pub type ResolveResult<T> = Result<T, ResolveError>;
