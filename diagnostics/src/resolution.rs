//! Name-resolution diagnostic builders
//!
//! Helpers for the diagnostics every symbol table reports: duplicates,
//! ambiguous template instantiation, unresolved names and corrupt
//! mangled names.

use crate::{Diagnostic, DiagnosticBuilder, SourceLocation};

/// Provides common name-resolution diagnostic builders
pub struct ResolutionDiagnostics;

impl ResolutionDiagnostics {
    /// Two declarations with the same name and signature in one scope
    pub fn duplicate_definition(
        location: SourceLocation,
        name: &str,
        previous: SourceLocation,
    ) -> Diagnostic {
        let mut builder =
            DiagnosticBuilder::error(format!("duplicate definition of '{}'", name), location)
                .code("E2201")
                .label(location, "redefined here");
        if previous.is_valid() {
            builder = builder.secondary_label(previous, "first defined here");
        }
        builder
            .help("overloads must differ in their parameter types")
            .build()
    }

    /// More than one template produced a candidate for the same request
    pub fn ambiguous_template(location: SourceLocation, name: &str, candidates: usize) -> Diagnostic {
        DiagnosticBuilder::error(
            format!("ambiguous template instantiation of '{}'", name),
            location,
        )
        .code("E2301")
        .label(location, format!("{} templates match this request", candidates))
        .help("make the template parameter constraints mutually exclusive")
        .build()
    }

    /// Name not found after a full load attempt
    pub fn unresolved_name(location: SourceLocation, name: &str) -> Diagnostic {
        DiagnosticBuilder::error(format!("cannot find '{}' in this scope", name), location)
            .code("E2001")
            .label(location, "not found")
            .help("check that the name is declared and its package can be loaded")
            .build()
    }

    /// Malformed mangled name
    pub fn invalid_encoding(position: usize, reason: &str) -> Diagnostic {
        DiagnosticBuilder::error(
            format!("invalid mangled name at offset {}: {}", position, reason),
            SourceLocation::unknown(),
        )
        .code("E2401")
        .note("mangled names are machine generated; this usually indicates corruption")
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_definition_labels() {
        let here = SourceLocation::new(0, 5, 1, 40);
        let first = SourceLocation::new(0, 2, 1, 10);
        let diagnostic = ResolutionDiagnostics::duplicate_definition(here, "foo", first);

        assert_eq!(diagnostic.code.as_deref(), Some("E2201"));
        assert_eq!(diagnostic.labels.len(), 2);

        let without_previous =
            ResolutionDiagnostics::duplicate_definition(here, "foo", SourceLocation::unknown());
        assert_eq!(without_previous.labels.len(), 1);
    }

    #[test]
    fn test_invalid_encoding_has_no_location() {
        let diagnostic = ResolutionDiagnostics::invalid_encoding(3, "separator outside a group");
        assert!(!diagnostic.location.is_valid());
        assert!(diagnostic.message.contains("offset 3"));
    }
}
