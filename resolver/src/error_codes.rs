//! Error Code Registry for name resolution
//!
//! Codes share the compiler-wide numbering in which E2000-E2999 is the
//! symbol resolution range. Within it, the hundreds digit is the
//! subcategory:
//!
//! - E20xx: Lookup errors
//! - E21xx: Inheritance errors
//! - E22xx: Declaration errors
//! - E23xx: Template errors
//! - E24xx: Mangled name errors

use std::collections::HashMap;
use std::fmt;

/// Error code struct containing the numeric code and human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// The numeric error code (e.g., 2001)
    pub code: u16,
    /// Human-readable error category
    pub category: &'static str,
    /// Brief description of what this error means
    pub description: &'static str,
    /// Optional help text with suggestions for fixing the error
    pub help: Option<&'static str>,
}

impl ErrorCode {
    pub const fn new(
        code: u16,
        category: &'static str,
        description: &'static str,
        help: Option<&'static str>,
    ) -> Self {
        Self {
            code,
            category,
            description,
            help,
        }
    }

    /// Format the error code as "E{code:04}" (e.g., "E2001")
    pub fn format_code(&self) -> String {
        format_error_code(self.code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.format_code(),
            self.category,
            self.description
        )
    }
}

/// Registry containing all defined error codes
pub struct ErrorCodeRegistry {
    codes: HashMap<u16, ErrorCode>,
}

impl ErrorCodeRegistry {
    /// Create a new registry with all predefined error codes
    pub fn new() -> Self {
        let mut registry = Self {
            codes: HashMap::new(),
        };
        registry.register_all_codes();
        registry
    }

    pub fn get(&self, code: u16) -> Option<&ErrorCode> {
        self.codes.get(&code)
    }

    /// Get an error code by its formatted string (e.g., "E2001")
    pub fn get_by_string(&self, code_str: &str) -> Option<&ErrorCode> {
        parse_error_code(code_str).and_then(|code| self.get(code))
    }

    fn register(&mut self, error_code: ErrorCode) {
        self.codes.insert(error_code.code, error_code);
    }

    fn register_all_codes(&mut self) {
        // Lookup errors (E2000-E2099)
        self.register(ErrorCode::new(
            2001,
            "Symbol",
            "Undefined symbol",
            Some("Check that the name is declared and its package can be loaded"),
        ));

        // Inheritance errors (E2100-E2199)
        self.register(ErrorCode::new(
            2101,
            "Inheritance",
            "Not a type",
            Some("Only types can take part in inheritance queries"),
        ));
        self.register(ErrorCode::new(
            2102,
            "Inheritance",
            "Cyclic inheritance",
            Some("A type cannot extend itself or one of its subtypes"),
        ));
        self.register(ErrorCode::new(
            2103,
            "Inheritance",
            "Inheritance chain too deep",
            Some("Raise max_hierarchy_depth or flatten the hierarchy"),
        ));

        // Declaration errors (E2200-E2299)
        self.register(ErrorCode::new(
            2201,
            "Symbol",
            "Symbol already defined",
            Some("Overloads must differ in their parameter types"),
        ));
        self.register(ErrorCode::new(
            2202,
            "Symbol",
            "Symbol already owned by another scope",
            Some("Declare a new entity instead of inserting the same one twice"),
        ));

        // Template errors (E2300-E2399)
        self.register(ErrorCode::new(
            2301,
            "Template",
            "Ambiguous template instantiation",
            Some("Make the templates' accepted parameter lists mutually exclusive"),
        ));

        // Mangled name errors (E2400-E2499)
        self.register(ErrorCode::new(
            2401,
            "Encoding",
            "Invalid mangled name",
            Some("Mangled names are machine generated; check for corruption"),
        ));
    }

    /// Get all error codes in a specific range
    pub fn get_range(&self, start: u16, end: u16) -> Vec<&ErrorCode> {
        let mut codes: Vec<&ErrorCode> = self
            .codes
            .values()
            .filter(|code| code.code >= start && code.code <= end)
            .collect();
        codes.sort_by_key(|code| code.code);
        codes
    }

    pub fn is_valid_code(&self, code: u16) -> bool {
        self.codes.contains_key(&code)
    }
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: std::sync::OnceLock<ErrorCodeRegistry> = std::sync::OnceLock::new();

/// Get the global error code registry
pub fn error_registry() -> &'static ErrorCodeRegistry {
    REGISTRY.get_or_init(ErrorCodeRegistry::new)
}

pub fn get_error_code(code: u16) -> Option<&'static ErrorCode> {
    error_registry().get(code)
}

/// Format error code string (e.g., 2001 -> "E2001")
pub fn format_error_code(code: u16) -> String {
    format!("E{:04}", code)
}

/// Parse error code from string (e.g., "E2001" -> Some(2001))
pub fn parse_error_code(code_str: &str) -> Option<u16> {
    code_str.strip_prefix('E')?.parse::<u16>().ok()
}
