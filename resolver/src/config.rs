//! Resolver configuration

/// Tunables for a [`crate::Resolver`] session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Ask the loader for just the missing name before a full load
    pub targeted_loads: bool,

    /// Keep template instantiations in the overload set so identical
    /// requests reuse them
    pub memoize_templates: bool,

    /// Longest allowed ancestor chain (root and self included)
    pub max_hierarchy_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            targeted_loads: true,
            memoize_templates: true,
            max_hierarchy_depth: 4096,
        }
    }
}

impl ResolverConfig {
    pub fn with_targeted_loads(mut self, enabled: bool) -> Self {
        self.targeted_loads = enabled;
        self
    }

    pub fn with_memoized_templates(mut self, enabled: bool) -> Self {
        self.memoize_templates = enabled;
        self
    }

    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }
}
