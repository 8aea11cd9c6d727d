//! Qualified names
//!
//! A [`QualifiedName`] is the lookup key handed to the resolver: an ordered
//! list of [`NamePart`]s. Simple parts carry the parameter signature used to
//! pick an overload; recursive parts carry unresolved nested names (as
//! written in grammar patterns) that are turned into a signature at lookup
//! time.

use crate::symbols::EntityId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A parameter slot in a signature
///
/// `entity == None` is the void slot. It is a legitimate parameter, not a
/// failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSignature {
    pub entity: Option<EntityId>,
    pub is_reference: bool,
}

impl TypeSignature {
    pub const fn value(entity: EntityId) -> Self {
        Self {
            entity: Some(entity),
            is_reference: false,
        }
    }

    pub const fn reference(entity: EntityId) -> Self {
        Self {
            entity: Some(entity),
            is_reference: true,
        }
    }

    pub const fn void() -> Self {
        Self {
            entity: None,
            is_reference: false,
        }
    }

    pub const fn is_void(&self) -> bool {
        self.entity.is_none()
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference {
            write!(f, "&")?;
        }
        match self.entity {
            Some(entity) => write!(f, "#{}", entity.as_raw()),
            None => write!(f, "void"),
        }
    }
}

/// Parameter list of a name part or entity
pub type Params = SmallVec<[TypeSignature; 4]>;

/// One segment of a qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamePart {
    /// Plain identifier with an already-resolved parameter list
    Simple { text: String, params: Params },
    /// Identifier whose parameters are still names (`Name(Arg, Pkg.Arg2)`)
    Recursive {
        text: String,
        nested: Vec<QualifiedName>,
    },
}

impl NamePart {
    pub fn simple(text: impl Into<String>) -> Self {
        NamePart::Simple {
            text: text.into(),
            params: Params::new(),
        }
    }

    pub fn with_params(text: impl Into<String>, params: impl IntoIterator<Item = TypeSignature>) -> Self {
        NamePart::Simple {
            text: text.into(),
            params: params.into_iter().collect(),
        }
    }

    pub fn recursive(text: impl Into<String>, nested: Vec<QualifiedName>) -> Self {
        NamePart::Recursive {
            text: text.into(),
            nested,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            NamePart::Simple { text, .. } | NamePart::Recursive { text, .. } => text,
        }
    }

    /// Resolved parameters; empty for recursive parts
    pub fn params(&self) -> &[TypeSignature] {
        match self {
            NamePart::Simple { params, .. } => params,
            NamePart::Recursive { .. } => &[],
        }
    }
}

impl From<&str> for NamePart {
    fn from(text: &str) -> Self {
        NamePart::simple(text)
    }
}

impl fmt::Display for NamePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePart::Simple { text, params } => {
                write!(f, "{}", text)?;
                if !params.is_empty() {
                    let rendered: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                    write!(f, "({})", rendered.join(", "))?;
                }
                Ok(())
            }
            NamePart::Recursive { text, nested } => {
                let rendered: Vec<String> = nested.iter().map(|n| n.to_string()).collect();
                write!(f, "{}({})", text, rendered.join(", "))
            }
        }
    }
}

/// Ordered sequence of name parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    parts: Vec<NamePart>,
}

impl QualifiedName {
    /// The empty name, denoting the root scope
    pub fn root() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn from_parts(parts: Vec<NamePart>) -> Self {
        Self { parts }
    }

    /// Build a name of parameterless simple parts
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            parts: segments.into_iter().map(NamePart::simple).collect(),
        }
    }

    pub fn push(&mut self, part: NamePart) {
        self.parts.push(part);
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, part: NamePart) -> Self {
        self.parts.push(part);
        self
    }

    /// The name with its last part dropped; the root is its own parent
    pub fn parent(&self) -> QualifiedName {
        let end = self.parts.len().saturating_sub(1);
        Self {
            parts: self.parts[..end].to_vec(),
        }
    }

    /// The name with its first `k` parts dropped
    pub fn suffix_from(&self, k: usize) -> QualifiedName {
        let start = k.min(self.parts.len());
        Self {
            parts: self.parts[start..].to_vec(),
        }
    }

    pub fn parts(&self) -> &[NamePart] {
        &self.parts
    }

    pub fn first(&self) -> Option<&NamePart> {
        self.parts.first()
    }

    pub fn last(&self) -> Option<&NamePart> {
        self.parts.last()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamePart> {
        self.parts.iter()
    }
}

impl<'a> IntoIterator for &'a QualifiedName {
    type Item = &'a NamePart;
    type IntoIter = std::slice::Iter<'a, NamePart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl FromIterator<NamePart> for QualifiedName {
    fn from_iter<T: IntoIterator<Item = NamePart>>(iter: T) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return write!(f, "<root>");
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ArenaId;
    use std::collections::HashSet;

    fn entity(raw: u32) -> EntityId {
        EntityId::from_parts(raw, 0)
    }

    #[test]
    fn test_parent_and_suffix() {
        let name = QualifiedName::from_segments(["core", "lang", "Str"]);
        assert_eq!(name.parent(), QualifiedName::from_segments(["core", "lang"]));
        assert_eq!(name.suffix_from(1), QualifiedName::from_segments(["lang", "Str"]));
        assert_eq!(name.suffix_from(5), QualifiedName::root());
        assert_eq!(QualifiedName::root().parent(), QualifiedName::root());
    }

    #[test]
    fn test_params_distinguish_parts() {
        let a = NamePart::with_params("f", [TypeSignature::value(entity(1))]);
        let b = NamePart::with_params("f", [TypeSignature::reference(entity(1))]);
        let c = NamePart::with_params("f", [TypeSignature::value(entity(1)), TypeSignature::void()]);
        let d = NamePart::simple("f");

        let set: HashSet<NamePart> = [a.clone(), b, c, d, a].into_iter().collect();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_render() {
        assert_eq!(QualifiedName::root().to_string(), "<root>");

        let name = QualifiedName::from_segments(["pkg"]).with(NamePart::with_params(
            "f",
            [TypeSignature::reference(entity(2)), TypeSignature::void()],
        ));
        assert_eq!(name.to_string(), "pkg.f(&#2, void)");

        let pattern = QualifiedName::root().with(NamePart::recursive(
            "Rule",
            vec![QualifiedName::from_segments(["a", "B"])],
        ));
        assert_eq!(pattern.to_string(), "Rule(a.B)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = QualifiedName::from_segments(["pkg"]).with(NamePart::with_params(
            "g",
            [TypeSignature::value(entity(4))],
        ));
        let json = serde_json::to_string(&name).unwrap();
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
