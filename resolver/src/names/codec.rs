//! Mangled names
//!
//! A mangled name is a flat string that identifies an entity, including the
//! parameter types of every overloaded part, with no characters reserved in
//! entity names. Structure is carried by control-character sentinels:
//!
//! ```text
//! name  := part (DOT part)*
//! part  := text [OPEN (sep param)* CLOSE]
//! sep   := COMMA | REF_COMMA
//! param := <empty> | name
//! ```
//!
//! A parameter is the full path of its type from the root package, and is
//! empty for `void`. `REF_COMMA` marks a by-reference parameter. Nested names
//! of a recursive part are written as given and read back as root paths, so
//! they must be absolute to round-trip. A group always holds at least one
//! parameter. Sentinels occurring in entity text are preceded by `ESCAPE`.
//! The empty string stands for the scope entity itself.
//!
//! Only the outer name is resolved relative to the caller's scope; parameter
//! types always resolve from the root, whatever the scope.

use super::qualified::{NamePart, Params, QualifiedName, TypeSignature};
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::Resolver;
use crate::symbols::{ContainerId, EntityId};
use diagnostics::SourceLocation;
use std::iter::Peekable;
use std::str::CharIndices;

pub const DOT: char = '\u{1}';
pub const OPEN: char = '\u{2}';
pub const CLOSE: char = '\u{3}';
pub const COMMA: char = '\u{4}';
pub const REF_COMMA: char = '\u{5}';
pub const ESCAPE: char = '\u{10}';

fn is_sentinel(c: char) -> bool {
    matches!(c, DOT | OPEN | CLOSE | COMMA | REF_COMMA | ESCAPE)
}

/// Stateless encoder and decoder of mangled names
pub struct NameCodec;

impl NameCodec {
    /// Mangle `name`; parameter types are written as their root paths
    pub fn encode(resolver: &Resolver, name: &QualifiedName) -> String {
        let mut out = String::new();
        write_name(resolver, name, &mut out);
        out
    }

    /// Mangle the root path of `entity`
    pub fn encode_entity(resolver: &Resolver, entity: EntityId) -> String {
        Self::encode(resolver, &resolver.path_of(entity))
    }

    /// Parse a mangled name, resolving parameter types from the root
    pub fn parse(resolver: &mut Resolver, encoded: &str) -> ResolveResult<QualifiedName> {
        if encoded.is_empty() {
            return Ok(QualifiedName::root());
        }
        let mut decoder = Decoder::new(encoded);
        decoder.name(resolver, false)
    }

    /// Decode `encoded` and resolve it from `scope`
    pub fn decode(resolver: &mut Resolver, scope: ContainerId, encoded: &str) -> ResolveResult<EntityId> {
        let name = Self::parse(resolver, encoded)?;
        resolver
            .find_name(scope, &name)?
            .ok_or_else(|| ResolveError::LookupFailure {
                name: name.to_string(),
                location: SourceLocation::unknown(),
            })
    }
}

fn write_name(resolver: &Resolver, name: &QualifiedName, out: &mut String) {
    for (i, part) in name.iter().enumerate() {
        if i > 0 {
            out.push(DOT);
        }
        write_part(resolver, part, out);
    }
}

fn write_part(resolver: &Resolver, part: &NamePart, out: &mut String) {
    for c in part.text().chars() {
        if is_sentinel(c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }

    match part {
        NamePart::Simple { params, .. } if params.is_empty() => {}
        NamePart::Recursive { nested, .. } if nested.is_empty() => {}
        NamePart::Simple { params, .. } => {
            out.push(OPEN);
            for param in params {
                out.push(if param.is_reference { REF_COMMA } else { COMMA });
                if let Some(entity) = param.entity {
                    write_name(resolver, &resolver.path_of(entity), out);
                }
            }
            out.push(CLOSE);
        }
        NamePart::Recursive { nested, .. } => {
            out.push(OPEN);
            for name in nested {
                out.push(COMMA);
                write_name(resolver, name, out);
            }
            out.push(CLOSE);
        }
    }
}

struct Decoder<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Decoder<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn error(&self, position: usize, reason: &'static str) -> ResolveError {
        ResolveError::InvalidEncoding {
            encoded: self.src.to_string(),
            position,
            reason,
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    /// Parse dotted parts. Inside a parameter group the name ends before a
    /// separator or the closing sentinel.
    fn name(&mut self, resolver: &mut Resolver, nested: bool) -> ResolveResult<QualifiedName> {
        let mut name = QualifiedName::root();
        loop {
            name.push(self.part(resolver)?);
            match self.peek() {
                None if nested => return Err(self.error(self.src.len(), "unterminated parameter group")),
                None => return Ok(name),
                Some((_, DOT)) => {
                    self.chars.next();
                }
                Some((_, COMMA | REF_COMMA | CLOSE)) if nested => return Ok(name),
                Some((pos, COMMA | REF_COMMA)) => {
                    return Err(self.error(pos, "parameter separator outside a group"));
                }
                Some((pos, CLOSE)) => return Err(self.error(pos, "group close without a matching open")),
                Some((pos, _)) => return Err(self.error(pos, "unexpected character after a part")),
            }
        }
    }

    fn part(&mut self, resolver: &mut Resolver) -> ResolveResult<NamePart> {
        let mut text = String::new();
        while let Some((pos, c)) = self.peek() {
            match c {
                ESCAPE => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((_, escaped)) => text.push(escaped),
                        None => return Err(self.error(pos, "escape at end of input")),
                    }
                }
                DOT | OPEN | CLOSE | COMMA | REF_COMMA => break,
                _ => {
                    text.push(c);
                    self.chars.next();
                }
            }
        }

        let Some((_, OPEN)) = self.peek() else {
            return Ok(NamePart::simple(text));
        };
        self.chars.next();

        let mut params = Params::new();
        loop {
            match self.chars.next() {
                Some((pos, CLOSE)) if params.is_empty() => return Err(self.error(pos, "empty parameter group")),
                Some((_, CLOSE)) => break,
                Some((_, COMMA)) => params.push(self.param(resolver, false)?),
                Some((_, REF_COMMA)) => params.push(self.param(resolver, true)?),
                Some((pos, _)) => return Err(self.error(pos, "expected a parameter separator")),
                None => return Err(self.error(self.src.len(), "unterminated parameter group")),
            }
        }

        if let Some((pos, c)) = self.peek() {
            if !matches!(c, DOT | CLOSE | COMMA | REF_COMMA) {
                return Err(self.error(pos, "unexpected character after a parameter group"));
            }
        }
        Ok(NamePart::Simple { text, params })
    }

    fn param(
        &mut self,
        resolver: &mut Resolver,
        is_reference: bool,
    ) -> ResolveResult<TypeSignature> {
        if let Some((_, COMMA | REF_COMMA | CLOSE)) = self.peek() {
            return Ok(TypeSignature {
                entity: None,
                is_reference,
            });
        }

        let name = self.name(resolver, true)?;
        let root = resolver.root();
        let entity = resolver
            .find_name(root, &name)?
            .ok_or_else(|| ResolveError::LookupFailure {
                name: name.to_string(),
                location: SourceLocation::unknown(),
            })?;
        Ok(TypeSignature {
            entity: Some(entity),
            is_reference,
        })
    }
}
