//! Qualified names, their textual forms and mangled encoding

pub mod codec;
pub mod parse;
pub mod qualified;

pub use codec::NameCodec;
pub use parse::{parse_complex_name, parse_simple_name};
pub use qualified::{NamePart, Params, QualifiedName, TypeSignature};
