//! # asn1-core
//!
//! A template-driven ASN.1 BER/DER decoder.
//!
//! The engine is an interpreter over a static, declarative description of an
//! ASN.1 type (an [`descriptor::ItemDescriptor`] tree): it walks the tree and
//! the input bytes together, producing an in-memory [`value::Asn1Value`] and
//! enforcing the well-formedness, tagging, and recursion rules that BER/DER
//! require. No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod cursor;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod eoc;
pub mod interpreter;
pub mod primitive;
pub mod tag;
pub mod value;

pub use decode::{decode, decode_field};
pub use descriptor::{FieldDescriptor, ItemDescriptor, Multiplicity, TagForm};
pub use error::{Asn1Annotation, Asn1Error, Asn1ErrorKind, Asn1Result};
pub use tag::{TagClass, UniversalTag};
pub use value::Asn1Value;

/// Maximum number of nested constructed levels a single decode may traverse.
///
/// This is the sole defense against adversarial recursion in constructed
/// encodings (SEQUENCE/SET/CHOICE nesting, explicit tag wrappers).
pub const MAX_CONSTRUCTED_NEST: u32 = 30;

/// Maximum recursion depth when flattening a constructed string into a
/// contiguous buffer (see [`eoc::collect_constructed_string`]).
pub const MAX_STRING_NEST: u32 = 5;
