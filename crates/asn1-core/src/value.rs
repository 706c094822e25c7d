//! The decoded value tree.
//!
//! Ownership is the ordinary Rust tree: a parent owns its children through
//! `Vec`/`Box`, and dropping the root frees everything transitively. There
//! is no analogue of the manual bookkeeping the original C implementation
//! needed on its error paths — every decode function here returns
//! `Result`, and a failing frame simply never constructs the value it would
//! have published.

use num_bigint::BigInt;

use crate::tag::TagClass;

/// A decoded ASN.1 value, or one node of the tree a SEQUENCE/CHOICE/
/// SEQUENCE-OF decode produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Asn1Value {
    Null,
    Boolean(bool),
    Integer(BigInt),
    ObjectIdentifier(Vec<u64>),
    BitString { unused_bits: u8, bytes: Vec<u8> },
    OctetString(Vec<u8>),
    /// Any string or time type whose universal tag number is stored
    /// alongside the verbatim content bytes, for later reinterpretation.
    TaggedString { tag_number: u32, bytes: Vec<u8> },
    /// A verbatim SEQUENCE/SET/OTHER span (header + body), retained rather
    /// than interpreted.
    Opaque(Vec<u8>),
    /// A named, ordered product. Absent OPTIONAL fields are `None`. `der`
    /// is the verbatim encoded span (header + body) of the whole SEQUENCE,
    /// retained for signature re-verification the way certificate bodies
    /// need it.
    Sequence {
        fields: Vec<(&'static str, Option<Asn1Value>)>,
        der: Vec<u8>,
    },
    /// An ordered SET-OF/SEQUENCE-OF collection.
    Collection(Vec<Asn1Value>),
    /// A CHOICE selection: which arm matched, and its decoded value.
    Choice {
        selector: usize,
        value: Box<Asn1Value>,
    },
    /// An ANY field's observed tag/class plus its encoded bytes, for
    /// non-UNIVERSAL classes (UNIVERSAL tags are decoded as their
    /// corresponding primitive instead).
    Any {
        class: TagClass,
        tag: u32,
        bytes: Vec<u8>,
    },
}

impl Asn1Value {
    /// For a [`Asn1Value::Sequence`], the decoded value of a named field, if
    /// present.
    pub fn field(&self, name: &str) -> Option<&Asn1Value> {
        match self {
            Self::Sequence { fields, .. } => fields
                .iter()
                .find(|(field_name, _)| *field_name == name)
                .and_then(|(_, value)| value.as_ref()),
            _ => None,
        }
    }

    /// For a [`Asn1Value::Collection`], its elements.
    pub fn elements(&self) -> Option<&[Asn1Value]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }
}
