//! Named descriptor trees the `decode` subcommand and `tests/vectors/*.json`
//! fixtures refer to by name. Descriptors are static Rust data, so unlike
//! the handshake tables there is no way to load one from JSON — the catalog
//! is the fixed set this harness binary was built with, the same way
//! `frankenlibc-harness`'s `--family string`/`--family malloc` selectors
//! name a fixed, compiled-in set of libc call families rather than a
//! user-supplied one.

use asn1_core::descriptor::{FieldDescriptor, ItemDescriptor, Multiplicity, TagForm};
use asn1_core::tag::UniversalTag;

static INTEGER_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
    name: "INTEGER",
    utype: UniversalTag::Integer,
    override_ctor: None,
};

static OCTET_STRING_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
    name: "OCTET STRING",
    utype: UniversalTag::OctetString,
    override_ctor: None,
};

static BOOLEAN_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
    name: "BOOLEAN",
    utype: UniversalTag::Boolean,
    override_ctor: None,
};

/// `SEQUENCE OF INTEGER`, indefinite-length
/// (`30 80 02 01 01 02 01 02 00 00` → `[1, 2]`).
static INTEGER_LIST_FIELD: FieldDescriptor = FieldDescriptor {
    name: "values",
    optional: false,
    tag_form: TagForm::None,
    multiplicity: Multiplicity::SequenceOf,
    item: &INTEGER_ITEM,
};
pub static INTEGER_LIST: ItemDescriptor = ItemDescriptor::NdefSequence {
    name: "IntegerList",
    fields: &[INTEGER_LIST_FIELD],
    pre: None,
    post: None,
};

/// A small record type exercising a required field, an OPTIONAL field that
/// can be legitimately absent, and the verbatim `der` span capture:
/// `SEQUENCE { id INTEGER, label OCTET STRING, flag BOOLEAN OPTIONAL }`.
static WIDGET_ID: FieldDescriptor = FieldDescriptor {
    name: "id",
    optional: false,
    tag_form: TagForm::None,
    multiplicity: Multiplicity::One,
    item: &INTEGER_ITEM,
};
static WIDGET_LABEL: FieldDescriptor = FieldDescriptor {
    name: "label",
    optional: false,
    tag_form: TagForm::None,
    multiplicity: Multiplicity::One,
    item: &OCTET_STRING_ITEM,
};
static WIDGET_FLAG: FieldDescriptor = FieldDescriptor {
    name: "flag",
    optional: true,
    tag_form: TagForm::None,
    multiplicity: Multiplicity::One,
    item: &BOOLEAN_ITEM,
};
pub static WIDGET: ItemDescriptor = ItemDescriptor::Sequence {
    name: "Widget",
    fields: &[WIDGET_ID, WIDGET_LABEL, WIDGET_FLAG],
    pre: None,
    post: None,
};

/// Resolve a vector's `template` field to a compiled descriptor.
pub fn lookup(name: &str) -> Option<&'static ItemDescriptor> {
    match name {
        "IntegerList" => Some(&INTEGER_LIST),
        "Widget" => Some(&WIDGET),
        _ => None,
    }
}
