//! Static type-tree nodes: the template the interpreter walks.
//!
//! These are plain data — `'static` descriptor trees built once and shared
//! across every decode, never mutated at decode time.

use crate::error::{Asn1Error, Asn1ErrorKind};
use crate::tag::TagClass;
use crate::value::Asn1Value;

/// How a field's tag relates to its natural (template) tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    /// No tag override; decode using the sub-item's own natural tag.
    None,
    /// Replace the natural tag entirely.
    Implicit { tag_number: u32, class: TagClass },
    /// Wrap the natural encoding in an additional constructed tag.
    Explicit { tag_number: u32, class: TagClass },
}

/// How many of a field's values to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    SequenceOf,
    SetOf,
}

/// A `D2I_PRE`/`D2I_POST`/ADB-style callback slot. These are plain function
/// pointers rather than `dyn Fn` because descriptor trees are built once as
/// `'static` data — there is no per-decode closure state to capture.
pub type PublishHook = fn(&mut Asn1Value) -> Result<(), Asn1Error>;

/// An external decode function, used by [`ItemDescriptor::Extern`] to
/// delegate to an opaque sub-type the template interpreter does not know
/// how to parse directly. Takes a read-only view starting at the field's
/// first byte and returns the decoded value plus the number of bytes it
/// consumed; the interpreter performs the actual cursor advance.
pub type ExternDecodeFn = fn(crate::cursor::Cursor<'_>) -> Result<(Asn1Value, usize), Asn1Error>;

/// A function-table override replacing the default primitive constructor
/// for one item descriptor, letting a template build its own representation
/// for a leaf value instead of the generic one.
pub type PrimitiveOverride = fn(bytes: &[u8], utype: crate::tag::UniversalTag) -> Result<Asn1Value, Asn1Error>;

/// A child slot inside a CHOICE or SEQUENCE.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub optional: bool,
    pub tag_form: TagForm,
    pub multiplicity: Multiplicity,
    pub item: &'static ItemDescriptor,
}

impl FieldDescriptor {
    /// Checks the structural invariants every field template must satisfy,
    /// independent of any particular input. A violation here is a bug in
    /// the *template*, not in the bytes being decoded.
    pub fn validate(&self) -> Result<(), Asn1Error> {
        if matches!(self.item, ItemDescriptor::Choice { .. })
            && matches!(self.tag_form, TagForm::Implicit { .. })
        {
            return Err(Asn1Error::new(Asn1ErrorKind::BadTemplate));
        }
        if matches!(self.item, ItemDescriptor::MultiString { .. })
            && matches!(self.tag_form, TagForm::Implicit { .. })
        {
            return Err(Asn1Error::new(Asn1ErrorKind::BadTemplate));
        }
        if self.is_any() {
            if !matches!(self.tag_form, TagForm::None) {
                return Err(Asn1Error::new(Asn1ErrorKind::IllegalTaggedAny));
            }
            if self.optional {
                return Err(Asn1Error::new(Asn1ErrorKind::IllegalOptionalAny));
            }
        }
        Ok(())
    }

    fn is_any(&self) -> bool {
        matches!(self.item, ItemDescriptor::Any)
    }
}

/// The static type-tree node.
pub enum ItemDescriptor {
    /// A concrete ASN.1 primitive (or SEQUENCE/SET/OTHER, retained
    /// verbatim).
    Primitive {
        name: &'static str,
        utype: crate::tag::UniversalTag,
        override_ctor: Option<PrimitiveOverride>,
    },
    /// A single sub-template wrapped with no tagging/OPTIONAL of its own —
    /// those flags are illegal directly on this variant.
    PrimitiveTemplate {
        name: &'static str,
        template: &'static FieldDescriptor,
    },
    /// A field accepting any of several string-like universal tags.
    MultiString {
        name: &'static str,
        permitted: &'static [crate::tag::UniversalTag],
    },
    /// A sum type discriminated by tag.
    Choice {
        name: &'static str,
        fields: &'static [FieldDescriptor],
        pre: Option<PublishHook>,
        post: Option<PublishHook>,
    },
    /// A definite-length product type.
    Sequence {
        name: &'static str,
        fields: &'static [FieldDescriptor],
        pre: Option<PublishHook>,
        post: Option<PublishHook>,
    },
    /// A SEQUENCE that additionally tolerates indefinite-length encoding.
    NdefSequence {
        name: &'static str,
        fields: &'static [FieldDescriptor],
        pre: Option<PublishHook>,
        post: Option<PublishHook>,
    },
    /// A type whose encoding is determined dynamically by the tag
    /// encountered at decode time.
    Any,
    /// Delegates entirely to an external decode function.
    Extern {
        name: &'static str,
        decode: ExternDecodeFn,
    },
}

impl ItemDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive { name, .. }
            | Self::PrimitiveTemplate { name, .. }
            | Self::MultiString { name, .. }
            | Self::Choice { name, .. }
            | Self::Sequence { name, .. }
            | Self::NdefSequence { name, .. }
            | Self::Extern { name, .. } => name,
            Self::Any => "ANY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::UniversalTag;

    static UTF8: ItemDescriptor = ItemDescriptor::Primitive {
        name: "UTF8String",
        utype: UniversalTag::Utf8String,
        override_ctor: None,
    };

    #[test]
    fn choice_field_rejects_implicit_tagging() {
        let field = FieldDescriptor {
            name: "bad",
            optional: false,
            tag_form: TagForm::Implicit {
                tag_number: 0,
                class: TagClass::Context,
            },
            multiplicity: Multiplicity::One,
            item: &ItemDescriptor::Choice {
                name: "Inner",
                fields: &[],
                pre: None,
                post: None,
            },
        };
        assert_eq!(
            field.validate().unwrap_err().kind,
            Asn1ErrorKind::BadTemplate
        );
    }

    #[test]
    fn any_field_rejects_tagging_and_optional() {
        let tagged = FieldDescriptor {
            name: "bad",
            optional: false,
            tag_form: TagForm::Implicit {
                tag_number: 0,
                class: TagClass::Context,
            },
            multiplicity: Multiplicity::One,
            item: &ItemDescriptor::Any,
        };
        assert_eq!(
            tagged.validate().unwrap_err().kind,
            Asn1ErrorKind::IllegalTaggedAny
        );

        let optional = FieldDescriptor {
            name: "bad",
            optional: true,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::One,
            item: &ItemDescriptor::Any,
        };
        assert_eq!(
            optional.validate().unwrap_err().kind,
            Asn1ErrorKind::IllegalOptionalAny
        );
    }

    #[test]
    fn plain_field_validates() {
        let field = FieldDescriptor {
            name: "ok",
            optional: true,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::One,
            item: &UTF8,
        };
        assert!(field.validate().is_ok());
    }
}
