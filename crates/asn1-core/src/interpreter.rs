//! The template interpreter: walks a static [`descriptor`] tree and the
//! input bytes together, producing a [`value::Asn1Value`] tree.
//!
//! Every public function here returns an [`Outcome`] rather than a bare
//! `Asn1Value`, because OPTIONAL is a first-class outcome, not an error: a
//! field that is simply not present must be distinguishable from a field
//! that failed to parse.

use crate::MAX_CONSTRUCTED_NEST;
use crate::cursor::Cursor;
use crate::descriptor::{FieldDescriptor, ItemDescriptor, Multiplicity, PrimitiveOverride, PublishHook, TagForm};
use crate::eoc::{collect_constructed_string, find_end, try_consume_eoc};
use crate::error::{Asn1Error, Asn1ErrorKind};
use crate::primitive::construct;
use crate::tag::{TagClass, TagExpectation, TagOutcome, UniversalTag, read_tag_length};
use crate::value::Asn1Value;

/// The result of attempting to decode one item or field: either a value was
/// produced, or an OPTIONAL slot legitimately matched nothing.
#[derive(Debug)]
pub enum Outcome {
    Value(Asn1Value),
    Absent,
}

/// Decode one [`ItemDescriptor`] from `cursor`.
///
/// `tag_override` replaces the item's natural tag — used for IMPLICIT
/// tagging on [`ItemDescriptor::Primitive`] and [`ItemDescriptor::Sequence`]/
/// [`ItemDescriptor::NdefSequence`]; every other variant ignores it (field
/// validation has already rejected IMPLICIT on CHOICE and MSTRING items
/// before this is ever called).
pub fn decode_item(
    cursor: &mut Cursor<'_>,
    item: &'static ItemDescriptor,
    tag_override: Option<(u32, TagClass)>,
    optional: bool,
    depth: u32,
) -> Result<Outcome, Asn1Error> {
    let depth = depth + 1;
    if depth > MAX_CONSTRUCTED_NEST {
        return Err(Asn1Error::new(Asn1ErrorKind::NestedTooDeep));
    }

    match item {
        ItemDescriptor::Extern { name, decode } => {
            if tag_override.is_some() || optional {
                return Err(Asn1Error::new(Asn1ErrorKind::IllegalOptionsOnItemTemplate).annotate(None, name));
            }
            let (value, consumed) = decode(*cursor).map_err(|e| e.annotate(None, name))?;
            cursor.skip(consumed).map_err(|e| e.annotate(None, name))?;
            Ok(Outcome::Value(value))
        }
        ItemDescriptor::PrimitiveTemplate { name, template } => {
            if tag_override.is_some() || optional {
                return Err(Asn1Error::new(Asn1ErrorKind::IllegalOptionsOnItemTemplate).annotate(None, name));
            }
            decode_field(cursor, template, depth)
        }
        ItemDescriptor::Primitive { name, utype, override_ctor } => {
            decode_primitive(cursor, *utype, *override_ctor, tag_override, optional).map_err(|e| e.annotate(None, name))
        }
        ItemDescriptor::MultiString { name, permitted } => {
            decode_multi_string(cursor, permitted, optional).map_err(|e| e.annotate(None, name))
        }
        ItemDescriptor::Choice { name, fields, pre, post } => decode_choice(cursor, name, fields, *pre, *post, optional, depth),
        ItemDescriptor::Sequence { name, fields, pre, post } => {
            decode_sequence(cursor, name, fields, *pre, *post, optional, tag_override, depth)
        }
        ItemDescriptor::NdefSequence { name, fields, pre, post } => {
            decode_sequence(cursor, name, fields, *pre, *post, optional, tag_override, depth)
        }
        ItemDescriptor::Any => decode_any(cursor),
    }
}

/// Decode one [`FieldDescriptor`] from `cursor`: the explicit-wrapper,
/// SET-OF/SEQUENCE-OF, and plain-IMPLICIT layers a field adds on top of its
/// underlying item.
pub fn decode_field(cursor: &mut Cursor<'_>, field: &FieldDescriptor, depth: u32) -> Result<Outcome, Asn1Error> {
    field.validate()?;

    if let TagForm::Explicit { tag_number, class } = field.tag_form {
        let outcome = read_tag_length(
            cursor,
            TagExpectation::Exact {
                tag_number,
                class,
                optional: field.optional,
            },
        )?;
        let header = match outcome {
            TagOutcome::Present(h) => h,
            TagOutcome::Absent => return Ok(Outcome::Absent),
        };
        if !header.constructed {
            return Err(Asn1Error::new(Asn1ErrorKind::ExplicitTagNotConstructed));
        }
        if header.indefinite {
            let mut inner = *cursor;
            let result = decode_field_body(&mut inner, field, TagForm::None, depth)?;
            if !try_consume_eoc(&mut inner)? {
                return Err(Asn1Error::new(Asn1ErrorKind::MissingEoc));
            }
            *cursor = inner;
            Ok(result)
        } else {
            let mut inner = cursor.sub_cursor(header.content_length)?;
            let result = decode_field_body(&mut inner, field, TagForm::None, depth)?;
            if !inner.is_empty() {
                return Err(Asn1Error::new(Asn1ErrorKind::SequenceLengthMismatch));
            }
            cursor.skip(header.content_length)?;
            Ok(result)
        }
    } else {
        decode_field_body(cursor, field, field.tag_form, depth)
    }
}

fn decode_field_body(
    cursor: &mut Cursor<'_>,
    field: &FieldDescriptor,
    tag_form: TagForm,
    depth: u32,
) -> Result<Outcome, Asn1Error> {
    match field.multiplicity {
        Multiplicity::One => {
            let tag_override = match tag_form {
                TagForm::Implicit { tag_number, class } => Some((tag_number, class)),
                _ => None,
            };
            decode_item(cursor, field.item, tag_override, field.optional, depth)
        }
        Multiplicity::SequenceOf | Multiplicity::SetOf => decode_of(cursor, field, tag_form, depth),
    }
}

fn decode_of(cursor: &mut Cursor<'_>, field: &FieldDescriptor, tag_form: TagForm, depth: u32) -> Result<Outcome, Asn1Error> {
    let (default_tag, default_class) = match field.multiplicity {
        Multiplicity::SequenceOf => (UniversalTag::Sequence.number(), TagClass::Universal),
        Multiplicity::SetOf => (UniversalTag::Set.number(), TagClass::Universal),
        Multiplicity::One => unreachable!("decode_of is only called for SET-OF/SEQUENCE-OF"),
    };
    let (tag_number, class) = match tag_form {
        TagForm::Implicit { tag_number, class } => (tag_number, class),
        _ => (default_tag, default_class),
    };

    let outcome = read_tag_length(
        cursor,
        TagExpectation::Exact {
            tag_number,
            class,
            optional: field.optional,
        },
    )?;
    let header = match outcome {
        TagOutcome::Present(h) => h,
        TagOutcome::Absent => return Ok(Outcome::Absent),
    };
    if !header.constructed {
        return Err(Asn1Error::new(Asn1ErrorKind::SequenceNotConstructed));
    }

    let mut body = if header.indefinite { *cursor } else { cursor.sub_cursor(header.content_length)? };
    let mut items = Vec::new();
    loop {
        if header.indefinite {
            if try_consume_eoc(&mut body)? {
                break;
            }
            if body.is_empty() {
                return Err(Asn1Error::new(Asn1ErrorKind::MissingEoc));
            }
        } else if body.is_empty() {
            break;
        }
        match decode_item(&mut body, field.item, None, false, depth)? {
            Outcome::Value(v) => items.push(v),
            Outcome::Absent => unreachable!("an element of a SET-OF/SEQUENCE-OF is never optional"),
        }
    }

    if header.indefinite {
        *cursor = body;
    } else {
        if !body.is_empty() {
            return Err(Asn1Error::new(Asn1ErrorKind::SequenceLengthMismatch));
        }
        cursor.skip(header.content_length)?;
    }
    Ok(Outcome::Value(Asn1Value::Collection(items)))
}

fn decode_primitive(
    cursor: &mut Cursor<'_>,
    utype: UniversalTag,
    override_ctor: Option<PrimitiveOverride>,
    tag_override: Option<(u32, TagClass)>,
    optional: bool,
) -> Result<Outcome, Asn1Error> {
    let mark = cursor.offset();
    let (tag_number, class) = tag_override.unwrap_or((utype.number(), TagClass::Universal));
    let outcome = read_tag_length(cursor, TagExpectation::Exact { tag_number, class, optional })?;
    let header = match outcome {
        TagOutcome::Present(h) => h,
        TagOutcome::Absent => return Ok(Outcome::Absent),
    };
    Ok(Outcome::Value(finish_primitive(cursor, mark, header, utype, override_ctor)?))
}

fn decode_multi_string(
    cursor: &mut Cursor<'_>,
    permitted: &'static [UniversalTag],
    optional: bool,
) -> Result<Outcome, Asn1Error> {
    let rewind = *cursor;
    let mark = cursor.offset();
    let outcome = read_tag_length(cursor, TagExpectation::None)?;
    let header = match outcome {
        TagOutcome::Present(h) => h,
        TagOutcome::Absent => unreachable!("TagExpectation::None never returns Absent"),
    };
    if header.class != TagClass::Universal {
        if optional {
            *cursor = rewind;
            return Ok(Outcome::Absent);
        }
        return Err(Asn1Error::new(Asn1ErrorKind::MstringNotUniversal));
    }
    let utype = UniversalTag::from_number(header.tag_number);
    if !permitted.contains(&utype) {
        if optional {
            *cursor = rewind;
            return Ok(Outcome::Absent);
        }
        return Err(Asn1Error::new(Asn1ErrorKind::MstringWrongTag));
    }
    Ok(Outcome::Value(finish_primitive(cursor, mark, header, utype, None)?))
}

fn decode_any(cursor: &mut Cursor<'_>) -> Result<Outcome, Asn1Error> {
    let mark = cursor.offset();
    let outcome = read_tag_length(cursor, TagExpectation::None)?;
    let header = match outcome {
        TagOutcome::Present(h) => h,
        TagOutcome::Absent => unreachable!("TagExpectation::None never returns Absent"),
    };
    if header.class != TagClass::Universal {
        find_end(cursor, header.indefinite, header.content_length)?;
        let span = cursor.span_since(mark).to_vec();
        return Ok(Outcome::Value(Asn1Value::Any {
            class: header.class,
            tag: header.tag_number,
            bytes: span,
        }));
    }
    let utype = UniversalTag::from_number(header.tag_number);
    Ok(Outcome::Value(finish_primitive(cursor, mark, header, utype, None)?))
}

/// Given an already-read tag/length header, extract the content bytes
/// (verbatim span for SEQUENCE/SET/OTHER, flattened fragments for a
/// constructed string, or a flat read otherwise) and build the leaf value.
fn finish_primitive(
    cursor: &mut Cursor<'_>,
    mark: usize,
    header: crate::tag::TagHeader,
    utype: UniversalTag,
    override_ctor: Option<PrimitiveOverride>,
) -> Result<Asn1Value, Asn1Error> {
    let needs_verbatim = matches!(utype, UniversalTag::Sequence | UniversalTag::Set | UniversalTag::Other(_));

    let bytes = if needs_verbatim {
        find_end(cursor, header.indefinite, header.content_length)?;
        cursor.span_since(mark).to_vec()
    } else if header.constructed {
        if !utype.allows_constructed_form() {
            return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
        }
        let mut sink = Vec::new();
        collect_constructed_string(cursor, header.indefinite, header.content_length, &mut sink, 0)?;
        sink
    } else {
        cursor.read_fixed(header.content_length)?.to_vec()
    };

    match override_ctor {
        Some(ctor) => ctor(&bytes, utype),
        None => construct(&bytes, utype),
    }
}

fn decode_choice(
    cursor: &mut Cursor<'_>,
    name: &'static str,
    fields: &'static [FieldDescriptor],
    pre: Option<PublishHook>,
    post: Option<PublishHook>,
    optional: bool,
    depth: u32,
) -> Result<Outcome, Asn1Error> {
    let mut placeholder = Asn1Value::Null;
    if let Some(pre) = pre {
        pre(&mut placeholder).map_err(|e| e.annotate(None, name))?;
    }

    let mut selected: Option<(usize, Asn1Value)> = None;
    for (index, field) in fields.iter().enumerate() {
        let mark = *cursor;
        // A tag mismatch on one arm just means "try the next arm", regardless
        // of whether the arm's own template marks it OPTIONAL — that flag is
        // about the arm's value, not about whether CHOICE may skip past it.
        let mut probe = *field;
        probe.optional = true;
        match decode_field(cursor, &probe, depth) {
            Ok(Outcome::Value(value)) => {
                selected = Some((index, value));
                break;
            }
            Ok(Outcome::Absent) => {
                *cursor = mark;
            }
            Err(e) => return Err(e.annotate(Some(field.name), name)),
        }
    }

    let (selector, inner) = match selected {
        Some(pair) => pair,
        None => {
            if optional {
                return Ok(Outcome::Absent);
            }
            return Err(Asn1Error::new(Asn1ErrorKind::NoMatchingChoiceType).annotate(None, name));
        }
    };

    let mut value = Asn1Value::Choice {
        selector,
        value: Box::new(inner),
    };
    if let Some(post) = post {
        post(&mut value).map_err(|e| e.annotate(None, name))?;
    }
    Ok(Outcome::Value(value))
}

#[allow(clippy::too_many_arguments)]
fn decode_sequence(
    cursor: &mut Cursor<'_>,
    name: &'static str,
    fields: &'static [FieldDescriptor],
    pre: Option<PublishHook>,
    post: Option<PublishHook>,
    optional: bool,
    tag_override: Option<(u32, TagClass)>,
    depth: u32,
) -> Result<Outcome, Asn1Error> {
    let mark = cursor.offset();
    let (tag_number, class) = tag_override.unwrap_or((UniversalTag::Sequence.number(), TagClass::Universal));
    let outcome = read_tag_length(cursor, TagExpectation::Exact { tag_number, class, optional })?;
    let header = match outcome {
        TagOutcome::Present(h) => h,
        TagOutcome::Absent => return Ok(Outcome::Absent),
    };
    if !header.constructed {
        return Err(Asn1Error::new(Asn1ErrorKind::SequenceNotConstructed).annotate(None, name));
    }

    let mut body = if header.indefinite { *cursor } else { cursor.sub_cursor(header.content_length)? };

    let mut placeholder = Asn1Value::Sequence {
        fields: Vec::new(),
        der: Vec::new(),
    };
    if let Some(pre) = pre {
        pre(&mut placeholder).map_err(|e| e.annotate(None, name))?;
    }

    let mut entries: Vec<(&'static str, Option<Asn1Value>)> = Vec::new();
    let last_index = fields.len().saturating_sub(1);
    let mut eoc_seen = false;

    for (index, field) in fields.iter().enumerate() {
        if header.indefinite && try_consume_eoc(&mut body)? {
            eoc_seen = true;
            break;
        }
        if body.is_empty() {
            break;
        }

        // A SEQUENCE's last field is decoded as non-optional even if the
        // template marks it OPTIONAL: trailing content always belongs to it.
        let mut effective_field = *field;
        if index == last_index {
            effective_field.optional = false;
        }

        match decode_field(&mut body, &effective_field, depth) {
            Ok(Outcome::Value(v)) => entries.push((field.name, Some(v))),
            Ok(Outcome::Absent) => entries.push((field.name, None)),
            Err(e) => return Err(e.annotate(Some(field.name), name)),
        }
    }

    if header.indefinite {
        if !eoc_seen && !try_consume_eoc(&mut body)? {
            return Err(Asn1Error::new(Asn1ErrorKind::MissingEoc).annotate(None, name));
        }
    } else if !body.is_empty() {
        return Err(Asn1Error::new(Asn1ErrorKind::SequenceLengthMismatch).annotate(None, name));
    }

    for field in fields.iter().skip(entries.len()) {
        if !field.optional {
            return Err(Asn1Error::new(Asn1ErrorKind::FieldMissing).annotate(Some(field.name), name));
        }
        entries.push((field.name, None));
    }

    if header.indefinite {
        *cursor = body;
    } else {
        cursor.skip(header.content_length)?;
    }

    let mut value = Asn1Value::Sequence {
        fields: entries,
        der: cursor.span_since(mark).to_vec(),
    };
    if let Some(post) = post {
        post(&mut value).map_err(|e| e.annotate(None, name))?;
    }
    Ok(Outcome::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    static NULL_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "NULL",
        utype: UniversalTag::Null,
        override_ctor: None,
    };
    static INTEGER_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "INTEGER",
        utype: UniversalTag::Integer,
        override_ctor: None,
    };
    static UTF8_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "UTF8String",
        utype: UniversalTag::Utf8String,
        override_ctor: None,
    };

    fn required(item: &'static ItemDescriptor, name: &'static str) -> FieldDescriptor {
        FieldDescriptor {
            name,
            optional: false,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::One,
            item,
        }
    }

    fn optional(item: &'static ItemDescriptor, name: &'static str) -> FieldDescriptor {
        FieldDescriptor {
            name,
            optional: true,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::One,
            item,
        }
    }

    #[test]
    fn decode_item_null() {
        let data = [0x05, 0x00];
        let mut cursor = Cursor::new(&data);
        match decode_item(&mut cursor, &NULL_ITEM, None, false, 0).unwrap() {
            Outcome::Value(Asn1Value::Null) => {}
            _ => panic!("expected NULL"),
        }
        assert!(cursor.is_empty());
    }

    #[test]
    fn decode_item_integer_value() {
        let data = [0x02, 0x02, 0x00, 0x80];
        let mut cursor = Cursor::new(&data);
        match decode_item(&mut cursor, &INTEGER_ITEM, None, false, 0).unwrap() {
            Outcome::Value(Asn1Value::Integer(n)) => assert_eq!(n, num_bigint::BigInt::from(128)),
            _ => panic!("expected INTEGER"),
        }
    }

    #[test]
    fn depth_guard_rejects_excessive_nesting() {
        static RECURSIVE: ItemDescriptor = ItemDescriptor::Any;
        let data = [0x05, 0x00];
        let mut cursor = Cursor::new(&data);
        let err = decode_item(&mut cursor, &RECURSIVE, None, false, MAX_CONSTRUCTED_NEST).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::NestedTooDeep);
    }

    #[test]
    fn sequence_decodes_two_required_fields() {
        let a = required(&INTEGER_ITEM, "a");
        let b = required(&INTEGER_ITEM, "b");
        let fields: &'static [FieldDescriptor] = Box::leak(Box::new([a, b]));
        let item: &'static ItemDescriptor = Box::leak(Box::new(ItemDescriptor::Sequence {
            name: "Pair",
            fields,
            pre: None,
            post: None,
        }));

        // SEQUENCE { INTEGER 1, INTEGER 2 }
        let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let mut cursor = Cursor::new(&data);
        let outcome = decode_item(&mut cursor, item, None, false, 0).unwrap();
        let value = match outcome {
            Outcome::Value(v) => v,
            Outcome::Absent => panic!("expected value"),
        };
        match value {
            Asn1Value::Sequence { fields, der } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].1, Some(Asn1Value::Integer(num_bigint::BigInt::from(1))));
                assert_eq!(fields[1].1, Some(Asn1Value::Integer(num_bigint::BigInt::from(2))));
                assert_eq!(der, data.to_vec());
            }
            _ => panic!("expected SEQUENCE"),
        }
        assert!(cursor.is_empty());
    }

    #[test]
    fn indefinite_sequence_of_two_integers() {
        let field = FieldDescriptor {
            name: "values",
            optional: false,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::SequenceOf,
            item: &INTEGER_ITEM,
        };
        let field: &'static FieldDescriptor = Box::leak(Box::new(field));

        // indefinite SEQUENCE OF: 30 80, INTEGER 1, INTEGER 2, EOC
        let data = [0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        let outcome = decode_field(&mut cursor, field, 0).unwrap();
        let value = match outcome {
            Outcome::Value(v) => v,
            Outcome::Absent => panic!("expected value"),
        };
        let elements = value.elements().unwrap();
        assert_eq!(elements.len(), 2);
        assert!(cursor.is_empty());
    }

    #[test]
    fn choice_picks_first_matching_arm() {
        let int_arm = required(&INTEGER_ITEM, "asInt");
        let str_arm = required(&UTF8_ITEM, "asString");
        let arms: &'static [FieldDescriptor] = Box::leak(Box::new([int_arm, str_arm]));
        let item: &'static ItemDescriptor = Box::leak(Box::new(ItemDescriptor::Choice {
            name: "StringOrInt",
            fields: arms,
            pre: None,
            post: None,
        }));

        let data = [0x0C, 0x03, b'f', b'o', b'o'];
        let mut cursor = Cursor::new(&data);
        let outcome = decode_item(&mut cursor, item, None, false, 0).unwrap();
        match outcome {
            Outcome::Value(Asn1Value::Choice { selector, value }) => {
                assert_eq!(selector, 1);
                assert_eq!(*value, Asn1Value::TaggedString { tag_number: 12, bytes: b"foo".to_vec() });
            }
            _ => panic!("expected a choice match"),
        }
    }

    #[test]
    fn choice_reports_no_matching_type_when_required() {
        let int_arm = required(&INTEGER_ITEM, "asInt");
        let arms: &'static [FieldDescriptor] = Box::leak(Box::new([int_arm]));
        let item: &'static ItemDescriptor = Box::leak(Box::new(ItemDescriptor::Choice {
            name: "OnlyInt",
            fields: arms,
            pre: None,
            post: None,
        }));

        let data = [0x05, 0x00]; // NULL: matches nothing
        let mut cursor = Cursor::new(&data);
        let err = decode_item(&mut cursor, item, None, false, 0).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::NoMatchingChoiceType);
    }

    #[test]
    fn optional_field_absent_leaves_cursor_untouched() {
        let field = optional(&INTEGER_ITEM, "maybeInt");
        let field: &'static FieldDescriptor = Box::leak(Box::new(field));
        let data = [0x05, 0x00]; // NULL, not the expected INTEGER tag
        let mut cursor = Cursor::new(&data);
        let before = cursor.offset();
        match decode_field(&mut cursor, field, 0).unwrap() {
            Outcome::Absent => {}
            Outcome::Value(_) => panic!("expected absent"),
        }
        assert_eq!(cursor.offset(), before);
    }
}
