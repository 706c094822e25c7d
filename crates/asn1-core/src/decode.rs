//! Top-level decode entry points: turn a byte slice and a static descriptor
//! into an [`Asn1Value`], without exposing the interpreter's cursor
//! machinery to callers.

use crate::cursor::Cursor;
use crate::descriptor::{FieldDescriptor, ItemDescriptor};
use crate::error::Asn1Result;
use crate::interpreter::{self, Outcome};
use crate::value::Asn1Value;

/// Decode a complete item from `input`, starting at offset zero.
///
/// Returns the decoded value and the number of bytes consumed. Trailing
/// bytes after the item are not an error — callers that need to reject them
/// should compare the returned length against `input.len()` themselves,
/// the way a DER-strict caller decoding a whole file would.
pub fn decode(input: &[u8], item: &'static ItemDescriptor) -> Asn1Result<(Asn1Value, usize)> {
    let mut cursor = Cursor::new(input);
    match interpreter::decode_item(&mut cursor, item, None, false, 0)? {
        Outcome::Value(value) => Ok((value, cursor.offset())),
        Outcome::Absent => unreachable!("a top-level decode target is never OPTIONAL"),
    }
}

/// Decode a single field template from `input`. Unlike [`decode`], the
/// field may be OPTIONAL, in which case `Ok((None, 0))` is returned without
/// consuming anything.
pub fn decode_field(input: &[u8], field: &'static FieldDescriptor) -> Asn1Result<(Option<Asn1Value>, usize)> {
    let mut cursor = Cursor::new(input);
    let outcome = interpreter::decode_field(&mut cursor, field, 0)?;
    Ok(match outcome {
        Outcome::Value(value) => (Some(value), cursor.offset()),
        Outcome::Absent => (None, 0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Multiplicity, TagForm};
    use crate::error::Asn1ErrorKind;
    use crate::tag::UniversalTag;
    use num_bigint::BigInt;

    static NULL_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "NULL",
        utype: UniversalTag::Null,
        override_ctor: None,
    };
    static BOOLEAN_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "BOOLEAN",
        utype: UniversalTag::Boolean,
        override_ctor: None,
    };
    static INTEGER_ITEM: ItemDescriptor = ItemDescriptor::Primitive {
        name: "INTEGER",
        utype: UniversalTag::Integer,
        override_ctor: None,
    };

    #[test]
    fn decodes_null() {
        let (value, consumed) = decode(&[0x05, 0x00], &NULL_ITEM).unwrap();
        assert_eq!(value, Asn1Value::Null);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn decodes_boolean_true_and_false() {
        let (true_value, _) = decode(&[0x01, 0x01, 0xFF], &BOOLEAN_ITEM).unwrap();
        assert_eq!(true_value, Asn1Value::Boolean(true));
        let (false_value, _) = decode(&[0x01, 0x01, 0x00], &BOOLEAN_ITEM).unwrap();
        assert_eq!(false_value, Asn1Value::Boolean(false));
    }

    #[test]
    fn decodes_integer_boundary_values() {
        let (positive, _) = decode(&[0x02, 0x02, 0x00, 0x80], &INTEGER_ITEM).unwrap();
        assert_eq!(positive, Asn1Value::Integer(BigInt::from(128)));
        let (negative, _) = decode(&[0x02, 0x01, 0x80], &INTEGER_ITEM).unwrap();
        assert_eq!(negative, Asn1Value::Integer(BigInt::from(-128)));
    }

    #[test]
    fn decodes_indefinite_sequence_of_integers() {
        let field = FieldDescriptor {
            name: "values",
            optional: false,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::SequenceOf,
            item: &INTEGER_ITEM,
        };
        let field: &'static FieldDescriptor = Box::leak(Box::new(field));
        let data = [0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00];
        let (value, consumed) = decode_field(&data, field).unwrap();
        let value = value.unwrap();
        let elements = value.elements().unwrap();
        assert_eq!(elements, &[Asn1Value::Integer(BigInt::from(1)), Asn1Value::Integer(BigInt::from(2))]);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn rejects_nesting_past_the_depth_bound() {
        // 31 nested indefinite-length SEQUENCE headers with no content: one
        // past MAX_CONSTRUCTED_NEST.
        let mut data = Vec::new();
        for _ in 0..31 {
            data.extend_from_slice(&[0x30, 0x80]);
        }
        let err = decode(&data, &SELF_NESTING_SEQUENCE).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::NestedTooDeep);
    }

    // A SEQUENCE whose only field recurses into itself, used to exercise the
    // depth guard against adversarially deep nesting.
    static SELF_NESTING_FIELD: FieldDescriptor = FieldDescriptor {
        name: "inner",
        optional: true,
        tag_form: TagForm::None,
        multiplicity: Multiplicity::One,
        item: &SELF_NESTING_SEQUENCE,
    };
    static SELF_NESTING_SEQUENCE: ItemDescriptor = ItemDescriptor::NdefSequence {
        name: "Nested",
        fields: &[SELF_NESTING_FIELD],
        pre: None,
        post: None,
    };

    #[test]
    fn optional_field_reports_absent_without_consuming() {
        let field = FieldDescriptor {
            name: "maybe",
            optional: true,
            tag_form: TagForm::None,
            multiplicity: Multiplicity::One,
            item: &INTEGER_ITEM,
        };
        let field: &'static FieldDescriptor = Box::leak(Box::new(field));
        let (value, consumed) = decode_field(&[0x05, 0x00], field).unwrap();
        assert_eq!(value, None);
        assert_eq!(consumed, 0);
    }
}
