//! BER identifier + length octet group decoding.

use crate::cursor::Cursor;
use crate::error::{Asn1Error, Asn1ErrorKind};

/// Tag class, the top two bits of the identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TagClass {
    Universal = 0,
    Application = 1,
    Context = 2,
    Private = 3,
}

impl TagClass {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Universal,
            1 => Self::Application,
            2 => Self::Context,
            3 => Self::Private,
            other => unreachable!("tag class is a 2-bit field, got {other}"),
        }
    }
}

/// Universal-class tag numbers the primitive constructors know about.
/// `Other` catches everything else (and SEQUENCE/SET, which are retained
/// verbatim rather than interpreted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversalTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Enumerated,
    Utf8String,
    Sequence,
    Set,
    PrintableString,
    Ia5String,
    UtcTime,
    GeneralizedTime,
    BmpString,
    UniversalString,
    Other(u32),
}

impl UniversalTag {
    pub fn from_number(n: u32) -> Self {
        match n {
            1 => Self::Boolean,
            2 => Self::Integer,
            3 => Self::BitString,
            4 => Self::OctetString,
            5 => Self::Null,
            6 => Self::ObjectIdentifier,
            10 => Self::Enumerated,
            12 => Self::Utf8String,
            16 => Self::Sequence,
            17 => Self::Set,
            19 => Self::PrintableString,
            22 => Self::Ia5String,
            23 => Self::UtcTime,
            24 => Self::GeneralizedTime,
            30 => Self::BmpString,
            28 => Self::UniversalString,
            other => Self::Other(other),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::Integer => 2,
            Self::BitString => 3,
            Self::OctetString => 4,
            Self::Null => 5,
            Self::ObjectIdentifier => 6,
            Self::Enumerated => 10,
            Self::Utf8String => 12,
            Self::Sequence => 16,
            Self::Set => 17,
            Self::PrintableString => 19,
            Self::Ia5String => 22,
            Self::UtcTime => 23,
            Self::GeneralizedTime => 24,
            Self::BmpString => 30,
            Self::UniversalString => 28,
            Self::Other(n) => n,
        }
    }

    /// Whether this universal type is permitted to appear as a constructed
    /// encoding whose fragments must be collected rather than read as flat
    /// content bytes (BER's "constructed string" allowance).
    pub fn allows_constructed_form(self) -> bool {
        !matches!(self, Self::Sequence | Self::Set | Self::Boolean | Self::Null | Self::Integer)
    }
}

/// A fully decoded identifier + length octet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub tag_number: u32,
    pub class: TagClass,
    pub constructed: bool,
    pub indefinite: bool,
    pub content_length: usize,
}

/// What the caller expects to find, if anything.
#[derive(Debug, Clone, Copy)]
pub enum TagExpectation {
    /// No expectation: always attempt to parse and report the observed tag.
    None,
    /// A mismatch is reported as [`Asn1ErrorKind::WrongTag`] unless `optional`
    /// is set, in which case it is reported as [`TagOutcome::Absent`].
    Exact {
        tag_number: u32,
        class: TagClass,
        optional: bool,
    },
}

/// Result of attempting a tag/length read against an expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Present(TagHeader),
    Absent,
}

/// Read one identifier octet (and its long-form continuation, if any) plus
/// one BER length, honoring `expected`.
pub fn read_tag_length(cursor: &mut Cursor<'_>, expected: TagExpectation) -> Result<TagOutcome, Asn1Error> {
    let mark = *cursor;

    let first = match cursor.read_u8() {
        Ok(b) => b,
        Err(e) => return Err(e),
    };

    let class = TagClass::from_bits(first >> 6);
    let constructed = (first & 0x20) != 0;
    let low_tag = first & 0x1F;

    let tag_number = if low_tag == 0x1F {
        read_long_form_tag_number(cursor)?
    } else {
        u32::from(low_tag)
    };

    if let TagExpectation::Exact {
        tag_number: expected_tag,
        class: expected_class,
        optional,
    } = expected
    {
        if tag_number != expected_tag || class != expected_class {
            if optional {
                *cursor = mark;
                return Ok(TagOutcome::Absent);
            }
            return Err(Asn1Error::new(Asn1ErrorKind::WrongTag));
        }
    }

    let length_byte = cursor.read_u8()?;

    let (indefinite, content_length) = if length_byte == 0x80 {
        if !constructed {
            return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
        }
        (true, 0)
    } else if length_byte & 0x80 == 0 {
        (false, usize::from(length_byte))
    } else {
        let num_octets = usize::from(length_byte & 0x7F);
        if num_octets == 0 || num_octets > core::mem::size_of::<usize>() {
            return Err(Asn1Error::new(Asn1ErrorKind::TooLong));
        }
        let octets = cursor.read_fixed(num_octets)?;
        let mut length: usize = 0;
        for &b in octets {
            length = length
                .checked_shl(8)
                .ok_or_else(|| Asn1Error::new(Asn1ErrorKind::TooLong))?;
            length |= usize::from(b);
        }
        (false, length)
    };

    if !indefinite && content_length > cursor.remaining() {
        return Err(Asn1Error::new(Asn1ErrorKind::TooLong));
    }

    Ok(TagOutcome::Present(TagHeader {
        tag_number,
        class,
        constructed,
        indefinite,
        content_length,
    }))
}

fn read_long_form_tag_number(cursor: &mut Cursor<'_>) -> Result<u32, Asn1Error> {
    let mut value: u32 = 0;
    let mut octets_read = 0usize;
    loop {
        let byte = cursor.read_u8()?;
        octets_read += 1;
        // Tag numbers are bounded to a signed 32-bit range; five base-128
        // digits is already more than enough headroom to catch overflow
        // before it happens.
        if octets_read > 5 {
            return Err(Asn1Error::new(Asn1ErrorKind::TooLong));
        }
        value = value
            .checked_shl(7)
            .ok_or_else(|| Asn1Error::new(Asn1ErrorKind::TooLong))?;
        value |= u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    if value > i32::MAX as u32 {
        return Err(Asn1Error::new(Asn1ErrorKind::TooLong));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_primitive_tag() {
        let data = [0x05, 0x00];
        let mut cursor = Cursor::new(&data);
        let outcome = read_tag_length(&mut cursor, TagExpectation::None).unwrap();
        let header = match outcome {
            TagOutcome::Present(h) => h,
            TagOutcome::Absent => panic!("expected Present"),
        };
        assert_eq!(header.tag_number, 5);
        assert_eq!(header.class, TagClass::Universal);
        assert!(!header.constructed);
        assert!(!header.indefinite);
        assert_eq!(header.content_length, 0);
    }

    #[test]
    fn indefinite_length_requires_constructed() {
        // Primitive bit (0x20 unset) with length 0x80 is malformed.
        let data = [0x04, 0x80];
        let mut cursor = Cursor::new(&data);
        let err = read_tag_length(&mut cursor, TagExpectation::None).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::BadObjectHeader);
    }

    #[test]
    fn indefinite_length_on_constructed_is_accepted() {
        let data = [0x30, 0x80];
        let mut cursor = Cursor::new(&data);
        let outcome = read_tag_length(&mut cursor, TagExpectation::None).unwrap();
        assert!(matches!(outcome, TagOutcome::Present(h) if h.indefinite && h.constructed));
    }

    #[test]
    fn long_form_length_definite() {
        // SEQUENCE, long-form length of 2 octets: 0x01, 0x02 -> 258 bytes.
        let mut data = vec![0x30, 0x82, 0x01, 0x02];
        data.extend(std::iter::repeat(0u8).take(258));
        let mut cursor = Cursor::new(&data);
        let outcome = read_tag_length(&mut cursor, TagExpectation::None).unwrap();
        assert!(matches!(outcome, TagOutcome::Present(h) if h.content_length == 258));
    }

    #[test]
    fn definite_length_exceeding_remaining_is_too_long() {
        let data = [0x04, 0x05, 0x01, 0x02]; // claims 5 bytes, only has 2
        let mut cursor = Cursor::new(&data);
        let err = read_tag_length(&mut cursor, TagExpectation::None).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::TooLong);
    }

    #[test]
    fn optional_mode_returns_absent_on_tag_mismatch_without_advancing() {
        let data = [0x05, 0x00];
        let mut cursor = Cursor::new(&data);
        let before = cursor.offset();
        let outcome = read_tag_length(
            &mut cursor,
            TagExpectation::Exact {
                tag_number: 2,
                class: TagClass::Universal,
                optional: true,
            },
        )
        .unwrap();
        assert!(matches!(outcome, TagOutcome::Absent));
        assert_eq!(cursor.offset(), before);
    }

    #[test]
    fn non_optional_mismatch_is_wrong_tag() {
        let data = [0x05, 0x00];
        let mut cursor = Cursor::new(&data);
        let err = read_tag_length(
            &mut cursor,
            TagExpectation::Exact {
                tag_number: 2,
                class: TagClass::Universal,
                optional: false,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::WrongTag);
    }

    #[test]
    fn long_form_tag_number_decodes_multi_octet() {
        // class=universal, constructed=0, tag=0x1F marker, then 0x81 0x00 -> 128.
        let data = [0x1F, 0x81, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        let outcome = read_tag_length(&mut cursor, TagExpectation::None).unwrap();
        assert!(matches!(outcome, TagOutcome::Present(h) if h.tag_number == 128));
    }
}
