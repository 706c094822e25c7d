//! Indefinite-length traversal: finding where a (possibly nested)
//! indefinite-length object ends, and flattening constructed string
//! fragments into one contiguous buffer.

use crate::cursor::Cursor;
use crate::error::{Asn1Error, Asn1ErrorKind};
use crate::tag::{TagClass, TagExpectation, TagOutcome, read_tag_length};
use crate::MAX_STRING_NEST;

/// Advance `cursor` past one encoded object, whose header has already been
/// consumed and described by `indefinite`/`content_length`. For a definite
/// length this is a plain skip; for an indefinite length it walks forward,
/// tracking nested indefinite-constructed headers, until the matching
/// end-of-contents marker is found.
pub fn find_end(cursor: &mut Cursor<'_>, indefinite: bool, content_length: usize) -> Result<(), Asn1Error> {
    if !indefinite {
        return cursor.skip(content_length);
    }

    let mut eoc_depth: u32 = 1;
    while eoc_depth > 0 {
        if cursor.remaining() >= 2 && cursor.peek_u8() == Some(0x00) {
            let mut probe = *cursor;
            let first = probe.read_u8()?;
            let second = probe.read_u8()?;
            if first == 0x00 && second == 0x00 {
                *cursor = probe;
                eoc_depth -= 1;
                continue;
            }
        }
        let outcome = read_tag_length(cursor, TagExpectation::None)?;
        let header = match outcome {
            TagOutcome::Present(h) => h,
            TagOutcome::Absent => unreachable!("TagExpectation::None never returns Absent"),
        };
        if header.indefinite {
            eoc_depth += 1;
        } else {
            cursor.skip(header.content_length)?;
        }
        if cursor.is_empty() && eoc_depth > 0 {
            return Err(Asn1Error::new(Asn1ErrorKind::MissingEoc));
        }
    }
    Ok(())
}

/// Flatten a constructed string's primitive leaf fragments into `sink`.
/// Inner tag *numbers* are ignored deliberately; inner tags must be
/// UNIVERSAL class. Recursion is capped at
/// [`MAX_STRING_NEST`].
pub fn collect_constructed_string(
    cursor: &mut Cursor<'_>,
    indefinite: bool,
    content_length: usize,
    sink: &mut Vec<u8>,
    depth: u32,
) -> Result<(), Asn1Error> {
    if depth > MAX_STRING_NEST {
        return Err(Asn1Error::new(Asn1ErrorKind::NestedAsn1String));
    }

    let mut body = if indefinite {
        *cursor
    } else {
        cursor.sub_cursor(content_length)?
    };

    loop {
        if indefinite {
            if body.remaining() >= 2 && body.peek_u8() == Some(0x00) {
                let mut probe = body;
                let first = probe.read_u8()?;
                let second = probe.read_u8()?;
                if first == 0x00 && second == 0x00 {
                    body = probe;
                    break;
                }
            }
            if body.is_empty() {
                return Err(Asn1Error::new(Asn1ErrorKind::MissingEoc));
            }
        } else if body.is_empty() {
            break;
        }

        let outcome = read_tag_length(&mut body, TagExpectation::None)?;
        let header = match outcome {
            TagOutcome::Present(h) => h,
            TagOutcome::Absent => unreachable!("TagExpectation::None never returns Absent"),
        };
        if header.class != TagClass::Universal {
            return Err(Asn1Error::new(Asn1ErrorKind::MstringNotUniversal));
        }
        if header.constructed {
            collect_constructed_string(&mut body, header.indefinite, header.content_length, sink, depth + 1)?;
        } else {
            let fragment = body.read_fixed(header.content_length)?;
            sink.extend_from_slice(fragment);
        }
    }

    if indefinite {
        *cursor = body;
    } else {
        cursor.skip(content_length)?;
    }
    Ok(())
}

/// If `cursor` is positioned right at a `00 00` end-of-contents marker,
/// consume it and return `true`; otherwise leave `cursor` untouched.
pub fn try_consume_eoc(cursor: &mut Cursor<'_>) -> Result<bool, Asn1Error> {
    if cursor.remaining() >= 2 && cursor.peek_u8() == Some(0x00) && cursor.peek_u16() == Some(0x0000) {
        cursor.read_u8()?;
        cursor.read_u8()?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_end_definite_is_a_plain_skip() {
        let data = [1, 2, 3, 4, 5];
        let mut cursor = Cursor::new(&data);
        find_end(&mut cursor, false, 3).unwrap();
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn find_end_indefinite_stops_at_matching_eoc() {
        // 02 01 01 (INTEGER 1) then EOC.
        let data = [0x02, 0x01, 0x01, 0x00, 0x00, 0xFF];
        let mut cursor = Cursor::new(&data);
        find_end(&mut cursor, true, 0).unwrap();
        assert_eq!(cursor.remaining(), 1, "stops right after the EOC marker");
    }

    #[test]
    fn find_end_indefinite_tracks_nested_indefinite_headers() {
        // outer already consumed; body = nested indefinite SEQUENCE (30 80) with
        // one INTEGER then its own EOC, then the outer EOC.
        let data = [0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        find_end(&mut cursor, true, 0).unwrap();
        assert!(cursor.is_empty());
    }

    #[test]
    fn find_end_missing_eoc_is_an_error() {
        let data = [0x02, 0x01, 0x01];
        let mut cursor = Cursor::new(&data);
        let err = find_end(&mut cursor, true, 0).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::MissingEoc);
    }

    #[test]
    fn collect_flattens_nested_primitive_fragments() {
        // Constructed OCTET STRING containing two primitive fragments: "ab" "cd".
        let data = [0x04, 0x02, b'a', b'b', 0x04, 0x02, b'c', b'd'];
        let mut cursor = Cursor::new(&data);
        let mut sink = Vec::new();
        collect_constructed_string(&mut cursor, false, data.len(), &mut sink, 0).unwrap();
        assert_eq!(sink, b"abcd");
    }

    #[test]
    fn collect_rejects_non_universal_inner_tag() {
        let data = [0x84, 0x01, b'a'];
        let mut cursor = Cursor::new(&data);
        let mut sink = Vec::new();
        let err = collect_constructed_string(&mut cursor, false, data.len(), &mut sink, 0).unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::MstringNotUniversal);
    }

    #[test]
    fn collect_enforces_depth_bound() {
        let data = [0x04, 0x00];
        let mut cursor = Cursor::new(&data);
        let mut sink = Vec::new();
        let err = collect_constructed_string(&mut cursor, false, data.len(), &mut sink, MAX_STRING_NEST + 1)
            .unwrap_err();
        assert_eq!(err.kind, Asn1ErrorKind::NestedAsn1String);
    }
}
