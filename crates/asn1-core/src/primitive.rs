//! Turning a content-bytes slice into a concrete leaf [`Asn1Value`].

use num_bigint::BigInt;
use num_bigint::Sign;

use crate::error::{Asn1Error, Asn1ErrorKind};
use crate::tag::UniversalTag;
use crate::value::Asn1Value;

/// Dispatch on `utype` and build the leaf value from `bytes` (already the
/// fully-collected content: for a SEQUENCE/SET/OTHER this is the verbatim
/// span; for a constructed string this is the flattened fragment buffer;
/// otherwise it is exactly `content_length` bytes read from the cursor).
pub fn construct(bytes: &[u8], utype: UniversalTag) -> Result<Asn1Value, Asn1Error> {
    match utype {
        UniversalTag::Null => {
            if !bytes.is_empty() {
                return Err(Asn1Error::new(Asn1ErrorKind::NullWrongLength));
            }
            Ok(Asn1Value::Null)
        }
        UniversalTag::Boolean => {
            if bytes.len() != 1 {
                return Err(Asn1Error::new(Asn1ErrorKind::BooleanWrongLength));
            }
            Ok(Asn1Value::Boolean(bytes[0] != 0))
        }
        UniversalTag::Integer | UniversalTag::Enumerated => Ok(Asn1Value::Integer(decode_integer(bytes)?)),
        UniversalTag::ObjectIdentifier => Ok(Asn1Value::ObjectIdentifier(decode_oid(bytes)?)),
        UniversalTag::BitString => decode_bit_string(bytes),
        UniversalTag::OctetString => Ok(Asn1Value::OctetString(bytes.to_vec())),
        UniversalTag::BmpString => {
            if bytes.len() % 2 != 0 {
                return Err(Asn1Error::new(Asn1ErrorKind::BmpStringWrongLength));
            }
            Ok(Asn1Value::TaggedString {
                tag_number: utype.number(),
                bytes: bytes.to_vec(),
            })
        }
        UniversalTag::UniversalString => {
            if bytes.len() % 4 != 0 {
                return Err(Asn1Error::new(Asn1ErrorKind::UniversalStringWrongLength));
            }
            Ok(Asn1Value::TaggedString {
                tag_number: utype.number(),
                bytes: bytes.to_vec(),
            })
        }
        UniversalTag::Sequence | UniversalTag::Set | UniversalTag::Other(_) => Ok(Asn1Value::Opaque(bytes.to_vec())),
        // Remaining string/time types: store verbatim, tag alongside.
        other => Ok(Asn1Value::TaggedString {
            tag_number: other.number(),
            bytes: bytes.to_vec(),
        }),
    }
}

/// Two's-complement big-endian decode into an arbitrary-precision integer.
/// An empty content slice is a malformed INTEGER; treated here as zero only
/// when callers have already validated non-emptiness at the tag/length
/// layer — the interpreter is responsible for that check before calling in.
fn decode_integer(bytes: &[u8]) -> Result<BigInt, Asn1Error> {
    if bytes.is_empty() {
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    let negative = bytes[0] & 0x80 != 0;
    if !negative {
        return Ok(BigInt::from_bytes_be(Sign::Plus, bytes));
    }
    // Two's-complement negative: invert and add one over the magnitude.
    let mut inverted: Vec<u8> = bytes.iter().map(|b| !b).collect();
    let mut carry = 1u16;
    for byte in inverted.iter_mut().rev() {
        let sum = u16::from(*byte) + carry;
        *byte = sum as u8;
        carry = sum >> 8;
        if carry == 0 {
            break;
        }
    }
    Ok(-BigInt::from_bytes_be(Sign::Plus, &inverted))
}

/// BER OID subidentifier stream: base-128, continuation bit in the high bit
/// of each octet; the first subidentifier is split as `40*X + Y`.
fn decode_oid(bytes: &[u8]) -> Result<Vec<u64>, Asn1Error> {
    if bytes.is_empty() {
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    let mut arcs = Vec::new();
    let mut value: u64 = 0;
    let mut started = false;
    for &byte in bytes {
        started = true;
        value = value
            .checked_shl(7)
            .ok_or_else(|| Asn1Error::new(Asn1ErrorKind::TooLong))?;
        value |= u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            arcs.push(value);
            value = 0;
            started = false;
        }
    }
    if started {
        // Truncated subidentifier: the last byte had its continuation bit set.
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    if arcs.is_empty() {
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    let first = arcs.remove(0);
    let (x, y) = if first < 40 {
        (0, first)
    } else if first < 80 {
        (1, first - 40)
    } else {
        (2, first - 80)
    };
    let mut out = vec![x, y];
    out.extend(arcs);
    Ok(out)
}

fn decode_bit_string(bytes: &[u8]) -> Result<Asn1Value, Asn1Error> {
    if bytes.is_empty() {
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    let unused_bits = bytes[0];
    if unused_bits > 7 {
        return Err(Asn1Error::new(Asn1ErrorKind::BadObjectHeader));
    }
    Ok(Asn1Value::BitString {
        unused_bits,
        bytes: bytes[1..].to_vec(),
    })
}
