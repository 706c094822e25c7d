//! The JSON shape of `tests/vectors/*.json`: one decode expectation per
//! entry, matching `frankenlibc-harness`'s fixture JSON under
//! `tests/runtime_math/golden/`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DecodeVectorFile {
    pub vectors: Vec<DecodeVector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecodeVector {
    pub name: String,
    /// Name of a [`crate::catalog`] entry.
    pub template: String,
    /// Input bytes, hex-encoded with no separators.
    pub input_hex: String,
    pub expect: DecodeExpectation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeExpectation {
    Ok,
    /// `kind` is the `Debug` rendering of the expected `Asn1ErrorKind`
    /// variant, e.g. `"WrongTag"`.
    Error { kind: String },
}

pub fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).ok())
        .collect()
}
