//! Drives `asn1-core` against loaded vectors and turns the outcome into a
//! [`report::DecodeSuiteReport`].

use std::path::Path;

use crate::catalog;
use crate::error::{HarnessError, HarnessResult};
use crate::report::{DecodeSuiteReport, DecodeVectorResult, VectorStatus};
use crate::vectors::{self, DecodeExpectation, DecodeVector, DecodeVectorFile};

pub fn run_decode_vector(vector: &DecodeVector) -> HarnessResult<DecodeVectorResult> {
    let item = catalog::lookup(&vector.template).ok_or_else(|| HarnessError::UnknownTemplate(vector.template.clone()))?;
    let input = vectors::decode_hex(&vector.input_hex).ok_or_else(|| HarnessError::BadHex(vector.input_hex.clone()))?;

    let outcome = asn1_core::decode(&input, item);
    let (status, detail) = match (&vector.expect, outcome) {
        (DecodeExpectation::Ok, Ok(_)) => (VectorStatus::Pass, None),
        (DecodeExpectation::Ok, Err(e)) => (VectorStatus::Fail, Some(format!("expected success, got {e}"))),
        (DecodeExpectation::Error { kind }, Ok(_)) => {
            (VectorStatus::Fail, Some(format!("expected error {kind}, decode succeeded")))
        }
        (DecodeExpectation::Error { kind }, Err(e)) => {
            let observed = format!("{:?}", e.kind);
            if &observed == kind {
                (VectorStatus::Pass, None)
            } else {
                (VectorStatus::Fail, Some(format!("expected error kind {kind}, got {observed} ({e})")))
            }
        }
    };

    Ok(DecodeVectorResult {
        name: vector.name.clone(),
        status,
        detail,
    })
}

pub fn run_decode_suite_from_path(path: &Path) -> HarnessResult<DecodeSuiteReport> {
    let text = std::fs::read_to_string(path)?;
    let file: DecodeVectorFile = serde_json::from_str(&text)?;
    run_decode_suite(&file)
}

pub fn run_decode_suite(file: &DecodeVectorFile) -> HarnessResult<DecodeSuiteReport> {
    let results = file
        .vectors
        .iter()
        .map(run_decode_vector)
        .collect::<HarnessResult<Vec<_>>>()?;
    Ok(DecodeSuiteReport::from_results(results))
}
