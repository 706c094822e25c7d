//! The structured pass/fail report emitted as `serde_json`, matching
//! `frankenlibc-harness`'s `DecodeReport`/`EpochDecodeProof` shape in
//! `evidence_decode.rs`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DecodeVectorResult {
    pub name: String,
    pub status: VectorStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VectorStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodeSuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<DecodeVectorResult>,
}

impl DecodeSuiteReport {
    pub fn from_results(results: Vec<DecodeVectorResult>) -> Self {
        let passed = results.iter().filter(|r| r.status == VectorStatus::Pass).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
