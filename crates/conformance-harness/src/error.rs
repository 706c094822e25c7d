//! Tooling-boundary errors: unlike `asn1-core`/`tls13-handshake`, this crate
//! uses `thiserror`, matching `frankenlibc-harness/src/evidence_decode.rs`'s
//! `EvidenceDecodeError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input is not valid hex: {0}")]
    BadHex(String),
    #[error("unknown decode template '{0}'")]
    UnknownTemplate(String),
    #[error("unknown handshake scenario '{0}'")]
    UnknownScenario(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
