//! The `sha2`-backed [`tls13_handshake::TranscriptHasher`] this harness
//! drives the sequencer with. `tls13-handshake` itself stays agnostic to any
//! concrete hash; this crate supplies one the same way
//! `frankenlibc-membrane`'s evidence module picks `sha2` as its hashing
//! primitive underneath deterministic bookkeeping.

use sha2::{Digest, Sha256};
use tls13_handshake::TranscriptHasher;

#[derive(Default)]
pub struct Sha256Hasher {
    state: Sha256,
}

impl TranscriptHasher for Sha256Hasher {
    fn update(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    fn snapshot(&self) -> Vec<u8> {
        self.state.clone().finalize().to_vec()
    }
}
