//! The transcript-hash plumbing the sequencer calls into.
//!
//! Cryptographic primitives themselves are out of scope for this crate;
//! what's in scope is the deterministic bookkeeping around one — when to
//! feed bytes in and when to snapshot the running digest. Callers supply
//! the hash itself by implementing this trait.

/// A running transcript digest. `update` feeds one handshake message's
/// bytes in; `snapshot` returns the digest value *as of the most recent
/// `update`*, without resetting the running state.
pub trait TranscriptHasher {
    fn update(&mut self, bytes: &[u8]);
    fn snapshot(&self) -> Vec<u8>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TranscriptHasher;
    use sha2::{Digest, Sha256};

    /// A `sha2`-backed hasher for tests, mirroring how
    /// `frankenlibc-membrane`'s evidence module uses `sha2` as its hashing
    /// primitive underneath deterministic bookkeeping.
    #[derive(Default)]
    pub struct RecordingHasher {
        state: Sha256,
        pub updates: Vec<Vec<u8>>,
    }

    impl TranscriptHasher for RecordingHasher {
        fn update(&mut self, bytes: &[u8]) {
            self.state.update(bytes);
            self.updates.push(bytes.to_vec());
        }

        fn snapshot(&self) -> Vec<u8> {
            self.state.clone().finalize().to_vec()
        }
    }
}
