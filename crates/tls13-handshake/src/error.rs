//! Hand-rolled error type, matching `asn1_core::error`'s style: this crate
//! stays a leaf engine crate with no `thiserror` dependency.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeErrorKind {
    /// A `send`/`recv`/`sent` callback reported a business-logic failure
    /// (malformed negotiated parameters, an unsupported extension, etc).
    CallbackFailed,
    /// The active `(variant, index)` pair has no table entry.
    InvalidState,
    /// `index` advanced past the end of the active sequence.
    SequenceExhausted,
}

impl core::fmt::Display for HandshakeErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::CallbackFailed => "handshake callback failed",
            Self::InvalidState => "no action for the current handshake state",
            Self::SequenceExhausted => "handshake sequence exhausted without reaching completion",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeError {
    pub kind: HandshakeErrorKind,
    pub detail: Option<&'static str>,
}

impl HandshakeError {
    pub fn new(kind: HandshakeErrorKind) -> Self {
        Self { kind, detail: None }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: &'static str) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl core::fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(detail) = self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HandshakeError {}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
