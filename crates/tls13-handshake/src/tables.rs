//! The two read-only tables the sequencer drives: which message comes at
//! step `index` of a negotiated variant (`SEQUENCE_TABLE`), and what to do
//! when that message is active (`ACTION_TABLE`). Transcribed from
//! `state_machine[]`/`handshakes[][]` in the original C handshake driver,
//! generalized to whatever `send`/`recv`/`sent` callbacks a caller supplies.

use crate::error::HandshakeError;
use crate::state::HandshakeState;

/// Every handshake message this sequencer knows how to place in a sequence.
/// One-to-one with `original_source/tls13_handshake.c`'s `tls13_message_type`
/// enum (`INVALID`/`INITIAL`/`NEGOTIATED` are state-machine bookkeeping, not
/// messages, and have no counterpart here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    ClientHello,
    ClientHelloRetry,
    ClientEndOfEarlyData,
    ClientCertificate,
    ClientCertificateVerify,
    ClientFinished,
    ServerHello,
    ServerHelloRetryRequest,
    ServerEncryptedExtensions,
    ServerCertificate,
    ServerCertificateRequest,
    ServerCertificateVerify,
    ServerFinished,
    ApplicationData,
}

/// The wire handshake-message type byte. Several [`MessageId`]s share one:
/// a normal `SERVER_HELLO` and a `HelloRetryRequest` are both wire-encoded
/// as `ServerHello`, distinguished only by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeType {
    ClientHello,
    ServerHello,
    EndOfEarlyData,
    Certificate,
    CertificateRequest,
    CertificateVerify,
    Finished,
    EncryptedExtensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

pub type SendFn = fn(&mut HandshakeState) -> Result<Vec<u8>, HandshakeError>;
pub type SentFn = fn(&mut HandshakeState) -> Result<(), HandshakeError>;
/// Returns the number of bytes of `body` consumed; a short count is
/// reported by the sequencer as trailing data.
pub type RecvFn = fn(&mut HandshakeState, &[u8]) -> Result<usize, HandshakeError>;

/// One row of `ACTION_TABLE`: what happens while `MessageId` is active.
pub struct HandshakeAction {
    pub handshake_type: Option<HandshakeType>,
    pub sender: Role,
    pub handshake_complete: bool,
    pub send_preserve_transcript_hash: bool,
    pub recv_preserve_transcript_hash: bool,
    pub send: Option<SendFn>,
    pub sent: Option<SentFn>,
    pub recv: Option<RecvFn>,
}

/// The default `recv` slot: accept whatever bytes arrived without
/// inspecting them. Content validation is business logic a caller installs
/// by building its own row with a real parser in this slot; the table ships
/// with this pass-through so a sequence can run to completion with no
/// business logic installed at all, exercising the sequencing behavior on
/// its own.
fn accept_any_content(_state: &mut HandshakeState, body: &[u8]) -> Result<usize, HandshakeError> {
    Ok(body.len())
}

impl HandshakeAction {
    const fn message(handshake_type: HandshakeType, sender: Role) -> Self {
        Self {
            handshake_type: Some(handshake_type),
            sender,
            handshake_complete: false,
            send_preserve_transcript_hash: false,
            recv_preserve_transcript_hash: false,
            send: None,
            sent: None,
            recv: Some(accept_any_content),
        }
    }

    const fn terminal() -> Self {
        Self {
            handshake_type: None,
            sender: Role::Client,
            handshake_complete: true,
            send_preserve_transcript_hash: false,
            recv_preserve_transcript_hash: false,
            send: None,
            sent: None,
            recv: None,
        }
    }
}

pub fn action_for(message: MessageId) -> &'static HandshakeAction {
    &ACTION_TABLE[message as usize]
}

/// Indexed by `MessageId as usize`; order must match the enum exactly.
pub static ACTION_TABLE: [HandshakeAction; 14] = [
    HandshakeAction::message(HandshakeType::ClientHello, Role::Client),
    HandshakeAction::message(HandshakeType::ClientHello, Role::Client),
    HandshakeAction::message(HandshakeType::EndOfEarlyData, Role::Client),
    HandshakeAction {
        send_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::Certificate, Role::Client)
    },
    HandshakeAction {
        recv_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::CertificateVerify, Role::Client)
    },
    HandshakeAction {
        recv_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::Finished, Role::Client)
    },
    HandshakeAction::message(HandshakeType::ServerHello, Role::Server),
    HandshakeAction::message(HandshakeType::ServerHello, Role::Server),
    HandshakeAction::message(HandshakeType::EncryptedExtensions, Role::Server),
    HandshakeAction {
        send_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::Certificate, Role::Server)
    },
    HandshakeAction::message(HandshakeType::CertificateRequest, Role::Server),
    HandshakeAction {
        recv_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::CertificateVerify, Role::Server)
    },
    HandshakeAction {
        send_preserve_transcript_hash: true,
        recv_preserve_transcript_hash: true,
        ..HandshakeAction::message(HandshakeType::Finished, Role::Server)
    },
    HandshakeAction::terminal(),
];

/// Which negotiated wrinkles apply to the current session — a plain bitset
/// rather than an external `bitflags` dependency, since five bits need
/// nothing more than `const` associated values and `|`/`&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Variant(u8);

impl Variant {
    pub const INITIAL: Variant = Variant(0);
    pub const NEGOTIATED: Variant = Variant(1 << 4);
    pub const WITHOUT_HRR: Variant = Variant(1 << 0);
    pub const WITHOUT_CR: Variant = Variant(1 << 1);
    pub const WITH_PSK: Variant = Variant(1 << 2);
    pub const WITH_CCV: Variant = Variant(1 << 3);

    pub const fn union(self, other: Variant) -> Variant {
        Variant(self.0 | other.0)
    }

    pub const fn contains(self, other: Variant) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for Variant {
    type Output = Variant;
    fn bitor(self, rhs: Variant) -> Variant {
        self.union(rhs)
    }
}

/// `SEQUENCE_TABLE`: every `handshakes[][]` row the original driver defines.
/// `INITIAL` drives the pre-negotiation hello exchange (including an
/// optional retry); every `NEGOTIATED` row is the remainder of the
/// handshake for one combination of hello-retry/cert-request/PSK/
/// client-cert-verify.
pub static SEQUENCE_TABLE: &[(Variant, &[MessageId])] = &[
    (
        Variant::INITIAL,
        &[
            MessageId::ClientHello,
            MessageId::ServerHelloRetryRequest,
            MessageId::ClientHelloRetry,
            MessageId::ServerHello,
        ],
    ),
    (
        Variant::NEGOTIATED,
        &[
            MessageId::ClientHello,
            MessageId::ServerHelloRetryRequest,
            MessageId::ClientHelloRetry,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificateRequest,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientCertificate,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITHOUT_HRR.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificateRequest,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientCertificate,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITHOUT_CR.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHelloRetryRequest,
            MessageId::ClientHelloRetry,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITHOUT_HRR.0 | Variant::WITHOUT_CR.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITH_PSK.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHelloRetryRequest,
            MessageId::ClientHelloRetry,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerFinished,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITHOUT_HRR.0 | Variant::WITH_PSK.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerFinished,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITH_CCV.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHelloRetryRequest,
            MessageId::ClientHelloRetry,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificateRequest,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientCertificate,
            MessageId::ClientCertificateVerify,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
    (
        Variant(Variant::NEGOTIATED.0 | Variant::WITHOUT_HRR.0 | Variant::WITH_CCV.0),
        &[
            MessageId::ClientHello,
            MessageId::ServerHello,
            MessageId::ServerEncryptedExtensions,
            MessageId::ServerCertificateRequest,
            MessageId::ServerCertificate,
            MessageId::ServerCertificateVerify,
            MessageId::ServerFinished,
            MessageId::ClientCertificate,
            MessageId::ClientCertificateVerify,
            MessageId::ClientFinished,
            MessageId::ApplicationData,
        ],
    ),
];

/// Look up the message active at `(variant, index)`, the way
/// `tls13_handshake_active_state` indexes `handshakes[hs_type][message_number]`.
pub fn message_at(variant: Variant, index: usize) -> Option<MessageId> {
    let (_, sequence) = SEQUENCE_TABLE.iter().find(|(v, _)| *v == variant)?;
    sequence.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sequence_ends_in_application_data() {
        for (variant, sequence) in SEQUENCE_TABLE {
            if *variant == Variant::INITIAL {
                continue;
            }
            assert_eq!(
                sequence.last(),
                Some(&MessageId::ApplicationData),
                "variant {variant:?} does not end in ApplicationData"
            );
        }
    }

    #[test]
    fn action_table_is_indexed_by_message_id() {
        assert_eq!(action_for(MessageId::ClientHello).sender, Role::Client);
        assert_eq!(action_for(MessageId::ServerFinished).sender, Role::Server);
        assert!(action_for(MessageId::ApplicationData).handshake_complete);
    }

    #[test]
    fn message_at_resolves_without_hrr_variant() {
        let variant = Variant::NEGOTIATED | Variant::WITHOUT_HRR;
        assert_eq!(message_at(variant, 0), Some(MessageId::ClientHello));
        assert_eq!(message_at(variant, 1), Some(MessageId::ServerHello));
    }

    #[test]
    fn message_at_returns_none_past_sequence_end() {
        let variant = Variant::NEGOTIATED | Variant::WITHOUT_HRR | Variant::WITHOUT_CR;
        let sequence_len = SEQUENCE_TABLE
            .iter()
            .find(|(v, _)| *v == variant)
            .unwrap()
            .1
            .len();
        assert_eq!(message_at(variant, sequence_len), None);
    }

    #[test]
    fn unknown_variant_resolves_to_nothing() {
        let bogus = Variant(0xFF);
        assert_eq!(message_at(bogus, 0), None);
    }
}
