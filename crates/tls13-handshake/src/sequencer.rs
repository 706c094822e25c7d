//! `perform()`: the loop that walks the active sequence, dispatching
//! send/receive callbacks and tracking transcript-hash preservation.
//!
//! Grounded in `tls13_handshake_perform`/`tls13_handshake_send_action`/
//! `tls13_handshake_recv_action` in `original_source/tls13_handshake.c`.
//! Record-layer I/O (the "send bytes"/"receive bytes" primitives
//! themselves) is out of scope — a transport concern this crate never
//! owns — so it is abstracted behind [`Transport`], supplied by the caller.

use crate::state::{AlertDescription, HandshakeState, TLS1_3_VERSION};
use crate::tables::{self, HandshakeAction, HandshakeType};
use crate::transcript::TranscriptHasher;

/// The result of one `perform()` call: mirrors
/// `TLS13_IO_{SUCCESS,FAILURE,USE_LEGACY}` plus the record layer's
/// would-block signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOutcome {
    Success,
    Failure,
    UseLegacy,
    WouldBlock,
}

/// One complete handshake message as the transport layer hands it back.
pub struct ReceivedMessage {
    pub handshake_type: HandshakeType,
    pub body: Vec<u8>,
}

/// The record-layer boundary `perform()` suspends at. A real
/// implementation talks to a socket; tests use an in-memory double.
pub trait Transport {
    /// Attempt to transmit a complete handshake message. `WouldBlock`
    /// means the caller should retry the same step later.
    fn send_message(&mut self, handshake_type: HandshakeType, body: &[u8]) -> IoOutcome;
    /// Attempt to receive one complete handshake message.
    fn recv_message(&mut self) -> Result<ReceivedMessage, IoOutcome>;
    fn send_alert(&mut self, alert: AlertDescription) -> IoOutcome;
}

/// Drive `state` forward through its active sequence until completion,
/// a hard failure, a legacy-version fallback, or a suspend point.
pub fn perform(
    state: &mut HandshakeState,
    transport: &mut impl Transport,
    hasher: &mut impl TranscriptHasher,
) -> IoOutcome {
    loop {
        let Some(message) = tables::message_at(state.variant, state.index) else {
            return IoOutcome::Failure;
        };
        let action = tables::action_for(message);

        if action.handshake_complete {
            state.completed = true;
            return IoOutcome::Success;
        }

        if let Some(alert) = state.pending_alert.take() {
            return transport.send_alert(alert);
        }

        let outcome = if action.sender == state.role {
            send_path(state, transport, hasher, action)
        } else {
            recv_path(state, transport, hasher, action)
        };

        match outcome {
            IoOutcome::Success => {}
            other => return other,
        }

        state.advance();
    }
}

fn send_path(
    state: &mut HandshakeState,
    transport: &mut impl Transport,
    hasher: &mut impl TranscriptHasher,
    action: &HandshakeAction,
) -> IoOutcome {
    let handshake_type = action
        .handshake_type
        .expect("a non-terminal action always names a wire handshake type");

    let body = match action.send {
        Some(send) => match send(state) {
            Ok(body) => body,
            Err(_) => return fail_or_alert(state, transport),
        },
        None => Vec::new(),
    };
    if let Some(alert) = state.pending_alert.take() {
        return transport.send_alert(alert);
    }

    match transport.send_message(handshake_type, &body) {
        IoOutcome::Success => {}
        other => return other,
    }

    hasher.update(&body);
    if action.send_preserve_transcript_hash {
        state.transcript_snapshot = Some(hasher.snapshot());
    }

    if let Some(sent) = action.sent {
        if sent(state).is_err() {
            return fail_or_alert(state, transport);
        }
    }

    IoOutcome::Success
}

fn recv_path(
    state: &mut HandshakeState,
    transport: &mut impl Transport,
    hasher: &mut impl TranscriptHasher,
    action: &HandshakeAction,
) -> IoOutcome {
    let expected_type = action
        .handshake_type
        .expect("a non-terminal action always names a wire handshake type");

    let received = match transport.recv_message() {
        Ok(received) => received,
        Err(outcome) => return outcome,
    };

    if action.recv_preserve_transcript_hash {
        state.transcript_snapshot = Some(hasher.snapshot());
    }
    hasher.update(&received.body);

    // TLSv1.3 never signals whether a CERTIFICATE_REQUEST is coming; a
    // CERTIFICATE received while one was expected is not an error.
    let permitted_substitute =
        expected_type == HandshakeType::CertificateRequest && received.handshake_type == HandshakeType::Certificate;
    if received.handshake_type != expected_type && !permitted_substitute {
        return transport.send_alert(AlertDescription::UnexpectedMessage);
    }

    let Some(recv) = action.recv else {
        return transport.send_alert(AlertDescription::UnexpectedMessage);
    };
    let consumed = match recv(state, &received.body) {
        Ok(consumed) => consumed,
        Err(_) => return fail_or_alert(state, transport),
    };
    if consumed != received.body.len() {
        return transport.send_alert(AlertDescription::DecodeError);
    }

    // The peer's first response is where the negotiated version becomes
    // known; if a caller's `recv` hook recorded one below TLS 1.3 there,
    // this session isn't actually speaking this handshake and the caller
    // needs to fall back to its legacy implementation instead.
    if state.index == 1 {
        if let Some(version) = state.negotiated_version {
            if version < TLS1_3_VERSION {
                return IoOutcome::UseLegacy;
            }
        }
    }

    IoOutcome::Success
}

fn fail_or_alert(state: &mut HandshakeState, transport: &mut impl Transport) -> IoOutcome {
    match state.pending_alert.take() {
        Some(alert) => transport.send_alert(alert),
        None => IoOutcome::Failure,
    }
}
