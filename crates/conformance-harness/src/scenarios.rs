//! Named handshake scripts the `handshake` subcommand runs, mirroring the
//! [`crate::catalog`] approach: the send/receive script is compiled-in
//! behavior, not something a JSON vector can describe, since driving a
//! [`Transport`] is code, not data.

use std::collections::VecDeque;

use serde::Serialize;
use tls13_handshake::{
    perform, AlertDescription, HandshakeState, HandshakeType, IoOutcome, ReceivedMessage, Role,
    Transport, Variant,
};

use crate::error::{HarnessError, HarnessResult};
use crate::hasher::Sha256Hasher;

struct ScriptedTransport {
    inbox: VecDeque<ReceivedMessage>,
    sent: Vec<HandshakeType>,
    alerts: Vec<AlertDescription>,
}

impl ScriptedTransport {
    fn with_inbox(messages: Vec<HandshakeType>) -> Self {
        Self {
            inbox: messages
                .into_iter()
                .map(|handshake_type| ReceivedMessage { handshake_type, body: Vec::new() })
                .collect(),
            sent: Vec::new(),
            alerts: Vec::new(),
        }
    }
}

impl Transport for ScriptedTransport {
    fn send_message(&mut self, handshake_type: HandshakeType, _body: &[u8]) -> IoOutcome {
        self.sent.push(handshake_type);
        IoOutcome::Success
    }

    fn recv_message(&mut self) -> Result<ReceivedMessage, IoOutcome> {
        self.inbox.pop_front().ok_or(IoOutcome::WouldBlock)
    }

    fn send_alert(&mut self, alert: AlertDescription) -> IoOutcome {
        self.alerts.push(alert);
        IoOutcome::Failure
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub outcome: String,
    pub completed: bool,
    pub sent: Vec<String>,
    pub alerts: Vec<String>,
    pub final_index: usize,
}

fn render(name: &str, outcome: IoOutcome, state: &HandshakeState, transport: &ScriptedTransport) -> ScenarioReport {
    ScenarioReport {
        scenario: name.to_string(),
        outcome: format!("{outcome:?}"),
        completed: state.completed,
        sent: transport.sent.iter().map(|t| format!("{t:?}")).collect(),
        alerts: transport.alerts.iter().map(|a| format!("{a:?}")).collect(),
        final_index: state.index,
    }
}

/// Variant `NEGOTIATED|WITHOUT_HRR` driven to `APPLICATION_DATA` in one
/// uninterrupted run.
fn happy_path() -> ScenarioReport {
    let mut state = HandshakeState::new(Role::Client);
    state.variant = Variant::NEGOTIATED | Variant::WITHOUT_HRR;
    let mut transport = ScriptedTransport::with_inbox(vec![
        HandshakeType::ServerHello,
        HandshakeType::EncryptedExtensions,
        HandshakeType::CertificateRequest,
        HandshakeType::Certificate,
        HandshakeType::CertificateVerify,
        HandshakeType::Finished,
    ]);
    let mut hasher = Sha256Hasher::default();
    let outcome = perform(&mut state, &mut transport, &mut hasher);
    render("happy-path-without-hrr", outcome, &state, &transport)
}

/// A CERTIFICATE_REQUEST arriving while SERVER_HELLO is expected is
/// rejected with `UNEXPECTED_MESSAGE`.
fn certificate_request_out_of_order() -> ScenarioReport {
    let mut state = HandshakeState::new(Role::Client);
    state.variant = Variant::NEGOTIATED | Variant::WITHOUT_HRR;
    let mut transport = ScriptedTransport::with_inbox(vec![HandshakeType::CertificateRequest]);
    let mut hasher = Sha256Hasher::default();
    let outcome = perform(&mut state, &mut transport, &mut hasher);
    render("certificate-request-out-of-order", outcome, &state, &transport)
}

/// A server skipping the optional certificate request and sending its
/// certificate directly, which must be accepted, not rejected.
fn certificate_request_omitted() -> ScenarioReport {
    let mut state = HandshakeState::new(Role::Client);
    state.variant = Variant::NEGOTIATED | Variant::WITHOUT_HRR;
    state.index = 3; // ServerCertificateRequest
    let mut transport = ScriptedTransport::with_inbox(vec![HandshakeType::Certificate]);
    let mut hasher = Sha256Hasher::default();
    let outcome = perform(&mut state, &mut transport, &mut hasher);
    render("certificate-request-omitted", outcome, &state, &transport)
}

pub fn run(name: &str) -> HarnessResult<ScenarioReport> {
    match name {
        "happy-path-without-hrr" => Ok(happy_path()),
        "certificate-request-out-of-order" => Ok(certificate_request_out_of_order()),
        "certificate-request-omitted" => Ok(certificate_request_omitted()),
        other => Err(HarnessError::UnknownScenario(other.to_string())),
    }
}
