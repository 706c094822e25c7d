#![deny(unsafe_code)]

pub mod error;
pub mod sequencer;
pub mod state;
pub mod tables;
pub mod transcript;

pub use error::{HandshakeError, HandshakeErrorKind, HandshakeResult};
pub use sequencer::{perform, IoOutcome, ReceivedMessage, Transport};
pub use state::{AlertDescription, HandshakeState, TLS1_3_VERSION};
pub use tables::{
    action_for, message_at, HandshakeAction, HandshakeType, MessageId, RecvFn, Role, SendFn,
    SentFn, Variant, ACTION_TABLE, SEQUENCE_TABLE,
};
pub use transcript::TranscriptHasher;
