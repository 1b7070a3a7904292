//! Call session coordination
//!
//! Brings a conversational session and an outbound dial together into one
//! live call, and owns the call's terminal actions:
//! - [`CallCoordinator`] starts the session and the dial concurrently and
//!   resolves their rendezvous without losing early remote speech
//! - [`CallContext`] carries the room, the shutdown signal and the shutdown
//!   hooks that run on every exit path
//! - [`TerminationController`] ends the call without truncating in-flight
//!   speech, or hands it to a human
//! - [`TranscriptSink`] serializes the conversation to disk once at call end
//! - [`ChannelSession`] is an in-process session used for rehearsal and tests

pub mod channel;
pub mod context;
pub mod coordinator;
pub mod termination;
pub mod transcript;

use thiserror::Error;

use debt_collector_telephony::{ParticipantIdentity, SipStatus, TelephonyError};

pub use channel::ChannelSession;
pub use context::CallContext;
pub use coordinator::{CallCoordinator, CallHandle};
pub use termination::{TerminationController, TransferOutcome};
pub use transcript::TranscriptSink;

/// Errors raised while coordinating a call
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no outbound trunk configured")]
    NoTrunk,

    /// The dial attempt definitively failed; the call context is shut down
    #[error("dial failed: {status}")]
    Dial { status: SipStatus },

    /// The remote participant never joined within the bounded wait
    #[error("timed out waiting for participant {identity} to join")]
    JoinTimeout { identity: ParticipantIdentity },

    #[error("session start failed: {0}")]
    SessionStart(String),

    #[error(transparent)]
    Telephony(#[from] TelephonyError),

    #[error(transparent)]
    Core(#[from] debt_collector_core::Error),
}
