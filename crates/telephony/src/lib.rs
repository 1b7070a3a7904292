//! Telephony provider contracts
//!
//! The dial, room and transfer providers are external services; this crate
//! defines the traits the call core depends on, the SIP status surfaced on
//! dial failure, and an in-process stub implementation used for rehearsal
//! runs and tests.

pub mod provider;
pub mod stub;

pub use provider::{
    DialProvider, Participant, ParticipantIdentity, RoomName, RoomService, SipStatus,
    TelephonyError, TransferService, TrunkId,
};
pub use stub::{ProviderCall, StubTelephony};
