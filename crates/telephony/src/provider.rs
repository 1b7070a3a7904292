//! Provider traits and identifier types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Logical container binding all legs and the session of one call
    RoomName
}
string_id! {
    /// Identity of a participant within a room
    ParticipantIdentity
}
string_id! {
    /// Outbound SIP trunk identifier
    TrunkId
}

/// Status/code pair a dial provider surfaces on definitive failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SipStatus {
    pub code: String,
    pub message: String,
}

impl SipStatus {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SIP {} {}", self.code, self.message)
    }
}

/// Telephony provider errors
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// The dial attempt definitively failed (busy, no answer, invalid
    /// number, provider rejection)
    #[error("dial failed: {status}")]
    Dial { status: SipStatus },

    /// The room no longer exists. Hangup treats this as success.
    #[error("room not found: {0}")]
    RoomNotFound(RoomName),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// A remote participant joined to the call's room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub identity: ParticipantIdentity,
}

/// Places outbound calls over a SIP trunk
#[async_trait]
pub trait DialProvider: Send + Sync {
    /// Dial `to` into `room` as `identity`. Resolves once the remote party
    /// answers; a definitive failure surfaces as [`TelephonyError::Dial`]
    /// with the provider's SIP status.
    async fn create_outbound_call(
        &self,
        room: &RoomName,
        trunk: &TrunkId,
        to: &str,
        identity: &ParticipantIdentity,
    ) -> Result<(), TelephonyError>;
}

/// Manages call rooms and participant membership
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Delete the room, tearing down every attached leg. Deleting a room
    /// that is already gone yields [`TelephonyError::RoomNotFound`].
    async fn delete_room(&self, room: &RoomName) -> Result<(), TelephonyError>;

    /// Resolve once the identified participant has joined the room. The
    /// caller applies its own bound on the wait.
    async fn wait_for_participant(
        &self,
        room: &RoomName,
        identity: &ParticipantIdentity,
    ) -> Result<Participant, TelephonyError>;
}

/// Hands a call leg to another destination (e.g. a human agent)
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Transfer the identified participant's leg to `to`.
    async fn transfer_participant(
        &self,
        room: &RoomName,
        identity: &ParticipantIdentity,
        to: &str,
    ) -> Result<(), TelephonyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sip_status_display() {
        let status = SipStatus::new("486", "Busy Here");
        assert_eq!(status.to_string(), "SIP 486 Busy Here");

        let err = TelephonyError::Dial { status };
        assert_eq!(err.to_string(), "dial failed: SIP 486 Busy Here");
    }

    #[test]
    fn test_room_name_serde_transparent() {
        let room = RoomName::from("debt-collector-room");
        assert_eq!(
            serde_json::to_string(&room).unwrap(),
            "\"debt-collector-room\""
        );
    }
}
