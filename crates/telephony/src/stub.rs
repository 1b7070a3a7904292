//! In-process stub telephony provider
//!
//! Implements all three provider traits with scriptable behavior: answer and
//! join delays, a scripted dial failure, a scripted transfer failure. Every
//! provider invocation is recorded so rehearsal runs and tests can assert on
//! exactly what the core asked the provider to do.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::provider::{
    DialProvider, Participant, ParticipantIdentity, RoomName, RoomService, SipStatus,
    TelephonyError, TransferService, TrunkId,
};
use async_trait::async_trait;

/// One recorded provider invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Dial { room: String, to: String },
    WaitForParticipant { room: String, identity: String },
    DeleteRoom { room: String },
    Transfer { room: String, identity: String, to: String },
}

#[derive(Default)]
struct StubState {
    calls: Vec<ProviderCall>,
    deleted_rooms: HashSet<String>,
    dial_failure: Option<SipStatus>,
    transfer_failure: Option<String>,
    answered_at: Option<Instant>,
}

/// Scriptable stand-in for the dial/room/transfer providers
#[derive(Clone, Default)]
pub struct StubTelephony {
    state: Arc<Mutex<StubState>>,
    answer_delay: Duration,
    join_delay: Duration,
}

impl StubTelephony {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time the remote party takes to answer the dial.
    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    /// Time the remote participant takes to join after answering.
    pub fn with_join_delay(mut self, delay: Duration) -> Self {
        self.join_delay = delay;
        self
    }

    /// Script every dial attempt to fail with `status`.
    pub fn with_dial_failure(self, status: SipStatus) -> Self {
        self.state.lock().dial_failure = Some(status);
        self
    }

    /// Script every transfer attempt to fail with `message`.
    pub fn with_transfer_failure(self, message: impl Into<String>) -> Self {
        self.state.lock().transfer_failure = Some(message.into());
        self
    }

    /// Every provider invocation recorded so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    /// When the scripted dial was answered, if it was.
    pub fn dial_answered_at(&self) -> Option<Instant> {
        self.state.lock().answered_at
    }

    /// Whether `room` has been deleted.
    pub fn room_deleted(&self, room: &RoomName) -> bool {
        self.state.lock().deleted_rooms.contains(room.as_str())
    }

    fn record(&self, call: ProviderCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl DialProvider for StubTelephony {
    async fn create_outbound_call(
        &self,
        room: &RoomName,
        _trunk: &TrunkId,
        to: &str,
        _identity: &ParticipantIdentity,
    ) -> Result<(), TelephonyError> {
        self.record(ProviderCall::Dial {
            room: room.to_string(),
            to: to.to_string(),
        });

        let failure = self.state.lock().dial_failure.clone();
        if let Some(status) = failure {
            return Err(TelephonyError::Dial { status });
        }

        tokio::time::sleep(self.answer_delay).await;
        self.state.lock().answered_at = Some(Instant::now());
        Ok(())
    }
}

#[async_trait]
impl RoomService for StubTelephony {
    async fn delete_room(&self, room: &RoomName) -> Result<(), TelephonyError> {
        self.record(ProviderCall::DeleteRoom {
            room: room.to_string(),
        });

        let mut state = self.state.lock();
        if !state.deleted_rooms.insert(room.to_string()) {
            return Err(TelephonyError::RoomNotFound(room.clone()));
        }
        Ok(())
    }

    async fn wait_for_participant(
        &self,
        room: &RoomName,
        identity: &ParticipantIdentity,
    ) -> Result<Participant, TelephonyError> {
        self.record(ProviderCall::WaitForParticipant {
            room: room.to_string(),
            identity: identity.to_string(),
        });

        tokio::time::sleep(self.join_delay).await;
        Ok(Participant {
            identity: identity.clone(),
        })
    }
}

#[async_trait]
impl TransferService for StubTelephony {
    async fn transfer_participant(
        &self,
        room: &RoomName,
        identity: &ParticipantIdentity,
        to: &str,
    ) -> Result<(), TelephonyError> {
        self.record(ProviderCall::Transfer {
            room: room.to_string(),
            identity: identity.to_string(),
            to: to.to_string(),
        });

        let failure = self.state.lock().transfer_failure.clone();
        if let Some(message) = failure {
            return Err(TelephonyError::Transfer(message));
        }

        tracing::info!(room = %room, identity = %identity, to = %to, "stub transfer completed");
        Ok(())
    }
}
